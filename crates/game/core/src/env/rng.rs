//! RNG oracle and the dice helpers built on top of it.
//!
//! Every roll is derived from `(game_seed, nonce, stream, counter)`, so a
//! replay of the same commands reproduces every hit, miss and noise fuzz.
//! [`Dice`] turns the stateless oracle into the handful of roll shapes the
//! combat and noise rules use (`random2`, `x_chance_in_y`, `div_rand_round`).

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;
}

/// PCG-XSH-RR generator: 64-bit LCG state, 32-bit permuted output.
///
/// See <https://www.pcg-random.org/>.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn advance(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn permute(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::permute(Self::advance(seed))
    }
}

/// Compute a deterministic seed for one roll.
///
/// * `game_seed` - Base seed set at game start
/// * `nonce` - Command sequence number
/// * `stream` - Independent roll stream (combat, noise, ...)
/// * `counter` - Position of the roll within the stream
pub fn compute_seed(game_seed: u64, nonce: u64, stream: u32, counter: u32) -> u64 {
    // SplitMix64 / FxHash style mixing
    let mut hash = game_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (stream as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (counter as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Roll streams, so combat and noise never share a sequence.
pub mod stream {
    pub const COMBAT: u32 = 1;
    pub const NOISE: u32 = 2;
    pub const TURN: u32 = 3;
}

/// Sequential roller over an [`RngOracle`].
pub struct Dice<'a> {
    rng: &'a dyn RngOracle,
    game_seed: u64,
    nonce: u64,
    stream: u32,
    counter: u32,
}

impl<'a> Dice<'a> {
    pub fn new(rng: &'a dyn RngOracle, game_seed: u64, nonce: u64, stream: u32) -> Self {
        Self {
            rng,
            game_seed,
            nonce,
            stream,
            counter: 0,
        }
    }

    /// Number of rolls consumed so far.
    pub fn rolls(&self) -> u32 {
        self.counter
    }

    /// Command nonce the rolls are keyed on.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    fn next(&mut self) -> u32 {
        let seed = compute_seed(self.game_seed, self.nonce, self.stream, self.counter);
        self.counter = self.counter.wrapping_add(1);
        self.rng.next_u32(seed)
    }

    /// Uniform integer in `0..n`; zero when `n <= 1`.
    pub fn random2(&mut self, n: i32) -> i32 {
        if n <= 1 {
            return 0;
        }
        ((u64::from(self.next()) * n as u64) >> 32) as i32
    }

    /// Uniform integer in `lo..=hi`.
    pub fn random_range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        lo + self.random2(hi - lo + 1)
    }

    pub fn coinflip(&mut self) -> bool {
        self.random2(2) == 0
    }

    pub fn one_chance_in(&mut self, n: i32) -> bool {
        n <= 1 || self.random2(n) == 0
    }

    /// `x` chances out of `y`. Certain when `x >= y`, impossible when `x <= 0`.
    pub fn x_chance_in_y(&mut self, x: i32, y: i32) -> bool {
        if x <= 0 {
            return false;
        }
        if x >= y {
            return true;
        }
        self.random2(y) < x
    }

    /// Integer division that rounds the remainder up with matching probability.
    pub fn div_rand_round(&mut self, num: i32, den: i32) -> i32 {
        if den <= 0 {
            return 0;
        }
        let negative = num < 0;
        let num = num.abs();
        let mut quotient = num / den;
        let remainder = num % den;
        if remainder > 0 && self.random2(den) < remainder {
            quotient += 1;
        }
        if negative { -quotient } else { quotient }
    }

    /// Average of `rolls` draws below `max`, biased toward the middle.
    pub fn random2avg(&mut self, max: i32, rolls: i32) -> i32 {
        let rolls = rolls.max(1);
        let mut sum = self.random2(max);
        for _ in 1..rolls {
            sum += self.random2(max + 1);
        }
        sum / rolls
    }

    /// Sum of `num` dice with `size` faces each.
    pub fn roll_dice(&mut self, num: i32, size: i32) -> i32 {
        if size <= 0 {
            return 0;
        }
        (0..num.max(0)).map(|_| 1 + self.random2(size)).sum()
    }

    /// Picks one element uniformly.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let index = self.random2(items.len() as i32) as usize;
        items.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    #[test]
    fn max_rolls_fail_chances_and_floor() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert_eq!(dice.random2(10), 9);
        assert!(!dice.x_chance_in_y(99, 100));
        assert!(!dice.coinflip());
        assert!(!dice.one_chance_in(3));
        assert_eq!(dice.div_rand_round(77, 10), 7);
        assert_eq!(dice.roll_dice(2, 6), 12);
    }

    #[test]
    fn min_rolls_pass_chances_and_round_up() {
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert_eq!(dice.random2(10), 0);
        assert!(dice.x_chance_in_y(1, 100));
        assert!(dice.coinflip());
        assert_eq!(dice.div_rand_round(71, 10), 8);
        assert_eq!(dice.random_range(3, 8), 3);
    }

    #[test]
    fn chance_edges_are_certain() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert!(dice.x_chance_in_y(5, 5));
        assert!(!dice.x_chance_in_y(0, 5));
        assert_eq!(dice.random2(0), 0);
        assert_eq!(dice.rolls(), 0);
    }

    #[test]
    fn pcg_dice_stay_in_range() {
        let rng = PcgRng;
        let mut dice = Dice::new(&rng, 42, 7, stream::NOISE);
        for _ in 0..500 {
            let roll = dice.random2(13);
            assert!((0..13).contains(&roll));
            let ranged = dice.random_range(-3, 3);
            assert!((-3..=3).contains(&ranged));
        }
    }

    #[test]
    fn seeds_differ_across_streams() {
        assert_ne!(
            compute_seed(1, 1, stream::COMBAT, 0),
            compute_seed(1, 1, stream::NOISE, 0)
        );
    }
}
