//! To-hit, evasion, shield and stab rolls.

use crate::config::CombatPolicy;
use crate::env::{Dice, SpeciesFlags};
use crate::state::{ActorState, Behaviour, MutationKind, PlayerTraits, Skill, StatusKind, Weapon};

/// Outcome of [`test_hit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitRoll {
    /// To-hit reached the automatic threshold.
    Automatic,
    /// The small forced band decided without looking at evasion.
    Forced(bool),
    /// `to_hit - ev`; non-negative hits.
    Rolled(i32),
}

impl HitRoll {
    pub fn hits(self) -> bool {
        match self {
            HitRoll::Automatic => true,
            HitRoll::Forced(hit) => hit,
            HitRoll::Rolled(margin) => margin >= 0,
        }
    }

    /// Evasion margin used for the miss message.
    pub fn margin(self) -> i32 {
        match self {
            HitRoll::Automatic | HitRoll::Forced(true) => 0,
            HitRoll::Forced(false) => -1,
            HitRoll::Rolled(margin) => margin,
        }
    }
}

/// Situational adjustments applied after the base to-hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitConditions {
    pub attacker_confused: bool,
    /// The attacker cannot see the defender.
    pub defender_unseen: bool,
    pub defender_backlit: bool,
}

impl HitConditions {
    pub fn between(attacker: &ActorState, defender: &ActorState, attacker_sees: bool) -> Self {
        Self {
            attacker_confused: attacker.is_confused(),
            defender_unseen: !attacker_sees,
            defender_backlit: defender.has(StatusKind::Backlit),
        }
    }
}

/// Player base to-hit before the roll.
///
/// # Formula
///
/// ```text
/// 15 + dex/2 + random2(fighting + 1)
///    + (weapon ? skill + plus + accuracy : 6 + unarmed combat)
///    + slaying + eyeballs (2*lvl + 1)
/// ```
pub fn player_base_to_hit(dice: &mut Dice<'_>, traits: &PlayerTraits, weapon: Option<&Weapon>) -> i32 {
    let mut mhit = 15 + traits.dexterity / 2;
    mhit += dice.random2(traits.skill(Skill::Fighting) + 1);
    mhit += match weapon {
        Some(weapon) => traits.skill(weapon.skill) + weapon.plus + weapon.accuracy,
        None => 6 + traits.skill(Skill::UnarmedCombat),
    };
    mhit += traits.slaying;
    let eyeballs = i32::from(traits.mutation(MutationKind::Eyeballs));
    if eyeballs > 0 {
        mhit += 2 * eyeballs + 1;
    }
    mhit
}

/// Monster base to-hit before the roll.
///
/// # Formula
///
/// ```text
/// 18 + hd * (fighter ? 25 : 15) / 10 + weapon plus + weapon accuracy
/// ```
pub fn monster_base_to_hit(attacker: &ActorState, weapon: Option<&Weapon>) -> i32 {
    let per_hd = if attacker.has_flag(SpeciesFlags::FIGHTER) { 25 } else { 15 };
    let mut mhit = 18 + attacker.hit_dice() * per_hd / 10;
    if let Some(weapon) = weapon {
        mhit += weapon.plus + weapon.accuracy;
    }
    mhit
}

/// Applies confusion, visibility and backlight to a to-hit value.
pub fn post_roll_modifiers(to_hit: i32, attacker_is_player: bool, conditions: HitConditions) -> i32 {
    let mut to_hit = to_hit;
    if conditions.attacker_confused {
        to_hit -= 5;
    }
    if conditions.defender_unseen {
        if attacker_is_player {
            to_hit -= 6;
        } else {
            to_hit = to_hit * 65 / 100;
        }
    }
    if conditions.defender_backlit {
        to_hit += 5;
    }
    to_hit
}

/// Final player to-hit: roll first, modify after.
pub fn player_to_hit(
    dice: &mut Dice<'_>,
    traits: &PlayerTraits,
    weapon: Option<&Weapon>,
    conditions: HitConditions,
) -> i32 {
    let mhit = player_base_to_hit(dice, traits, weapon);
    let rolled = dice.random2(mhit);
    post_roll_modifiers(rolled, true, conditions)
}

/// Final monster to-hit: modify first, roll after.
pub fn monster_to_hit(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    weapon: Option<&Weapon>,
    conditions: HitConditions,
) -> i32 {
    let mhit = post_roll_modifiers(monster_base_to_hit(attacker, weapon), false, conditions);
    dice.random2(mhit + 1)
}

/// Accuracy of player aux attacks.
///
/// # Formula
///
/// ```text
/// (1300 + dex*75 + fighting*30) / 100 + slaying
/// ```
pub fn aux_to_hit(traits: &PlayerTraits) -> i32 {
    (1300 + traits.dexterity * 75 + traits.skill(Skill::Fighting) * 30) / 100 + traits.slaying
}

/// Rolls the swing against the defender's evasion.
///
/// Monster attackers face a randomised evasion, `random2avg(2*ev, 2)`.
pub fn test_hit(
    dice: &mut Dice<'_>,
    to_hit: i32,
    ev: i32,
    randomise_ev: bool,
    policy: &CombatPolicy,
) -> HitRoll {
    if to_hit >= policy.automatic_hit {
        return HitRoll::Automatic;
    }
    if dice.x_chance_in_y(policy.auto_hit_miss_percent, 100) {
        return HitRoll::Forced(dice.coinflip());
    }
    let ev = if randomise_ev {
        dice.random2avg(2 * ev, 2)
    } else {
        ev
    };
    HitRoll::Rolled(to_hit - ev)
}

/// Shield block roll. Helpless defenders and spent shields never block.
///
/// # Formula
///
/// ```text
/// pro = shield (/ 3 when the attacker is unseen)
/// con = random2(to_hit)
/// block when pro >= con
/// ```
pub fn shield_blocks(
    dice: &mut Dice<'_>,
    defender: &ActorState,
    to_hit: i32,
    attacker_unseen: bool,
) -> bool {
    if defender.shield <= 0 || defender.incapacitated() || defender.has(StatusKind::ShieldExhausted) {
        return false;
    }
    let pro = if attacker_unseen {
        defender.shield / 3
    } else {
        defender.shield
    };
    pro >= dice.random2(to_hit)
}

/// Decides whether a player swing is a stab and how good it is.
///
/// Returns the stab bonus: 0 when no stab happens, 1 for a helpless target,
/// 2 for a defender that cannot see the attacker, 4 for a distracted one.
/// Only the helpless case skips the skill roll.
pub fn stab_check(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &ActorState,
    defender_sees_attacker: bool,
    weapon: Option<&Weapon>,
) -> i32 {
    let Some(traits) = attacker.player_traits() else {
        return 0;
    };
    if attacker.is_confused() || !defender.is_alive() {
        return 0;
    }

    let bonus = if defender.incapacitated() {
        return 1;
    } else if !defender_sees_attacker {
        2
    } else if defender.is_monster()
        && matches!(defender.behaviour, Behaviour::Wandering | Behaviour::Seeking(_))
        && defender.foe != Some(attacker.id)
    {
        4
    } else {
        return 0;
    };

    let skill = weapon.map_or(Skill::UnarmedCombat, |w| w.skill);
    let chance =
        traits.skill(skill) / 2 + traits.skill(Skill::Stealth) / 2 + traits.dexterity + 1;
    if dice.x_chance_in_y(chance, 100) { bonus } else { 0 }
}

/// Adverb for a miss message by how far the swing fell short.
pub fn evasion_adverb(margin: i32) -> &'static str {
    match margin {
        m if m <= -20 => " completely",
        m if m <= -12 => "",
        m if m <= -6 => " closely",
        _ => " barely",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{RngOracle, SpeciesDef, SpeciesId, stream};
    use crate::state::{EntityId, Position, StatusEffect};

    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    fn orc() -> ActorState {
        let def = SpeciesDef::new(SpeciesId(5), "orc", 4).with_defences(20, 0, 10);
        ActorState::monster(EntityId(1), &def, Position::new(1, 0))
    }

    fn player() -> ActorState {
        ActorState::player(
            "Ada",
            Position::ORIGIN,
            PlayerTraits::new(5, 10, 14).with_skill(Skill::Fighting, 4),
        )
    }

    #[test]
    fn player_base_to_hit_unarmed() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let traits = PlayerTraits::new(5, 10, 14).with_skill(Skill::Fighting, 4);
        // 15 + 7 + random2(5)=4 + 6
        assert_eq!(player_base_to_hit(&mut dice, &traits, None), 32);
    }

    #[test]
    fn monster_base_to_hit_counts_fighters() {
        let plain = orc();
        assert_eq!(monster_base_to_hit(&plain, None), 24);
        let def = SpeciesDef::new(SpeciesId(6), "knight", 4).with_flags(SpeciesFlags::FIGHTER);
        let knight = ActorState::monster(EntityId(2), &def, Position::ORIGIN);
        assert_eq!(monster_base_to_hit(&knight, None), 28);
    }

    #[test]
    fn post_roll_penalties_differ_by_attacker() {
        let conditions = HitConditions {
            attacker_confused: true,
            defender_unseen: true,
            defender_backlit: false,
        };
        assert_eq!(post_roll_modifiers(40, true, conditions), 29);
        assert_eq!(post_roll_modifiers(40, false, conditions), 22);
    }

    #[test]
    fn automatic_threshold_always_hits() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let policy = CombatPolicy::default();
        assert_eq!(test_hit(&mut dice, 1500, 99, false, &policy), HitRoll::Automatic);
        assert_eq!(test_hit(&mut dice, 5, 20, false, &policy), HitRoll::Rolled(-15));
    }

    #[test]
    fn forced_band_uses_a_coinflip() {
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let roll = test_hit(&mut dice, 0, 50, true, &CombatPolicy::default());
        assert_eq!(roll, HitRoll::Forced(true));
        assert!(roll.hits());
    }

    #[test]
    fn exhausted_shield_never_blocks() {
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let mut defender = player().with_shield(5);
        assert!(shield_blocks(&mut dice, &defender, 30, false));
        defender.statuses.add(StatusEffect::new(StatusKind::ShieldExhausted, 1));
        assert!(!shield_blocks(&mut dice, &defender, 30, false));
    }

    #[test]
    fn sleeping_targets_are_stabbed_without_a_roll() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let attacker = player();
        let sleeper = orc().with_behaviour(Behaviour::Sleeping);
        assert_eq!(stab_check(&mut dice, &attacker, &sleeper, false, None), 1);
        assert_eq!(dice.rolls(), 0);

        let confused = player().with_status(StatusEffect::new(StatusKind::Confused, 3));
        assert_eq!(stab_check(&mut dice, &confused, &sleeper, false, None), 0);
    }

    #[test]
    fn distracted_monsters_need_a_roll() {
        let attacker = player();
        let wanderer = orc();

        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert_eq!(stab_check(&mut dice, &attacker, &wanderer, true, None), 4);

        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert_eq!(stab_check(&mut dice, &attacker, &wanderer, true, None), 0);

        let mut hunter = orc();
        hunter.foe = Some(EntityId::PLAYER);
        assert_eq!(stab_check(&mut dice, &attacker, &hunter, true, None), 0);
    }

    #[test]
    fn adverbs_follow_the_margin() {
        assert_eq!(evasion_adverb(-25), " completely");
        assert_eq!(evasion_adverb(-12), "");
        assert_eq!(evasion_adverb(-7), " closely");
        assert_eq!(evasion_adverb(-1), " barely");
    }

    #[test]
    fn aux_accuracy() {
        let traits = PlayerTraits::new(1, 10, 10).with_skill(Skill::Fighting, 10);
        assert_eq!(aux_to_hit(&traits), (1300 + 750 + 300) / 100);
    }
}
