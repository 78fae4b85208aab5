use std::fmt;

/// Unique identifier for any actor tracked in the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for the controllable player character.
    pub const PLAYER: Self = Self(0);

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::PLAYER
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the position shifted by the given step.
    pub const fn offset(self, step: Step) -> Self {
        Self::new(self.x + step.dx as i32, self.y + step.dy as i32)
    }

    /// Chebyshev distance, the number of king moves between two cells.
    pub fn distance(self, other: Position) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// True when `other` is one of the eight neighbours (or the same cell).
    pub fn is_adjacent(self, other: Position) -> bool {
        self.distance(other) <= 1
    }

    /// Unit step pointing from `self` toward `other` (component-wise sign).
    pub fn step_toward(self, other: Position) -> Step {
        Step::new(
            (other.x - self.x).signum() as i8,
            (other.y - self.y).signum() as i8,
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Single-cell displacement on the grid. `(0, 0)` is the null step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    pub dx: i8,
    pub dy: i8,
}

impl Step {
    pub const NONE: Self = Self { dx: 0, dy: 0 };

    /// The eight compass neighbours in clockwise order, starting north.
    pub const NEIGHBOURS: [Step; 8] = [
        Step::new(0, -1),
        Step::new(1, -1),
        Step::new(1, 0),
        Step::new(1, 1),
        Step::new(0, 1),
        Step::new(-1, 1),
        Step::new(-1, 0),
        Step::new(-1, -1),
    ];

    pub const fn new(dx: i8, dy: i8) -> Self {
        Self { dx, dy }
    }

    pub const fn is_none(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub const fn reversed(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }

    /// Index of this step in [`Step::NEIGHBOURS`], if it is a unit step.
    pub fn compass_index(self) -> Option<usize> {
        Self::NEIGHBOURS.iter().position(|s| *s == self)
    }
}

/// Discrete time unit counted in whole game turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_chebyshev() {
        let a = Position::new(2, 2);
        assert_eq!(a.distance(Position::new(5, 3)), 3);
        assert_eq!(a.distance(Position::new(1, 1)), 1);
        assert!(a.is_adjacent(Position::new(3, 1)));
        assert!(!a.is_adjacent(Position::new(4, 2)));
    }

    #[test]
    fn neighbours_are_clockwise_from_north() {
        assert_eq!(Step::NEIGHBOURS[0], Step::new(0, -1));
        assert_eq!(Step::NEIGHBOURS[2], Step::new(1, 0));
        assert_eq!(Step::new(-1, -1).compass_index(), Some(7));
        assert_eq!(Step::NONE.compass_index(), None);
    }

    #[test]
    fn step_toward_uses_signs() {
        let from = Position::new(4, 4);
        assert_eq!(from.step_toward(Position::new(9, 1)), Step::new(1, -1));
        assert_eq!(from.step_toward(from), Step::NONE);
    }
}
