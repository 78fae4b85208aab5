//! Visibility between actors.
//!
//! Line of sight comes from the [`MapOracle`]; this module layers the actor
//! conditions on top (blindness, invisibility, backlighting).

use crate::env::{MapOracle, SightPolicy, SpeciesFlags};
use crate::state::{ActorState, StatusKind};

/// Maximum distance at which anything can be seen.
pub const LOS_RADIUS: u32 = 7;

/// True when `observer` perceives invisible creatures.
pub fn sees_invisible(observer: &ActorState) -> bool {
    observer.has_flag(SpeciesFlags::SEE_INVISIBLE)
}

/// Invisibility test only, ignoring terrain.
///
/// Backlit actors glow and are visible even when invisible.
pub fn visible_to(target: &ActorState, observer: &ActorState) -> bool {
    !target.has(StatusKind::Invisible) || target.has(StatusKind::Backlit) || sees_invisible(observer)
}

/// Full visibility check: the observer is not blind, the target is in range
/// and visible, and no opaque terrain stands between them.
pub fn can_see<M>(map: &M, observer: &ActorState, target: &ActorState) -> bool
where
    M: MapOracle + ?Sized,
{
    if observer.has(StatusKind::Blind) {
        return false;
    }
    if observer.position.distance(target.position) > LOS_RADIUS {
        return false;
    }
    visible_to(target, observer)
        && map.line_of_sight(observer.position, target.position, SightPolicy::SolidBlocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MapDimensions, SpeciesDef, SpeciesId, StaticTile, TerrainKind};
    use crate::state::{EntityId, PlayerTraits, Position, StatusEffect};

    struct Corridor;

    impl MapOracle for Corridor {
        fn dimensions(&self) -> MapDimensions {
            MapDimensions::new(12, 1)
        }

        fn tile(&self, position: Position) -> Option<StaticTile> {
            if !self.contains(position) {
                return None;
            }
            let terrain = if position.x == 6 {
                TerrainKind::Door
            } else {
                TerrainKind::Floor
            };
            Some(StaticTile::new(terrain))
        }
    }

    fn player_at(x: i32) -> ActorState {
        ActorState::player("Ada", Position::new(x, 0), PlayerTraits::new(1, 10, 10))
    }

    fn rat_at(x: i32) -> ActorState {
        let def = SpeciesDef::new(SpeciesId(2), "rat", 1);
        ActorState::monster(EntityId(1), &def, Position::new(x, 0))
    }

    #[test]
    fn doors_block_sight() {
        assert!(can_see(&Corridor, &player_at(0), &rat_at(5)));
        assert!(!can_see(&Corridor, &player_at(0), &rat_at(7)));
    }

    #[test]
    fn invisibility_is_undone_by_backlight() {
        let observer = rat_at(3);
        let mut target = player_at(1).with_status(StatusEffect::new(StatusKind::Invisible, 5));
        assert!(!can_see(&Corridor, &observer, &target));
        target.add_status(StatusKind::Backlit, 5);
        assert!(can_see(&Corridor, &observer, &target));
    }

    #[test]
    fn blind_observers_see_nothing() {
        let observer = player_at(0).with_status(StatusEffect::new(StatusKind::Blind, 3));
        assert!(!can_see(&Corridor, &observer, &rat_at(1)));
    }
}
