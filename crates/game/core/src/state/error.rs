//! State management errors.
//!
//! Errors related to actor bookkeeping in [`GameState`](super::GameState).

use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, Position};

/// Errors that occur during game state operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    /// An actor with the same id is already present.
    #[error("actor {0} already exists")]
    DuplicateActor(EntityId),

    /// Position is already occupied by another living actor.
    #[error("position {position} is already occupied by {occupant}")]
    CellOccupied {
        position: Position,
        occupant: EntityId,
    },

    /// Entity ID allocation overflow (all IDs exhausted).
    #[error("entity id space exhausted")]
    EntityIdExhausted,
}

impl GameError for StateError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            StateError::DuplicateActor(_) | StateError::CellOccupied { .. } => {
                ErrorSeverity::Validation
            }
            StateError::EntityIdExhausted => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StateError::DuplicateActor(_) => "STATE_DUPLICATE_ACTOR",
            StateError::CellOccupied { .. } => "STATE_CELL_OCCUPIED",
            StateError::EntityIdExhausted => "STATE_ENTITY_ID_EXHAUSTED",
        }
    }
}
