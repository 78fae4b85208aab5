use crate::env::OracleError;
use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::noise::NoiseError;
use crate::state::EntityId;

/// Programmer errors raised by the attack resolver.
///
/// A miss, a refused confirmation or an unreachable target are ordinary
/// outcomes and never surface here.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("actor {actor} is not on the roster")]
    UnknownActor { actor: EntityId, context: ErrorContext },

    #[error("aux attack index {0} is out of range")]
    AuxIndex(usize),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Noise(#[from] NoiseError),
}

impl CombatError {
    /// Creates an UnknownActor error stamped with the command nonce.
    pub fn unknown_actor(actor: EntityId, nonce: u64) -> Self {
        Self::UnknownActor {
            actor,
            context: ErrorContext::new(nonce)
                .with_actor(actor)
                .with_message("attack named an actor missing from the roster"),
        }
    }
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CombatError::UnknownActor { .. } | CombatError::AuxIndex(_) => ErrorSeverity::Internal,
            CombatError::Oracle(err) => err.severity(),
            CombatError::Noise(err) => err.severity(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            CombatError::UnknownActor { context, .. } => Some(context),
            CombatError::Noise(err) => err.context(),
            CombatError::AuxIndex(_) | CombatError::Oracle(_) => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CombatError::UnknownActor { .. } => "COMBAT_UNKNOWN_ACTOR",
            CombatError::AuxIndex(_) => "COMBAT_AUX_INDEX",
            CombatError::Oracle(err) => err.error_code(),
            CombatError::Noise(err) => err.error_code(),
        }
    }
}
