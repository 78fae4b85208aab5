//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the rules, the oracles and the turn hooks so clients
//! can bubble them up with consistent context.
use thiserror::Error;

use crawl_core::{
    CombatError, EntityId, ErrorContext, ErrorSeverity, GameError, NoiseError, OracleError, Position,
    StateError,
};

use crate::hooks::HookError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires a map before building")]
    MissingMap,

    #[error("actor {0} is not on the roster")]
    UnknownActor(EntityId),

    #[error("actor {0} is dead")]
    DeadActor(EntityId),

    #[error("position {0} is off the map")]
    OffMap(Position),

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Noise(#[from] NoiseError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("turn hook '{hook}' failed")]
    Hook {
        hook: &'static str,
        #[source]
        source: HookError,
    },
}

impl From<(&'static str, HookError)> for RuntimeError {
    fn from((hook, source): (&'static str, HookError)) -> Self {
        RuntimeError::Hook { hook, source }
    }
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::MissingMap => ErrorSeverity::Fatal,
            RuntimeError::UnknownActor(_)
            | RuntimeError::DeadActor(_)
            | RuntimeError::OffMap(_) => ErrorSeverity::Validation,
            RuntimeError::Combat(err) => err.severity(),
            RuntimeError::Noise(err) => err.severity(),
            RuntimeError::State(err) => err.severity(),
            RuntimeError::Oracle(err) => err.severity(),
            RuntimeError::Hook { .. } => ErrorSeverity::Internal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            RuntimeError::Combat(err) => err.context(),
            RuntimeError::Noise(err) => err.context(),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::MissingMap => "RUNTIME_MISSING_MAP",
            RuntimeError::UnknownActor(_) => "RUNTIME_UNKNOWN_ACTOR",
            RuntimeError::DeadActor(_) => "RUNTIME_DEAD_ACTOR",
            RuntimeError::OffMap(_) => "RUNTIME_OFF_MAP",
            RuntimeError::Combat(err) => err.error_code(),
            RuntimeError::Noise(err) => err.error_code(),
            RuntimeError::State(err) => err.error_code(),
            RuntimeError::Oracle(err) => err.error_code(),
            RuntimeError::Hook { .. } => "RUNTIME_HOOK_FAILED",
        }
    }
}
