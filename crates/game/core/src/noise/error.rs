use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::state::{EntityId, Position};

/// Errors raised while registering noise.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoiseError {
    /// The noise source lies outside the grid.
    #[error("noise source {position} is outside the map")]
    OutOfBounds {
        position: Position,
        #[cfg_attr(feature = "serde", serde(skip))]
        context: ErrorContext,
    },
}

impl NoiseError {
    /// Creates an OutOfBounds error. The grid does not know the command
    /// nonce, so callers stamp it with [`NoiseError::at_nonce`].
    pub fn out_of_bounds(position: Position, producer: Option<EntityId>) -> Self {
        let context = ErrorContext::new(0)
            .with_position(position)
            .with_message("noise source off the map");
        Self::OutOfBounds {
            position,
            context: match producer {
                Some(actor) => context.with_actor(actor),
                None => context,
            },
        }
    }

    #[must_use]
    pub fn at_nonce(mut self, nonce: u64) -> Self {
        match &mut self {
            Self::OutOfBounds { context, .. } => context.nonce = nonce,
        }
        self
    }
}

impl GameError for NoiseError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            NoiseError::OutOfBounds { .. } => ErrorSeverity::Validation,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            NoiseError::OutOfBounds { context, .. } => Some(context),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            NoiseError::OutOfBounds { .. } => "NOISE_OUT_OF_BOUNDS",
        }
    }
}
