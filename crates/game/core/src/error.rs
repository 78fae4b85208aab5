//! Common error infrastructure for crawl-core.
//!
//! Domain errors (`OracleError`, `CombatError`, `NoiseError`, `StateError`)
//! live next to the code that raises them and implement [`GameError`] so
//! callers can classify them uniformly.
//!
//! Ordinary game outcomes are never errors: a missed swing, a declined
//! attack, or a noise below the audibility floor are reported through return
//! values. Errors mean the caller or the data is wrong.

use crate::state::{EntityId, Position};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; retrying with different input may succeed.
    Recoverable,

    /// Invalid input; should not be retried unchanged.
    ///
    /// Examples: unknown actor id, noise outside the map
    Validation,

    /// Unexpected state inconsistency; indicates a bug.
    ///
    /// Examples: actor references a species missing from the table
    Internal,

    /// Game cannot continue.
    ///
    /// Examples: required oracle missing
    Fatal,
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Actor that triggered the error (if applicable).
    pub actor: Option<EntityId>,

    /// Position where the error occurred (if applicable).
    pub position: Option<Position>,

    /// Command nonce at the time of error.
    pub nonce: u64,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(nonce: u64) -> Self {
        Self {
            actor: None,
            position: None,
            nonce,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_actor(mut self, actor: EntityId) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Common trait for all crawl-core errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Include `ErrorContext` in variants that need debugging info
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
