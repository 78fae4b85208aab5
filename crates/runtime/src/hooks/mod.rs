//! End-of-turn hook system.
//!
//! After the noise pass, the runtime runs every registered [`TurnHook`] in
//! priority order against the shared [`HookContext`]. Hooks mutate the game
//! state directly and record what they did in a [`HookOutcome`].

mod context;
mod energy;
mod poison;
mod registry;
mod status;

pub use context::{HookContext, HookOutcome};
pub use energy::EnergyHook;
pub use poison::PoisonHook;
pub use registry::HookRegistry;
pub use status::StatusDecayHook;

use crawl_core::EntityId;

/// Defines the criticality level of a hook for error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCriticality {
    /// Hook failure aborts the rest of the turn.
    Critical,

    /// Hook failure is logged as an error but the turn continues.
    Important,

    /// Hook failure is expected and can be silently ignored.
    Optional,
}

/// Failures raised by turn hooks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    #[error("actor {actor} has non-positive speed {speed}")]
    InvalidSpeed { actor: EntityId, speed: i32 },

    #[error("{0}")]
    Custom(String),
}

/// Hook run once at the end of every turn.
///
/// Hooks are sorted by priority (lower values execute first):
/// - Negative priorities: damage over time, before anything expires
/// - Zero: default priority for most hooks
/// - Positive priorities: bookkeeping that should see the final state
pub trait TurnHook: Send + Sync {
    /// Returns a human-readable name for this hook (used in logging and debugging).
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Important
    }

    /// Cheap check run before [`TurnHook::execute`].
    fn should_trigger(&self, _ctx: &HookContext<'_, '_>) -> bool {
        true
    }

    fn execute(&self, ctx: &mut HookContext<'_, '_>) -> Result<(), HookError>;
}
