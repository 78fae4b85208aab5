//! Execution context provided to hooks during evaluation.

use crawl_core::env::Dice;
use crawl_core::{EntityId, GameConfig, GameState, MessageSink, StatusKind};

/// Context handed to each turn hook.
///
/// Bundles the mutable state with the policies and the turn's roll stream,
/// without exposing the rest of the runtime.
pub struct HookContext<'a, 'r> {
    pub state: &'a mut GameState,
    pub config: &'a GameConfig,
    pub dice: &'a mut Dice<'r>,
    pub messages: &'a mut dyn MessageSink,
    /// What the hooks did, collected for the turn summary.
    pub outcome: &'a mut HookOutcome,
}

/// Side effects recorded by hooks during one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HookOutcome {
    pub expired: Vec<(EntityId, StatusKind)>,
    /// Poison damage dealt, per actor.
    pub poisoned: Vec<(EntityId, i32)>,
    /// Actors killed by turn effects.
    pub deaths: Vec<EntityId>,
}
