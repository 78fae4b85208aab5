use super::effects::EffectRegistry;
use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::message::MessageSink;
use crate::state::{ActorState, GameState};

/// Asked before the player commits to a risky swing, such as one that
/// would hurt an ally.
pub trait AttackConfirmation {
    fn confirm(&self, attacker: &ActorState, defender: &ActorState) -> bool;
}

/// Confirmation policy that never objects.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysProceed;

impl AttackConfirmation for AlwaysProceed {
    fn confirm(&self, _attacker: &ActorState, _defender: &ActorState) -> bool {
        true
    }
}

/// Refuses attacks on anything aligned with the attacker.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefuseAllies;

impl AttackConfirmation for RefuseAllies {
    fn confirm(&self, attacker: &ActorState, defender: &ActorState) -> bool {
        !attacker.aligned_with(defender)
    }
}

/// Everything the resolver reads or mutates, passed explicitly.
pub struct CombatContext<'a> {
    pub state: &'a mut GameState,
    pub env: GameEnv<'a>,
    pub effects: &'a EffectRegistry,
    pub config: &'a GameConfig,
    pub messages: &'a mut dyn MessageSink,
    pub confirm: &'a dyn AttackConfirmation,
}

impl<'a> CombatContext<'a> {
    pub fn new(
        state: &'a mut GameState,
        env: GameEnv<'a>,
        effects: &'a EffectRegistry,
        config: &'a GameConfig,
        messages: &'a mut dyn MessageSink,
    ) -> Self {
        Self {
            state,
            env,
            effects,
            config,
            messages,
            confirm: &AlwaysProceed,
        }
    }

    pub fn with_confirmation(mut self, confirm: &'a dyn AttackConfirmation) -> Self {
        self.confirm = confirm;
        self
    }
}
