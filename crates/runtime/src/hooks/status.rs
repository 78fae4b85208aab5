//! Hook that decays timed statuses and clouds.

use crawl_core::{MessageChannel, StatusKind};

use super::{HookContext, HookError, TurnHook};

/// Ticks every timed status down by one turn and drops the expired ones.
///
/// Wariness from interrupted sleep and the once-per-turn shield block both
/// ride on ordinary durations, so they reset here too.
#[derive(Debug, Clone, Copy)]
pub struct StatusDecayHook;

impl StatusDecayHook {
    /// Statuses whose expiry the player is not told about.
    fn is_bookkeeping(kind: StatusKind) -> bool {
        matches!(
            kind,
            StatusKind::Sleepy
                | StatusKind::SleepWary
                | StatusKind::ShieldExhausted
                | StatusKind::ShroudTimeout
                | StatusKind::Rolling
        )
    }
}

impl TurnHook for StatusDecayHook {
    fn name(&self) -> &'static str {
        "status_decay"
    }

    fn execute(&self, ctx: &mut HookContext<'_, '_>) -> Result<(), HookError> {
        for actor in ctx.state.actors.iter_mut() {
            if !actor.is_alive() {
                continue;
            }
            for kind in actor.statuses.tick() {
                if actor.is_player() && !Self::is_bookkeeping(kind) {
                    ctx.messages.push(
                        MessageChannel::Plain,
                        format!("You are no longer {}.", kind.to_string().to_lowercase()),
                    );
                }
                ctx.outcome.expired.push((actor.id, kind));
            }
        }
        ctx.state.tick_clouds();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crawl_core::env::{Dice, RngOracle, stream};
    use crawl_core::message::MessageLog;
    use crawl_core::state::{PlayerTraits, StatusEffect};
    use crawl_core::{ActorState, GameConfig, GameState, MapDimensions, Position};

    use super::*;
    use crate::hooks::HookOutcome;

    struct Zero;

    impl RngOracle for Zero {
        fn next_u32(&self, _seed: u64) -> u32 {
            0
        }
    }

    #[test]
    fn expiring_status_is_reported_once() {
        let mut state = GameState::new(MapDimensions::new(4, 4), 1);
        let player = ActorState::player("Ada", Position::ORIGIN, PlayerTraits::new(1, 10, 10))
            .with_status(StatusEffect::new(StatusKind::Confused, 2))
            .with_status(StatusEffect::new(StatusKind::ShieldExhausted, 1))
            .with_status(StatusEffect::new(StatusKind::Poisoned, 0).with_potency(3));
        state.spawn(player).expect("spawn");

        let config = GameConfig::default();
        let mut dice = Dice::new(&Zero, 0, 0, stream::TURN);
        let mut log = MessageLog::new();
        let mut outcome = HookOutcome::default();
        for _ in 0..2 {
            let mut ctx = HookContext {
                state: &mut state,
                config: &config,
                dice: &mut dice,
                messages: &mut log,
                outcome: &mut outcome,
            };
            StatusDecayHook.execute(&mut ctx).expect("decay");
        }

        let kinds: Vec<StatusKind> = outcome.expired.iter().map(|(_, kind)| *kind).collect();
        assert_eq!(kinds, vec![StatusKind::ShieldExhausted, StatusKind::Confused]);
        assert!(log.contains("You are no longer confused."));
        let player = state.actors.player().expect("player");
        assert!(player.has(StatusKind::Poisoned));
    }
}
