//! Hook that deals poison damage.

use crawl_core::state::Harm;
use crawl_core::{MessageChannel, StatusKind};

use super::{HookContext, HookError, TurnHook};

/// Poisoned actors lose hit points each turn and the poison weakens by the
/// same amount.
///
/// # Formula
///
/// ```text
/// damage  = max(1, div_rand_round(potency, 4))
/// potency = potency - damage   (cured at zero)
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PoisonHook;

impl TurnHook for PoisonHook {
    fn name(&self) -> &'static str {
        "poison"
    }

    fn priority(&self) -> i32 {
        -10
    }

    fn execute(&self, ctx: &mut HookContext<'_, '_>) -> Result<(), HookError> {
        for actor in ctx.state.actors.iter_mut() {
            let potency = i32::from(actor.statuses.potency(StatusKind::Poisoned));
            if !actor.is_alive() || potency == 0 {
                continue;
            }

            let damage = ctx.dice.div_rand_round(potency, 4).max(1);
            actor.hurt(Harm::Points(damage));
            ctx.outcome.poisoned.push((actor.id, damage));

            let remaining = (potency - damage).max(0);
            if remaining == 0 {
                actor.remove_status(StatusKind::Poisoned);
            } else {
                actor
                    .statuses
                    .set_potency(StatusKind::Poisoned, remaining as u16);
            }

            tracing::debug!(
                target: "crawl_runtime::hooks",
                actor = %actor.id,
                damage,
                remaining,
                "poison tick"
            );

            if actor.is_alive() {
                continue;
            }
            let text = if actor.is_player() {
                "You die of poison...".to_owned()
            } else {
                format!("{} dies of poison!", actor.subject())
            };
            ctx.messages.push(MessageChannel::Danger, text);
            ctx.outcome.deaths.push(actor.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crawl_core::env::{Dice, RngOracle, SpeciesDef, SpeciesId, stream};
    use crawl_core::message::MessageLog;
    use crawl_core::state::StatusEffect;
    use crawl_core::{ActorState, EntityId, GameConfig, GameState, MapDimensions, Position};

    use super::*;
    use crate::hooks::HookOutcome;

    struct Max;

    impl RngOracle for Max {
        fn next_u32(&self, _seed: u64) -> u32 {
            u32::MAX
        }
    }

    fn rat(hp: i32, potency: u16) -> ActorState {
        let def = SpeciesDef::new(SpeciesId(1), "rat", 1).with_defences(hp, 0, 0);
        ActorState::monster(EntityId(1), &def, Position::new(1, 1)).with_status(
            StatusEffect::new(StatusKind::Poisoned, 0).with_potency(potency),
        )
    }

    fn tick(state: &mut GameState) -> (HookOutcome, MessageLog) {
        let config = GameConfig::default();
        let mut dice = Dice::new(&Max, 0, 0, stream::TURN);
        let mut log = MessageLog::new();
        let mut outcome = HookOutcome::default();
        let mut ctx = HookContext {
            state,
            config: &config,
            dice: &mut dice,
            messages: &mut log,
            outcome: &mut outcome,
        };
        PoisonHook.execute(&mut ctx).expect("poison");
        (outcome, log)
    }

    #[test]
    fn weak_poison_still_bites_once() {
        let mut state = GameState::new(MapDimensions::new(4, 4), 1);
        state.spawn(rat(10, 1)).expect("spawn");

        let (outcome, _) = tick(&mut state);

        assert_eq!(outcome.poisoned, vec![(EntityId(1), 1)]);
        let rat = state.actors.get(EntityId(1)).expect("rat");
        assert_eq!(rat.hp, 9);
        assert!(!rat.has(StatusKind::Poisoned));
    }

    #[test]
    fn strong_poison_can_kill() {
        let mut state = GameState::new(MapDimensions::new(4, 4), 1);
        // 16 / 4 divides evenly, so rounding never changes the damage.
        state.spawn(rat(3, 16)).expect("spawn");

        let (outcome, log) = tick(&mut state);

        assert_eq!(outcome.poisoned, vec![(EntityId(1), 4)]);
        assert_eq!(outcome.deaths, vec![EntityId(1)]);
        assert!(log.contains("dies of poison"));
        let rat = state.actors.get(EntityId(1)).expect("rat");
        assert_eq!(rat.statuses.potency(StatusKind::Poisoned), 12);
    }
}
