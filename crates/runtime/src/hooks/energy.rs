//! Hook that regains action energy.

use crawl_core::EntityId;

use super::{HookContext, HookCriticality, HookError, TurnHook};

/// Gives every living actor its speed in energy, up to one turn's worth.
///
/// Attacks spend energy and can leave an actor in debt; a debt is paid off
/// over the following turns before the actor banks anything.
#[derive(Debug, Clone, Copy)]
pub struct EnergyHook;

impl TurnHook for EnergyHook {
    fn name(&self) -> &'static str {
        "energy"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn criticality(&self) -> HookCriticality {
        // Broken speeds would stall the turn order.
        HookCriticality::Critical
    }

    fn execute(&self, ctx: &mut HookContext<'_, '_>) -> Result<(), HookError> {
        let mut stalled: Option<(EntityId, i32)> = None;
        for actor in ctx.state.actors.iter_mut().filter(|a| a.is_alive()) {
            if actor.speed <= 0 {
                stalled.get_or_insert((actor.id, actor.speed));
                continue;
            }
            actor.energy = (actor.energy + actor.speed).min(actor.speed);
        }
        match stalled {
            Some((actor, speed)) => Err(HookError::InvalidSpeed { actor, speed }),
            None => Ok(()),
        }
    }
}
