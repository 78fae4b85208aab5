//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. The runtime is synchronous; callers drain receivers
//! with [`drain`] after each call.

mod bus;
mod types;

pub use bus::{EventBus, GameEvent, Topic, drain};
pub use types::{CombatEvent, NoiseEvent, TurnEvent};
