//! Event types for different topics.

use crawl_core::noise::NoiseId;
use crawl_core::{EntityId, Position, StatusKind};
use crawl_core::state::Tick;
use serde::{Deserialize, Serialize};

/// Events raised while melee resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A full attack set finished.
    AttackResolved {
        attacker: EntityId,
        defender: EntityId,
        swings: usize,
        hits: usize,
        damage: i32,
    },

    /// An actor died, in combat or to a turn effect.
    ActorKilled {
        victim: EntityId,
        /// `None` when a status effect did it.
        killer: Option<EntityId>,
    },
}

/// Events raised by the end-of-turn noise pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseEvent {
    NoiseHeard {
        listener: EntityId,
        noise: NoiseId,
        intensity: i32,
        /// Where the listener believes the sound came from.
        perceived: Position,
    },

    /// A sleeping monster noticed a noise.
    ActorWoke { actor: EntityId },
}

/// Events related to turn management (lightweight)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    StatusExpired { actor: EntityId, status: StatusKind },

    TurnEnded {
        turn: Tick,
        /// Nonce the next turn rolls with.
        nonce: u64,
    },
}
