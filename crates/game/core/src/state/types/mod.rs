pub mod actor;
pub mod cloud;
pub mod common;

// Re-export all actor-related types
pub use actor::{
    ActorKind, ActorState, Attitude, Behaviour, Element, Form, GearFlags, Harm, MonsterTraits,
    MutationKind, PlayerTraits, Resistances, Skill, StatusEffect, StatusEffects, StatusKind,
    Weapon,
};

pub use cloud::{Cloud, CloudKind};

// Re-export common types
pub use common::{EntityId, Position, Step, Tick};
