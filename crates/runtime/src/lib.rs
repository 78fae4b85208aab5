//! Runtime orchestration for the deterministic combat and noise rules.
//!
//! This crate wires together oracle access, turn hooks and the event bus
//! into a cohesive runtime API. Consumers build a [`Runtime`] to spawn
//! actors, resolve melee, make noise and close turns.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the error types downstream clients handle
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`hooks`] provides the end-of-turn hook system
//! - [`oracle`] provides data adapters over loaded content
pub mod api;
pub mod events;
pub mod hooks;
pub mod oracle;
pub mod runtime;

pub use api::{Result, RuntimeError};
pub use events::{CombatEvent, EventBus, GameEvent, NoiseEvent, Topic, TurnEvent, drain};
pub use hooks::{
    EnergyHook, HookContext, HookCriticality, HookError, HookOutcome, HookRegistry, PoisonHook,
    StatusDecayHook, TurnHook,
};
pub use oracle::{MapOracleImpl, OracleManager, SpeciesOracleImpl};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, TurnSummary};
