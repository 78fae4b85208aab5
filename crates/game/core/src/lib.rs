//! Deterministic melee combat and noise rules for a turn-based dungeon crawler.
//!
//! `crawl-core` owns the canonical rules and exposes them as plain functions
//! over an explicit [`state::GameState`]. Static data (map layout, species
//! table, random numbers) is injected through the oracle traits in [`env`],
//! so the same rules run unchanged in the runtime, in tests and in offline
//! tools.
//!
//! - [`combat`]: the phased attack resolver and its damage pipeline
//! - [`noise`]: noise registration, flood propagation and hearing
//! - [`sight`]: visibility between actors
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod message;
pub mod noise;
pub mod sight;
pub mod state;

pub use combat::{
    AttackConfirmation, AttackReport, AttackResolver, AttackType, Brand, CombatContext,
    CombatError, DamageType, EffectRegistry, Flavour, Manoeuvre, SwingKind, SwingOutcome,
};
pub use config::{CombatPolicy, GameConfig, NoisePolicy};
pub use env::{
    Dice, Env, GameEnv, MapDimensions, MapOracle, OracleError, PcgRng, RngOracle, SpeciesDef,
    SpeciesFlags, SpeciesId, SpeciesOracle, StaticTile, TerrainKind,
};
pub use error::{ErrorContext, ErrorSeverity, GameError};
pub use message::{Message, MessageChannel, MessageLog, MessageSink};
pub use noise::{NoiseError, NoiseEvent, NoiseGrid, NoiseId, NoiseListener};
pub use state::{
    ActorState, Attitude, Behaviour, EntityId, GameState, Position, Roster, StateError,
    StatusKind, Weapon,
};
