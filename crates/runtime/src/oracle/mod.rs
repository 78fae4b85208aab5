//! Runtime wrappers around static game content oracles.
//!
//! These implementations expose `crawl-core` oracle traits and bundle them
//! into an [`OracleManager`] so the runtime can build [`crawl_core::Env`]
//! snapshots on demand. The data is immutable at runtime; dynamic state
//! lives in [`crawl_core::GameState`].
mod map;
mod species;

use std::sync::Arc;

use crawl_core::{Env, GameEnv, MapOracle, PcgRng, RngOracle, SpeciesOracle};

pub use map::MapOracleImpl;
pub use species::SpeciesOracleImpl;

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) map: Arc<MapOracleImpl>,
    pub(crate) species: Arc<SpeciesOracleImpl>,
    pub(crate) rng: Arc<dyn RngOracle>,
}

impl OracleManager {
    /// Creates a new oracle manager rolling with [`PcgRng`].
    pub fn new(map: Arc<MapOracleImpl>, species: Arc<SpeciesOracleImpl>) -> Self {
        Self::with_rng(map, species, Arc::new(PcgRng))
    }

    /// Same as [`OracleManager::new`] with a caller-supplied generator.
    pub fn with_rng(
        map: Arc<MapOracleImpl>,
        species: Arc<SpeciesOracleImpl>,
        rng: Arc<dyn RngOracle>,
    ) -> Self {
        Self { map, species, rng }
    }

    /// Converts oracle manager into GameEnv for crawl-core
    pub fn as_game_env(&self) -> GameEnv<'_> {
        let map: &dyn MapOracle = self.map.as_ref();
        let species: &dyn SpeciesOracle = self.species.as_ref();
        Env::with_all(map, species, self.rng.as_ref())
    }

    pub fn map(&self) -> &MapOracleImpl {
        &self.map
    }

    pub fn species(&self) -> &SpeciesOracleImpl {
        &self.species
    }

    pub fn rng(&self) -> &dyn RngOracle {
        self.rng.as_ref()
    }
}
