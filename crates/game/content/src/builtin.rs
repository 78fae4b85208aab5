//! Content embedded in the binary.

use crawl_core::{GameConfig, SpeciesDef};

use crate::loaders::{ConfigLoader, LoadResult, MapLayout, MapLoader, SpeciesLoader};

const SPECIES: &str = include_str!("../data/species.ron");
const ARENA: &str = include_str!("../data/arena.ron");
const CONFIG: &str = include_str!("../data/config.toml");

/// Starter bestiary.
pub fn species() -> LoadResult<Vec<SpeciesDef>> {
    SpeciesLoader::parse(SPECIES)
}

/// Walled test arena with a door, water and a silenced corner.
pub fn arena() -> LoadResult<MapLayout> {
    MapLoader::parse(ARENA)
}

pub fn config() -> LoadResult<GameConfig> {
    ConfigLoader::parse(CONFIG)
}
