//! Content loaders for reading game data from files.
//!
//! Species tables and map layouts are RON; tunable policies are TOML.

pub mod config;
pub mod map;
pub mod species;

pub use config::ConfigLoader;
pub use map::{MapLayout, MapLoader};
pub use species::SpeciesLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
