//! Content selection shared by the commands.
//!
//! A file given on the command line wins. Otherwise `CRAWL_DATA_DIR` may
//! supply `species.ron`, `arena.ron` or `config.toml`, and the built-in set
//! fills whatever is still missing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use crawl_content::{ConfigLoader, MapLayout, MapLoader, SpeciesLoader, builtin};
use crawl_core::{GameConfig, SpeciesDef};

#[derive(Args, Debug, Clone, Default)]
pub struct ContentArgs {
    /// Species table (RON)
    #[arg(long, value_name = "FILE")]
    pub species_file: Option<PathBuf>,

    /// Map layout (RON)
    #[arg(long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Rule policies (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ContentArgs {
    fn resolve(explicit: &Option<PathBuf>, file: &str) -> Option<PathBuf> {
        explicit.clone().or_else(|| {
            let dir = std::env::var_os("CRAWL_DATA_DIR")?;
            let path = Path::new(&dir).join(file);
            path.exists().then_some(path)
        })
    }

    pub fn species(&self) -> Result<Vec<SpeciesDef>> {
        match Self::resolve(&self.species_file, "species.ron") {
            Some(path) => SpeciesLoader::load(&path),
            None => builtin::species().context("built-in species table"),
        }
    }

    pub fn map(&self) -> Result<MapLayout> {
        match Self::resolve(&self.map, "arena.ron") {
            Some(path) => MapLoader::load(&path),
            None => builtin::arena().context("built-in arena"),
        }
    }

    pub fn config(&self) -> Result<GameConfig> {
        match Self::resolve(&self.config, "config.toml") {
            Some(path) => ConfigLoader::load(&path),
            None => builtin::config().context("built-in config"),
        }
    }
}
