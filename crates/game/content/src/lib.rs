//! Data-driven content definitions and loaders.
//!
//! This crate provides loaders for RON/TOML data files:
//! - Species tables (RON)
//! - Map layouts with silence zones (RON)
//! - Combat and noise policies (TOML)
//!
//! A small built-in set of the same files ships with the crate so tools and
//! tests can run without a data directory.
//!
//! Content is consumed by runtime oracles and never appears in game state.

#[cfg(feature = "loaders")]
pub mod builtin;
#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult, MapLayout, MapLoader, SpeciesLoader};
