//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod duel;
mod noise;

pub use duel::Duel;
pub use noise::NoiseMap;
