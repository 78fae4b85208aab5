//! Acoustic simulation: noise registration, propagation, and perception.
//!
//! A turn's noises are registered into the [`NoiseGrid`], then flushed once
//! by [`NoiseGrid::propagate_noise`]. Propagation is a breadth-first flood
//! where each cell keeps only the loudest noise reaching it. Sound loses
//! intensity per step according to the terrain it leaves, plus a penalty for
//! bending around corners. Once the wavefront dies out, every actor standing
//! on a reached cell is handed to a [`NoiseListener`] exactly once, together
//! with where it *thinks* the sound came from.
//!
//! The grid has no dependency on combat; the resolver only emits events.

mod awaken;
mod error;
mod grid;
mod perception;

pub use awaken::{StealthCheck, awaken_chance};
pub use error::NoiseError;
pub use grid::{
    Heard, NoiseCell, NoiseEvent, NoiseGrid, NoiseId, NoiseListener, PropagationReport,
    turn_angle,
};
pub use perception::perceived_position;
