//! Oracle access errors.
//!
//! Errors related to oracle availability and data access.

use crate::error::{ErrorSeverity, GameError};
use crate::state::Position;

use super::SpeciesId;

/// Errors that occur when accessing Oracle data.
///
/// Oracle errors indicate that required game data is unavailable or invalid.
/// A missing oracle or species entry is a programming error: the resolver
/// cannot continue without the map, the species table, or the RNG.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// MapOracle is not available in the environment.
    #[error("MapOracle not available")]
    MapNotAvailable,

    /// SpeciesOracle is not available in the environment.
    #[error("SpeciesOracle not available")]
    SpeciesNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,

    /// Position is outside the map bounds.
    #[error("position {0} is out of map bounds")]
    PositionOutOfBounds(Position),

    /// Species entry was not found by id.
    #[error("species {0:?} not found")]
    SpeciesNotFound(SpeciesId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            // Missing oracles are fatal - engine cannot proceed
            MapNotAvailable | SpeciesNotAvailable | RngNotAvailable => ErrorSeverity::Fatal,

            PositionOutOfBounds(_) => ErrorSeverity::Validation,

            // Actors reference species that must exist
            SpeciesNotFound(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            MapNotAvailable => "ORACLE_MAP_NOT_AVAILABLE",
            SpeciesNotAvailable => "ORACLE_SPECIES_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            PositionOutOfBounds(_) => "ORACLE_POSITION_OUT_OF_BOUNDS",
            SpeciesNotFound(_) => "ORACLE_SPECIES_NOT_FOUND",
        }
    }
}
