//! Traits describing read-only world data.
//!
//! Oracles expose static map geometry, the species database, and the RNG.
//! The [`Env`] aggregate bundles them so the resolver and the noise pass can
//! access everything they need without hard coupling to concrete
//! implementations.
mod error;
mod map;
mod rng;
mod species;

pub use error::OracleError;
pub use map::{MapDimensions, MapOracle, SightPolicy, StaticTile, TerrainKind};
pub use rng::{Dice, PcgRng, RngOracle, compute_seed, stream};
pub use species::{
    Holiness, Intelligence, MAX_SPECIES_ATTACKS, MonsterAttack, SizeClass, SpeciesDef,
    SpeciesFlags, SpeciesId, SpeciesOracle,
};

/// Aggregates read-only oracles required by the combat and noise rules.
pub struct Env<'a, M, S, R>
where
    M: MapOracle + ?Sized,
    S: SpeciesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    map: Option<&'a M>,
    species: Option<&'a S>,
    rng: Option<&'a R>,
}

// Manual impls: the oracles are borrowed, so copying never requires `M: Copy`.
impl<M, S, R> Clone for Env<'_, M, S, R>
where
    M: MapOracle + ?Sized,
    S: SpeciesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, S, R> Copy for Env<'_, M, S, R>
where
    M: MapOracle + ?Sized,
    S: SpeciesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
}

pub type GameEnv<'a> = Env<'a, dyn MapOracle + 'a, dyn SpeciesOracle + 'a, dyn RngOracle + 'a>;

impl<'a, M, S, R> Env<'a, M, S, R>
where
    M: MapOracle + ?Sized,
    S: SpeciesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(map: Option<&'a M>, species: Option<&'a S>, rng: Option<&'a R>) -> Self {
        Self { map, species, rng }
    }

    pub fn with_all(map: &'a M, species: &'a S, rng: &'a R) -> Self {
        Self::new(Some(map), Some(species), Some(rng))
    }

    pub fn empty() -> Self {
        Self {
            map: None,
            species: None,
            rng: None,
        }
    }

    /// Returns the MapOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::MapNotAvailable` if no map oracle was provided.
    pub fn map(&self) -> Result<&'a M, OracleError> {
        self.map.ok_or(OracleError::MapNotAvailable)
    }

    /// Returns the SpeciesOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SpeciesNotAvailable` if no species oracle was provided.
    pub fn species(&self) -> Result<&'a S, OracleError> {
        self.species.ok_or(OracleError::SpeciesNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Looks up a species entry.
    ///
    /// # Errors
    ///
    /// Fails when the species oracle is missing or the id is unknown.
    pub fn species_def(&self, id: SpeciesId) -> Result<&'a SpeciesDef, OracleError> {
        self.species()?
            .species(id)
            .ok_or(OracleError::SpeciesNotFound(id))
    }
}

impl<'a, M, S, R> Env<'a, M, S, R>
where
    M: MapOracle + 'a,
    S: SpeciesOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `GameEnv` (consumes self).
    pub fn into_game_env(self) -> GameEnv<'a> {
        let map: Option<&'a dyn MapOracle> = self.map.map(|map| map as _);
        let species: Option<&'a dyn SpeciesOracle> = self.species.map(|species| species as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(map, species, rng)
    }
}
