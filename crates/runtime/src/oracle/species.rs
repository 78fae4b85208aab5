//! Species table served through [`crawl_core::SpeciesOracle`].
use std::collections::HashMap;

use crawl_core::{SpeciesDef, SpeciesId, SpeciesOracle};

/// SpeciesOracle implementation backed by a loaded table.
#[derive(Default)]
pub struct SpeciesOracleImpl {
    species: HashMap<SpeciesId, SpeciesDef>,
}

impl SpeciesOracleImpl {
    /// Later entries replace earlier ones with the same id.
    pub fn new(table: impl IntoIterator<Item = SpeciesDef>) -> Self {
        Self {
            species: table.into_iter().map(|def| (def.id, def)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Looks a species up by display name.
    pub fn by_name(&self, name: &str) -> Option<&SpeciesDef> {
        self.species.values().find(|def| def.name == name)
    }
}

impl SpeciesOracle for SpeciesOracleImpl {
    fn species(&self, id: SpeciesId) -> Option<&SpeciesDef> {
        self.species.get(&id)
    }
}
