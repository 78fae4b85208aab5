//! Species table loader.
//!
//! RON format: a list of entries. Only `id`, `name` and `hd` are required;
//! flags and holiness are written as lists of names.
//!
//! ```ron
//! [
//!     (id: 1, name: "goblin", hd: 1, max_hp: 6, attacks: [(Hit, Plain, 4)]),
//!     (id: 7, name: "hydra", hd: 10, flags: ["HYDRA"], heads: 5,
//!      attacks: [(Bite, Plain, 18)]),
//! ]
//! ```

use std::collections::HashSet;
use std::path::Path;

use crawl_core::combat::{AttackType, Flavour};
use crawl_core::env::{
    Holiness, Intelligence, MAX_SPECIES_ATTACKS, SizeClass, SpeciesDef, SpeciesFlags, SpeciesId,
};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Deserialize)]
struct SpeciesEntryRon {
    id: u16,
    name: String,
    hd: i32,
    #[serde(default)]
    max_hp: Option<i32>,
    #[serde(default)]
    ac: i32,
    #[serde(default)]
    ev: i32,
    #[serde(default)]
    intelligence: Intelligence,
    #[serde(default)]
    size: SizeClass,
    #[serde(default)]
    holiness: Vec<String>,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    attacks: Vec<(AttackType, Flavour, i32)>,
    #[serde(default)]
    spines: i32,
    #[serde(default)]
    heads: Option<u8>,
}

impl SpeciesEntryRon {
    fn into_def(self) -> LoadResult<SpeciesDef> {
        if self.hd <= 0 {
            anyhow::bail!("species '{}' needs positive hit dice", self.name);
        }
        if self.attacks.len() > MAX_SPECIES_ATTACKS {
            anyhow::bail!(
                "species '{}' lists {} attacks, at most {} fit",
                self.name,
                self.attacks.len(),
                MAX_SPECIES_ATTACKS
            );
        }

        let flags = self
            .flags
            .iter()
            .try_fold(SpeciesFlags::empty(), |acc, name| {
                SpeciesFlags::from_name(name)
                    .map(|flag| acc | flag)
                    .ok_or_else(|| anyhow::anyhow!("unknown species flag '{name}'"))
            })?;
        let holiness = if self.holiness.is_empty() {
            Holiness::default()
        } else {
            self.holiness
                .iter()
                .try_fold(Holiness::empty(), |acc, name| {
                    Holiness::from_name(name)
                        .map(|bit| acc | bit)
                        .ok_or_else(|| anyhow::anyhow!("unknown holiness '{name}'"))
                })?
        };

        let mut def = SpeciesDef::new(SpeciesId(self.id), self.name, self.hd);
        let max_hp = self.max_hp.unwrap_or(def.max_hp);
        def = def
            .with_defences(max_hp, self.ac, self.ev)
            .with_intelligence(self.intelligence)
            .with_size(self.size)
            .with_holiness(holiness)
            .with_flags(flags)
            .with_spines(self.spines);
        if let Some(heads) = self.heads {
            def = def.with_heads(heads);
        }
        for (kind, flavour, damage) in self.attacks {
            def = def.with_attack(kind, flavour, damage);
        }
        Ok(def)
    }
}

/// Loader for species tables from RON files.
pub struct SpeciesLoader;

impl SpeciesLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<SpeciesDef>> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse species RON {}: {}", path.display(), e)
        })
    }

    /// Parses a species table. Ids must be unique.
    pub fn parse(content: &str) -> LoadResult<Vec<SpeciesDef>> {
        let entries: Vec<SpeciesEntryRon> = ron::from_str(content)?;

        let mut seen = HashSet::with_capacity(entries.len());
        let mut table = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.id) {
                anyhow::bail!("duplicate species id {}", entry.id);
            }
            table.push(entry.into_def()?);
        }

        tracing::debug!(count = table.len(), "parsed species table");
        Ok(table)
    }
}
