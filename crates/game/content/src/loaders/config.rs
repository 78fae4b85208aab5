//! Game configuration loader.

use std::path::Path;

use crawl_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`GameConfig`] from TOML files.
///
/// Every table and field is optional; anything missing keeps its default.
///
/// ```toml
/// [combat]
/// cleave_percent = 70
///
/// [noise]
/// base_attenuation = 850
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        let config = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "loaded game config");
        Ok(config)
    }

    /// Parses a TOML document into a config.
    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)?;
        if config.noise.base_attenuation <= 0 {
            anyhow::bail!("noise.base_attenuation must be positive");
        }
        if !(0..=100).contains(&config.combat.cleave_percent) {
            anyhow::bail!("combat.cleave_percent must be within 0..=100");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = ConfigLoader::parse("").expect("parse");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_tables_override_single_fields() {
        let config = ConfigLoader::parse("[combat]\nriposte_one_in = 5\n").expect("parse");
        assert_eq!(config.combat.riposte_one_in, 5);
        assert_eq!(config.combat.cleave_percent, GameConfig::default().combat.cleave_percent);
    }

    #[test]
    fn silly_attenuation_is_rejected() {
        let err = ConfigLoader::parse("[noise]\nbase_attenuation = 0\n").expect_err("invalid");
        assert!(err.to_string().contains("base_attenuation"));
    }
}
