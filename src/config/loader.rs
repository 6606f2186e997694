//! Configuration loading and merging logic
//!
//! Precedence order (highest to lowest):
//! 1. Environment variable overrides (`KGET_OUTPUT`, `KGET_CHUNK_SIZE`,
//!    `KGET_NAMESPACE`)
//! 2. Root config file
//! 3. Built-in defaults

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// A missing or unreadable root file falls back to the defaults; use
    /// `validate` to surface file problems.
    pub fn load() -> Config {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration using the given root file
    pub fn load_from(path: &Path) -> Config {
        let mut config = Self::load_defaults();
        if path.exists() {
            match Self::load_file(path) {
                Ok(file_config) => config = file_config,
                Err(e) => tracing::warn!("Ignoring configuration file: {:#}", e),
            }
        }
        Self::apply_env_overrides(config)
    }

    /// Load configuration from a file
    ///
    /// Keys missing from the file take their default values.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the root file and the merged configuration
    pub fn validate() -> Result<()> {
        Self::validate_file(&paths::root_config_path())
    }

    /// Validate a configuration file and the environment overrides
    pub fn validate_file(path: &Path) -> Result<()> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            Self::load_defaults()
        };
        Self::check(&Self::apply_env_overrides(config))
    }

    /// Check values that parse but cannot be used
    pub fn check(config: &Config) -> Result<()> {
        config
            .default_output
            .parse::<crate::printers::OutputFormat>()
            .context("Invalid defaultOutput")?;
        LevelFilter::from_str(&config.logger.level)
            .with_context(|| format!("Invalid logger.level \"{}\"", config.logger.level))?;
        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides(config, |name| std::env::var(name).ok())
    }

    fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
        if let Some(output) = var("KGET_OUTPUT") {
            config.default_output = output;
        }

        if let Some(chunk_size) = var("KGET_CHUNK_SIZE") {
            match chunk_size.parse() {
                Ok(value) => config.chunk_size = value,
                Err(_) => tracing::warn!("Ignoring invalid KGET_CHUNK_SIZE \"{}\"", chunk_size),
            }
        }

        if let Some(namespace) = var("KGET_NAMESPACE").filter(|ns| !ns.is_empty()) {
            config.default_namespace = Some(namespace);
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.default_output, "table");
    }

    #[test]
    fn test_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "defaultOutput: wide\nshowKind: true\n").unwrap();

        let config = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(config.default_output, "wide");
        assert!(config.show_kind);
        assert_eq!(config.chunk_size, 500);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = Config {
            no_headers: true,
            ..Default::default()
        };
        ConfigLoader::save(&config, &path).unwrap();
        assert_eq!(ConfigLoader::load_file(&path).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("KGET_OUTPUT", "yaml"),
            ("KGET_CHUNK_SIZE", "50"),
            ("KGET_NAMESPACE", "staging"),
        ]
        .into_iter()
        .collect();

        let config = ConfigLoader::apply_overrides(Config::default(), |name| {
            vars.get(name).map(|v| v.to_string())
        });
        assert_eq!(config.default_output, "yaml");
        assert_eq!(config.chunk_size, 50);
        assert_eq!(config.default_namespace.as_deref(), Some("staging"));
    }

    #[test]
    fn test_invalid_chunk_size_is_ignored() {
        let config = ConfigLoader::apply_overrides(Config::default(), |name| {
            (name == "KGET_CHUNK_SIZE").then(|| "lots".to_string())
        });
        assert_eq!(config.chunk_size, 500);
    }

    #[test]
    fn test_check_rejects_unusable_values() {
        let bad_output = Config {
            default_output: "xml".to_string(),
            ..Default::default()
        };
        assert!(ConfigLoader::check(&bad_output).is_err());

        let mut bad_level = Config::default();
        bad_level.logger.level = "loud".to_string();
        assert!(ConfigLoader::check(&bad_level).is_err());

        assert!(ConfigLoader::check(&Config::default()).is_ok());
    }
}
