//! Configuration subcommands

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{CONFIG_KEYS, ConfigLoader, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "defaultOutput", "logger.level")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "defaultOutput", "logger.level")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key: Some(key) } => {
            let config = ConfigLoader::load();
            let value = crate::config::get_config_value(&config, &key).with_context(|| {
                format!("Valid keys are: {}", CONFIG_KEYS.join(", "))
            })?;
            println!("{}", value);
        }
        ConfigSubcommand::Get { key: None } | ConfigSubcommand::List => {
            let config = ConfigLoader::load();
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Set { key, value } => {
            // Persist only what the file holds, not the environment overrides
            let path = paths::root_config_path();
            let mut config = if path.exists() {
                ConfigLoader::load_file(&path)?
            } else {
                ConfigLoader::load_defaults()
            };

            crate::config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;

            ConfigLoader::save_root(&config).context("Failed to save configuration")?;
            println!("Configuration saved");
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::validate().context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
