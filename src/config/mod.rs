//! Configuration system for kget
//!
//! A single YAML file supplies the defaults for flags the user did not pass.
//! Environment variables override the file; command-line flags override
//! both.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, LoggerConfig};

/// Keys accepted by `get_config_value` and `set_config_value`
pub const CONFIG_KEYS: &[&str] = &[
    "defaultOutput",
    "chunkSize",
    "noHeaders",
    "showKind",
    "defaultNamespace",
    "logger.level",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "defaultOutput" => Ok(config.default_output.clone()),
        "chunkSize" => Ok(config.chunk_size.to_string()),
        "noHeaders" => Ok(config.no_headers.to_string()),
        "showKind" => Ok(config.show_kind.to_string()),
        "defaultNamespace" => Ok(config.default_namespace.clone().unwrap_or_default()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "defaultOutput" => {
            value
                .parse::<crate::printers::OutputFormat>()
                .context("defaultOutput must be a valid output format")?;
            config.default_output = value.to_string();
        }
        "chunkSize" => {
            config.chunk_size = value.parse().context("chunkSize must be a number")?;
        }
        "noHeaders" => {
            config.no_headers = value
                .parse()
                .context("noHeaders must be 'true' or 'false'")?;
        }
        "showKind" => {
            config.show_kind = value
                .parse()
                .context("showKind must be 'true' or 'false'")?;
        }
        "defaultNamespace" => {
            if value.is_empty() {
                config.default_namespace = None;
            } else {
                config.default_namespace = Some(value.to_string());
            }
        }
        "logger.level" => {
            value
                .parse::<tracing_subscriber::filter::LevelFilter>()
                .context("logger.level must be one of off, error, warn, info, debug, trace")?;
            config.logger.level = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_round_trips() {
        let config = Config::default();
        for key in CONFIG_KEYS {
            let value = get_config_value(&config, key).unwrap();
            let mut copy = config.clone();
            set_config_value(&mut copy, key, &value).unwrap();
            assert_eq!(copy, config, "key {}", key);
        }
    }

    #[test]
    fn test_set_values() {
        let mut config = Config::default();
        set_config_value(&mut config, "chunkSize", "100").unwrap();
        set_config_value(&mut config, "showKind", "true").unwrap();
        set_config_value(&mut config, "defaultNamespace", "prod").unwrap();
        assert_eq!(config.chunk_size, 100);
        assert!(config.show_kind);
        assert_eq!(config.default_namespace.as_deref(), Some("prod"));

        set_config_value(&mut config, "defaultNamespace", "").unwrap();
        assert!(config.default_namespace.is_none());
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(set_config_value(&mut config, "chunkSize", "many").is_err());
        assert!(set_config_value(&mut config, "defaultOutput", "xml").is_err());
        assert!(set_config_value(&mut config, "logger.level", "chatty").is_err());
        assert!(set_config_value(&mut config, "ui.skin", "dark").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_key() {
        assert!(get_config_value(&Config::default(), "readOnly").is_err());
    }
}
