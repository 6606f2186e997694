//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde for
//! serialization.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Output format used when `-o` is not given
    #[serde(default = "default_output")]
    pub default_output: String,

    /// Page size of list requests (0 fetches everything at once)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Omit table headers
    #[serde(default)]
    pub no_headers: bool,

    /// Always prefix names with their kind
    #[serde(default)]
    pub show_kind: bool,

    /// Namespace used instead of the kubeconfig context's namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<String>,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Level used when neither `-v` nor `RUST_LOG` is given
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_output() -> String {
    "table".to_string()
}

fn default_chunk_size() -> u32 {
    500
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_output: default_output(),
            chunk_size: default_chunk_size(),
            no_headers: false,
            show_kind: false,
            default_namespace: None,
            logger: LoggerConfig::default(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.default_output, "table");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.logger.level, "warn");
        assert!(config.default_namespace.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("defaultOutput"));
        assert!(yaml.contains("chunkSize"));
        assert!(!yaml.contains("defaultNamespace"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
defaultOutput: wide
noHeaders: true
logger:
  level: debug
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.default_output, "wide");
        assert!(config.no_headers);
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.logger.level, "debug");
    }
}
