//! Logging initialization
//!
//! Diagnostics go to stderr so that stdout carries only listing output.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` wins when set. Otherwise each `-v` raises the configured level:
/// `-v` info, `-vv` debug, `-vvv` trace.
pub fn init_logging(verbosity: u8, configured_level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, configured_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false) // No ANSI codes in log file
                .try_init()
        }
        None => builder
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Filter directive used when `RUST_LOG` is unset
fn default_directive(verbosity: u8, configured_level: &str) -> String {
    match verbosity {
        0 => configured_level.to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}
