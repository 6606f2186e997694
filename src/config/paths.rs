//! Configuration file location
//!
//! `KGET_CONFIG_DIR` names the directory holding `config.yaml`. Without it
//! the platform configuration directory is used (`$XDG_CONFIG_HOME/kget` on
//! Linux).

use directories::BaseDirs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.yaml";

fn config_dir_from(override_dir: Option<PathBuf>, base: Option<PathBuf>) -> PathBuf {
    override_dir
        .or_else(|| base.map(|dir| dir.join("kget")))
        .unwrap_or_else(|| PathBuf::from(".kget"))
}

/// Directory holding the configuration file
pub fn config_dir() -> PathBuf {
    config_dir_from(
        std::env::var_os("KGET_CONFIG_DIR").map(PathBuf::from),
        BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    )
}

/// Path of the root configuration file
pub fn root_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}
