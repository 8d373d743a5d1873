//! Path resolution for config and store files.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{default_config_path, default_store_path, read_config, RosterConfig};
use crate::constants::env_vars;

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(env_vars::CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config file, falling back to defaults when none exists.
///
/// Without a config file the store lives at `--store` or the default data
/// path, the embedded salt is used and the messenger is off.
pub fn load_config(store_override: Option<&str>) -> anyhow::Result<RosterConfig> {
    let config_path = resolve_config_path()?;
    if config_path.exists() {
        return read_config(&config_path);
    }
    debug!(path = %config_path.display(), "no config file, using defaults");
    let store = match store_override {
        Some(store) => PathBuf::from(store),
        None => default_store_path()?,
    };
    Ok(RosterConfig::new(store))
}

pub fn missing_store_message(path: &Path) -> String {
    format!("No record store found at {}", path.display())
}
