//! Configuration loading from file system

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::CONFIG_FILE_NAME;
use super::types::Config;

/// Environment variable that relocates the Asgard data directory
pub const ASGARD_PATH_ENV: &str = "ASGARD_PATH";

/// Base directory for config, click data, preferences and logs.
///
/// `$ASGARD_PATH` wins when set, otherwise `~/.asgard`.
pub fn get_asgard_path() -> PathBuf {
    if let Ok(path) = std::env::var(ASGARD_PATH_ENV) {
        return PathBuf::from(shellexpand::tilde(&path).as_ref());
    }

    match dirs::home_dir() {
        Some(home) => home.join(".asgard"),
        None => std::env::temp_dir().join("asgard"),
    }
}

/// Load configuration from the default location
pub fn load_config() -> Config {
    load_config_from(&get_asgard_path().join(CONFIG_FILE_NAME))
}

/// Load configuration from an explicit file.
///
/// Returns Config::default() if the file is missing or cannot be parsed.
#[instrument(name = "load_config")]
pub fn load_config_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, path = %config_path.display(), "Failed to read config, using defaults");
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => {
            info!(path = %config_path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}
