//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use super::defaults::*;
use super::loader::get_asgard_path;
use crate::scripts::Percentile;

/// Interpreter used to launch scripts.
///
/// The script path is appended after `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Literal, case-sensitive file suffix (default: ".jsx")
    #[serde(default = "default_script_extension")]
    pub script_extension: String,
    /// Top fraction of click counts that earns favorite status (default: 0.25)
    #[serde(default = "default_favorite_percentile")]
    pub favorite_percentile: f64,
    /// Skip entries whose name starts with '.' (default: true)
    #[serde(default = "default_ignore_hidden")]
    pub ignore_hidden: bool,
    /// Override for the click database location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks_path: Option<String>,
    /// Override for the preference store location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences_path: Option<String>,
    /// Interpreter for scripts; when absent the script is executed directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner: Option<RunnerConfig>,
}

fn default_script_extension() -> String {
    DEFAULT_SCRIPT_EXTENSION.to_string()
}
fn default_favorite_percentile() -> f64 {
    DEFAULT_FAVORITE_PERCENTILE
}
fn default_ignore_hidden() -> bool {
    DEFAULT_IGNORE_HIDDEN
}

impl Default for Config {
    fn default() -> Self {
        Config {
            script_extension: default_script_extension(),
            favorite_percentile: DEFAULT_FAVORITE_PERCENTILE,
            ignore_hidden: DEFAULT_IGNORE_HIDDEN,
            clicks_path: None,
            preferences_path: None,
            runner: None,
        }
    }
}

impl Config {
    /// Validated favorite percentile, falling back to the default when out of range
    pub fn percentile(&self) -> Percentile {
        match Percentile::new(self.favorite_percentile) {
            Ok(p) => p,
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = DEFAULT_FAVORITE_PERCENTILE,
                    "Invalid favoritePercentile in config, using default"
                );
                Percentile::default()
            }
        }
    }

    pub fn clicks_path(&self) -> PathBuf {
        resolve_path(self.clicks_path.as_deref(), CLICKS_FILE_NAME)
    }

    pub fn preferences_path(&self) -> PathBuf {
        resolve_path(self.preferences_path.as_deref(), PREFERENCES_FILE_NAME)
    }
}

fn resolve_path(configured: Option<&str>, file_name: &str) -> PathBuf {
    match configured {
        Some(p) => PathBuf::from(shellexpand::tilde(p).as_ref()),
        None => get_asgard_path().join(file_name),
    }
}
