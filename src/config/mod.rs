//! Configuration module - Application settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.asgard/config.json
//! - Default values for all settings
//! - Resolving the per-user data paths (clicks, preferences, logs)
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, RunnerConfig)
//! - `loader` - File system loading and path resolution

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_FAVORITE_MARKER, DEFAULT_FAVORITE_PERCENTILE, DEFAULT_IGNORE_HIDDEN,
    DEFAULT_SCRIPT_EXTENSION,
};

pub use types::{Config, RunnerConfig};

pub use loader::{get_asgard_path, load_config, load_config_from, ASGARD_PATH_ENV};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
