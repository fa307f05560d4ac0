//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Suffix that marks a file as a launchable script
pub const DEFAULT_SCRIPT_EXTENSION: &str = ".jsx";

/// Fraction of tracked scripts (by click count) promoted to favorites
pub const DEFAULT_FAVORITE_PERCENTILE: f64 = 0.25;

/// Skip dot-files and dot-directories while scanning
pub const DEFAULT_IGNORE_HIDDEN: bool = true;

/// Glyph shown in front of favorite scripts
pub const DEFAULT_FAVORITE_MARKER: &str = "★";

pub(crate) const CONFIG_FILE_NAME: &str = "config.json";
pub(crate) const CLICKS_FILE_NAME: &str = "clicks.json";
pub(crate) const PREFERENCES_FILE_NAME: &str = "preferences.json";
