//! Scripts module - Script discovery, classification and search
//!
//! This module provides functionality for:
//! - Discovering script files under a root directory
//! - Splitting scripts into favorites and standard groups by click count
//! - Case-insensitive search across both groups
//!
//! # Module Structure
//!
//! - `types` - Core data types (ScriptFile, DirectoryEntry, RegistryView)
//! - `scanner` - Recursive discovery over a `FileSystem`
//! - `grouping` - Percentile-based favorites classification
//! - `search` - Substring filtering

mod grouping;
mod scanner;
mod search;
mod types;

pub use types::{DirectoryEntry, RegistryView, ScriptFile};

pub use scanner::{FileScanner, FileSystem, StdFileSystem};

pub use grouping::{classify, favorite_threshold, Percentile};

pub use search::{apply_filter, filter_scripts};
