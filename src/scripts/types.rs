//! Script type definitions
//!
//! This module contains the core data types produced by a scan and
//! consumed by classification and search.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A discovered script file.
///
/// `name` is the file name with the script extension stripped, `path` is
/// absolute. Names may collide across directories; paths never do.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScriptFile {
    pub name: String,
    pub path: PathBuf,
}

impl ScriptFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ScriptFile {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// One entry found below the scan root, as reported by a `FileSystem`.
///
/// Links have already been followed, so an entry reached through a link
/// carries the type of its target and the path of the link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryEntry {
    Directory(PathBuf),
    File(PathBuf),
}

impl DirectoryEntry {
    pub fn path(&self) -> &Path {
        match self {
            DirectoryEntry::Directory(p) | DirectoryEntry::File(p) => p,
        }
    }
}

/// The partitioned result of one refresh.
///
/// Both groups are sorted by name; together they hold every scanned file
/// exactly once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryView {
    pub favorites: Vec<Arc<ScriptFile>>,
    pub standard: Vec<Arc<ScriptFile>>,
}

impl RegistryView {
    pub fn len(&self) -> usize {
        self.favorites.len() + self.standard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty() && self.standard.is_empty()
    }

    /// Favorites first, then standard, each in display order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ScriptFile>> {
        self.favorites.iter().chain(self.standard.iter())
    }
}
