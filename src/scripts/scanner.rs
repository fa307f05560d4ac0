//! Script discovery from the file system
//!
//! Walks a root directory without depth limit and collects every file whose
//! name ends with the configured script extension. Traversal order is
//! whatever the file system reports; callers sort.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{AsgardError, Result};

use super::types::{DirectoryEntry, ScriptFile};

/// Recursive listing abstraction so discovery can run against real disks or
/// an in-memory tree.
pub trait FileSystem {
    /// Every entry below `root`, excluding `root` itself, with links
    /// followed. `keep` is asked about each entry; a rejected directory is
    /// not descended into. Entries that cannot be read are logged and
    /// skipped; only a failure to read `root` is an error.
    fn walk(&self, root: &Path, keep: &dyn Fn(&Path) -> bool) -> io::Result<Vec<DirectoryEntry>>;

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    fn is_dir(&self, path: &Path) -> bool;
}

/// `FileSystem` backed by `walkdir`, following symlinks with its loop
/// detection
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn walk(&self, root: &Path, keep: &dyn Fn(&Path) -> bool) -> io::Result<Vec<DirectoryEntry>> {
        let walker = WalkDir::new(root)
            .follow_links(true)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| keep(e.path()));

        let mut entries = Vec::new();
        for item in walker {
            let entry = match item {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, path = ?e.path(), "Skipping entry during scan");
                    continue;
                }
            };

            let file_type = entry.file_type();
            let path = entry.into_path();
            if file_type.is_dir() {
                entries.push(DirectoryEntry::Directory(path));
            } else if file_type.is_file() {
                entries.push(DirectoryEntry::File(path));
            } else {
                debug!(path = %path.display(), "Skipping special file");
            }
        }
        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Recursive, extension-filtered script discovery
#[derive(Debug, Clone)]
pub struct FileScanner {
    extension: String,
    ignore_hidden: bool,
}

impl FileScanner {
    pub fn new(extension: impl Into<String>, ignore_hidden: bool) -> Self {
        FileScanner {
            extension: extension.into(),
            ignore_hidden,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.script_extension.clone(), config.ignore_hidden)
    }

    /// Scan `root` on the real file system
    pub fn scan(&self, root: &Path) -> Result<Vec<ScriptFile>> {
        self.scan_with(&StdFileSystem, root)
    }

    /// Scan `root` through an arbitrary `FileSystem`.
    ///
    /// Fails with `NotFound` if `root` is missing or not a directory.
    /// Unreadable sub-directories are logged and skipped.
    #[instrument(level = "debug", skip_all, fields(root = %root.display()))]
    pub fn scan_with(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<ScriptFile>> {
        if !fs.is_dir(root) {
            return Err(AsgardError::NotFound {
                path: root.to_path_buf(),
            });
        }
        let root = fs.canonicalize(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AsgardError::NotFound {
                path: root.to_path_buf(),
            },
            _ => AsgardError::io(root, e),
        })?;

        let ignore_hidden = self.ignore_hidden;
        let entries = fs
            .walk(&root, &|path: &Path| !(ignore_hidden && is_hidden(path)))
            .map_err(|e| AsgardError::io(&root, e))?;

        let scripts: Vec<ScriptFile> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                DirectoryEntry::File(path) => self.script_from_path(path),
                DirectoryEntry::Directory(_) => None,
            })
            .collect();

        debug!(count = scripts.len(), "Scan complete");
        Ok(scripts)
    }

    fn script_from_path(&self, path: PathBuf) -> Option<ScriptFile> {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!(path = %path.display(), "Skipping file with non UTF-8 name");
            return None;
        };
        let name = file_name.strip_suffix(self.extension.as_str())?;
        if name.is_empty() {
            return None;
        }
        let name = name.to_string();
        Some(ScriptFile { name, path })
    }
}

/// Name starts with '.', judged on a lossy rendering so non UTF-8 names
/// still get a decision
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
