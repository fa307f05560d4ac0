//! Click tracking for script invocations
//!
//! Counts how many times each script (by display name) has been launched and
//! persists the counts as a single JSON object:
//!
//! ```json
//! {
//!     "Align Layers": 12,
//!     "Render Queue": 3
//! }
//! ```
//!
//! Every mutation rewrites the whole document. Only one process is expected
//! to touch the file at a time; there is no locking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::{AsgardError, Result};

/// Script name -> invocation count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClickDatabase(BTreeMap<String, u64>);

impl ClickDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded count for `name`, 0 if never clicked
    pub fn count(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    /// Add one click for `name` and return the new count
    pub fn increment(&mut self, name: &str) -> u64 {
        let count = self.0.entry(name.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Copy of this database with one more click for `name`
    pub fn incremented(&self, name: &str) -> ClickDatabase {
        let mut next = self.clone();
        next.increment(name);
        next
    }

    /// Counts of every tracked script, in name order
    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u64)> for ClickDatabase {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        ClickDatabase(iter.into_iter().collect())
    }
}

/// Owner of the click database and its on-disk document
#[derive(Debug, Clone)]
pub struct ClickStore {
    clicks: ClickDatabase,
    file_path: PathBuf,
    /// Set once the document has been read (or written) this session
    loaded: bool,
}

impl ClickStore {
    /// Store at the default path (~/.asgard/clicks.json)
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        ClickStore {
            clicks: ClickDatabase::new(),
            file_path: path.into(),
            loaded: false,
        }
    }

    fn default_path() -> PathBuf {
        Config::default().clicks_path()
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Whether the in-memory counts reflect the persisted document
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// In-memory copy of the counts
    pub fn database(&self) -> &ClickDatabase {
        &self.clicks
    }

    pub fn count(&self, name: &str) -> u64 {
        self.clicks.count(name)
    }

    /// Replace the in-memory counts with the persisted document.
    ///
    /// A missing document yields an empty database. A document that exists
    /// but does not parse fails with `CorruptData` and leaves the in-memory
    /// counts untouched.
    #[instrument(name = "clicks_load", skip(self), fields(path = %self.file_path.display()))]
    pub fn load(&mut self) -> Result<&ClickDatabase> {
        let content = match std::fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Click file not found, starting fresh");
                self.clicks = ClickDatabase::new();
                self.loaded = true;
                return Ok(&self.clicks);
            }
            Err(e) => return Err(AsgardError::io(&self.file_path, e)),
        };

        let clicks: ClickDatabase =
            serde_json::from_str(&content).map_err(|source| AsgardError::CorruptData {
                path: self.file_path.clone(),
                source,
            })?;

        info!(entry_count = clicks.len(), "Loaded click data");
        self.clicks = clicks;
        self.loaded = true;
        Ok(&self.clicks)
    }

    /// Overwrite the persisted document with `clicks` and adopt it in memory.
    pub fn save(&mut self, clicks: ClickDatabase) -> Result<()> {
        write_document(&self.file_path, &clicks)?;
        self.clicks = clicks;
        self.loaded = true;
        Ok(())
    }

    /// Record one click for `name`, persist, and return the new count.
    ///
    /// Reads the document first if this session has not yet, so a rewrite
    /// never drops existing counts. A document that fails to parse is left
    /// on disk untouched. The in-memory count is kept even if the write fails.
    #[instrument(name = "clicks_increment", skip(self))]
    pub fn increment(&mut self, name: &str) -> Result<u64> {
        if !self.loaded {
            self.load()?;
        }
        let count = self.clicks.increment(name);
        debug!(name, count, "Recorded click");
        write_document(&self.file_path, &self.clicks)?;
        Ok(count)
    }

    /// Drop every recorded click and persist the empty document
    #[instrument(name = "clicks_reset", skip(self))]
    pub fn reset(&mut self) -> Result<()> {
        info!(dropped = self.clicks.len(), "Resetting click data");
        self.save(ClickDatabase::new())
    }
}

impl Default for ClickStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Pretty-print with 4-space indentation, write to a temp file, then rename
/// over the target.
#[instrument(name = "clicks_save", skip_all, fields(path = %path.display()))]
fn write_document(path: &Path, clicks: &ClickDatabase) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AsgardError::io(parent, e))?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    clicks.serialize(&mut serializer)?;

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &buf).map_err(|e| AsgardError::io(&temp_path, e))?;
    std::fs::rename(&temp_path, path).map_err(|e| AsgardError::io(path, e))?;

    debug!(entry_count = clicks.len(), bytes = buf.len(), "Saved click data (atomic)");
    Ok(())
}
