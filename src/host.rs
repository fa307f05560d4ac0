//! Host collaborators
//!
//! The core never talks to a UI toolkit or an interpreter directly. Everything
//! it needs from the outside goes through three narrow traits:
//!
//! - [`PreferenceStore`] - two string settings (root folder, favorite marker)
//! - [`DirectoryChooser`] - pick a new root folder
//! - [`ScriptRunner`] - execute a resolved script path
//!
//! Default implementations back the command-line binary.

use std::collections::BTreeMap;
use std::io::{BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::config::{RunnerConfig, DEFAULT_FAVORITE_MARKER};
use crate::error::{AsgardError, Result, ResultExt};

/// Preference key holding the scripts root directory
pub const ROOT_DIRECTORY_KEY: &str = "Folder";
/// Preference key holding the favorites marker
pub const FAVORITE_MARKER_KEY: &str = "FavoriteMarker";

pub trait PreferenceStore {
    fn get_preference(&self, key: &str) -> Option<String>;
    fn set_preference(&mut self, key: &str, value: &str) -> Result<()>;
}

pub trait DirectoryChooser {
    /// `None` when the user cancels
    fn choose_directory(&mut self) -> Option<PathBuf>;
}

pub trait ScriptRunner {
    fn run_script(&mut self, path: &Path) -> Result<()>;
}

/// Settings read through a `PreferenceStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root_directory: Option<PathBuf>,
    pub favorite_marker: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            root_directory: None,
            favorite_marker: DEFAULT_FAVORITE_MARKER.to_string(),
        }
    }
}

impl Settings {
    pub fn load(prefs: &dyn PreferenceStore) -> Self {
        let root_directory = prefs
            .get_preference(ROOT_DIRECTORY_KEY)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let favorite_marker = prefs
            .get_preference(FAVORITE_MARKER_KEY)
            .unwrap_or_else(|| DEFAULT_FAVORITE_MARKER.to_string());
        Settings {
            root_directory,
            favorite_marker,
        }
    }

    pub fn set_root_directory(prefs: &mut dyn PreferenceStore, path: &Path) -> Result<()> {
        prefs.set_preference(ROOT_DIRECTORY_KEY, &path.to_string_lossy())
    }

    pub fn set_favorite_marker(prefs: &mut dyn PreferenceStore, marker: &str) -> Result<()> {
        prefs.set_preference(FAVORITE_MARKER_KEY, marker)
    }
}

/// String map persisted as a pretty JSON object, written through on every set
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    values: BTreeMap<String, String>,
    file_path: PathBuf,
}

impl JsonPreferenceStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is reported and treated as empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let file_path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&file_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!(error = %e, path = %file_path.display(), "Failed to parse preferences, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %file_path.display(), "Preferences file not found, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(error = %e, path = %file_path.display(), "Failed to read preferences, starting empty");
                BTreeMap::new()
            }
        };
        JsonPreferenceStore { values, file_path }
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AsgardError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.file_path, json).map_err(|e| AsgardError::io(&self.file_path, e))
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get_preference(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_preference(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
            .map_err(|e| AsgardError::Preference(format!("could not save '{}': {}", key, e)))?;
        info!(key, "Saved preference");
        Ok(())
    }
}

/// Asks for a directory on a line-oriented input
pub struct PromptDirectoryChooser<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptDirectoryChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        PromptDirectoryChooser { input, output }
    }
}

impl<R: BufRead, W: Write> DirectoryChooser for PromptDirectoryChooser<R, W> {
    fn choose_directory(&mut self) -> Option<PathBuf> {
        write!(self.output, "Scripts folder: ")
            .and_then(|_| self.output.flush())
            .log_err();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(shellexpand::tilde(trimmed).as_ref()))
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read directory from prompt");
                None
            }
        }
    }
}

/// Runs scripts as child processes and waits for them to exit
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    runner: Option<RunnerConfig>,
}

impl CommandRunner {
    /// `None` executes the script file itself
    pub fn new(runner: Option<RunnerConfig>) -> Self {
        CommandRunner { runner }
    }

    fn command_for(&self, path: &Path) -> Command {
        match &self.runner {
            Some(cfg) => {
                let mut command = Command::new(&cfg.command);
                command.args(&cfg.args).arg(path);
                command
            }
            None => Command::new(path),
        }
    }
}

impl ScriptRunner for CommandRunner {
    #[instrument(name = "run_script", skip_all, fields(path = %path.display()))]
    fn run_script(&mut self, path: &Path) -> Result<()> {
        let mut command = self.command_for(path);
        debug!(command = ?command, "Spawning script process");

        let status = command.status().map_err(|e| AsgardError::Launch {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(AsgardError::Launch {
                path: path.to_path_buf(),
                message: format!("exited with {}", status),
            })
        }
    }
}
