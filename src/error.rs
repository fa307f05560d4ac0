use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// Error severity for user-facing display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable
    Error,    // operation failed
    Critical, // requires user action
}

/// Domain-specific errors for Asgard
#[derive(Error, Debug)]
pub enum AsgardError {
    #[error("Path not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Usage data at '{}' is not valid JSON: {source}", path.display())]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O failure on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Percentile must lie strictly between 0 and 1, got {0}")]
    InvalidPercentile(f64),

    #[error("Script launch failed for '{}': {message}", path.display())]
    Launch { path: PathBuf, message: String },

    #[error("Preference store error: {0}")]
    Preference(String),
}

impl AsgardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } => ErrorSeverity::Warning,
            Self::CorruptData { .. } => ErrorSeverity::Critical,
            Self::Io { .. } => ErrorSeverity::Error,
            Self::Serialize(_) => ErrorSeverity::Error,
            Self::InvalidPercentile(_) => ErrorSeverity::Warning,
            Self::Launch { .. } => ErrorSeverity::Error,
            Self::Preference(_) => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { path } => format!("Nothing found at {}", path.display()),
            Self::CorruptData { path, .. } => format!(
                "Usage data at {} is damaged; run `asgard reset` to start over",
                path.display()
            ),
            Self::Io { path, source } => {
                format!("Could not access {}: {}", path.display(), source)
            }
            Self::Serialize(e) => format!("Could not encode data: {}", e),
            Self::InvalidPercentile(p) => {
                format!("Favorite percentile {} is out of range (0, 1)", p)
            }
            Self::Launch { path, message } => {
                format!("Could not run {}: {}", path.display(), message)
            }
            Self::Preference(msg) => format!("Preference issue: {}", msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, AsgardError>;

/// Turn a `Result` into an `Option`, logging the error with the caller's
/// location. For failures that should not interrupt the current operation.
pub trait ResultExt<T> {
    /// Log at `error` level
    fn log_err(self) -> Option<T>;
    /// Log at `warn` level
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        let caller = std::panic::Location::caller();
        self.map_err(|error| {
            error!(
                error = ?error,
                file = caller.file(),
                line = caller.line(),
                "Ignored failure"
            )
        })
        .ok()
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        let caller = std::panic::Location::caller();
        self.map_err(|error| {
            warn!(
                error = ?error,
                file = caller.file(),
                line = caller.line(),
                "Continuing past failure"
            )
        })
        .ok()
    }
}
