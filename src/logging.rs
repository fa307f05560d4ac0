//! Structured JSONL logging plus human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.asgard/logs/asgard.jsonl) - structured, one event per line
//! - **Compact to stderr** - for whoever is at the terminal, quiet by default
//!
//! # Usage
//!
//! ```rust,ignore
//! use asgard::logging;
//! use tracing_subscriber::filter::LevelFilter;
//!
//! // MUST keep guard alive for duration of program
//! let _guard = logging::init(LevelFilter::WARN);
//!
//! tracing::info!(event_type = "app_start", "Application started");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2026-01-05T10:30:45.123Z","level":"INFO","fields":{"message":"Script launch Align","event_type":"script_event","script":"Align","action":"launch","success":true},"target":"asgard::logging"}
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::get_asgard_path;

const LOG_FILE_NAME: &str = "asgard.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// The file always receives `info` and above (or whatever `RUST_LOG` says);
/// stderr only shows events at `stderr_level` or more severe.
pub fn init(stderr_level: LevelFilter) -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    let writer: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            Box::new(std::io::sink())
        }
    };

    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(writer);

    // Default to info, or lower if the terminal asked for more
    let default_level = std::cmp::max(stderr_level, LevelFilter::INFO);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::new(Rfc3339))
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .compact()
        .with_filter(stderr_level);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Application logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (~/.asgard/logs/)
fn get_log_dir() -> PathBuf {
    get_asgard_path().join("logs")
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

/// Log a script launch event with structured fields
pub fn log_script_event(script: &str, action: &str, success: bool) {
    if success {
        tracing::info!(
            event_type = "script_event",
            script = script,
            action = action,
            success = success,
            "Script {} {}", action, script
        );
    } else {
        tracing::warn!(
            event_type = "script_event",
            script = script,
            action = action,
            success = success,
            "Script {} {} failed", action, script
        );
    }
}
