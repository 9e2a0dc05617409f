//! Logging setup.
//!
//! The TUI owns the terminal, so interactive runs log to a file. Headless
//! runs (`--execute`) log to stderr and keep stdout for the result.

use crate::core::{Result, ViewerError};
use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "sqlview.log";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Starts logging to the log file, truncating the previous run's log.
///
/// Returns the file path so it can be reported on failure.
pub fn init_file_logging() -> Result<PathBuf> {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = File::create(&log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(log_file)
        .with_ansi(false)
        .try_init()
        .map_err(|e| ViewerError::Config(format!("Failed to initialize logging: {e}")))?;
    Ok(log_path)
}

/// Starts logging to stderr. Only warnings and errors unless `RUST_LOG` says otherwise.
pub fn init_stderr_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| ViewerError::Config(format!("Failed to initialize logging: {e}")))
}

/// Log file location: the XDG state directory on Linux, the config
/// directory elsewhere, the temp directory as a last resort.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("sqlview").join(LOG_FILE);
    }
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("sqlview").join(LOG_FILE);
    }
    std::env::temp_dir().join(LOG_FILE)
}
