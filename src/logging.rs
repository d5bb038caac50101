//! File logging for the TUI.  The terminal belongs to the calendar, so log
//! records go to size-rotated files in a log directory instead.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "daymark";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// `debug` in debug builds, `info` otherwise
pub(crate) fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        _ => Err(LoggingError::Level(level.to_owned())),
    }
}

/// Start logging to `log_dir`.  Records are written until the returned
/// handle is dropped.
pub(crate) fn init(level: &str, log_dir: &Path) -> Result<LoggerHandle, LoggingError> {
    let level = normalize_level(level)?;
    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::Directory {
        path: log_dir.to_path_buf(),
        source,
    })?;
    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;
    info!(
        "Starting {} {} (log level {level}, logging to {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );
    Ok(handle)
}

#[derive(Debug, Error)]
pub(crate) enum LoggingError {
    #[error("unsupported log level {0:?}; expected trace, debug, info, warn, error, or off")]
    Level(String),
    #[error("failed to create log directory {}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start logger")]
    Start(#[from] flexi_logger::FlexiLoggerError),
}
