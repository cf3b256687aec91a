// src/logging.rs

//! Log output setup for the long-running tracker.
//!
//! Library code logs through the `log` facade. This installs a tracing
//! subscriber that captures those records and writes them, with timestamp
//! and level, to a file rotated at midnight (`tracker.log.YYYY-MM-DD`) and
//! to stderr.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{AppError, Result};

/// Base name of the rotating log file.
pub const LOG_FILE_NAME: &str = "tracker.log";

/// Level used when `RUST_LOG` is not set.
pub fn default_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Daily rotating appender writing `tracker.log.YYYY-MM-DD` under `log_dir`.
pub fn file_appender(log_dir: &Path) -> RollingFileAppender {
    tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME)
}

/// Initialize logging. The returned guard flushes the file writer on drop
/// and must be held for the life of the process.
pub fn init(log_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(log_dir));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| AppError::config(format!("cannot initialize logging: {e}")))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), "debug");
        assert_eq!(default_level(false), "info");
    }

    #[test]
    fn test_file_appender_writes_dated_file() {
        let tmp = TempDir::new().unwrap();
        let mut appender = file_appender(tmp.path());
        appender.write_all(b"Application Started !\n").unwrap();
        appender.flush().unwrap();
        drop(appender);

        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with(&format!("{LOG_FILE_NAME}.")));

        let content = std::fs::read_to_string(tmp.path().join(&names[0])).unwrap();
        assert_eq!(content, "Application Started !\n");
    }
}
