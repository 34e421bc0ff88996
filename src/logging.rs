//! Tracing subscriber setup for the CLI
//!
//! Logs always go to stderr so stdout stays reserved for verification output. A log file,
//! optionally rotated, can be added through [`LoggingOptions`].

use crate::config::{LogRotation, LoggingOptions};
use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Environment variable that overrides the configured filter directive
pub const LOG_LEVEL_ENV: &str = "CIP8_LOG_LEVEL";

/// Install the global subscriber. Later calls are no-ops.
pub fn init(options: &LoggingOptions) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| options.level.clone());
    let file_layer = match options.file.as_deref() {
        Some(path) => Some(
            fmt::layer()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(false)
                .with_writer(file_writer(path, options.rotation)?),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(build_filter(&level)?)
        .with(file_layer)
        .with(
            fmt::layer()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(options.color)
                .with_writer(io::stderr),
        )
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}

/// Parse a level or filter directive (`info`, `cip8_verify=debug,warn`, ...).
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).map_err(|e| Error::Config(format!("Invalid log level '{level}': {e}")))
}

fn file_writer(path: &Path, rotation: Option<LogRotation>) -> Result<NonBlocking> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .map_err(|e| Error::Config(format!("Failed to create log directory {}: {e}", dir.display())))?;

    let (writer, guard) = match rotation {
        Some(rotation) => {
            let file_name = path.file_name().ok_or_else(|| {
                Error::Config(format!("Log file path '{}' has no file name", path.display()))
            })?;
            let appender = match rotation {
                LogRotation::Hourly => rolling::hourly(dir, file_name),
                LogRotation::Daily => rolling::daily(dir, file_name),
            };
            tracing_appender::non_blocking(appender)
        }
        None => {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .map_err(|e| Error::Config(format!("Failed to open log file {}: {e}", path.display())))?;
            tracing_appender::non_blocking(file)
        }
    };
    // the guard flushes on drop, so it lives as long as the process
    let _ = FILE_GUARD.set(guard);
    Ok(writer)
}
