//! Log output while the dashboard owns the terminal.
//!
//! Writing to stderr would corrupt the screen, so tracing goes to a
//! daily-rolling file under `.app-builder/logs/` instead.

use ab_core::config::loader::ENV_LOG;
use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the rolling log.
pub const LOG_FILE_PREFIX: &str = "app-builder.log";

/// Filter from `APP_BUILDER_LOG`, or `default` when unset or invalid.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a global subscriber writing to a rolling file in `log_dir`.
///
/// Keep the returned guard alive until exit; dropping it flushes the
/// writer thread.
///
/// # Errors
///
/// Fails if the directory cannot be created or a global subscriber is
/// already installed.
pub fn init_file_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::debug!(dir = %log_dir.display(), "file logging initialized");
    Ok(guard)
}
