//! stderr logging for the headless commands.
//!
//! The dashboard logs to a file instead; see `ab_tui::logging`.

use tracing_subscriber::EnvFilter;

/// Warnings and errors by default; `APP_BUILDER_LOG` overrides.
pub fn init_stderr_logging() {
    let filter = EnvFilter::try_from_env(ab_core::config::loader::ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
