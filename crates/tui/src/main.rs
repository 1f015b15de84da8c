//! Standalone dashboard binary.
//!
//! Reads `.app-builder/config.toml` from the working directory; the
//! `app-builder` CLI offers the same dashboard plus headless commands.

use ab_core::config::loader::{load_config, log_dir};
use std::path::Path;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let root = Path::new(".");
    let config = load_config(root).await?;
    let _guard = ab_tui::logging::init_file_logging(&log_dir(root))
        .map_err(|e| color_eyre::eyre::eyre!(e))?;

    ab_tui::run_app(&config)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e))
}
