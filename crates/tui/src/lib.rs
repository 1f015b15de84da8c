//! # ab-tui
//!
//! Terminal dashboard for app-builder generation runs.
//!
//! The dashboard lists projects, follows the current project's run through
//! the six agent slots and streams the event log. It owns a
//! `GenerationCoordinator` from `ab-core`; user intents become `Op`s from
//! `ab-protocol` and push-channel notifications arrive as `Event`s.

pub mod app;
pub mod boundary;
pub mod event;
pub mod event_handler;
pub mod logging;
pub mod tui;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::App;
pub use boundary::{ErrorBoundary, RenderError};
pub use tui::Tui;

use ab_core::client::HttpCommandClient;
use ab_core::state::GenerationCoordinator;
use ab_core::transport::{SocketTransport, Transport};
use ab_protocol::ClientConfig;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Build the client stack from `config` and run the dashboard until the
/// user quits.
///
/// The caller is responsible for logging: stderr is not usable while the
/// dashboard owns the terminal (see [`logging::init_file_logging`]).
pub async fn run_app(config: &ClientConfig) -> Result<()> {
    let client = Arc::new(
        HttpCommandClient::from_config(config).context("Invalid server.api_base_url")?,
    );
    let transport: Arc<dyn Transport> = Arc::new(SocketTransport::from_config(config));
    let coordinator = GenerationCoordinator::from_config(client, Arc::clone(&transport), config);

    let mut app = App::new(coordinator, transport);
    let mut tui = Tui::init()?;
    let result = app.run(&mut tui).await;
    tui.restore()?;
    result
}
