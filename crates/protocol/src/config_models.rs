//! Client configuration models for `.app-builder/config.toml`.
//!
//! Every section and field has a default, so an empty or missing file is a
//! valid configuration.
//!
//! # Example
//!
//! ```toml
//! # .app-builder/config.toml
//! log_capacity = 50
//! progress_mode = "monotonic"
//!
//! [server]
//! api_base_url = "http://localhost:5000/api"
//! socket_url = "http://localhost:5000"
//!
//! [reconnection]
//! attempts = 5
//! delay_ms = 1000
//! delay_max_ms = 5000
//! timeout_ms = 20000
//!
//! [watchdog]
//! # 0 turns the watchdog off.
//! stall_timeout_secs = 120
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use ts_rs::TS;

use crate::agent_models::ProgressMode;

/// Root of the client configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerConfig,
    pub reconnection: ReconnectionConfig,
    pub watchdog: WatchdogConfig,

    /// How many console lines to keep before evicting the oldest.
    pub log_capacity: usize,

    /// Formula for the active agent's own progress bar.
    pub progress_mode: ProgressMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            reconnection: ReconnectionConfig::default(),
            watchdog: WatchdogConfig::default(),
            log_capacity: 50,
            progress_mode: ProgressMode::default(),
        }
    }
}

/// Where the server lives.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the REST command endpoints, including the `/api` prefix.
    pub api_base_url: String,

    /// Origin of the push channel. `http(s)` is rewritten to `ws(s)`.
    pub socket_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            socket_url: "http://localhost:5000".to_string(),
        }
    }
}

/// Automatic reconnection of the push channel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(default)]
pub struct ReconnectionConfig {
    /// Attempts after a drop or failed connect before giving up.
    pub attempts: u32,

    /// Delay before the first retry; each further retry adds this much.
    pub delay_ms: u64,

    /// Ceiling for the retry delay.
    pub delay_max_ms: u64,

    /// Time allowed for a single connection attempt.
    pub timeout_ms: u64,
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay_ms: 1_000,
            delay_max_ms: 5_000,
            timeout_ms: 20_000,
        }
    }
}

/// Client-side watchdog for runs that stop reporting.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Poll the status endpoint after this many seconds without progress.
    ///
    /// `0` (or `None` when built in code) disables the watchdog.
    pub stall_timeout_secs: Option<u64>,
}

impl WatchdogConfig {
    /// The effective timeout, `None` when the watchdog is off.
    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            stall_timeout_secs: Some(120),
        }
    }
}
