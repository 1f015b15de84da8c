//! Configuration loading and management.
//!
//! This module loads the client settings from `.app-builder/config.toml`
//! and applies environment overrides on top.

pub mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
