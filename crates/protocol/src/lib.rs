//! # ab-protocol
//!
//! Core protocol definitions and data models for the app-builder client.
//!
//! This crate defines all shared data structures used for:
//! - Projects, their lifecycle status and generated artifacts
//! - The fixed agent roster and derived agent-slot display state
//! - REST request/response envelopes of the command endpoints
//! - Operations and Events between the dashboard and the coordinator
//! - Client configuration from `.app-builder/config.toml`
//!
//! ## Modules
//!
//! - [`project_models`]: Projects, stats and generation status
//! - [`agent_models`]: Agent roles, slots and progress modes
//! - [`api_models`]: Command endpoint bodies
//! - [`ipc`]: Operations and Events, push-channel event names
//! - [`config_models`]: Client configuration
//!
//! ## Design Principles
//!
//! - Minimal dependencies: only serde, chrono and ts-rs
//! - TypeScript generation: all types derive `TS` for the web dashboard
//! - Independent compilation: no dependencies on other app-builder crates

pub mod agent_models;
pub mod api_models;
pub mod config_models;
pub mod ipc;
pub mod project_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use api_models::*;
pub use config_models::*;
pub use ipc::*;
pub use project_models::*;
