//! # ab-core
//!
//! Live connection and generation-progress client for the app builder.
//!
//! This crate provides:
//! - The push-channel transport (Socket.IO over WebSocket) with reconnection
//! - The request/response command client for the REST endpoints
//! - Normalization of inbound events and the bounded console log
//! - The generation state coordinator and agent-slot derivation
//! - Configuration loading from `.app-builder/`
//!
//! ## Modules
//!
//! - [`transport`]: `Transport` trait, socket and in-memory implementations
//! - [`client`]: `CommandClient` trait and its HTTP implementation
//! - [`normalizer`]: inbound payloads to `Event`s, log buffer
//! - [`state`]: `GenerationCoordinator`
//! - [`config`]: configuration loading

pub mod client;
pub mod config;
pub mod normalizer;
pub mod state;
pub mod transport;
