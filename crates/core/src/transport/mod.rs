//! Push-channel transport.
//!
//! This module provides:
//! - The [`Transport`] trait every push-channel implementation satisfies
//! - A registration-ordered [`HandlerRegistry`] shared by implementations
//! - The Socket.IO framing codec and the reconnection policy
//! - [`SocketTransport`], a WebSocket client for Socket.IO v4 servers
//! - [`MemoryTransport`], an in-process loopback for tests and offline use

pub mod backoff;
pub mod codec;
pub mod error;
pub mod memory;
pub mod registry;
pub mod socket;

pub use backoff::ReconnectPolicy;
pub use error::TransportError;
pub use memory::MemoryTransport;
pub use registry::{Handler, HandlerId, HandlerRegistry};
pub use socket::SocketTransport;

use async_trait::async_trait;
use serde_json::Value;

/// A persistent bidirectional push channel.
///
/// Inbound events are delivered to handlers registered with [`Transport::on`].
/// Implementations raise two synthetic events of their own:
/// `connection_status` (`{"connected": bool}`) on every transition and
/// `connection_error` (`{"message": string}`) on every failed attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the channel.
    ///
    /// Idempotent. Never fails: when no channel can be established the
    /// transport reports `connection_status {connected: false}` and a
    /// `connection_error` instead.
    async fn connect(&self);

    /// Register a handler for an inbound event name.
    ///
    /// Handlers for the same name run in registration order.
    fn on(&self, event: &str, handler: Handler) -> HandlerId;

    /// Remove one handler. Unknown names or ids are ignored.
    fn off(&self, event: &str, id: HandlerId);

    /// Remove every handler registered for `event`.
    fn off_all(&self, event: &str);

    /// Send an event to the peer if connected, and synchronously notify
    /// local handlers registered for the same name.
    fn emit(&self, event: &str, payload: Value);

    /// Close the channel and drop every handler. Safe to call repeatedly.
    async fn disconnect(&self);

    /// Whether the channel is currently connected.
    fn is_connected(&self) -> bool;
}
