//! Error types of the push-channel transport.

use thiserror::Error;

/// Reasons a push channel could not be established or was lost.
///
/// These never escape [`super::Transport`]: they are reported to handlers
/// as `connection_error` events and recovered by the reconnection policy.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No channel can exist in this environment.
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    /// The socket URL could not be turned into a WebSocket endpoint.
    #[error("Invalid socket URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A connection attempt did not complete in time, or a connected
    /// server stopped sending heartbeats.
    #[error("Connection timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The server refused the namespace connection.
    #[error("Connection refused by server: {0}")]
    Refused(String),

    /// The server closed the channel.
    #[error("Connection closed by server")]
    Closed,

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Malformed packet: {0}")]
    Codec(#[from] super::codec::CodecError),
}
