//! Error types for the request/response channel.

use thiserror::Error;

/// Failure of a command sent to the REST endpoints.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The server answered with an explanation, either as a non-2xx body or
    /// as a 2xx body with `success: false`.
    #[error("{message}")]
    Server { status: Option<u16>, message: String },

    /// Non-2xx response without a usable body.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request was rejected before sending.
    #[error("{0}")]
    Invalid(String),
}

impl RequestError {
    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Server { status, .. } => *status,
            RequestError::Status { status } => Some(*status),
            RequestError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the server refused because a run is already active.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

/// Type alias for Result with RequestError.
pub type RequestResult<T> = Result<T, RequestError>;
