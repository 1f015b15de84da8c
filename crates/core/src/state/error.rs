//! Error types for coordinator operations.

use crate::client::RequestError;
use thiserror::Error;

/// Errors returned by [`GenerationCoordinator`](super::GenerationCoordinator)
/// operations.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// The server rejected or never answered the command.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A run is already active; no start command was sent.
    #[error("Generation already in progress for project {project_id}")]
    GenerationInProgress { project_id: i64 },

    #[error("Unknown project {0}")]
    UnknownProject(i64),

    /// Client-side validation failed before anything was sent.
    #[error("{0}")]
    InvalidProject(String),

    #[error("No project selected")]
    NoProjectSelected,
}

/// Type alias for Result with CoordinatorError.
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
