//! Request/response channel to the builder's REST endpoints.
//!
//! The coordinator only sees [`CommandClient`]; [`HttpCommandClient`] is the
//! production implementation and tests substitute their own.

pub mod error;
pub mod http;

pub use error::{RequestError, RequestResult};
pub use http::HttpCommandClient;

use ab_protocol::{
    GenerationAck, GenerationStatus, NewProject, Project, ProjectStats, ProjectUpdate,
    StartGenerationRequest,
};
use async_trait::async_trait;

/// Commands the client can send to the server.
#[async_trait]
pub trait CommandClient: Send + Sync {
    async fn list_projects(&self) -> RequestResult<Vec<Project>>;

    async fn project_stats(&self) -> RequestResult<ProjectStats>;

    async fn create_project(&self, project: &NewProject) -> RequestResult<Project>;

    async fn get_project(&self, project_id: i64) -> RequestResult<Project>;

    async fn update_project(
        &self,
        project_id: i64,
        update: &ProjectUpdate,
    ) -> RequestResult<Project>;

    async fn delete_project(&self, project_id: i64) -> RequestResult<()>;

    /// Ask the server to begin a run. Accepted runs are acknowledged with
    /// `202` and the project's new status.
    async fn start_generation(
        &self,
        request: &StartGenerationRequest,
    ) -> RequestResult<GenerationAck>;

    async fn generation_status(&self, project_id: i64) -> RequestResult<GenerationStatus>;

    async fn cancel_generation(&self, project_id: i64) -> RequestResult<GenerationAck>;
}
