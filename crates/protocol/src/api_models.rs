//! Request and response bodies of the REST command endpoints.
//!
//! Every response carries a boolean `success` flag next to its payload
//! field. Failures come back with a non-2xx status and, usually, a JSON body
//! holding a human-readable `message` (newer servers) or `error` (the Flask
//! backend).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::project_models::{GenerationStatus, Project, ProjectStats, ProjectStatus};

/// `GET /projects`
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct ProjectListResponse {
    pub success: bool,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `GET|POST|PUT /projects[/{id}]`
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct ProjectResponse {
    pub success: bool,
    pub project: Project,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /projects/stats`
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct StatsResponse {
    pub success: bool,
    #[serde(default)]
    pub stats: ProjectStats,
}

/// `GET /generation/status/{id}`
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct GenerationStatusResponse {
    pub success: bool,
    #[serde(flatten)]
    pub status: GenerationStatus,
}

/// Acknowledgement of `POST /generation/start` and `/generation/cancel/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct GenerationAck {
    pub success: bool,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Bare acknowledgement, e.g. of `DELETE /projects/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /generation/start`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct StartGenerationRequest {
    pub project_id: i64,
    pub description: String,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub requirements: Value,
}

impl StartGenerationRequest {
    pub fn for_project(project: &Project) -> Self {
        Self {
            project_id: project.id,
            description: project.description.clone(),
            requirements: Value::Object(Default::default()),
        }
    }
}

/// Error body of a failed command.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The server-supplied explanation, preferring `message` over `error`.
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
