//! Messages flowing between the dashboard and the generation coordinator.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: user intents sent from the UI to the coordinator
//! - `Event`: normalized push-channel notifications fed to the coordinator
//!
//! Inbound push payloads arrive in several historical shapes; the core's
//! normalizer folds them into [`Event`] before anything else sees them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::project_models::{NewProject, ProjectStatus};

/// Push-channel event names.
pub mod names {
    /// Synthetic: raised by the transport on every connect/disconnect.
    pub const CONNECTION_STATUS: &str = "connection_status";
    /// Synthetic: raised by the transport on every failed attempt.
    pub const CONNECTION_ERROR: &str = "connection_error";

    pub const CONNECT: &str = "connect";
    pub const DISCONNECT: &str = "disconnect";
    pub const CONNECT_ERROR: &str = "connect_error";

    pub const SERVER_MESSAGE: &str = "server_message";
    pub const PROGRESS: &str = "progress";
    pub const GENERATION_PROGRESS: &str = "generation_progress";
    pub const GENERATION_UPDATE: &str = "generation_update";
    pub const GENERATION_COMPLETE: &str = "generation_complete";
    pub const GENERATION_ERROR: &str = "generation_error";

    pub const START_GENERATION: &str = "start_generation";
    pub const JOIN_PROJECT: &str = "join_project";

    /// Every inbound name the normalizer subscribes to.
    pub const INBOUND: &[&str] = &[
        CONNECTION_STATUS,
        CONNECTION_ERROR,
        CONNECT,
        DISCONNECT,
        CONNECT_ERROR,
        SERVER_MESSAGE,
        PROGRESS,
        GENERATION_PROGRESS,
        GENERATION_UPDATE,
        GENERATION_COMPLETE,
        GENERATION_ERROR,
    ];
}

/// Operations requested by the user.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// { "type": "startGeneration", "payload": { "project_id": 1 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Create a project and make it current.
    CreateProject(NewProject),

    /// Make a project current and subscribe to its run.
    SelectProject { project_id: i64 },

    /// Start a generation run for a project.
    ///
    /// `None` targets the current project.
    StartGeneration { project_id: Option<i64> },

    /// Quick-start a run from a one-line idea over the push channel.
    StartFromIdea { idea: String },

    /// Ask the server to cancel a running generation.
    ///
    /// `None` targets the current project.
    CancelGeneration { project_id: Option<i64> },

    /// Delete a project on the server.
    DeleteProject { project_id: i64 },

    /// Reload the project list and stats.
    RefreshProjects,

    /// Hide the error banner.
    DismissError,

    /// Leave the application.
    Shutdown,
}

/// Normalized inbound notifications.
///
/// ```json
/// { "type": "generationProgress", "payload": { "project_id": 1, "progress": 50, ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// The push channel connected or disconnected.
    ConnectionStatus { connected: bool },

    /// A connection attempt failed.
    ConnectionError { message: String },

    /// A run reported progress.
    ///
    /// `project_id` is absent in payloads from servers that only ever
    /// stream a single run; those apply to the current project.
    GenerationProgress {
        project_id: Option<i64>,
        progress: u32,
        current_agent: Option<String>,
        status: Option<ProjectStatus>,
    },

    /// A run finished successfully.
    GenerationComplete { project_id: Option<i64> },

    /// A run failed on the server.
    GenerationError {
        project_id: Option<i64>,
        error: String,
    },

    /// Free-form server notice.
    ServerMessage {
        #[ts(type = "unknown")]
        payload: Value,
    },

    /// Named step of a quick-start run.
    StepProgress { step: String },
}

impl Event {
    /// Project the event refers to, when it names one.
    pub fn project_id(&self) -> Option<i64> {
        match self {
            Event::GenerationProgress { project_id, .. }
            | Event::GenerationComplete { project_id }
            | Event::GenerationError { project_id, .. } => *project_id,
            _ => None,
        }
    }
}
