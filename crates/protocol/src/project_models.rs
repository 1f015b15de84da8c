//! Project models shared between the command client and the dashboard.
//!
//! A project is the unit the user creates and then hands to the remote
//! generator. The server is the source of truth; the client only mirrors
//! what the REST endpoints and push events report.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

/// Lifecycle status of a project.
///
/// ```text
/// draft -> generating -> completed | failed | cancelled
/// ```
///
/// Terminal statuses may be restarted with a new start command.
///
/// Decoding ignores case, and a status this client does not know becomes
/// [`ProjectStatus::Unknown`] instead of failing the whole payload.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Created but never generated.
    #[default]
    Draft,

    /// A generation run is in flight.
    Generating,

    /// The last run finished successfully.
    Completed,

    /// The last run reported an error.
    Failed,

    /// The last run was cancelled by the user.
    Cancelled,

    /// Reported by a newer server; shown as-is and treated as idle.
    Unknown,
}

impl ProjectStatus {
    /// Whether this status ends a generation run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "generating" => Ok(Self::Generating),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown project status: {other}")),
        }
    }
}

impl<'de> Deserialize<'de> for ProjectStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Self::Unknown))
    }
}

/// Complexity tier requested for a project.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl Complexity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "medium" => Ok(Self::Medium),
            "complex" => Ok(Self::Complex),
            other => Err(format!("unknown complexity tier: {other}")),
        }
    }
}

/// A project as reported by the server.
///
/// Only `id` and `name` are guaranteed; every other field tolerates being
/// absent or `null` because the backend variants disagree on what they send.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct Project {
    /// Server-assigned identifier.
    pub id: i64,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: ProjectStatus,

    /// Overall run progress, 0-100.
    #[serde(default)]
    pub progress: u32,

    /// Display name of the agent the server is currently running.
    #[serde(default)]
    pub current_agent: Option<String>,

    #[serde(default)]
    pub framework: Option<String>,

    /// Complexity tier as the server spells it.
    ///
    /// Kept as a string because older servers accept free-form values; use
    /// [`Project::complexity_tier`] for the parsed form.
    #[serde(default)]
    pub complexity: Option<String>,

    /// Requirements analysis produced by the first agent.
    #[serde(default)]
    #[ts(type = "unknown")]
    pub specifications: Option<Value>,

    #[serde(default)]
    #[ts(type = "unknown")]
    pub architecture: Option<Value>,

    #[serde(default)]
    #[ts(type = "unknown")]
    pub design: Option<Value>,

    /// Aggregated output of every agent once the run completes.
    #[serde(default)]
    #[ts(type = "unknown")]
    pub generated_code: Option<Value>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub tech_stack: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<String>,

    /// Failure reason of the last run, if it failed.
    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub deploy_url: Option<String>,

    #[serde(default)]
    pub build_time: Option<String>,

    #[serde(default)]
    pub performance_score: Option<u32>,

    #[serde(default)]
    pub started_at: Option<NaiveDateTime>,

    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,

    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,

    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which generated document to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Specifications,
    Architecture,
    Design,
    Code,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Specifications,
        ArtifactKind::Architecture,
        ArtifactKind::Design,
        ArtifactKind::Code,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Specifications => "Specifications",
            Self::Architecture => "Architecture",
            Self::Design => "Design",
            Self::Code => "Code",
        }
    }
}

impl Project {
    /// Create a bare draft project. Mostly useful for tests and fixtures.
    pub fn draft(id: i64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            status: ProjectStatus::Draft,
            progress: 0,
            current_agent: None,
            framework: None,
            complexity: None,
            specifications: None,
            architecture: None,
            design: None,
            generated_code: None,
            tech_stack: Vec::new(),
            features: Vec::new(),
            error_message: None,
            deploy_url: None,
            build_time: None,
            performance_score: None,
            started_at: None,
            completed_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Parsed complexity tier, if the server sent a known one.
    pub fn complexity_tier(&self) -> Option<Complexity> {
        self.complexity.as_deref().and_then(|c| c.parse().ok())
    }

    /// Whether a generation run is currently in flight.
    pub fn is_generating(&self) -> bool {
        self.status == ProjectStatus::Generating
    }

    /// Raw JSON of a generated artifact.
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Value> {
        match kind {
            ArtifactKind::Specifications => self.specifications.as_ref(),
            ArtifactKind::Architecture => self.architecture.as_ref(),
            ArtifactKind::Design => self.design.as_ref(),
            ArtifactKind::Code => self.generated_code.as_ref(),
        }
        .filter(|v| !v.is_null())
    }

    /// A generated artifact rendered as display text.
    ///
    /// Strings are shown verbatim; structured values are pretty-printed.
    pub fn artifact_text(&self, kind: ArtifactKind) -> Option<String> {
        self.artifact(kind).map(|value| match value {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        })
    }
}

/// Request body for creating a project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
pub struct NewProject {
    pub name: String,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub framework: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub complexity: Option<Complexity>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tech_stack: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub features: Option<Vec<String>>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }

    /// Check the fields the server rejects with a 400.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Project name is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Project description is required".to_string());
        }
        Ok(())
    }
}

/// Partial update of a project. Absent fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<ProjectStatus>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub framework: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub complexity: Option<Complexity>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tech_stack: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub features: Option<Vec<String>>,
}

/// Aggregate counters shown on the dashboard header.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
pub struct ProjectStats {
    #[serde(default)]
    pub total_projects: u64,
    #[serde(default)]
    pub deployed: u64,
    #[serde(default)]
    pub building: u64,
    #[serde(default)]
    pub total_views: u64,
}

/// Snapshot returned by the generation status endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct GenerationStatus {
    pub project_id: i64,
    pub status: ProjectStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub current_agent: Option<String>,
    #[serde(default)]
    pub started_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub estimated_completion: Option<NaiveDateTime>,
    #[serde(default)]
    pub error_message: Option<String>,
}
