//! Agent roles of the generation run and their derived display state.
//!
//! The server runs a fixed sequence of six agents. The client never stores
//! per-agent state: an [`AgentSlot`] is recomputed from the project's
//! overall progress and current agent name every time it is shown.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// One of the six roles of a generation run, in execution order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    RequirementsAnalyst,
    SystemArchitect,
    UiUxDesigner,
    FrontendDeveloper,
    BackendDeveloper,
    DevopsEngineer,
}

impl AgentRole {
    /// Every role in the order the server runs them.
    pub const ALL: [AgentRole; 6] = [
        AgentRole::RequirementsAnalyst,
        AgentRole::SystemArchitect,
        AgentRole::UiUxDesigner,
        AgentRole::FrontendDeveloper,
        AgentRole::BackendDeveloper,
        AgentRole::DevopsEngineer,
    ];

    /// Name the server reports in `current_agent`.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::RequirementsAnalyst => "Requirements Analyst",
            Self::SystemArchitect => "System Architect",
            Self::UiUxDesigner => "UI/UX Designer",
            Self::FrontendDeveloper => "Frontend Developer",
            Self::BackendDeveloper => "Backend Developer",
            Self::DevopsEngineer => "DevOps Engineer",
        }
    }

    /// Short id used by the generator backend.
    pub fn short_id(self) -> &'static str {
        match self {
            Self::RequirementsAnalyst => "analyst",
            Self::SystemArchitect => "architect",
            Self::UiUxDesigner => "designer",
            Self::FrontendDeveloper => "frontend",
            Self::BackendDeveloper => "backend",
            Self::DevopsEngineer => "deployer",
        }
    }

    /// Position of this role in [`AgentRole::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap_or_default()
    }

    /// Look a role up by the display name the server sends.
    ///
    /// The match is exact: the server always reports the canonical names.
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.display_name() == name)
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Display state of an agent slot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Pending,
    Active,
    Completed,
}

/// Derived view of one agent within the current run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
pub struct AgentSlot {
    pub role: AgentRole,
    pub state: SlotState,
    /// Progress of this slot alone, 0-100.
    pub progress: u8,
}

/// How the active slot's own progress is computed from overall progress.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// `(overall * 6) mod 100`, matching the original dashboard. Jumps back
    /// to zero every time overall progress crosses a multiple of ~16.7%.
    Coarse,

    /// Position of overall progress within the active slot's sixth of the
    /// bar. Never decreases while the same agent stays active.
    #[default]
    Monotonic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_are_ordered() {
        let names: Vec<_> = AgentRole::ALL.iter().map(|r| r.display_name()).collect();
        assert_eq!(
            names,
            vec![
                "Requirements Analyst",
                "System Architect",
                "UI/UX Designer",
                "Frontend Developer",
                "Backend Developer",
                "DevOps Engineer",
            ]
        );
        assert_eq!(AgentRole::BackendDeveloper.index(), 4);
    }

    #[test]
    fn test_from_display_name() {
        assert_eq!(
            AgentRole::from_display_name("UI/UX Designer"),
            Some(AgentRole::UiUxDesigner)
        );
        assert_eq!(AgentRole::from_display_name("frontend developer"), None);
        assert_eq!(AgentRole::from_display_name("Tester"), None);
    }

    #[test]
    fn test_progress_mode_serialization() {
        assert_eq!(serde_json::to_value(ProgressMode::Coarse).unwrap(), "coarse");
        assert_eq!(ProgressMode::default(), ProgressMode::Monotonic);
    }
}
