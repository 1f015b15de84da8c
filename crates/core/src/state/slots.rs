//! Derivation of the six agent slots from a project's run fields.

use ab_protocol::{AgentRole, AgentSlot, Project, ProjectStatus, ProgressMode, SlotState};

/// Compute the display state of every agent for `project`.
///
/// - no project, or a project that is neither generating nor completed:
///   all pending at 0
/// - completed: all completed at 100, whatever `current_agent` says
/// - generating: slots before the current agent completed, after it
///   pending, the current one active with its own progress per `mode`
/// - generating with an unknown or missing agent: all pending at 0
pub fn derive_agent_slots(project: Option<&Project>, mode: ProgressMode) -> [AgentSlot; 6] {
    let uniform = |state: SlotState, progress: u8| {
        AgentRole::ALL.map(|role| AgentSlot {
            role,
            state,
            progress,
        })
    };

    let Some(project) = project else {
        return uniform(SlotState::Pending, 0);
    };

    match project.status {
        ProjectStatus::Completed => return uniform(SlotState::Completed, 100),
        ProjectStatus::Generating => {}
        _ => return uniform(SlotState::Pending, 0),
    }

    let Some(active) = project
        .current_agent
        .as_deref()
        .and_then(AgentRole::from_display_name)
        .map(AgentRole::index)
    else {
        return uniform(SlotState::Pending, 0);
    };

    AgentRole::ALL.map(|role| {
        let index = role.index();
        let (state, progress) = if index < active {
            (SlotState::Completed, 100)
        } else if index > active {
            (SlotState::Pending, 0)
        } else {
            (SlotState::Active, slot_progress(project.progress, index, mode))
        };
        AgentSlot {
            role,
            state,
            progress,
        }
    })
}

/// Progress of the active slot at `index` given overall progress.
pub fn slot_progress(overall: u32, index: usize, mode: ProgressMode) -> u8 {
    match mode {
        ProgressMode::Coarse => ((overall.saturating_mul(6)) % 100).min(100) as u8,
        // Each agent owns a sixth of the bar: (overall - index * 100/6) / (100/6)
        // scaled to percent, which reduces to 6 * overall - 100 * index.
        ProgressMode::Monotonic => {
            let within = 6 * i64::from(overall) - 100 * index as i64;
            within.clamp(0, 100) as u8
        }
    }
}
