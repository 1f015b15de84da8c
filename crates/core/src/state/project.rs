//! Project lifecycle transitions.
//!
//! These functions are the only places that change a [`Project`]'s run
//! fields (`status`, `progress`, `current_agent`, `error_message`). The
//! coordinator decides *when* to call them; they decide *what* changes.

use ab_protocol::{Project, ProjectStatus};
use chrono::Local;

/// Mark a project as generating after the server accepted the start command.
///
/// Progress restarts at 0 and any previous failure is cleared, so restarting
/// a `failed`, `cancelled` or `completed` project begins a fresh run.
pub fn begin_generation(project: &mut Project) {
    project.status = ProjectStatus::Generating;
    project.progress = 0;
    project.current_agent = None;
    project.error_message = None;
    project.started_at = Some(Local::now().naive_local());
    project.completed_at = None;
}

/// Apply a progress report.
///
/// # Arguments
///
/// * `project` - The project the report refers to
/// * `progress` - Overall progress, clamped to 0-100
/// * `current_agent` - Agent now running, if reported
/// * `status` - Status reported alongside the progress, if any
pub fn apply_progress(
    project: &mut Project,
    progress: u32,
    current_agent: Option<&str>,
    status: Option<ProjectStatus>,
) {
    project.progress = progress.min(100);
    if let Some(agent) = current_agent {
        project.current_agent = Some(agent.to_string());
    }
    if let Some(status) = status {
        project.status = status;
        if status.is_terminal() {
            project.completed_at = Some(Local::now().naive_local());
        }
    }
}

pub fn complete_generation(project: &mut Project) {
    project.status = ProjectStatus::Completed;
    project.progress = 100;
    project.error_message = None;
    project.completed_at = Some(Local::now().naive_local());
}

/// Mark the run as failed with the server's explanation.
pub fn fail_generation(project: &mut Project, error: &str) {
    project.status = ProjectStatus::Failed;
    project.error_message = Some(error.to_string());
    project.completed_at = Some(Local::now().naive_local());
}

/// Mark the run as cancelled after the server acknowledged the cancel.
pub fn cancel_generation(project: &mut Project) {
    project.status = ProjectStatus::Cancelled;
    project.current_agent = None;
    project.completed_at = Some(Local::now().naive_local());
}
