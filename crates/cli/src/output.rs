//! Plain-text rendering of projects for the headless commands.

use ab_protocol::{
    AgentSlot, ArtifactKind, GenerationStatus, Project, ProjectStats, ProjectStatus, SlotState,
};
use colored::{ColoredString, Colorize};

pub fn status_label(status: ProjectStatus) -> ColoredString {
    let text = status.as_str();
    match status {
        ProjectStatus::Draft => text.normal(),
        ProjectStatus::Generating => text.yellow(),
        ProjectStatus::Completed => text.green(),
        ProjectStatus::Failed => text.red(),
        ProjectStatus::Cancelled => text.dimmed(),
        ProjectStatus::Unknown => text.magenta(),
    }
}

/// One line per project, aligned under a header.
pub fn project_table(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects yet. Create one with `app-builder create`.".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<28} {:<12} {:>4}  {}\n",
        "ID", "NAME", "STATUS", "%", "FRAMEWORK"
    )
    .bold()
    .to_string();
    for project in projects {
        // Escape codes count toward `{:<12}`, so pad by hand.
        let pad = 12usize.saturating_sub(project.status.as_str().len());
        let status = format!("{}{}", status_label(project.status), " ".repeat(pad));
        out.push_str(&format!(
            "{:>5}  {:<28} {} {:>4}  {}\n",
            project.id,
            truncate(&project.name, 28),
            status,
            project.progress,
            project.framework.as_deref().unwrap_or("-"),
        ));
    }
    out
}

pub fn stats_summary(stats: &ProjectStats) -> String {
    format!(
        "Projects: {}\nBuilding: {}\nDeployed: {}\nViews:    {}",
        stats.total_projects, stats.building, stats.deployed, stats.total_views
    )
}

/// Icon and short name per slot, e.g. `✓ analyst  ▶ frontend 40%  · backend`.
pub fn slot_line(slots: &[AgentSlot]) -> String {
    slots
        .iter()
        .map(|slot| match slot.state {
            SlotState::Completed => format!("✓ {}", slot.role.short_id()).green().to_string(),
            SlotState::Active => format!("▶ {} {}%", slot.role.short_id(), slot.progress)
                .yellow()
                .to_string(),
            SlotState::Pending => format!("· {}", slot.role.short_id()).dimmed().to_string(),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Header, status and artifact overview of one project.
pub fn project_detail(project: &Project, slots: &[AgentSlot]) -> String {
    let mut out = format!("{} ({})\n", project.name.bold(), project.id);
    if !project.description.is_empty() {
        out.push_str(&format!("{}\n", project.description));
    }
    out.push_str(&format!(
        "Status:    {} {}%\n",
        status_label(project.status),
        project.progress
    ));
    if let Some(agent) = &project.current_agent {
        out.push_str(&format!("Agent:     {agent}\n"));
    }
    if let Some(framework) = &project.framework {
        out.push_str(&format!("Framework: {framework}\n"));
    }
    if let Some(url) = &project.deploy_url {
        out.push_str(&format!("Deployed:  {url}\n"));
    }
    if let Some(error) = &project.error_message {
        out.push_str(&format!("Error:     {}\n", error.red()));
    }
    out.push_str(&format!("Agents:    {}\n", slot_line(slots)));

    let artifacts: Vec<_> = ArtifactKind::ALL
        .iter()
        .map(|&kind| {
            let mark = if project.artifact(kind).is_some() { "✓" } else { "-" };
            format!("{mark} {}", kind.title())
        })
        .collect();
    out.push_str(&format!("Artifacts: {}", artifacts.join("  ")));
    out
}

pub fn generation_status(status: &GenerationStatus) -> String {
    let mut out = format!(
        "Project {}: {} {}%",
        status.project_id,
        status_label(status.status),
        status.progress
    );
    if let Some(agent) = &status.current_agent {
        out.push_str(&format!(" ({agent})"));
    }
    if let Some(error) = &status.error_message {
        out.push_str(&format!("\nError: {}", error.red()));
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_core::state::derive_agent_slots;
    use ab_protocol::ProgressMode;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_project_table_lists_every_project() {
        plain();
        let mut todo = Project::draft(1, "Todo", "A todo app");
        todo.framework = Some("React".to_string());
        let mut shop = Project::draft(2, "Shop", "A shop");
        shop.status = ProjectStatus::Generating;
        shop.progress = 50;

        let table = project_table(&[todo, shop]);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("STATUS"));
        assert!(lines[1].contains("Todo"));
        assert!(lines[1].contains("draft") && lines[1].contains("React"));
        assert!(lines[2].contains("generating") && lines[2].contains("50"));
    }

    #[test]
    fn test_empty_table_suggests_create() {
        plain();
        assert!(project_table(&[]).contains("app-builder create"));
    }

    #[test]
    fn test_slot_line_marks_active_agent() {
        plain();
        let mut project = Project::draft(1, "Todo", "A todo app");
        project.status = ProjectStatus::Generating;
        project.progress = 50;
        project.current_agent = Some("Frontend Developer".to_string());
        let slots = derive_agent_slots(Some(&project), ProgressMode::Coarse);

        let line = slot_line(&slots);

        assert!(line.starts_with("✓ analyst  ✓ architect  ✓ designer  ▶ frontend 0%"));
        assert!(line.ends_with("· backend  · deployer"));
    }

    #[test]
    fn test_detail_shows_error_and_artifacts() {
        plain();
        let mut project = Project::draft(7, "Blog", "A blog");
        project.status = ProjectStatus::Failed;
        project.error_message = Some("timeout".to_string());
        project.specifications = Some(serde_json::json!({"pages": 3}));
        let slots = derive_agent_slots(Some(&project), ProgressMode::Monotonic);

        let detail = project_detail(&project, &slots);

        assert!(detail.contains("Blog (7)"));
        assert!(detail.contains("Status:    failed 0%"));
        assert!(detail.contains("Error:     timeout"));
        assert!(detail.contains("✓ Specifications  - Architecture"));
    }

    #[test]
    fn test_truncate_keeps_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 3), "éé…");
    }
}
