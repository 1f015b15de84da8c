//! Dashboard widget listing every project in a table.

use ab_protocol::{Project, ProjectStats, ProjectStatus};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crate::boundary::RenderError;

pub(crate) fn status_style(status: ProjectStatus) -> Style {
    match status {
        ProjectStatus::Draft => Style::default().fg(Color::Gray),
        ProjectStatus::Generating => Style::default().fg(Color::Yellow),
        ProjectStatus::Completed => Style::default().fg(Color::Green),
        ProjectStatus::Failed => Style::default().fg(Color::Red),
        ProjectStatus::Cancelled => Style::default().fg(Color::DarkGray),
        ProjectStatus::Unknown => Style::default().fg(Color::Magenta),
    }
}

/// Renders the project table.
///
/// # Arguments
/// * `frame` - The frame to render into
/// * `area` - The area to render the table in
/// * `projects` - Projects to list
/// * `selected` - Index of the highlighted row
/// * `current` - Id of the current project, marked with `*`
/// * `stats` - Totals shown in the title when known
pub fn render_dashboard(
    frame: &mut Frame,
    area: Rect,
    projects: &[Project],
    selected: usize,
    current: Option<i64>,
    stats: Option<&ProjectStats>,
) -> Result<(), RenderError> {
    RenderError::require_area("dashboard", area, 30, 4)?;
    if !projects.is_empty() && selected >= projects.len() {
        return Err(RenderError::InvalidState {
            widget: "dashboard",
            reason: format!(
                "selected row {selected} but only {} projects",
                projects.len()
            ),
        });
    }

    let rows: Vec<Row> = projects
        .iter()
        .map(|p| {
            let marker = if Some(p.id) == current { "*" } else { " " };
            Row::new(vec![
                Cell::from(format!("{marker}{}", p.id)),
                Cell::from(p.name.clone()),
                Cell::from(p.framework.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(p.status.as_str()).style(status_style(p.status)),
                Cell::from(format!("{:>3}%", p.progress)),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("ID"),
        Cell::from("Project"),
        Cell::from("Framework"),
        Cell::from("Status"),
        Cell::from("Progress"),
    ])
    .style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Cyan),
    );

    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(40),
        Constraint::Length(12),
        Constraint::Length(11),
        Constraint::Length(9),
    ];

    let title = match stats {
        Some(stats) => format!(
            "Projects ({} total, {} building, {} deployed)",
            stats.total_projects, stats.building, stats.deployed
        ),
        None => format!("Projects ({})", projects.len()),
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(Color::White)),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !projects.is_empty() {
        table_state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut table_state);
    Ok(())
}
