//! Detail view of the current project.
//!
//! Shows the status line, the overall progress gauge, the six agent slots
//! and one generated artifact in a scrollable pane. `Shift+Tab` cycles the
//! artifact, `PageUp`/`PageDown` scroll it.

use ab_protocol::{AgentSlot, ArtifactKind, Project};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Gauge, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};

use crate::boundary::RenderError;
use crate::widgets::agents::render_agent_slots;
use crate::widgets::dashboard::status_style;

/// Height taken by the status line, gauge and agent slots, borders included.
const HEADER_HEIGHT: u16 = 2 + 2 + 8;

/// Widget for displaying the current project with a scrollable artifact pane.
pub struct DetailView {
    /// Current scroll offset of the artifact pane, in lines.
    pub scroll_offset: usize,
    /// Which generated document is shown.
    pub artifact: ArtifactKind,
}

impl DetailView {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0,
            artifact: ArtifactKind::Specifications,
        }
    }

    /// Text of the selected artifact, or a placeholder.
    pub fn artifact_text(&self, project: &Project) -> String {
        project.artifact_text(self.artifact).unwrap_or_else(|| {
            format!("No {} generated yet.", self.artifact.title().to_lowercase())
        })
    }

    /// Number of lines in the artifact pane for `project`.
    pub fn line_count(&self, project: Option<&Project>) -> usize {
        project.map_or(0, |p| self.artifact_text(p).lines().count())
    }

    /// Render the detail view.
    ///
    /// # Arguments
    ///
    /// * `frame` - The ratatui frame to render to
    /// * `area` - The area to render within
    /// * `project` - The current project, if any
    /// * `slots` - Agent slots derived for `project`
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        project: Option<&Project>,
        slots: &[AgentSlot],
    ) -> Result<(), RenderError> {
        let Some(project) = project else {
            let paragraph = Paragraph::new(
                "No project selected. Press Enter on a row, or /new to create one.",
            )
            .block(Block::default().borders(Borders::ALL).title("Detail"))
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return Ok(());
        };

        RenderError::require_area("detail", area, 40, HEADER_HEIGHT)?;

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Detail - {} ({})", project.name, project.id));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Status line
                Constraint::Length(1), // Overall progress
                Constraint::Length(8), // Agent slots
                Constraint::Min(0),    // Artifact
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(status_line(project)), chunks[0]);

        let gauge = Gauge::default()
            .gauge_style(status_style(project.status))
            .percent(u16::try_from(project.progress.min(100)).unwrap_or(100))
            .label(format!("{}%", project.progress.min(100)));
        frame.render_widget(gauge, chunks[1]);

        render_agent_slots(frame, chunks[2], slots)?;
        self.render_artifact(frame, chunks[3], project);
        Ok(())
    }

    fn render_artifact(&self, frame: &mut Frame, area: Rect, project: &Project) {
        if area.height < 3 {
            return;
        }

        let text = self.artifact_text(project);
        let total_lines = text.lines().count();
        let tabs = ArtifactKind::ALL
            .iter()
            .map(|kind| {
                if *kind == self.artifact {
                    format!("[{}]", kind.title())
                } else {
                    kind.title().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(tabs))
            .scroll((u16::try_from(self.scroll_offset).unwrap_or(u16::MAX), 0));
        frame.render_widget(paragraph, area);

        let visible_lines = usize::from(area.height.saturating_sub(2));
        if total_lines > visible_lines {
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(total_lines)
                .viewport_content_length(visible_lines)
                .position(self.scroll_offset);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }

    /// Show the next artifact and jump back to its top.
    pub fn next_artifact(&mut self) {
        let index = ArtifactKind::ALL
            .iter()
            .position(|k| *k == self.artifact)
            .unwrap_or(0);
        self.artifact = ArtifactKind::ALL[(index + 1) % ArtifactKind::ALL.len()];
        self.scroll_to_top();
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Scroll down by one line, stopping at `max`.
    pub fn scroll_down(&mut self, max: usize) {
        self.scroll_offset = (self.scroll_offset + 1).min(max);
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
    }

    /// Scroll down by `page_size` lines, stopping at `max`.
    pub fn page_down(&mut self, page_size: usize, max: usize) {
        self.scroll_offset = (self.scroll_offset + page_size).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }
}

impl Default for DetailView {
    fn default() -> Self {
        Self::new()
    }
}

fn status_line(project: &Project) -> Line<'static> {
    let mut spans = vec![
        Span::raw("Status: "),
        Span::styled(project.status.as_str(), status_style(project.status)),
    ];
    if let Some(agent) = &project.current_agent {
        spans.push(Span::raw(format!("  Agent: {agent}")));
    }
    if let Some(framework) = &project.framework {
        spans.push(Span::raw(format!("  Framework: {framework}")));
    }
    if let Some(error) = &project.error_message {
        spans.push(Span::styled(
            format!("  Error: {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}
