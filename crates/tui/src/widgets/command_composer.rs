//! Command composer widget with slash command autocomplete.
//!
//! This widget provides a text input field for entering commands, with
//! autocomplete suggestions when the user types a slash command.

use ab_protocol::{Complexity, NewProject, Op};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Available slash commands with their descriptions.
const COMMANDS: &[(&str, &str)] = &[
    ("/new <name> | <description>", "Create a project [| framework [| complexity]]"),
    ("/select <id>", "Make a project current"),
    ("/start [id]", "Start generation"),
    ("/cancel [id]", "Cancel a running generation"),
    ("/refresh", "Reload projects and stats"),
    ("/delete <id>", "Delete a project"),
    ("/idea <text>", "Quick-start from a one-line idea"),
    ("/dismiss", "Hide the error banner"),
    ("/quit", "Leave the dashboard"),
];

const NEW_USAGE: &str = "Usage: /new name | description [| framework [| complexity]]";

/// Command composer state.
#[derive(Debug, Clone)]
pub struct CommandComposer {
    /// Current input text
    input: String,
    /// Cursor position as a byte offset into `input`
    cursor_pos: usize,
    /// Whether autocomplete popup should be shown
    show_popup: bool,
    /// Selected index in the autocomplete list
    selected_index: usize,
    /// Whether `/start` would currently be sent
    start_enabled: bool,
}

impl Default for CommandComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandComposer {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            cursor_pos: 0,
            show_popup: false,
            selected_index: 0,
            start_enabled: true,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn should_show_popup(&self) -> bool {
        self.show_popup
    }

    /// Grey out `/start` while a run is in flight.
    pub fn set_start_enabled(&mut self, enabled: bool) {
        self.start_enabled = enabled;
    }

    pub fn is_start_enabled(&self) -> bool {
        self.start_enabled
    }

    /// Get filtered command suggestions based on current input.
    pub fn suggestions(&self) -> Vec<(&'static str, &'static str)> {
        if !self.input.starts_with('/') {
            return Vec::new();
        }

        let filter = self.input.trim();
        if filter == "/" {
            return COMMANDS.to_vec();
        }

        COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(filter))
            .copied()
            .collect()
    }

    pub fn selected_suggestion(&self) -> Option<(&'static str, &'static str)> {
        self.suggestions().get(self.selected_index).copied()
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
        self.update_popup_state();
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.input.remove(prev);
            self.cursor_pos = prev;
            self.update_popup_state();
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
        self.show_popup = false;
        self.selected_index = 0;
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor_pos = prev;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.input[self.cursor_pos..].chars().next() {
            self.cursor_pos += c.len_utf8();
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.suggestions().len() {
            self.selected_index += 1;
        }
    }

    /// Complete with the currently selected suggestion (Tab key).
    pub fn complete_with_selection(&mut self) {
        if let Some((cmd, _)) = self.selected_suggestion() {
            let cmd_name = cmd.split_whitespace().next().unwrap_or(cmd);
            self.input = format!("{cmd_name} ");
            self.cursor_pos = self.input.len();
            self.show_popup = false;
            self.selected_index = 0;
        }
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.input[..self.cursor_pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn update_popup_state(&mut self) {
        self.show_popup = self.input.starts_with('/') && !self.input.contains(' ');

        let suggestions = self.suggestions();
        if self.selected_index >= suggestions.len() {
            self.selected_index = suggestions.len().saturating_sub(1);
        }
    }

    /// Render the input field. `notice` replaces the default title.
    pub fn render(&self, area: Rect, buf: &mut Buffer, notice: Option<&str>) {
        let title = notice.unwrap_or("Command (/ for commands, Tab console, q to quit)");
        let block = Block::default().borders(Borders::ALL).title(title);

        let inner = block.inner(area);
        block.render(area, buf);

        let paragraph =
            Paragraph::new(format!("> {}", self.input)).style(Style::default().fg(Color::Yellow));
        paragraph.render(inner, buf);
    }

    /// Render the autocomplete popup.
    pub fn render_popup(&self, area: Rect, buf: &mut Buffer) {
        if !self.show_popup {
            return;
        }

        let suggestions = self.suggestions();
        if suggestions.is_empty() {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Suggestions")
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut y = inner.y;
        for (i, (cmd, desc)) in suggestions.iter().enumerate() {
            if y >= inner.y + inner.height {
                break;
            }

            let disabled = !self.start_enabled && cmd.starts_with("/start");
            let style = if disabled {
                Style::default().fg(Color::DarkGray)
            } else if i == self.selected_index {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let desc = if disabled {
                "Unavailable while generating"
            } else {
                desc
            };

            let line = Line::from(vec![
                Span::styled(format!("{cmd:<30}"), style),
                Span::styled(desc.to_string(), style.fg(Color::Gray)),
            ]);

            buf.set_line(inner.x, y, &line, inner.width);
            y += 1;
        }
    }

    /// Parse the current input into an [`Op`].
    ///
    /// Returns `Ok(None)` for blank input and `Err` with a user-facing
    /// message for anything that is not a valid command.
    pub fn parse_command(&self) -> Result<Option<Op>, String> {
        let input = self.input.trim();

        if input.is_empty() {
            return Ok(None);
        }

        if !input.starts_with('/') {
            return Err("Invalid command. Commands must start with '/'".to_string());
        }

        let (cmd, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();

        match cmd {
            "/new" => parse_new_project(rest).map(|p| Some(Op::CreateProject(p))),
            "/select" => Ok(Some(Op::SelectProject {
                project_id: parse_id(rest)?.ok_or("Missing project ID")?,
            })),
            "/start" => Ok(Some(Op::StartGeneration {
                project_id: parse_id(rest)?,
            })),
            "/cancel" => Ok(Some(Op::CancelGeneration {
                project_id: parse_id(rest)?,
            })),
            "/refresh" => Ok(Some(Op::RefreshProjects)),
            "/delete" => Ok(Some(Op::DeleteProject {
                project_id: parse_id(rest)?.ok_or("Missing project ID")?,
            })),
            "/idea" => {
                if rest.is_empty() {
                    return Err("Missing idea".to_string());
                }
                Ok(Some(Op::StartFromIdea {
                    idea: rest.to_string(),
                }))
            }
            "/dismiss" => Ok(Some(Op::DismissError)),
            "/quit" => Ok(Some(Op::Shutdown)),
            _ => Err(format!("Unknown command: {cmd}")),
        }
    }
}

fn parse_id(arg: &str) -> Result<Option<i64>, String> {
    if arg.is_empty() {
        return Ok(None);
    }
    arg.parse()
        .map(Some)
        .map_err(|_| format!("Invalid project ID: {arg}"))
}

fn parse_new_project(args: &str) -> Result<NewProject, String> {
    let parts: Vec<&str> = args.split('|').map(str::trim).collect();
    let [name, description, extra @ ..] = parts.as_slice() else {
        return Err(NEW_USAGE.to_string());
    };
    if extra.len() > 2 {
        return Err(NEW_USAGE.to_string());
    }

    let mut project = NewProject::new(*name, *description);
    if let Some(framework) = extra.first().filter(|f| !f.is_empty()) {
        project = project.with_framework(*framework);
    }
    if let Some(complexity) = extra.get(1).filter(|c| !c.is_empty()) {
        project = project.with_complexity(complexity.parse::<Complexity>()?);
    }
    Ok(project)
}
