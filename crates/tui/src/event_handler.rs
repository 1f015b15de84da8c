//! Keyboard handling for the dashboard.
//!
//! This module turns key presses into [`KeyAction`]s:
//! - the command composer consumes text editing keys first
//! - dashboard keys move the selection, toggle panels and scroll
//! - `Enter` submits the composer (or selects the highlighted row)
//!
//! Nothing here talks to the server; the app runs the returned action.

use ab_core::state::GenerationCoordinator;
use ab_protocol::Op;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::ViewState;
use crate::event::EventStatus;
use crate::widgets::CommandComposer;

/// Lines moved by `PageUp`/`PageDown` in the artifact pane.
const PAGE_SIZE: usize = 10;

/// What the app should do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// Only redraw.
    None,
    Exit,
    /// Run an operation against the coordinator.
    Dispatch(Op),
    /// Show a message in the composer title.
    Notice(String),
    /// Reset the tripped error boundary and reload the project list.
    Reload,
}

/// Offer a key to the command composer.
pub fn handle_composer_key(composer: &mut CommandComposer, key_event: KeyEvent) -> EventStatus {
    let popup = composer.should_show_popup();
    match key_event.code {
        // A bare `q` quits; inside a command it is just a letter.
        KeyCode::Char('q') if composer.input().is_empty() => EventStatus::NotConsumed,
        KeyCode::Char(c) => {
            composer.insert_char(c);
            EventStatus::Consumed
        }
        KeyCode::Backspace => {
            composer.delete_char();
            EventStatus::Consumed
        }
        KeyCode::Left => {
            composer.move_cursor_left();
            EventStatus::Consumed
        }
        KeyCode::Right => {
            composer.move_cursor_right();
            EventStatus::Consumed
        }
        KeyCode::Esc if !composer.input().is_empty() => {
            composer.clear();
            EventStatus::Consumed
        }
        KeyCode::Up if popup => {
            composer.move_selection_up();
            EventStatus::Consumed
        }
        KeyCode::Down if popup => {
            composer.move_selection_down();
            EventStatus::Consumed
        }
        KeyCode::Tab if popup => {
            composer.complete_with_selection();
            EventStatus::Consumed
        }
        _ => EventStatus::NotConsumed,
    }
}

/// Handle a keyboard event from the user.
///
/// `tripped` tells whether the render error boundary is showing its
/// fallback; only reload and quit work then.
pub fn handle_keyboard_event(
    key_event: KeyEvent,
    view: &mut ViewState,
    coordinator: &GenerationCoordinator,
    tripped: bool,
) -> KeyAction {
    if key_event.kind != KeyEventKind::Press {
        return KeyAction::None;
    }
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return KeyAction::Exit;
    }

    if tripped {
        return match key_event.code {
            KeyCode::Char('r') => KeyAction::Reload,
            KeyCode::Char('q') => KeyAction::Exit,
            _ => KeyAction::None,
        };
    }

    if handle_composer_key(&mut view.composer, key_event).is_consumed() {
        return KeyAction::None;
    }

    let project_count = coordinator.projects().len();
    match key_event.code {
        KeyCode::Char('q') => return KeyAction::Exit,
        KeyCode::Up => {
            view.selected_index = view.selected_index.saturating_sub(1);
        }
        KeyCode::Down => {
            if view.selected_index + 1 < project_count {
                view.selected_index += 1;
            }
        }
        KeyCode::Tab => view.show_console = !view.show_console,
        KeyCode::BackTab => view.detail.next_artifact(),
        KeyCode::PageUp => view.detail.page_up(PAGE_SIZE),
        KeyCode::PageDown => {
            let max = view
                .detail
                .line_count(coordinator.current_project())
                .saturating_sub(1);
            view.detail.page_down(PAGE_SIZE, max);
        }
        KeyCode::Esc if coordinator.banner().is_some() => {
            return KeyAction::Dispatch(Op::DismissError);
        }
        KeyCode::Enter => return submit_command(view, coordinator),
        _ => {}
    }

    KeyAction::None
}

/// Submit the composer, or select the highlighted row when it is empty.
fn submit_command(view: &mut ViewState, coordinator: &GenerationCoordinator) -> KeyAction {
    if view.composer.input().trim().is_empty() {
        view.composer.clear();
        return match coordinator.projects().get(view.selected_index) {
            Some(project) => KeyAction::Dispatch(Op::SelectProject {
                project_id: project.id,
            }),
            None => KeyAction::None,
        };
    }

    match view.composer.parse_command() {
        Ok(Some(op)) => {
            view.composer.clear();
            if let Op::StartGeneration { project_id } = &op {
                if let Some(id) = project_id.or(coordinator.current_project_id()) {
                    if !coordinator.can_start_generation(id) {
                        return KeyAction::Notice(format!(
                            "Generation already in progress for project {id}"
                        ));
                    }
                }
            }
            KeyAction::Dispatch(op)
        }
        Ok(None) => KeyAction::None,
        Err(message) => KeyAction::Notice(message),
    }
}
