//! TUI application state and event loop.
//!
//! `App` owns the [`GenerationCoordinator`] and runs a single
//! `tokio::select!` loop over terminal input, normalized push-channel events
//! and the stall watchdog tick. Every state change happens on this task.

use ab_core::normalizer::EventNormalizer;
use ab_core::state::{BannerKind, GenerationCoordinator};
use ab_core::transport::Transport;
use ab_protocol::{Event, Op};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::select;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::boundary::{ErrorBoundary, RenderError};
use crate::event_handler::{self, KeyAction};
use crate::tui::{Tui, TuiEvent};
use crate::widgets::{console::render_console, dashboard::render_dashboard};
use crate::widgets::{CommandComposer, DetailView};

/// How often the stall watchdog looks at the current run.
const WATCHDOG_TICK: Duration = Duration::from_secs(5);

/// Presentation-only state: selection, panels, composer.
#[derive(Default)]
pub struct ViewState {
    /// Highlighted row of the dashboard.
    pub selected_index: usize,
    pub show_console: bool,
    pub composer: CommandComposer,
    pub detail: DetailView,
    /// Current project the detail view was last scrolled for.
    shown_project: Option<i64>,
}

/// Main TUI application state.
pub struct App {
    coordinator: GenerationCoordinator,
    event_rx: UnboundedReceiver<Event>,
    /// Keeps the push-channel handlers installed for the app's lifetime.
    _normalizer: EventNormalizer,
    pub view: ViewState,
    boundary: ErrorBoundary,
    /// One-line feedback shown in the composer title.
    notice: Option<String>,
    pub should_exit: bool,
}

impl App {
    /// Wire the coordinator to the push channel.
    ///
    /// `transport` must be the instance the coordinator was built with.
    pub fn new(coordinator: GenerationCoordinator, transport: Arc<dyn Transport>) -> Self {
        let (event_tx, event_rx) = unbounded_channel();
        let normalizer = EventNormalizer::install(transport, event_tx);
        Self {
            coordinator,
            event_rx,
            _normalizer: normalizer,
            view: ViewState::default(),
            boundary: ErrorBoundary::new(),
            notice: None,
            should_exit: false,
        }
    }

    pub fn coordinator(&self) -> &GenerationCoordinator {
        &self.coordinator
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Connect, load the project list and run until the user quits.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        self.coordinator.connect().await;
        self.dispatch(Op::RefreshProjects).await;

        let mut tui_events = tui.event_stream();
        let mut watchdog = tokio::time::interval(WATCHDOG_TICK);
        watchdog.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tui.frame_requester().schedule_frame();

        while !self.should_exit {
            select! {
                Some(event) = self.event_rx.recv() => {
                    self.handle_core_event(event).await;
                    tui.frame_requester().schedule_frame();
                }
                Some(tui_event) = tui_events.next() => {
                    self.handle_tui_event(tui, tui_event).await?;
                }
                _ = watchdog.tick() => {
                    if self.coordinator.poll_stalled(Instant::now()).await {
                        self.sync_view();
                        tui.frame_requester().schedule_frame();
                    }
                }
            }
        }

        info!("leaving dashboard");
        self.coordinator.dispatch(Op::Shutdown).await?;
        Ok(())
    }

    /// Apply everything already queued by the push channel.
    pub async fn drain_core_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_core_event(event).await;
        }
    }

    async fn handle_core_event(&mut self, event: Event) {
        debug!(?event, "core event");
        self.coordinator.handle_event(event).await;
        self.sync_view();
    }

    async fn handle_tui_event(&mut self, tui: &mut Tui, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) => {
                self.handle_key_event(key_event).await;
                tui.frame_requester().schedule_frame();
            }
            TuiEvent::Paste(text) => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.view.composer.insert_char(c);
                }
                tui.frame_requester().schedule_frame();
            }
            TuiEvent::Draw => {
                tui.draw(|frame| self.render(frame))?;
            }
        }
        Ok(())
    }

    pub async fn handle_key_event(&mut self, key_event: KeyEvent) {
        let action = event_handler::handle_keyboard_event(
            key_event,
            &mut self.view,
            &self.coordinator,
            self.boundary.is_tripped(),
        );
        match action {
            KeyAction::None => {}
            KeyAction::Exit => self.should_exit = true,
            KeyAction::Dispatch(op) => self.dispatch(op).await,
            KeyAction::Notice(message) => self.notice = Some(message),
            KeyAction::Reload => {
                self.boundary.reset();
                self.view.selected_index = 0;
                self.dispatch(Op::RefreshProjects).await;
            }
        }
    }

    /// Run an operation and report its outcome in the composer title.
    async fn dispatch(&mut self, op: Op) {
        if op == Op::Shutdown {
            self.should_exit = true;
            return;
        }
        self.notice = match self.coordinator.dispatch(op).await {
            Ok(()) => None,
            Err(err) => Some(err.to_string()),
        };
        self.sync_view();
    }

    /// Keep view state consistent with the coordinator after a change.
    fn sync_view(&mut self) {
        let count = self.coordinator.projects().len();
        if self.view.selected_index >= count {
            self.view.selected_index = count.saturating_sub(1);
        }

        let current = self.coordinator.current_project_id();
        if current != self.view.shown_project {
            self.view.shown_project = current;
            self.view.detail.scroll_to_top();
            if let Some(index) = self
                .coordinator
                .projects()
                .iter()
                .position(|p| Some(p.id) == current)
            {
                self.view.selected_index = index;
            }
        }

        let can_start = !self.coordinator.is_generating()
            && current.map_or(true, |id| self.coordinator.can_start_generation(id));
        self.view.composer.set_start_enabled(can_start);
    }

    /// Render the TUI through the error boundary.
    pub fn render(&mut self, frame: &mut Frame) {
        let coordinator = &self.coordinator;
        let view = &self.view;
        let notice = self.notice.as_deref();
        self.boundary
            .render(frame, |frame| render_screen(frame, coordinator, view, notice));
    }
}

fn render_screen(
    frame: &mut Frame,
    coordinator: &GenerationCoordinator,
    view: &ViewState,
    notice: Option<&str>,
) -> Result<(), RenderError> {
    let area = frame.area();
    let banner_height = if coordinator.banner().is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Header
            Constraint::Length(banner_height), // Error banner
            Constraint::Percentage(30),        // Dashboard
            Constraint::Min(12),               // Detail (+ console)
            Constraint::Length(3),             // Command input
        ])
        .split(area);

    render_header(frame, chunks[0], coordinator);
    render_banner(frame, chunks[1], coordinator);
    render_dashboard(
        frame,
        chunks[2],
        coordinator.projects(),
        view.selected_index,
        coordinator.current_project_id(),
        coordinator.stats(),
    )?;

    let (detail_area, console_area) = if view.show_console {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[3]);
        (halves[0], Some(halves[1]))
    } else {
        (chunks[3], None)
    };

    let slots = coordinator.agent_slots();
    view.detail
        .render(frame, detail_area, coordinator.current_project(), &slots)?;
    if let Some(console_area) = console_area {
        render_console(frame, console_area, coordinator.log())?;
    }

    view.composer.render(chunks[4], frame.buffer_mut(), notice);
    render_popup(frame, chunks[4], &view.composer);
    Ok(())
}

fn render_header(frame: &mut Frame, area: Rect, coordinator: &GenerationCoordinator) {
    let connection = if coordinator.is_connected() {
        Span::styled("● Connected", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ Disconnected", Style::default().fg(Color::Red))
    };
    let mut spans = vec![
        Span::styled(
            "App Builder ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        connection,
    ];
    if coordinator.is_generating() {
        spans.push(Span::styled(
            "  Generating...",
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_banner(frame: &mut Frame, area: Rect, coordinator: &GenerationCoordinator) {
    let Some(banner) = coordinator.banner() else {
        return;
    };
    let title = match banner.kind {
        BannerKind::Transport => "Connection error",
        BannerKind::Request => "Request failed",
        BannerKind::Generation => "Generation failed",
    };
    let paragraph = Paragraph::new(format!("{} (Esc to dismiss)", banner.message))
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Suggestions float above the command input.
fn render_popup(frame: &mut Frame, input_area: Rect, composer: &CommandComposer) {
    if !composer.should_show_popup() {
        return;
    }
    let rows = u16::try_from(composer.suggestions().len()).unwrap_or(u16::MAX);
    if rows == 0 {
        return;
    }
    let height = (rows + 2).min(input_area.y);
    let area = Rect::new(
        input_area.x,
        input_area.y - height,
        input_area.width,
        height,
    );
    frame.render_widget(Clear, area);
    composer.render_popup(area, frame.buffer_mut());
}
