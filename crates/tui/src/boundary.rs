//! Render error boundary.
//!
//! Widgets report rendering faults as [`RenderError`] instead of panicking.
//! The [`ErrorBoundary`] wraps the whole frame: the first fault is recorded
//! and every later frame shows a fallback screen until the user reloads.
//! A size fault also clears itself once the terminal is resized.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use thiserror::Error;
use tracing::{debug, error};

/// A widget could not be drawn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("{widget} needs at least {min_width}x{min_height} cells, got {width}x{height}")]
    AreaTooSmall {
        widget: &'static str,
        min_width: u16,
        min_height: u16,
        width: u16,
        height: u16,
    },

    /// The state handed to the widget is inconsistent.
    #[error("{widget}: {reason}")]
    InvalidState {
        widget: &'static str,
        reason: String,
    },
}

impl RenderError {
    /// Fail with [`RenderError::AreaTooSmall`] unless `area` is at least
    /// `min_width` x `min_height`.
    pub fn require_area(
        widget: &'static str,
        area: Rect,
        min_width: u16,
        min_height: u16,
    ) -> Result<(), RenderError> {
        if area.width < min_width || area.height < min_height {
            return Err(RenderError::AreaTooSmall {
                widget,
                min_width,
                min_height,
                width: area.width,
                height: area.height,
            });
        }
        Ok(())
    }
}

/// Catches render faults and swaps in a fallback screen.
#[derive(Debug, Default)]
pub struct ErrorBoundary {
    fault: Option<RenderError>,
    /// Frame size when the fault was recorded.
    tripped_at: Rect,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded fault, if the boundary has tripped.
    pub fn fault(&self) -> Option<&RenderError> {
        self.fault.as_ref()
    }

    pub fn is_tripped(&self) -> bool {
        self.fault.is_some()
    }

    /// Clear the recorded fault so the next frame renders normally again.
    pub fn reset(&mut self) {
        self.fault = None;
    }

    /// Draw a frame through the boundary.
    ///
    /// Once tripped, `render` is not called again until [`reset`](Self::reset),
    /// except that [`RenderError::AreaTooSmall`] is retried when the frame
    /// size changes.
    pub fn render<F>(&mut self, frame: &mut Frame, render: F)
    where
        F: FnOnce(&mut Frame) -> Result<(), RenderError>,
    {
        let area = frame.area();
        if matches!(self.fault, Some(RenderError::AreaTooSmall { .. })) && area != self.tripped_at {
            debug!(width = area.width, height = area.height, "terminal resized; retrying render");
            self.fault = None;
        }

        if self.fault.is_none() {
            match render(frame) {
                Ok(()) => return,
                Err(fault) => {
                    error!(error = %fault, "render failed; showing fallback screen");
                    self.fault = Some(fault);
                    self.tripped_at = area;
                }
            }
        }
        if let Some(fault) = &self.fault {
            render_fallback(frame, fault);
        }
    }
}

fn render_fallback(frame: &mut Frame, fault: &RenderError) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(Span::styled(
            "Something went wrong while drawing the dashboard.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(fault.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to reload, q to quit.",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_boundary_passes_through_healthy_frames() {
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        let mut boundary = ErrorBoundary::new();

        terminal
            .draw(|frame| {
                boundary.render(frame, |frame| {
                    frame.render_widget(Paragraph::new("all good"), frame.area());
                    Ok(())
                })
            })
            .unwrap();

        assert!(!boundary.is_tripped());
        assert!(screen(&terminal).contains("all good"));
    }

    #[test]
    fn test_boundary_trips_and_stays_tripped_until_reset() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let mut boundary = ErrorBoundary::new();

        terminal
            .draw(|frame| {
                boundary.render(frame, |_| {
                    Err(RenderError::InvalidState {
                        widget: "dashboard",
                        reason: "selection out of range".to_string(),
                    })
                })
            })
            .unwrap();

        assert!(boundary.is_tripped());
        let content = screen(&terminal);
        assert!(content.contains("Something went wrong"));
        assert!(content.contains("selection out of range"));

        let mut called = false;
        terminal
            .draw(|frame| {
                boundary.render(frame, |_| {
                    called = true;
                    Ok(())
                })
            })
            .unwrap();
        assert!(!called);
        assert!(screen(&terminal).contains("Press r to reload"));

        boundary.reset();
        terminal
            .draw(|frame| {
                boundary.render(frame, |frame| {
                    frame.render_widget(Paragraph::new("back again"), frame.area());
                    Ok(())
                })
            })
            .unwrap();
        assert!(!boundary.is_tripped());
        assert!(screen(&terminal).contains("back again"));
    }

    #[test]
    fn test_size_fault_clears_after_resize() {
        let mut boundary = ErrorBoundary::new();
        let draw = |terminal: &mut Terminal<TestBackend>, boundary: &mut ErrorBoundary| {
            terminal
                .draw(|frame| {
                    boundary.render(frame, |frame| {
                        RenderError::require_area("dashboard", frame.area(), 50, 10)?;
                        frame.render_widget(Paragraph::new("roomy"), frame.area());
                        Ok(())
                    })
                })
                .unwrap();
        };

        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        draw(&mut terminal, &mut boundary);
        assert!(boundary.is_tripped());

        // Same size: still the fallback.
        draw(&mut terminal, &mut boundary);
        assert!(screen(&terminal).contains("Press r to reload"));

        terminal.backend_mut().resize(80, 20);
        draw(&mut terminal, &mut boundary);
        assert!(!boundary.is_tripped());
        assert!(screen(&terminal).contains("roomy"));
    }

    #[test]
    fn test_state_fault_survives_resize() {
        let mut boundary = ErrorBoundary::new();
        for width in [60, 80] {
            let mut terminal = Terminal::new(TestBackend::new(width, 10)).unwrap();
            terminal
                .draw(|frame| {
                    boundary.render(frame, |_| {
                        Err(RenderError::InvalidState {
                            widget: "dashboard",
                            reason: "selection out of range".to_string(),
                        })
                    })
                })
                .unwrap();
        }
        assert!(boundary.is_tripped());
    }

    #[test]
    fn test_require_area() {
        let small = Rect::new(0, 0, 10, 2);
        assert!(RenderError::require_area("agents", small, 10, 2).is_ok());
        assert_eq!(
            RenderError::require_area("agents", small, 20, 3),
            Err(RenderError::AreaTooSmall {
                widget: "agents",
                min_width: 20,
                min_height: 3,
                width: 10,
                height: 2,
            })
        );
    }
}
