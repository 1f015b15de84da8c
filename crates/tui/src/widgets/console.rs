//! Console panel showing the tail of the event log.

use ab_core::normalizer::LogBuffer;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::boundary::RenderError;

pub fn render_console(frame: &mut Frame, area: Rect, log: &LogBuffer) -> Result<(), RenderError> {
    RenderError::require_area("console", area, 20, 3)?;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Console ({}/{})", log.len(), log.capacity()));

    // Newest entries stay visible: skip whatever does not fit.
    let visible = usize::from(area.height.saturating_sub(2));
    let skip = log.len().saturating_sub(visible);
    let lines: Vec<Line> = log
        .iter()
        .skip(skip)
        .map(|entry| Line::from(entry.to_string()))
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(paragraph, area);
    Ok(())
}
