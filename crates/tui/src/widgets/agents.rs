//! Agent slot panel: one line gauge per agent of the run.

use ab_protocol::{AgentSlot, SlotState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, LineGauge},
    Frame,
};

use crate::boundary::RenderError;

fn slot_icon(state: SlotState) -> &'static str {
    match state {
        SlotState::Pending => "·",
        SlotState::Active => "▶",
        SlotState::Completed => "✓",
    }
}

fn slot_style(state: SlotState) -> Style {
    match state {
        SlotState::Pending => Style::default().fg(Color::DarkGray),
        SlotState::Active => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        SlotState::Completed => Style::default().fg(Color::Green),
    }
}

/// Text shown next to a slot's gauge.
pub fn slot_label(slot: &AgentSlot) -> String {
    format!(
        "{} {:<20} {:>3}%",
        slot_icon(slot.state),
        slot.role.display_name(),
        slot.progress
    )
}

pub fn render_agent_slots(
    frame: &mut Frame,
    area: Rect,
    slots: &[AgentSlot],
) -> Result<(), RenderError> {
    let min_height = u16::try_from(slots.len()).unwrap_or(u16::MAX).saturating_add(2);
    RenderError::require_area("agents", area, 40, min_height)?;

    let block = Block::default().borders(Borders::ALL).title("Agents");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(slots.iter().map(|_| Constraint::Length(1)))
        .split(inner);

    for (slot, row) in slots.iter().zip(rows.iter()) {
        let style = slot_style(slot.state);
        let gauge = LineGauge::default()
            .label(slot_label(slot))
            .ratio(f64::from(slot.progress.min(100)) / 100.0)
            .style(style)
            .filled_style(style)
            .unfilled_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(gauge, *row);
    }
    Ok(())
}
