//! Custom assertion helpers for coordinator tests.

use ab_core::state::GenerationCoordinator;
use ab_protocol::{AgentSlot, SlotState};

/// Assert the state of all six slots, in order.
#[allow(dead_code)]
pub fn assert_slot_states(slots: &[AgentSlot; 6], expected: [SlotState; 6]) {
    let actual: Vec<SlotState> = slots.iter().map(|s| s.state).collect();
    assert_eq!(actual, expected.to_vec(), "Unexpected slot states: {slots:?}");
}

/// Console messages without their timestamps, oldest first.
#[allow(dead_code)]
pub fn log_messages(coordinator: &GenerationCoordinator) -> Vec<String> {
    coordinator
        .log()
        .iter()
        .map(|entry| entry.message.clone())
        .collect()
}

/// Assert that the slot invariant holds: at most one active slot, every
/// slot before it completed and every slot after it pending.
#[allow(dead_code)]
pub fn assert_slot_invariant(slots: &[AgentSlot; 6]) {
    let active: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.state == SlotState::Active)
        .map(|(i, _)| i)
        .collect();
    assert!(active.len() <= 1, "More than one active slot: {slots:?}");
    if let Some(&index) = active.first() {
        assert!(slots[..index].iter().all(|s| s.state == SlotState::Completed));
        assert!(slots[index + 1..].iter().all(|s| s.state == SlotState::Pending));
    }
}
