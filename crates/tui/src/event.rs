//! Key routing types.
//!
//! Keys go through a chain of handlers: the command composer sees them
//! first, the dashboard gets whatever it leaves alone.

/// Status of an event after being handled by a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// The widget used the event; stop propagating it.
    Consumed,
    /// Pass the event to the next handler in the chain.
    NotConsumed,
}

impl EventStatus {
    pub fn is_consumed(self) -> bool {
        self == EventStatus::Consumed
    }
}
