//! Handler table shared by transport implementations.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Callback invoked with the payload of an inbound event.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Token returned by [`HandlerRegistry::register`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(Uuid);

impl HandlerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Event name to handlers, each list kept in registration order.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Mutex<HashMap<String, Vec<(HandlerId, Handler)>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, event: &str, handler: Handler) -> HandlerId {
        let id = HandlerId::new();
        self.lock()
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    pub fn unregister(&self, event: &str, id: HandlerId) {
        let mut handlers = self.lock();
        if let Some(list) = handlers.get_mut(event) {
            list.retain(|(existing, _)| *existing != id);
            if list.is_empty() {
                handlers.remove(event);
            }
        }
    }

    pub fn unregister_all(&self, event: &str) {
        self.lock().remove(event);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of handlers registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }

    /// Invoke every handler for `event`, in registration order.
    ///
    /// The table lock is released before handlers run, so a handler may
    /// register or unregister handlers without deadlocking.
    pub fn dispatch(&self, event: &str, payload: &Value) {
        let snapshot: Vec<Handler> = match self.lock().get(event) {
            Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return,
        };
        for handler in snapshot {
            handler(payload);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<(HandlerId, Handler)>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
