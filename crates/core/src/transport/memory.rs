//! In-process transport.
//!
//! `MemoryTransport` never touches the network: outbound events are recorded
//! and inbound events are injected with [`MemoryTransport::inject`]. It backs
//! the coordinator and dashboard tests.

use ab_protocol::names;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use super::registry::{Handler, HandlerId, HandlerRegistry};
use super::Transport;

/// Loopback push channel.
pub struct MemoryTransport {
    registry: HandlerRegistry,
    connected: AtomicBool,
    available: bool,
    sent: Mutex<Vec<(String, Value)>>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// A transport whose `connect` succeeds.
    pub fn new() -> Self {
        Self {
            registry: HandlerRegistry::new(),
            connected: AtomicBool::new(false),
            available: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// A transport that behaves like an unreachable server.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Deliver an inbound event to registered handlers.
    pub fn inject(&self, event: &str, payload: Value) {
        self.registry.dispatch(event, &payload);
    }

    /// Simulate the server dropping the connection.
    pub fn drop_connection(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.registry
                .dispatch(names::CONNECTION_STATUS, &json!({ "connected": false }));
        }
    }

    /// Events that reached the (pretend) peer, in send order.
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sent events with the given name.
    pub fn sent_named(&self, event: &str) -> Vec<Value> {
        self.sent()
            .into_iter()
            .filter(|(name, _)| name == event)
            .map(|(_, payload)| payload)
            .collect()
    }

    /// Number of handlers currently registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        self.registry.count(event)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&self) {
        if !self.available {
            self.registry
                .dispatch(names::CONNECTION_STATUS, &json!({ "connected": false }));
            self.registry.dispatch(
                names::CONNECTION_ERROR,
                &json!({ "message": "no transport available" }),
            );
            return;
        }
        if !self.connected.swap(true, Ordering::SeqCst) {
            self.registry
                .dispatch(names::CONNECTION_STATUS, &json!({ "connected": true }));
        }
    }

    fn on(&self, event: &str, handler: Handler) -> HandlerId {
        self.registry.register(event, handler)
    }

    fn off(&self, event: &str, id: HandlerId) {
        self.registry.unregister(event, id);
    }

    fn off_all(&self, event: &str) {
        self.registry.unregister_all(event);
    }

    fn emit(&self, event: &str, payload: Value) {
        if self.connected.load(Ordering::SeqCst) {
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((event.to_string(), payload.clone()));
        }
        self.registry.dispatch(event, &payload);
    }

    async fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.registry
                .dispatch(names::CONNECTION_STATUS, &json!({ "connected": false }));
        }
        self.registry.clear();
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn collect(transport: &MemoryTransport, event: &str) -> Arc<Mutex<Vec<Value>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        transport.on(
            event,
            Arc::new(move |v: &Value| sink.lock().unwrap().push(v.clone())),
        );
        seen
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let transport = MemoryTransport::new();
        let statuses = collect(&transport, names::CONNECTION_STATUS);

        transport.connect().await;
        transport.connect().await;

        assert!(transport.is_connected());
        assert_eq!(*statuses.lock().unwrap(), vec![json!({"connected": true})]);
    }

    #[tokio::test]
    async fn test_unavailable_connect_reports_instead_of_failing() {
        let transport = MemoryTransport::unavailable();
        let statuses = collect(&transport, names::CONNECTION_STATUS);
        let errors = collect(&transport, names::CONNECTION_ERROR);

        transport.connect().await;

        assert!(!transport.is_connected());
        assert_eq!(*statuses.lock().unwrap(), vec![json!({"connected": false})]);
        assert_eq!(errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_emit_self_notifies_even_when_disconnected() {
        let transport = MemoryTransport::new();
        let echoes = collect(&transport, "start_generation");

        transport.emit("start_generation", json!({"idea": "SaaS"}));

        assert!(transport.sent().is_empty());
        assert_eq!(*echoes.lock().unwrap(), vec![json!({"idea": "SaaS"})]);

        transport.connect().await;
        transport.emit("start_generation", json!({"idea": "Shop"}));
        assert_eq!(transport.sent_named("start_generation"), vec![json!({"idea": "Shop"})]);
        assert_eq!(echoes.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_clears_handlers_and_is_repeatable() {
        let transport = MemoryTransport::new();
        let statuses = collect(&transport, names::CONNECTION_STATUS);
        transport.connect().await;

        transport.disconnect().await;
        transport.disconnect().await;

        assert!(!transport.is_connected());
        assert_eq!(transport.handler_count(names::CONNECTION_STATUS), 0);
        assert_eq!(
            *statuses.lock().unwrap(),
            vec![json!({"connected": true}), json!({"connected": false})]
        );
    }
}
