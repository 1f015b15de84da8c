//! Translation of raw push-channel payloads into [`Event`]s.
//!
//! Servers disagree on field names (`agent` vs `current_agent`), send ids as
//! numbers or strings and sometimes omit the project id entirely. Everything
//! downstream of this module only sees the normalized [`Event`] enum.

pub mod log;

pub use log::{describe, LogBuffer, LogEntry, DEFAULT_LOG_CAPACITY};

use ab_protocol::{names, Event, ProjectStatus};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{trace, warn};

use crate::transport::{HandlerId, Transport};

#[derive(Deserialize)]
struct StatusPayload {
    connected: bool,
}

#[derive(Deserialize)]
struct ProgressPayload {
    #[serde(default, deserialize_with = "lenient_id")]
    project_id: Option<i64>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default, alias = "agent")]
    current_agent: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct CompletePayload {
    #[serde(default, deserialize_with = "lenient_id")]
    project_id: Option<i64>,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default, deserialize_with = "lenient_id")]
    project_id: Option<i64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Accept `1`, `"1"` or `null` as a project id.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Text of a payload that may be a bare string or an object with `message`.
fn message_of(payload: &Value) -> Option<String> {
    match payload {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Normalize one inbound payload.
///
/// Returns `None` for names this client does not consume and for malformed
/// payloads, which are logged and dropped.
pub fn normalize(name: &str, payload: &Value) -> Option<Event> {
    match parse(name, payload) {
        Ok(event) => event,
        Err(error) => {
            warn!(event = name, %payload, %error, "dropping malformed payload");
            None
        }
    }
}

fn parse(name: &str, payload: &Value) -> Result<Option<Event>, serde_json::Error> {
    let event = match name {
        names::CONNECTION_STATUS => {
            let StatusPayload { connected } = StatusPayload::deserialize(payload)?;
            Event::ConnectionStatus { connected }
        }
        names::CONNECT => Event::ConnectionStatus { connected: true },
        names::DISCONNECT => Event::ConnectionStatus { connected: false },
        names::CONNECTION_ERROR | names::CONNECT_ERROR => Event::ConnectionError {
            message: message_of(payload).unwrap_or_else(|| "Connection failed".to_string()),
        },
        names::GENERATION_PROGRESS | names::GENERATION_UPDATE => {
            let wire = ProgressPayload::deserialize(payload)?;
            let progress = wire.progress.unwrap_or_default().clamp(0.0, 100.0).round() as u32;
            Event::GenerationProgress {
                project_id: wire.project_id,
                progress,
                current_agent: wire.current_agent.filter(|a| !a.is_empty()),
                status: wire.status.and_then(|s| s.parse::<ProjectStatus>().ok()),
            }
        }
        names::GENERATION_COMPLETE => {
            let wire = CompletePayload::deserialize(payload)?;
            Event::GenerationComplete {
                project_id: wire.project_id,
            }
        }
        names::GENERATION_ERROR => {
            let wire = ErrorPayload::deserialize(payload)?;
            Event::GenerationError {
                project_id: wire.project_id,
                error: wire
                    .error
                    .or(wire.message)
                    .unwrap_or_else(|| "Generation failed".to_string()),
            }
        }
        names::SERVER_MESSAGE => Event::ServerMessage {
            payload: payload.clone(),
        },
        names::PROGRESS => {
            let step = match payload.get("step") {
                Some(Value::String(step)) => step.clone(),
                Some(other) => other.to_string(),
                None => payload.to_string(),
            };
            Event::StepProgress { step }
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

/// Subscription of the normalizer on a transport.
///
/// Each inbound name gets one handler that forwards the normalized event into
/// `sink`. Handlers run on the transport's task, so the receiving side sees
/// events in arrival order. Dropping the normalizer unregisters them.
pub struct EventNormalizer {
    transport: Arc<dyn Transport>,
    handlers: Vec<(&'static str, HandlerId)>,
}

impl EventNormalizer {
    pub fn install(transport: Arc<dyn Transport>, sink: UnboundedSender<Event>) -> Self {
        let handlers = names::INBOUND
            .iter()
            .map(|&name| {
                let sink = sink.clone();
                let id = transport.on(
                    name,
                    Arc::new(move |payload: &Value| {
                        if let Some(event) = normalize(name, payload) {
                            trace!(event = name, "forwarding normalized event");
                            let _ = sink.send(event);
                        }
                    }),
                );
                (name, id)
            })
            .collect();

        Self {
            transport,
            handlers,
        }
    }

    /// Remove every handler this normalizer registered.
    pub fn uninstall(self) {
        drop(self);
    }
}

impl Drop for EventNormalizer {
    fn drop(&mut self) {
        for (name, id) in self.handlers.drain(..) {
            self.transport.off(name, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[test]
    fn test_progress_accepts_agent_alias() {
        let event = normalize(
            names::GENERATION_PROGRESS,
            &json!({
                "project_id": 1,
                "progress": 50,
                "agent": "Frontend Developer",
                "status": "generating"
            }),
        );
        assert_eq!(
            event,
            Some(Event::GenerationProgress {
                project_id: Some(1),
                progress: 50,
                current_agent: Some("Frontend Developer".to_string()),
                status: Some(ProjectStatus::Generating),
            })
        );
    }

    #[test]
    fn test_update_with_string_id_and_unknown_status() {
        let event = normalize(
            names::GENERATION_UPDATE,
            &json!({
                "project_id": "7",
                "progress": 120.4,
                "current_agent": "DevOps Engineer",
                "status": "deploying"
            }),
        );
        assert_eq!(
            event,
            Some(Event::GenerationProgress {
                project_id: Some(7),
                progress: 100,
                current_agent: Some("DevOps Engineer".to_string()),
                status: None,
            })
        );
    }

    #[test]
    fn test_progress_without_project_id() {
        match normalize(names::GENERATION_PROGRESS, &json!({"progress": 10})) {
            Some(Event::GenerationProgress { project_id, progress, .. }) => {
                assert_eq!(project_id, None);
                assert_eq!(progress, 10);
            }
            other => panic!("Expected GenerationProgress, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_connection_events() {
        assert_eq!(
            normalize(names::CONNECT, &Value::Null),
            Some(Event::ConnectionStatus { connected: true })
        );
        assert_eq!(
            normalize(names::DISCONNECT, &json!("transport close")),
            Some(Event::ConnectionStatus { connected: false })
        );
        assert_eq!(
            normalize(names::CONNECT_ERROR, &json!({"message": "xhr poll error"})),
            Some(Event::ConnectionError {
                message: "xhr poll error".to_string()
            })
        );
    }

    #[test]
    fn test_generation_error_falls_back_to_message() {
        assert_eq!(
            normalize(names::GENERATION_ERROR, &json!({"project_id": 1, "error": "timeout"})),
            Some(Event::GenerationError {
                project_id: Some(1),
                error: "timeout".to_string()
            })
        );
        assert_eq!(
            normalize(names::GENERATION_ERROR, &json!({"message": "boom"})),
            Some(Event::GenerationError {
                project_id: None,
                error: "boom".to_string()
            })
        );
    }

    #[test]
    fn test_step_progress_and_server_message() {
        assert_eq!(
            normalize(names::PROGRESS, &json!({"step": "Analyzing idea"})),
            Some(Event::StepProgress {
                step: "Analyzing idea".to_string()
            })
        );
        assert_eq!(
            normalize(names::SERVER_MESSAGE, &json!({"event": "connected"})),
            Some(Event::ServerMessage {
                payload: json!({"event": "connected"})
            })
        );
    }

    #[test]
    fn test_malformed_and_unknown_payloads_are_dropped() {
        assert_eq!(normalize(names::CONNECTION_STATUS, &json!({"connected": "yes"})), None);
        assert_eq!(normalize(names::GENERATION_PROGRESS, &json!("fifty")), None);
        assert_eq!(normalize("chat_message", &json!({})), None);
    }

    #[tokio::test]
    async fn test_install_forwards_in_arrival_order_and_uninstalls() {
        let transport = Arc::new(MemoryTransport::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let normalizer = EventNormalizer::install(transport.clone(), tx);

        transport.connect().await;
        transport.inject(names::GENERATION_PROGRESS, json!({"progress": 10}));
        transport.inject(names::GENERATION_COMPLETE, json!({"project_id": 1}));

        assert_eq!(rx.recv().await, Some(Event::ConnectionStatus { connected: true }));
        assert!(matches!(rx.recv().await, Some(Event::GenerationProgress { progress: 10, .. })));
        assert_eq!(
            rx.recv().await,
            Some(Event::GenerationComplete { project_id: Some(1) })
        );

        normalizer.uninstall();
        for name in names::INBOUND {
            assert_eq!(transport.handler_count(name), 0);
        }
    }
}
