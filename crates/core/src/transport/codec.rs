//! Engine.IO v4 / Socket.IO v4 text framing.
//!
//! Every WebSocket text frame carries one Engine.IO packet whose first byte
//! is its type. Engine.IO `message` packets (`4`) wrap a Socket.IO packet
//! with its own type byte:
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                     ping / pong
//! 40 / 40{"sid":".."}                                       namespace connect
//! 41                                                        namespace disconnect
//! 42["generation_progress",{"progress":50}]                 event
//! 44{"message":"Not authorized"}                            connect error
//! ```
//!
//! Only the default namespace and text payloads are supported; binary
//! packets decode to an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors produced while decoding a frame.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty frame")]
    Empty,

    #[error("unknown packet type {0:?}")]
    UnknownType(char),

    #[error("unsupported packet type {0:?}")]
    Unsupported(char),

    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("event packet without a name")]
    MissingEventName,
}

/// Engine.IO open handshake.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Noop,
    /// Socket.IO namespace connect; the server's variant carries its sid.
    Connect(Option<Value>),
    Disconnect,
    Event {
        name: String,
        data: Value,
        ack_id: Option<u64>,
    },
    Ack {
        ack_id: u64,
        data: Vec<Value>,
    },
    ConnectError(String),
}

impl Packet {
    /// Event packet without an acknowledgement id.
    pub fn event(name: impl Into<String>, data: Value) -> Self {
        Packet::Event {
            name: name.into(),
            data,
            ack_id: None,
        }
    }

    /// Encode this packet as a text frame.
    pub fn encode(&self) -> String {
        match self {
            Packet::Open(handshake) => {
                format!("0{}", serde_json::to_string(handshake).unwrap_or_default())
            }
            Packet::Close => "1".to_string(),
            Packet::Ping(payload) => format!("2{payload}"),
            Packet::Pong(payload) => format!("3{payload}"),
            Packet::Noop => "6".to_string(),
            Packet::Connect(None) => "40".to_string(),
            Packet::Connect(Some(data)) => format!("40{data}"),
            Packet::Disconnect => "41".to_string(),
            Packet::Event { name, data, ack_id } => {
                let args = if data.is_null() {
                    Value::Array(vec![Value::String(name.clone())])
                } else {
                    Value::Array(vec![Value::String(name.clone()), data.clone()])
                };
                match ack_id {
                    Some(id) => format!("42{id}{args}"),
                    None => format!("42{args}"),
                }
            }
            Packet::Ack { ack_id, data } => {
                format!("43{ack_id}{}", Value::Array(data.clone()))
            }
            Packet::ConnectError(message) => {
                format!("44{}", serde_json::json!({ "message": message }))
            }
        }
    }

    /// Decode a text frame.
    pub fn decode(frame: &str) -> Result<Packet, CodecError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(CodecError::Empty)?;
        let rest = chars.as_str();

        match kind {
            '0' => serde_json::from_str(rest)
                .map(Packet::Open)
                .map_err(|e| CodecError::InvalidJson(e.to_string())),
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping(rest.to_string())),
            '3' => Ok(Packet::Pong(rest.to_string())),
            '4' => decode_socket_packet(rest),
            '5' => Ok(Packet::Noop),
            '6' => Ok(Packet::Noop),
            other => Err(CodecError::UnknownType(other)),
        }
    }
}

fn decode_socket_packet(frame: &str) -> Result<Packet, CodecError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let body = strip_namespace(chars.as_str());

    match kind {
        '0' => {
            if body.is_empty() {
                Ok(Packet::Connect(None))
            } else {
                parse_json(body).map(|v| Packet::Connect(Some(v)))
            }
        }
        '1' => Ok(Packet::Disconnect),
        '2' => {
            let (ack_id, json) = split_ack_id(body);
            let args = match parse_json(json)? {
                Value::Array(args) => args,
                _ => return Err(CodecError::MissingEventName),
            };
            let mut args = args.into_iter();
            let name = match args.next() {
                Some(Value::String(name)) => name,
                _ => return Err(CodecError::MissingEventName),
            };
            Ok(Packet::Event {
                name,
                data: args.next().unwrap_or(Value::Null),
                ack_id,
            })
        }
        '3' => {
            let (ack_id, json) = split_ack_id(body);
            let data = match parse_json(json)? {
                Value::Array(values) => values,
                other => vec![other],
            };
            Ok(Packet::Ack {
                ack_id: ack_id.unwrap_or_default(),
                data,
            })
        }
        '4' => {
            let message = match parse_json(body)? {
                Value::Object(map) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("connection refused")
                    .to_string(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            Ok(Packet::ConnectError(message))
        }
        '5' | '6' => Err(CodecError::Unsupported(kind)),
        other => Err(CodecError::UnknownType(other)),
    }
}

/// Drop a leading `/namespace,` prefix.
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(idx) => &body[idx + 1..],
            None => "",
        }
    } else {
        body
    }
}

/// Split the optional numeric acknowledgement id off the JSON body.
fn split_ack_id(body: &str) -> (Option<u64>, &str) {
    let digits = body.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return (None, body);
    }
    (body[..digits].parse().ok(), &body[digits..])
}

fn parse_json(body: &str) -> Result<Value, CodecError> {
    serde_json::from_str(body).map_err(|e| CodecError::InvalidJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open_handshake() {
        let packet = Packet::decode(concat!(
            r#"0{"sid":"abc","upgrades":[],"#,
            r#""pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#
        ))
        .unwrap();
        match packet {
            Packet::Open(handshake) => {
                assert_eq!(handshake.sid, "abc");
                assert_eq!(handshake.ping_interval, 25000);
            }
            other => panic!("Expected Open, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_event_with_payload() {
        let packet =
            Packet::decode(r#"42["generation_progress",{"project_id":1,"progress":50}]"#).unwrap();
        assert_eq!(
            packet,
            Packet::event("generation_progress", json!({"project_id": 1, "progress": 50}))
        );
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack() {
        let packet =
            Packet::decode(r#"42/admin,7["server_message",{"event":"connected"}]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "server_message".to_string(),
                data: json!({"event": "connected"}),
                ack_id: Some(7),
            }
        );
    }

    #[test]
    fn test_event_round_trip_preserves_name_and_payload() {
        let original = Packet::event("join_project", json!({"project_id": 3}));
        let frame = original.encode();
        assert_eq!(frame, r#"42["join_project",{"project_id":3}]"#);
        assert_eq!(Packet::decode(&frame).unwrap(), original);
    }

    #[test]
    fn test_event_without_payload() {
        let frame = Packet::event("ping_me", Value::Null).encode();
        assert_eq!(frame, r#"42["ping_me"]"#);
        assert_eq!(
            Packet::decode(&frame).unwrap(),
            Packet::event("ping_me", Value::Null)
        );
    }

    #[test]
    fn test_connect_and_connect_error() {
        assert_eq!(Packet::decode("40").unwrap(), Packet::Connect(None));
        assert_eq!(
            Packet::decode(r#"40{"sid":"xyz"}"#).unwrap(),
            Packet::Connect(Some(json!({"sid": "xyz"})))
        );
        assert_eq!(
            Packet::decode(r#"44{"message":"Not authorized"}"#).unwrap(),
            Packet::ConnectError("Not authorized".to_string())
        );
        assert_eq!(Packet::Connect(None).encode(), "40");
    }

    #[test]
    fn test_ping_pong() {
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping(String::new()));
        assert_eq!(Packet::Pong(String::new()).encode(), "3");
        assert_eq!(Packet::decode("2hello").unwrap(), Packet::Ping("hello".to_string()));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(Packet::decode(""), Err(CodecError::Empty));
        assert_eq!(Packet::decode("9"), Err(CodecError::UnknownType('9')));
        assert_eq!(Packet::decode("45[]"), Err(CodecError::Unsupported('5')));
        assert_eq!(Packet::decode("42[1,2]"), Err(CodecError::MissingEventName));
        assert!(matches!(
            Packet::decode("42[not json"),
            Err(CodecError::InvalidJson(_))
        ));
    }
}
