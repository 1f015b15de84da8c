//! Bounded, timestamped console log.

use ab_protocol::Event;
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

/// Number of entries kept when no capacity is configured.
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// One console line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Append-only log that keeps the most recent `capacity` entries.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogBuffer {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.push_entry(LogEntry::new(message));
    }

    pub fn push_entry(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Console line for a normalized event.
pub fn describe(event: &Event) -> String {
    match event {
        Event::ConnectionStatus { connected: true } => "Connected to server".to_string(),
        Event::ConnectionStatus { connected: false } => "Disconnected from server".to_string(),
        Event::ConnectionError { message } => format!("Connection error: {message}"),
        Event::GenerationProgress {
            project_id,
            progress,
            current_agent,
            ..
        } => {
            let mut line = match project_id {
                Some(id) => format!("Project {id}: {progress}%"),
                None => format!("Progress: {progress}%"),
            };
            if let Some(agent) = current_agent {
                line.push_str(&format!(" ({agent})"));
            }
            line
        }
        Event::GenerationComplete { project_id: Some(id) } => {
            format!("Project {id}: generation completed")
        }
        Event::GenerationComplete { project_id: None } => "Generation completed".to_string(),
        Event::GenerationError { error, .. } => format!("Generation failed: {error}"),
        Event::ServerMessage { payload } => format!("server: {payload}"),
        Event::StepProgress { step } => format!("progress: {step}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_buffer_evicts_oldest_first() {
        let mut log = LogBuffer::new(DEFAULT_LOG_CAPACITY);
        for i in 1..=51 {
            log.push(format!("entry {i}"));
        }

        assert_eq!(log.len(), 50);
        let messages: Vec<_> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages.first(), Some(&"entry 2"));
        assert_eq!(messages.last(), Some(&"entry 51"));
        assert!(!messages.contains(&"entry 1"));
        assert!(messages
            .windows(2)
            .all(|w| w[0].trim_start_matches("entry ").parse::<u32>().unwrap()
                < w[1].trim_start_matches("entry ").parse::<u32>().unwrap()));
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut log = LogBuffer::new(0);
        log.push("a");
        log.push("b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().map(|e| e.message.as_str()), Some("b"));
    }

    #[test]
    fn test_entry_display_has_clock_prefix() {
        let entry = LogEntry::new("Connected to server");
        let text = entry.to_string();
        assert!(text.starts_with('['));
        assert!(text.ends_with("] Connected to server"));
        assert_eq!(text.len(), "[HH:MM:SS] Connected to server".len());
    }

    #[test]
    fn test_describe_events() {
        assert_eq!(
            describe(&Event::GenerationProgress {
                project_id: Some(1),
                progress: 50,
                current_agent: Some("Frontend Developer".to_string()),
                status: None,
            }),
            "Project 1: 50% (Frontend Developer)"
        );
        assert_eq!(
            describe(&Event::ServerMessage {
                payload: json!({"event": "connected"})
            }),
            r#"server: {"event":"connected"}"#
        );
        assert_eq!(
            describe(&Event::StepProgress {
                step: "Designing UI".to_string()
            }),
            "progress: Designing UI"
        );
    }
}
