//! Test fixtures: sample projects and a coordinator wired to in-memory
//! doubles.

use super::mock_client::MockCommandClient;
use ab_core::normalizer::EventNormalizer;
use ab_core::state::GenerationCoordinator;
use ab_core::transport::{MemoryTransport, Transport};
use ab_protocol::{Complexity, Event, NewProject, Project, ProjectStatus};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// A project in the given state.
#[allow(dead_code)]
pub fn sample_project(id: i64, name: &str, status: ProjectStatus) -> Project {
    let mut project = Project::draft(id, name, format!("{name} description"));
    project.status = status;
    project.framework = Some("React".to_string());
    project.complexity = Some(Complexity::Medium.to_string());
    project
}

/// The create request of the canonical "Todo" scenario.
#[allow(dead_code)]
pub fn todo_request() -> NewProject {
    NewProject::new("Todo", "A todo app").with_framework("React")
}

/// Everything a coordinator test needs, connected and loaded.
#[allow(dead_code)]
pub struct Harness {
    pub coordinator: GenerationCoordinator,
    pub client: Arc<MockCommandClient>,
    pub transport: Arc<MemoryTransport>,
    events: mpsc::UnboundedReceiver<Event>,
    _normalizer: EventNormalizer,
}

#[allow(dead_code)]
impl Harness {
    pub async fn new(projects: Vec<Project>) -> Self {
        Self::with_stall_timeout(projects, None).await
    }

    /// Like [`Harness::new`] with the stall watchdog set to `timeout`.
    pub async fn with_stall_timeout(projects: Vec<Project>, timeout: Option<Duration>) -> Self {
        let client = Arc::new(MockCommandClient::with_projects(projects));
        let transport = Arc::new(MemoryTransport::new());
        let (tx, events) = mpsc::unbounded_channel();
        let normalizer = EventNormalizer::install(transport.clone(), tx);

        let mut coordinator = GenerationCoordinator::new(client.clone(), transport.clone())
            .with_stall_timeout(timeout);
        coordinator.connect().await;
        coordinator
            .refresh_projects()
            .await
            .expect("Initial refresh should succeed");

        let mut harness = Self {
            coordinator,
            client,
            transport,
            events,
            _normalizer: normalizer,
        };
        harness.pump().await;
        harness
    }

    /// Apply every event the transport has delivered so far.
    pub async fn pump(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.coordinator.handle_event(event).await;
        }
    }

    /// Deliver an inbound push event and apply it.
    pub async fn inject(&mut self, name: &str, payload: Value) {
        self.transport.inject(name, payload);
        self.pump().await;
    }

    pub fn is_transport_connected(&self) -> bool {
        self.transport.is_connected()
    }
}
