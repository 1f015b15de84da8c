//! The generation state coordinator.
//!
//! `GenerationCoordinator` owns every piece of client state: the project
//! list, the current-project pointer, the connection flag, the
//! generation-loading flag, the error banner and the console log. It is owned
//! by a single task; user intents arrive as method calls (or [`Op`]s) and
//! push-channel notifications arrive as normalized [`Event`]s, so no locking
//! is needed around it.

use ab_protocol::{
    names, AgentSlot, ClientConfig, Event, GenerationAck, GenerationStatus, NewProject, Op,
    Project, ProjectStats, ProjectStatus, ProjectUpdate, ProgressMode, StartGenerationRequest,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::client::{CommandClient, RequestError};
use crate::normalizer::{describe, LogBuffer};
use crate::state::error::{CoordinatorError, CoordinatorResult};
use crate::state::project;
use crate::state::slots::derive_agent_slots;
use crate::transport::Transport;

/// Where an error banner came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// The push channel failed to connect or dropped.
    Transport,
    /// A command was rejected or never answered.
    Request,
    /// The server reported a failed run.
    Generation,
}

/// Dismissible error shown above the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub kind: BannerKind,
    pub message: String,
}

/// Work the owner of the coordinator should do after applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    RefreshProjects,
}

pub struct GenerationCoordinator {
    client: Arc<dyn CommandClient>,
    transport: Arc<dyn Transport>,
    projects: Vec<Project>,
    stats: Option<ProjectStats>,
    current: Option<i64>,
    connected: bool,
    generating: bool,
    banner: Option<ErrorBanner>,
    log: LogBuffer,
    progress_mode: ProgressMode,
    stall_timeout: Option<Duration>,
    last_progress: Option<Instant>,
}

impl GenerationCoordinator {
    /// Create a coordinator with default settings.
    pub fn new(client: Arc<dyn CommandClient>, transport: Arc<dyn Transport>) -> Self {
        Self::from_config(client, transport, &ClientConfig::default())
    }

    pub fn from_config(
        client: Arc<dyn CommandClient>,
        transport: Arc<dyn Transport>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            client,
            transport,
            projects: Vec::new(),
            stats: None,
            current: None,
            connected: false,
            generating: false,
            banner: None,
            log: LogBuffer::new(config.log_capacity),
            progress_mode: config.progress_mode,
            stall_timeout: config.watchdog.stall_timeout(),
            last_progress: None,
        }
    }

    pub fn with_progress_mode(mut self, mode: ProgressMode) -> Self {
        self.progress_mode = mode;
        self
    }

    pub fn with_stall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stall_timeout = timeout;
        self
    }

    // ---- accessors -------------------------------------------------------

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, project_id: i64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn current_project_id(&self) -> Option<i64> {
        self.current
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current.and_then(|id| self.project(id))
    }

    pub fn stats(&self) -> Option<&ProjectStats> {
        self.stats.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The generation-loading flag: a start command is in flight or a run
    /// started by this client has not finished yet.
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn banner(&self) -> Option<&ErrorBanner> {
        self.banner.as_ref()
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn progress_mode(&self) -> ProgressMode {
        self.progress_mode
    }

    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout
    }

    /// Agent slots of the current project.
    pub fn agent_slots(&self) -> [AgentSlot; 6] {
        derive_agent_slots(self.current_project(), self.progress_mode)
    }

    /// Append a line to the console log.
    pub fn log_message(&mut self, message: impl Into<String>) {
        self.log.push(message);
    }

    pub fn dismiss_error(&mut self) {
        self.banner = None;
    }

    // ---- commands --------------------------------------------------------

    /// Open the push channel.
    pub async fn connect(&self) {
        self.transport.connect().await;
    }

    /// Run a user intent.
    pub async fn dispatch(&mut self, op: Op) -> CoordinatorResult<()> {
        match op {
            Op::CreateProject(new_project) => self.create_project(new_project).await.map(|_| ()),
            Op::SelectProject { project_id } => self.select_project(project_id),
            Op::StartGeneration { project_id } => {
                self.start_generation(project_id).await.map(|_| ())
            }
            Op::StartFromIdea { idea } => self.start_from_idea(&idea),
            Op::CancelGeneration { project_id } => {
                self.cancel_generation(project_id).await.map(|_| ())
            }
            Op::DeleteProject { project_id } => self.delete_project(project_id).await,
            Op::RefreshProjects => self.refresh_projects().await,
            Op::DismissError => {
                self.dismiss_error();
                Ok(())
            }
            Op::Shutdown => {
                self.transport.disconnect().await;
                Ok(())
            }
        }
    }

    /// Reload the project list and stats.
    ///
    /// The current-project pointer survives when the project still exists.
    pub async fn refresh_projects(&mut self) -> CoordinatorResult<()> {
        let projects = match self.client.list_projects().await {
            Ok(projects) => projects,
            Err(err) => return Err(self.request_failed("Failed to load projects", err)),
        };
        let stats = match self.client.project_stats().await {
            Ok(stats) => Some(stats),
            Err(err) => {
                warn!(error = %err, "failed to load project stats");
                None
            }
        };

        debug!(count = projects.len(), "project list refreshed");
        self.projects = projects;
        if stats.is_some() {
            self.stats = stats;
        }
        if let Some(id) = self.current {
            if self.project(id).is_none() {
                self.current = None;
            }
        }
        // Terminal events sent while disconnected are not replayed.
        self.reconcile_run();
        Ok(())
    }

    /// Create a project and make it current.
    pub async fn create_project(&mut self, new_project: NewProject) -> CoordinatorResult<Project> {
        if let Err(reason) = new_project.validate() {
            self.raise(BannerKind::Request, reason.clone());
            return Err(CoordinatorError::InvalidProject(reason));
        }

        let created = match self.client.create_project(&new_project).await {
            Ok(project) => project,
            Err(err) => return Err(self.request_failed("Failed to create project", err)),
        };

        info!(project_id = created.id, name = %created.name, "project created");
        self.log
            .push(format!("Created project {} ({})", created.name, created.id));
        self.projects.retain(|p| p.id != created.id);
        self.projects.insert(0, created.clone());
        self.current = Some(created.id);
        Ok(created)
    }

    /// Make a project current and subscribe to its run.
    pub fn select_project(&mut self, project_id: i64) -> CoordinatorResult<()> {
        if self.project(project_id).is_none() {
            return Err(CoordinatorError::UnknownProject(project_id));
        }
        if self.current != Some(project_id) {
            self.last_progress = None;
        }
        self.current = Some(project_id);
        self.generating = self.project(project_id).is_some_and(Project::is_generating);
        self.reconcile_run();
        self.transport
            .emit(names::JOIN_PROJECT, json!({ "project_id": project_id }));
        Ok(())
    }

    /// Whether a start command for `project_id` would be sent.
    pub fn can_start_generation(&self, project_id: i64) -> bool {
        !self.generating
            && self
                .project(project_id)
                .is_some_and(|p| p.status != ProjectStatus::Generating)
    }

    /// Start a run for `project_id`, or the current project when `None`.
    ///
    /// Rejected without sending anything while the project is generating or
    /// another start is in flight.
    pub async fn start_generation(
        &mut self,
        project_id: Option<i64>,
    ) -> CoordinatorResult<GenerationAck> {
        let project_id = self.resolve(project_id)?;
        if !self.can_start_generation(project_id) {
            self.log
                .push(format!("Generation already in progress for project {project_id}"));
            return Err(CoordinatorError::GenerationInProgress { project_id });
        }
        let request = match self.project(project_id) {
            Some(project) => StartGenerationRequest::for_project(project),
            None => return Err(CoordinatorError::UnknownProject(project_id)),
        };

        self.generating = true;
        let ack = match self.client.start_generation(&request).await {
            Ok(ack) => ack,
            Err(err) => {
                self.generating = false;
                return Err(self.request_failed("Failed to start generation", err));
            }
        };

        if let Some(project) = self.project_mut(project_id) {
            project::begin_generation(project);
        }
        info!(project_id, "generation started");
        self.log
            .push(format!("Generation started for project {project_id}"));
        self.current = Some(project_id);
        self.last_progress = Some(Instant::now());
        self.transport
            .emit(names::JOIN_PROJECT, json!({ "project_id": project_id }));
        Ok(ack)
    }

    /// Quick-start a run from a one-line idea over the push channel.
    pub fn start_from_idea(&mut self, idea: &str) -> CoordinatorResult<()> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(CoordinatorError::InvalidProject(
                "Idea is required".to_string(),
            ));
        }
        let payload = json!({ "idea": idea });
        self.log.push(format!("generate: {payload}"));
        self.transport.emit(names::START_GENERATION, payload);
        Ok(())
    }

    /// Ask the server to cancel the run of `project_id` (or the current
    /// project). Local state changes only once the server acknowledges.
    pub async fn cancel_generation(
        &mut self,
        project_id: Option<i64>,
    ) -> CoordinatorResult<GenerationAck> {
        let project_id = self.resolve(project_id)?;
        let ack = match self.client.cancel_generation(project_id).await {
            Ok(ack) => ack,
            Err(err) => return Err(self.request_failed("Failed to cancel generation", err)),
        };

        if let Some(project) = self.project_mut(project_id) {
            project::cancel_generation(project);
        }
        self.generating = false;
        self.last_progress = None;
        info!(project_id, "generation cancelled");
        self.log
            .push(format!("Generation cancelled for project {project_id}"));
        Ok(ack)
    }

    pub async fn update_project(
        &mut self,
        project_id: i64,
        update: ProjectUpdate,
    ) -> CoordinatorResult<Project> {
        let updated = match self.client.update_project(project_id, &update).await {
            Ok(project) => project,
            Err(err) => return Err(self.request_failed("Failed to update project", err)),
        };
        match self.project_mut(project_id) {
            Some(existing) => *existing = updated.clone(),
            None => self.projects.insert(0, updated.clone()),
        }
        self.log.push(format!("Updated project {project_id}"));
        Ok(updated)
    }

    pub async fn delete_project(&mut self, project_id: i64) -> CoordinatorResult<()> {
        if let Err(err) = self.client.delete_project(project_id).await {
            return Err(self.request_failed("Failed to delete project", err));
        }
        self.projects.retain(|p| p.id != project_id);
        if self.current == Some(project_id) {
            self.current = None;
            self.reconcile_run();
        }
        self.log.push(format!("Deleted project {project_id}"));
        Ok(())
    }

    // ---- events ----------------------------------------------------------

    /// Apply a normalized event and report follow-up work.
    ///
    /// Every event appends one log line. This never performs I/O; use
    /// [`handle_event`](Self::handle_event) to run the follow-up as well.
    pub fn apply_event(&mut self, event: Event) -> Option<FollowUp> {
        self.log.push(describe(&event));

        match event {
            Event::ConnectionStatus { connected } => {
                self.connected = connected;
                // Room membership does not survive a reconnect.
                if let Some(project_id) = self.current.filter(|_| connected) {
                    self.transport
                        .emit(names::JOIN_PROJECT, json!({ "project_id": project_id }));
                }
                if connected
                    && self
                        .banner
                        .as_ref()
                        .is_some_and(|b| b.kind == BannerKind::Transport)
                {
                    self.banner = None;
                }
                None
            }
            Event::ConnectionError { message } => {
                self.raise(BannerKind::Transport, message);
                None
            }
            Event::GenerationProgress {
                project_id,
                progress,
                current_agent,
                status,
            } => {
                let target = project_id.or(self.current);
                if target.is_none() || target != self.current {
                    debug!(?project_id, "progress for a project that is not current");
                    return None;
                }
                let id = self.current?;
                if let Some(project) = self.project_mut(id) {
                    project::apply_progress(project, progress, current_agent.as_deref(), status);
                }
                if status.is_some_and(ProjectStatus::is_terminal) {
                    self.generating = false;
                    self.last_progress = None;
                } else {
                    self.last_progress = Some(Instant::now());
                }
                None
            }
            Event::GenerationComplete { project_id } => {
                self.generating = false;
                self.last_progress = None;
                if let Some(id) = self.current.filter(|id| project_id.map_or(true, |p| p == *id)) {
                    if let Some(project) = self.project_mut(id) {
                        project::complete_generation(project);
                    }
                }
                Some(FollowUp::RefreshProjects)
            }
            Event::GenerationError { project_id, error } => {
                self.generating = false;
                self.last_progress = None;
                if let Some(id) = project_id.or(self.current) {
                    if let Some(project) = self.project_mut(id) {
                        project::fail_generation(project, &error);
                    }
                }
                self.raise(BannerKind::Generation, error);
                None
            }
            Event::ServerMessage { .. } | Event::StepProgress { .. } => None,
        }
    }

    /// Apply an event and run its follow-up.
    pub async fn handle_event(&mut self, event: Event) {
        if let Some(FollowUp::RefreshProjects) = self.apply_event(event) {
            // Failures already raised a banner.
            let _ = self.refresh_projects().await;
        }
    }

    // ---- watchdog --------------------------------------------------------

    /// Project whose run has reported no progress for longer than the stall
    /// timeout, if any.
    pub fn check_stalled(&self, now: Instant) -> Option<i64> {
        let timeout = self.stall_timeout?;
        let last = self.last_progress?;
        let project = self.current_project()?;
        if project.status != ProjectStatus::Generating {
            return None;
        }
        (now.saturating_duration_since(last) >= timeout).then_some(project.id)
    }

    /// Poll the status endpoint for a stalled run and apply the answer as if
    /// it had arrived over the push channel. Returns whether a poll was made.
    pub async fn poll_stalled(&mut self, now: Instant) -> bool {
        let Some(project_id) = self.check_stalled(now) else {
            return false;
        };

        warn!(project_id, "no progress received; polling generation status");
        self.log.push(format!(
            "No progress for project {project_id}; checking status"
        ));
        self.last_progress = Some(now);

        match self.client.generation_status(project_id).await {
            Ok(status) => {
                let event = status_event(status);
                self.handle_event(event).await;
            }
            Err(err) => {
                let _ = self.request_failed("Failed to check generation status", err);
            }
        }
        true
    }

    // ---- helpers ---------------------------------------------------------

    fn project_mut(&mut self, project_id: i64) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == project_id)
    }

    fn resolve(&self, project_id: Option<i64>) -> CoordinatorResult<i64> {
        let id = project_id
            .or(self.current)
            .ok_or(CoordinatorError::NoProjectSelected)?;
        if self.project(id).is_none() {
            return Err(CoordinatorError::UnknownProject(id));
        }
        Ok(id)
    }

    /// Align the loading flag and the watchdog clock with the current
    /// project. The flag is only ever cleared here; a run the server still
    /// reports as generating arms the watchdog so it gets polled.
    fn reconcile_run(&mut self) {
        let running = self.current_project().is_some_and(Project::is_generating);
        if !running {
            if self.generating {
                debug!("current project is no longer generating; clearing loading flag");
            }
            self.generating = false;
            self.last_progress = None;
        } else if self.last_progress.is_none() {
            self.last_progress = Some(Instant::now());
        }
    }

    fn raise(&mut self, kind: BannerKind, message: String) {
        self.banner = Some(ErrorBanner { kind, message });
    }

    /// Log and surface a failed command, returning it for propagation.
    fn request_failed(&mut self, context: &str, err: RequestError) -> CoordinatorError {
        warn!(error = %err, "{context}");
        self.log.push(format!("{context}: {err}"));
        self.raise(BannerKind::Request, err.to_string());
        CoordinatorError::Request(err)
    }
}

/// Translate a polled status into the event the push channel would have sent.
fn status_event(status: GenerationStatus) -> Event {
    match status.status {
        ProjectStatus::Completed => Event::GenerationComplete {
            project_id: Some(status.project_id),
        },
        ProjectStatus::Failed => Event::GenerationError {
            project_id: Some(status.project_id),
            error: status
                .error_message
                .unwrap_or_else(|| "Generation failed".to_string()),
        },
        other => Event::GenerationProgress {
            project_id: Some(status.project_id),
            progress: status.progress,
            current_agent: status.current_agent,
            status: Some(other),
        },
    }
}
