//! Scripted command client for deterministic coordinator tests.

use ab_core::client::{CommandClient, RequestError, RequestResult};
use ab_protocol::{
    GenerationAck, GenerationStatus, NewProject, Project, ProjectStats, ProjectStatus,
    ProjectUpdate, StartGenerationRequest,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    projects: Vec<Project>,
    next_id: i64,
    calls: Vec<String>,
    failures: HashMap<&'static str, (Option<u16>, String)>,
    statuses: HashMap<i64, GenerationStatus>,
}

/// In-memory server: keeps a project table and records every call.
#[allow(dead_code)]
pub struct MockCommandClient {
    inner: Mutex<Inner>,
}

#[allow(dead_code)]
impl MockCommandClient {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    pub fn with_projects(projects: Vec<Project>) -> Self {
        let client = Self::new();
        {
            let mut inner = client.inner.lock().unwrap();
            inner.next_id = projects.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            inner.projects = projects;
        }
        client
    }

    /// Make every later call of `operation` fail with a server message.
    pub fn fail(&self, operation: &'static str, status: Option<u16>, message: &str) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .insert(operation, (status, message.to_string()));
    }

    /// Answer for the status endpoint. The project table follows it, as on
    /// the real server.
    pub fn set_status(&self, status: GenerationStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(project) = inner.projects.iter_mut().find(|p| p.id == status.project_id) {
            project.status = status.status;
            project.progress = status.progress;
        }
        inner.statuses.insert(status.project_id, status);
    }

    /// Change a project behind the client's back, like a run finishing
    /// while the push channel was down.
    pub fn set_project_status(&self, project_id: i64, status: ProjectStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(project) = inner.projects.iter_mut().find(|p| p.id == project_id) {
            project.status = status;
        }
    }

    /// Names of the operations called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| *c == operation).count()
    }

    fn enter(&self, operation: &'static str) -> RequestResult<std::sync::MutexGuard<'_, Inner>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(operation.to_string());
        if let Some((status, message)) = inner.failures.get(operation).cloned() {
            return Err(RequestError::Server { status, message });
        }
        Ok(inner)
    }
}

fn not_found(project_id: i64) -> RequestError {
    RequestError::Server {
        status: Some(404),
        message: format!("Project {project_id} not found"),
    }
}

#[async_trait]
impl CommandClient for MockCommandClient {
    async fn list_projects(&self) -> RequestResult<Vec<Project>> {
        Ok(self.enter("list_projects")?.projects.clone())
    }

    async fn project_stats(&self) -> RequestResult<ProjectStats> {
        let inner = self.enter("project_stats")?;
        Ok(ProjectStats {
            total_projects: inner.projects.len() as u64,
            deployed: 0,
            building: inner
                .projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Generating)
                .count() as u64,
            total_views: 0,
        })
    }

    async fn create_project(&self, project: &NewProject) -> RequestResult<Project> {
        let mut inner = self.enter("create_project")?;
        let id = inner.next_id;
        inner.next_id += 1;
        let mut created = Project::draft(id, &project.name, &project.description);
        created.framework = project.framework.clone();
        created.complexity = project.complexity.map(|c| c.to_string());
        inner.projects.insert(0, created.clone());
        Ok(created)
    }

    async fn get_project(&self, project_id: i64) -> RequestResult<Project> {
        let inner = self.enter("get_project")?;
        inner
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| not_found(project_id))
    }

    async fn update_project(
        &self,
        project_id: i64,
        update: &ProjectUpdate,
    ) -> RequestResult<Project> {
        let mut inner = self.enter("update_project")?;
        let project = inner
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| not_found(project_id))?;
        if let Some(name) = &update.name {
            project.name = name.clone();
        }
        if let Some(description) = &update.description {
            project.description = description.clone();
        }
        if let Some(framework) = &update.framework {
            project.framework = Some(framework.clone());
        }
        Ok(project.clone())
    }

    async fn delete_project(&self, project_id: i64) -> RequestResult<()> {
        let mut inner = self.enter("delete_project")?;
        let before = inner.projects.len();
        inner.projects.retain(|p| p.id != project_id);
        if inner.projects.len() == before {
            return Err(not_found(project_id));
        }
        Ok(())
    }

    async fn start_generation(
        &self,
        request: &StartGenerationRequest,
    ) -> RequestResult<GenerationAck> {
        let mut inner = self.enter("start_generation")?;
        let project = inner
            .projects
            .iter_mut()
            .find(|p| p.id == request.project_id)
            .ok_or_else(|| not_found(request.project_id))?;
        if project.status == ProjectStatus::Generating {
            return Err(RequestError::Server {
                status: Some(409),
                message: "Generation already in progress".to_string(),
            });
        }
        project.status = ProjectStatus::Generating;
        project.progress = 0;
        Ok(GenerationAck {
            success: true,
            project_id: Some(request.project_id),
            status: Some(ProjectStatus::Generating),
            message: Some("Generation started successfully".to_string()),
        })
    }

    async fn generation_status(&self, project_id: i64) -> RequestResult<GenerationStatus> {
        let inner = self.enter("generation_status")?;
        inner
            .statuses
            .get(&project_id)
            .cloned()
            .ok_or_else(|| not_found(project_id))
    }

    async fn cancel_generation(&self, project_id: i64) -> RequestResult<GenerationAck> {
        let mut inner = self.enter("cancel_generation")?;
        let project = inner
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| not_found(project_id))?;
        project.status = ProjectStatus::Cancelled;
        Ok(GenerationAck {
            success: true,
            project_id: Some(project_id),
            status: Some(ProjectStatus::Cancelled),
            message: Some("Generation cancelled".to_string()),
        })
    }
}
