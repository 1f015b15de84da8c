//! Shared fixtures for the widget and app tests.

use ab_core::client::{CommandClient, RequestError, RequestResult};
use ab_core::state::GenerationCoordinator;
use ab_core::transport::MemoryTransport;
use ab_protocol::{
    GenerationAck, GenerationStatus, NewProject, Project, ProjectStats, ProjectStatus,
    ProjectUpdate, StartGenerationRequest,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub fn project(id: i64, status: ProjectStatus) -> Project {
    let mut project = Project::draft(id, format!("project-{id}"), "test project");
    project.status = status;
    if status == ProjectStatus::Generating {
        project.progress = 50;
        project.current_agent = Some("Frontend Developer".to_string());
    }
    project
}

/// Serves a mutable project table and accepts every command.
pub struct StubClient {
    projects: Mutex<Vec<Project>>,
}

impl StubClient {
    pub fn new(projects: Vec<Project>) -> Self {
        Self {
            projects: Mutex::new(projects),
        }
    }

    fn find(&self, project_id: i64) -> RequestResult<Project> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or(RequestError::Server {
                status: Some(404),
                message: "Project not found".to_string(),
            })
    }
}

#[async_trait]
impl CommandClient for StubClient {
    async fn list_projects(&self) -> RequestResult<Vec<Project>> {
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn project_stats(&self) -> RequestResult<ProjectStats> {
        Ok(ProjectStats::default())
    }

    async fn create_project(&self, new_project: &NewProject) -> RequestResult<Project> {
        let mut projects = self.projects.lock().unwrap();
        let id = projects.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let project = Project::draft(id, &new_project.name, &new_project.description);
        projects.push(project.clone());
        Ok(project)
    }

    async fn get_project(&self, project_id: i64) -> RequestResult<Project> {
        self.find(project_id)
    }

    async fn update_project(
        &self,
        project_id: i64,
        _update: &ProjectUpdate,
    ) -> RequestResult<Project> {
        self.find(project_id)
    }

    async fn delete_project(&self, project_id: i64) -> RequestResult<()> {
        self.projects.lock().unwrap().retain(|p| p.id != project_id);
        Ok(())
    }

    async fn start_generation(
        &self,
        request: &StartGenerationRequest,
    ) -> RequestResult<GenerationAck> {
        Ok(GenerationAck {
            success: true,
            project_id: Some(request.project_id),
            status: Some(ProjectStatus::Generating),
            message: None,
        })
    }

    async fn generation_status(&self, project_id: i64) -> RequestResult<GenerationStatus> {
        let project = self.find(project_id)?;
        Ok(GenerationStatus {
            project_id,
            status: project.status,
            progress: project.progress,
            current_agent: project.current_agent,
            started_at: None,
            completed_at: None,
            estimated_completion: None,
            error_message: None,
        })
    }

    async fn cancel_generation(&self, project_id: i64) -> RequestResult<GenerationAck> {
        Ok(GenerationAck {
            success: true,
            project_id: Some(project_id),
            status: Some(ProjectStatus::Cancelled),
            message: None,
        })
    }
}

/// A coordinator whose project list is already loaded. The transport is
/// not connected yet.
pub async fn coordinator_with(
    projects: Vec<Project>,
) -> (GenerationCoordinator, Arc<MemoryTransport>) {
    let transport = Arc::new(MemoryTransport::new());
    let client = Arc::new(StubClient::new(projects));
    let mut coordinator = GenerationCoordinator::new(client, transport.clone())
        .with_stall_timeout(None);
    coordinator
        .refresh_projects()
        .await
        .expect("Stub refresh should succeed");
    (coordinator, transport)
}
