//! `reqwest` implementation of [`CommandClient`].

use ab_protocol::{
    ClientConfig, ErrorBody, GenerationAck, GenerationStatus, GenerationStatusResponse,
    MessageResponse, NewProject, Project, ProjectListResponse, ProjectResponse, ProjectStats,
    ProjectUpdate, StartGenerationRequest, StatsResponse,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::error::{RequestError, RequestResult};
use super::CommandClient;

/// Upper bound for a single command round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client rooted at the API base URL (e.g. `http://localhost:5000/api`).
#[derive(Debug, Clone)]
pub struct HttpCommandClient {
    http: Client,
    base_url: String,
}

impl HttpCommandClient {
    pub fn new(api_base_url: &str) -> RequestResult<Self> {
        Url::parse(api_base_url)
            .map_err(|e| RequestError::Invalid(format!("Invalid API URL {api_base_url}: {e}")))?;

        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> RequestResult<Self> {
        Self::new(&config.server.api_base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the success envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> RequestResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "command response");

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            return Err(match message {
                Some(message) => RequestError::Server {
                    status: Some(status.as_u16()),
                    message,
                },
                None => RequestError::Status {
                    status: status.as_u16(),
                },
            });
        }

        let value: Value = serde_json::from_slice(&body)?;
        if value.get("success") == Some(&Value::Bool(false)) {
            let message = serde_json::from_value::<ErrorBody>(value)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(RequestError::Server {
                status: Some(status.as_u16()),
                message,
            });
        }

        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl CommandClient for HttpCommandClient {
    async fn list_projects(&self) -> RequestResult<Vec<Project>> {
        let resp: ProjectListResponse = self.send(self.http.get(self.url("/projects"))).await?;
        Ok(resp.projects)
    }

    async fn project_stats(&self) -> RequestResult<ProjectStats> {
        let resp: StatsResponse = self
            .send(self.http.get(self.url("/projects/stats")))
            .await?;
        Ok(resp.stats)
    }

    async fn create_project(&self, project: &NewProject) -> RequestResult<Project> {
        project.validate().map_err(RequestError::Invalid)?;
        let resp: ProjectResponse = self
            .send(self.http.post(self.url("/projects")).json(project))
            .await?;
        Ok(resp.project)
    }

    async fn get_project(&self, project_id: i64) -> RequestResult<Project> {
        let resp: ProjectResponse = self
            .send(self.http.get(self.url(&format!("/projects/{project_id}"))))
            .await?;
        Ok(resp.project)
    }

    async fn update_project(
        &self,
        project_id: i64,
        update: &ProjectUpdate,
    ) -> RequestResult<Project> {
        let resp: ProjectResponse = self
            .send(
                self.http
                    .put(self.url(&format!("/projects/{project_id}")))
                    .json(update),
            )
            .await?;
        Ok(resp.project)
    }

    async fn delete_project(&self, project_id: i64) -> RequestResult<()> {
        let _: MessageResponse = self
            .send(self.http.delete(self.url(&format!("/projects/{project_id}"))))
            .await?;
        Ok(())
    }

    async fn start_generation(
        &self,
        request: &StartGenerationRequest,
    ) -> RequestResult<GenerationAck> {
        self.send(self.http.post(self.url("/generation/start")).json(request))
            .await
    }

    async fn generation_status(&self, project_id: i64) -> RequestResult<GenerationStatus> {
        let resp: GenerationStatusResponse = self
            .send(
                self.http
                    .get(self.url(&format!("/generation/status/{project_id}"))),
            )
            .await?;
        Ok(resp.status)
    }

    async fn cancel_generation(&self, project_id: i64) -> RequestResult<GenerationAck> {
        self.send(
            self.http
                .post(self.url(&format!("/generation/cancel/{project_id}"))),
        )
        .await
    }
}
