//! `HttpCommandClient` against a stub REST server.

use ab_core::client::{CommandClient, HttpCommandClient, RequestError};
use ab_protocol::{NewProject, ProjectStatus, StartGenerationRequest};
use axum::extract::{Json, Path};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn list_projects() -> Json<Value> {
    Json(json!({
        "success": true,
        "projects": [
            {
                "id": 1,
                "name": "Todo",
                "description": "A todo app",
                "status": "completed",
                "progress": 100
            },
            {
                "id": 2,
                "name": "Blog",
                "description": "A blog",
                "status": "generating",
                "progress": 35,
                "current_agent": "System Architect",
                "tech_stack": null
            }
        ],
        "total": 2
    }))
}

async fn stats() -> Json<Value> {
    Json(json!({
        "success": true,
        "stats": {"total_projects": 2, "deployed": 0, "building": 1, "total_views": 0}
    }))
}

async fn create_project(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut project = body;
    project["id"] = json!(7);
    project["status"] = json!("draft");
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "project": project,
            "message": "Project created successfully"
        })),
    )
}

async fn get_project(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    if id == 1 {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "project": {"id": 1, "name": "Todo", "status": "completed"}
            })),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "Project not found"})),
        )
    }
}

async fn delete_project(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!({"success": false, "message": "Cannot delete a generating project"}))
}

async fn start_generation(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["project_id"] == json!(2) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"success": false, "message": "Generation already in progress"})),
        );
    }
    (
        StatusCode::ACCEPTED,
        Json(json!({
            "success": true,
            "message": "Generation started successfully",
            "project_id": body["project_id"],
            "status": "generating"
        })),
    )
}

async fn generation_status(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({
        "success": true,
        "project_id": id,
        "status": "generating",
        "progress": 60,
        "current_agent": "Frontend Developer",
        "started_at": "2024-05-01T10:00:00",
        "completed_at": null,
        "estimated_completion": null,
        "error_message": null
    }))
}

async fn cancel_generation(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_server() -> String {
    let api = Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/stats", get(stats))
        .route("/projects/:id", get(get_project).delete(delete_project))
        .route("/generation/start", post(start_generation))
        .route("/generation/status/:id", get(generation_status))
        .route("/generation/cancel/:id", post(cancel_generation));
    let app = Router::new().nest("/api", api);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}/api")
}

async fn client() -> HttpCommandClient {
    HttpCommandClient::new(&spawn_server().await).expect("Failed to build client")
}

#[tokio::test]
async fn test_list_projects_and_stats() {
    let client = client().await;

    let projects = client.list_projects().await.expect("List should succeed");
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[1].status, ProjectStatus::Generating);
    assert!(projects[1].tech_stack.is_empty());

    let stats = client.project_stats().await.expect("Stats should succeed");
    assert_eq!(stats.total_projects, 2);
    assert_eq!(stats.building, 1);
}

#[tokio::test]
async fn test_create_project_posts_body() {
    let client = client().await;

    let project = client
        .create_project(&NewProject::new("Todo", "A todo app").with_framework("React"))
        .await
        .expect("Create should succeed");

    assert_eq!(project.id, 7);
    assert_eq!(project.name, "Todo");
    assert_eq!(project.framework.as_deref(), Some("React"));
    assert_eq!(project.status, ProjectStatus::Draft);
}

#[tokio::test]
async fn test_error_body_maps_to_server_error() {
    let client = client().await;

    match client.get_project(99).await {
        Err(RequestError::Server { status, message }) => {
            assert_eq!(status, Some(404));
            assert_eq!(message, "Project not found");
        }
        other => panic!("Expected Server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bodiless_failure_maps_to_status_error() {
    let client = client().await;

    let err = client
        .cancel_generation(1)
        .await
        .expect_err("Cancel should fail");

    assert!(matches!(err, RequestError::Status { status: 500 }));
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn test_success_false_is_an_error() {
    let client = client().await;

    let err = client
        .delete_project(2)
        .await
        .expect_err("Delete should fail");

    assert_eq!(err.to_string(), "Cannot delete a generating project");
}

#[tokio::test]
async fn test_start_generation_ack_and_conflict() {
    let client = client().await;
    let mut project = ab_protocol::Project::draft(1, "Todo", "A todo app");

    let ack = client
        .start_generation(&StartGenerationRequest::for_project(&project))
        .await
        .expect("Start should be accepted");
    assert_eq!(ack.project_id, Some(1));
    assert_eq!(ack.status, Some(ProjectStatus::Generating));

    project.id = 2;
    let err = client
        .start_generation(&StartGenerationRequest::for_project(&project))
        .await
        .expect_err("Second run should conflict");
    assert!(err.is_conflict());
    assert_eq!(err.to_string(), "Generation already in progress");
}

#[tokio::test]
async fn test_generation_status() {
    let client = client().await;

    let status = client
        .generation_status(3)
        .await
        .expect("Status should succeed");

    assert_eq!(status.project_id, 3);
    assert_eq!(status.progress, 60);
    assert_eq!(status.current_agent.as_deref(), Some("Frontend Developer"));
    assert!(status.started_at.is_some());
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);

    let client = HttpCommandClient::new(&format!("http://{addr}/api")).expect("Client");
    assert!(matches!(
        client.list_projects().await,
        Err(RequestError::Network(_))
    ));
}
