//! Headless subcommands.
//!
//! One-shot commands call the REST endpoints and print the answer. `watch`
//! also opens the push channel and follows a run the same way the dashboard
//! does, printing console lines instead of drawing them.

use ab_core::client::{CommandClient, HttpCommandClient};
use ab_core::normalizer::EventNormalizer;
use ab_core::state::{derive_agent_slots, GenerationCoordinator};
use ab_core::transport::{SocketTransport, Transport};
use ab_protocol::{
    ClientConfig, Complexity, Event, NewProject, ProgressMode, ProjectStatus,
    StartGenerationRequest,
};
use color_eyre::eyre::{bail, Result, WrapErr};
use colored::Colorize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::output;

const WATCHDOG_TICK: Duration = Duration::from_secs(5);

pub fn http_client(config: &ClientConfig) -> Result<HttpCommandClient> {
    HttpCommandClient::from_config(config).wrap_err("Failed to build the HTTP client")
}

pub async fn list_projects(client: &dyn CommandClient) -> Result<()> {
    let projects = client
        .list_projects()
        .await
        .wrap_err("Failed to load projects")?;
    print!("{}", output::project_table(&projects));
    if projects.is_empty() {
        println!();
    }
    Ok(())
}

pub async fn show_stats(client: &dyn CommandClient) -> Result<()> {
    let stats = client
        .project_stats()
        .await
        .wrap_err("Failed to load stats")?;
    println!("{}", output::stats_summary(&stats));
    Ok(())
}

pub async fn show_project(client: &dyn CommandClient, project_id: i64) -> Result<()> {
    let project = client
        .get_project(project_id)
        .await
        .wrap_err_with(|| format!("Failed to load project {project_id}"))?;
    let slots = derive_agent_slots(Some(&project), ProgressMode::default());
    println!("{}", output::project_detail(&project, &slots));
    Ok(())
}

pub async fn create_project(
    client: &dyn CommandClient,
    name: String,
    description: String,
    framework: Option<String>,
    complexity: Option<Complexity>,
) -> Result<()> {
    let mut new_project = NewProject::new(name, description);
    if let Some(framework) = framework {
        new_project = new_project.with_framework(framework);
    }
    if let Some(complexity) = complexity {
        new_project = new_project.with_complexity(complexity);
    }
    if let Err(reason) = new_project.validate() {
        bail!(reason);
    }

    let project = client
        .create_project(&new_project)
        .await
        .wrap_err("Failed to create project")?;
    info!(project_id = project.id, "project created");
    println!(
        "{} project {} ({})",
        "Created".green(),
        project.name.bold(),
        project.id
    );
    Ok(())
}

/// Start a run unless the project is already generating.
pub async fn start_generation(client: &dyn CommandClient, project_id: i64) -> Result<()> {
    let project = client
        .get_project(project_id)
        .await
        .wrap_err_with(|| format!("Failed to load project {project_id}"))?;
    if project.status == ProjectStatus::Generating {
        bail!("Generation already in progress for project {project_id}");
    }

    let ack = client
        .start_generation(&StartGenerationRequest::for_project(&project))
        .await
        .wrap_err("Failed to start generation")?;
    println!(
        "{} for project {project_id}{}",
        "Generation started".green(),
        ack.message.map(|m| format!(": {m}")).unwrap_or_default()
    );
    println!("Follow it with `app-builder watch {project_id}`.");
    Ok(())
}

pub async fn show_status(client: &dyn CommandClient, project_id: i64) -> Result<()> {
    let status = client
        .generation_status(project_id)
        .await
        .wrap_err_with(|| format!("Failed to load status of project {project_id}"))?;
    println!("{}", output::generation_status(&status));
    Ok(())
}

pub async fn cancel_generation(client: &dyn CommandClient, project_id: i64) -> Result<()> {
    client
        .cancel_generation(project_id)
        .await
        .wrap_err("Failed to cancel generation")?;
    println!("{} for project {project_id}", "Generation cancelled".yellow());
    Ok(())
}

pub async fn delete_project(client: &dyn CommandClient, project_id: i64) -> Result<()> {
    client
        .delete_project(project_id)
        .await
        .wrap_err_with(|| format!("Failed to delete project {project_id}"))?;
    println!("{} project {project_id}", "Deleted".red());
    Ok(())
}

/// Follow a run until it reaches a terminal status or the user presses
/// Ctrl+C. A failed run is reported as an error.
pub async fn watch(config: &ClientConfig, project_id: i64) -> Result<()> {
    let client = Arc::new(http_client(config)?);
    let transport: Arc<dyn Transport> = Arc::new(SocketTransport::from_config(config));
    let mut coordinator =
        GenerationCoordinator::from_config(client, Arc::clone(&transport), config);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let _normalizer = EventNormalizer::install(Arc::clone(&transport), event_tx);

    coordinator.refresh_projects().await?;
    coordinator.select_project(project_id)?;
    if let Some(status) = terminal_status(&coordinator, project_id) {
        print_snapshot(&coordinator, project_id);
        transport.disconnect().await;
        return finish(&coordinator, project_id, status);
    }

    coordinator.connect().await;
    print_snapshot(&coordinator, project_id);

    let mut watchdog = tokio::time::interval(WATCHDOG_TICK);
    watchdog.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let outcome = loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                let progress = matches!(event, Event::GenerationProgress { .. });
                coordinator.handle_event(event).await;
                print_latest(&coordinator);

                if progress {
                    println!("  {}", output::slot_line(&coordinator.agent_slots()));
                }
                if let Some(status) = terminal_status(&coordinator, project_id) {
                    break Some(status);
                }
            }
            _ = watchdog.tick() => {
                if coordinator.poll_stalled(Instant::now()).await {
                    print_latest(&coordinator);
                    if let Some(status) = terminal_status(&coordinator, project_id) {
                        break Some(status);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break None;
            }
        }
    };

    transport.disconnect().await;
    match outcome {
        Some(status) => finish(&coordinator, project_id, status),
        None => Ok(()),
    }
}

fn terminal_status(coordinator: &GenerationCoordinator, project_id: i64) -> Option<ProjectStatus> {
    coordinator
        .project(project_id)
        .map(|p| p.status)
        .filter(|status| status.is_terminal())
}

fn print_latest(coordinator: &GenerationCoordinator) {
    if let Some(entry) = coordinator.log().latest() {
        println!("{entry}");
    }
}

fn print_snapshot(coordinator: &GenerationCoordinator, project_id: i64) {
    if let Some(project) = coordinator.project(project_id) {
        println!(
            "Watching {} ({}): {} {}%",
            project.name.bold(),
            project.id,
            output::status_label(project.status),
            project.progress
        );
        println!("  {}", output::slot_line(&coordinator.agent_slots()));
    }
}

fn finish(
    coordinator: &GenerationCoordinator,
    project_id: i64,
    status: ProjectStatus,
) -> Result<()> {
    match status {
        ProjectStatus::Failed => {
            let reason = coordinator
                .project(project_id)
                .and_then(|p| p.error_message.clone())
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("Generation failed for project {project_id}: {reason}")
        }
        other => {
            println!("Project {project_id} {}", output::status_label(other));
            Ok(())
        }
    }
}
