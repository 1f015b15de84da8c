//! `app-builder`: dashboard and headless commands for the app builder.
//!
//! Without a subcommand the terminal dashboard starts. Subcommands talk to
//! the REST endpoints directly and print plain, colored text.

mod commands;
mod logging;
mod output;

use ab_core::config::loader::{load_config, log_dir, validate};
use ab_protocol::{ClientConfig, Complexity};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "app-builder")]
#[command(version, about = "Follow AI app generation runs from the terminal")]
struct Cli {
    /// Directory containing `.app-builder/config.toml`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Base URL of the REST endpoints, e.g. http://localhost:5000/api.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// URL of the push-channel server.
    #[arg(long, global = true)]
    socket_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List projects.
    Projects,
    /// Show aggregate counters.
    Stats,
    /// Show one project with its agent slots and artifacts.
    Show { id: i64 },
    /// Create a draft project.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        framework: Option<String>,
        /// simple, medium or complex.
        #[arg(long)]
        complexity: Option<Complexity>,
    },
    /// Start generating a project.
    Start { id: i64 },
    /// Print the generation status of a project.
    Status { id: i64 },
    /// Cancel a running generation.
    Cancel { id: i64 },
    /// Delete a project.
    Delete { id: i64 },
    /// Follow a run over the push channel until it finishes.
    Watch { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // A missing .env is fine.
    let _ = dotenvy::from_path(cli.root.join(".env"));
    let config = resolve_config(&cli).await?;

    let Some(command) = cli.command else {
        let _guard = ab_tui::logging::init_file_logging(&log_dir(&cli.root))
            .map_err(|e| eyre!(e))?;
        return ab_tui::run_app(&config).await.map_err(|e| eyre!(e));
    };

    logging::init_stderr_logging();
    run_command(command, &config).await
}

/// Load the config file and apply the URL flags on top of it.
async fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = load_config(&cli.root)
        .await
        .wrap_err("Failed to load configuration")?;
    apply_flags(&mut config, cli.api_url.as_deref(), cli.socket_url.as_deref());
    validate(&config, "command line").wrap_err("Invalid command line option")?;
    Ok(config)
}

fn apply_flags(config: &mut ClientConfig, api_url: Option<&str>, socket_url: Option<&str>) {
    if let Some(url) = api_url {
        config.server.api_base_url = url.to_string();
    }
    if let Some(url) = socket_url {
        config.server.socket_url = url.to_string();
    }
}

async fn run_command(command: Command, config: &ClientConfig) -> Result<()> {
    let client = commands::http_client(config)?;
    match command {
        Command::Projects => commands::list_projects(&client).await,
        Command::Stats => commands::show_stats(&client).await,
        Command::Show { id } => commands::show_project(&client, id).await,
        Command::Create {
            name,
            description,
            framework,
            complexity,
        } => commands::create_project(&client, name, description, framework, complexity).await,
        Command::Start { id } => commands::start_generation(&client, id).await,
        Command::Status { id } => commands::show_status(&client, id).await,
        Command::Cancel { id } => commands::cancel_generation(&client, id).await,
        Command::Delete { id } => commands::delete_project(&client, id).await,
        Command::Watch { id } => commands::watch(config, id).await,
    }
}
