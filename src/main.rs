use anyhow::{Context, Result};
use clap::Parser;
use jobster::cli::{self, Cli, Command};
use jobster::core::{ConfigManager, Database};
use jobster::start_web_server;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "jobster=info,rocket::server=off";

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Invalid log filter")?;

    // JSON lines to a file when JOBSTER_LOG_FILE is set, plain text otherwise
    let json_layer = match std::env::var("JOBSTER_LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(json_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let config = ConfigManager::load()?;

    match cli.command {
        None | Some(Command::Serve) => {
            let port = std::env::var("ROCKET_PORT")
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT environment variable not set"))?
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;
            let jwt_secret = std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

            config.ensure_directories().await?;

            info!("Environment: {}", config.environment_name);
            info!("Database: {}", config.environment.database_path.display());
            info!("Storage: {}", config.environment.storage_path.display());
            info!("Analysis service: {}", config.environment.analysis.url);

            start_web_server(config, port, jwt_secret).await
        }
        Some(command) => {
            let database_path = cli
                .database_path
                .unwrap_or_else(|| config.environment.database_path.clone());
            let db = Database::new(&database_path).await?;
            cli::handle_command(command, &db, &database_path).await
        }
    }
}
