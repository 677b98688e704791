use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use tracing::info;

use career_compass::cli::{handle_command, Cli};
use career_compass::{EnvironmentConfig, LocalStore, ServiceClient};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EnvironmentConfig::load_from(&cli.config)?;
    config.ensure_directories()?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file: {}", config.log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let base_url = config.resolved_base_url();
    info!("API base URL: {}", base_url);
    info!("Storage: {}", config.storage_path.display());

    let backend = ServiceClient::new(base_url, config.timeout_seconds)?;
    let store = LocalStore::open(config.storage_path.clone())?;

    handle_command(cli.command, &backend, &store).await
}
