//! Artifact Store server.

use clap::Parser;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use artifact_store::config::{Args, Config};
use artifact_store::error::{Error, Result};
use artifact_store::http::{self, AppState};
use artifact_store::VERSION;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Config(format!("Failed to set tracing subscriber: {}", e)))?;

    let config: Config = args.into();

    info!("Artifact Store v{}", VERSION);
    info!("Data directory: {:?}", config.data_dir);
    info!(
        "Blob timeout: {}s, verify on read: {}",
        config.blob_timeout_secs, config.verify_on_read
    );

    let state = AppState::open(&config).await?;
    state.spawn_session_purge(SESSION_PURGE_INTERVAL);
    http::start_server(&config, state).await?;

    Ok(())
}
