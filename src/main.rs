use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use echotrain::oracle::UnconfiguredOracle;
use echotrain::{create_router, AppState, Config, JsonFileStore};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "echotrain", about = "Spaced-repetition dictation trainer service")]
struct Args {
    /// Config file (without extension), as read by the `config` crate
    #[arg(long, default_value = "config/echotrain")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config))?;

    info!("{} starting", cfg.service.name);

    let store = Arc::new(
        JsonFileStore::open(&cfg.storage.data_dir)
            .await
            .context("failed to open data directory")?,
    );

    if cfg.oracle.api_key.is_empty() {
        warn!("No oracle API key configured; transcription and lookup will be unavailable");
    }
    let oracle = Arc::new(UnconfiguredOracle::new(cfg.oracle.clone()));

    let state = AppState::new(
        Arc::clone(&store),
        store,
        Arc::clone(&oracle),
        oracle,
    );
    let router = create_router(state);

    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
