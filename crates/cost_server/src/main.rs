//! Insurance cost prediction server

use anyhow::{anyhow, Result};
use clap::Parser;
use insurance_server::{start_server, ServerConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "cost-server")]
#[command(about = "Serve insurance cost predictions from a trained artifact pair")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding model.json, scaler.json and model.hash
    #[arg(short, long)]
    artifacts: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(artifacts) = cli.artifacts {
        config.artifacts = artifacts;
    }

    info!("insurance cost server v{}", env!("CARGO_PKG_VERSION"));
    start_server(&config).await
}

fn init_logging() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
