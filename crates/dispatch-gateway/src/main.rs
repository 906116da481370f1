use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dispatch_gateway::{DispatchService, GatewayConfig};
use tracing::info;

/// Replay dispatch push messages through the emergency alert pipeline.
#[derive(Parser)]
#[command(name = "dispatch-gateway", version)]
struct Cli {
    /// Optional TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read messages from a JSON-lines file instead of stdin.
    #[arg(long)]
    feed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig::load(cli.config.as_deref())?;
    info!(
        max_duration_secs = config.alerting.alarm.max_duration_secs,
        "dispatch gateway starting"
    );

    let service = DispatchService::new(config);
    service.install_channels();

    match cli.feed {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("failed to open feed file {}", path.display()))?;
            service.run(tokio::io::BufReader::new(file)).await?;
        }
        None => {
            service
                .run(tokio::io::BufReader::new(tokio::io::stdin()))
                .await?;
        }
    }

    Ok(())
}
