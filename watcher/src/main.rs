use anyhow::Result;
use dotenvy::dotenv;
use envconfig::Envconfig;
use tracing::info;
use tracing_subscriber::EnvFilter;
use watcher::{client::WatcherClient, config::WatcherConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = WatcherConfig::init_from_env()?;
    info!("Starting watcher with config:\n{config}");

    WatcherClient::new(config).start().await??;

    Ok(())
}
