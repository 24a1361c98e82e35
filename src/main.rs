//! Offline agent demo binary
//!
//! Loads configuration, runs the install and activate lifecycle phases
//! against the configured origin, and reports the resulting state.

use anyhow::Context;
use offline_agent::{OfflineAgent, OfflineConfig};
use std::env;
use std::sync::Arc;
use tracing::info;

/// # Usage
/// ```bash
/// # Start with the default config (offline_agent.yaml)
/// cargo run
///
/// # Start with a custom config
/// cargo run -- /path/to/config.yaml
/// ```
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "offline_agent.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = OfflineConfig::from_file(&config_path)
        .with_context(|| format!("failed to load {}", config_path))?;

    info!("  - Origin: {}", config.origin);
    info!("  - Static generation: {}", config.static_cache_name);
    info!("  - Dynamic generation: {}", config.dynamic_cache_name);
    info!("  - Static assets: {}", config.static_assets.len());
    info!("  - External hosts: {:?}", config.external_api_hosts);
    info!("  - External timeout: {} ms", config.external_timeout_ms);

    let agent = OfflineAgent::new(Arc::new(config));

    agent.install().await.context("installation failed")?;
    agent.activate().await.context("activation failed")?;

    let stats = agent.store().stats();
    info!(
        "Agent active: version={}, generations={}, entries={}",
        agent.config().static_cache_name,
        stats.generations,
        stats.total_entries
    );

    Ok(())
}
