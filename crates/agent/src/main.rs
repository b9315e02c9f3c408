//! vigil agent entry point.
//!
//! Boots the offline agent: seeds and activates the cache generation for the
//! configured version, then ticks the sync reconciler so outbox batches are
//! replayed whenever the interval fires. Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use vigil_agent::OfflineAgent;
use vigil_client::{HttpNetwork, NetConfig};
use vigil_core::{AppConfig, CacheDb, Category, OutboxDb};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(origin = %config.origin, version = %config.cache_version, "starting vigil agent");

    let cache = CacheDb::open(&config.cache_db_path).await?;
    let outbox = OutboxDb::open(&config.outbox_db_path).await?;
    let net = HttpNetwork::new(NetConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..Default::default()
    })?;

    let agent = OfflineAgent::new(config.clone(), cache, outbox, Arc::new(net))?;

    agent.on_install().await?;
    agent.on_activate().await?;

    let mut ticker = tokio::time::interval(config.sync_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for category in Category::ALL {
                    match agent.on_sync(category).await {
                        Ok(report) if report.replayed > 0 => {
                            tracing::info!(category = %category, replayed = report.replayed, "sync tick replayed batch");
                        }
                        Ok(_) => {}
                        Err(err) => {
                            tracing::warn!(category = %category, %err, "sync attempt failed, batch kept for next tick");
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
