use anyhow::Result;
use idstore_cosmos::{CosmosDbConfig, CosmosStorage, TokenCleanupConfig};
use tracing::info;

use crate::output::print_success;

pub async fn sweep(config: &CosmosDbConfig) -> Result<()> {
    let storage = CosmosStorage::connect(config).await?;
    let removed = storage.grants().remove_expired().await?;
    print_success(&format!("Removed {removed} expired grants"));
    Ok(())
}

/// Runs the cleanup task until Ctrl-C, whether or not `cleanup.enabled` is
/// set; that flag only controls hosts that start the task on their own.
pub async fn cleanup(config: &CosmosDbConfig, cleanup: TokenCleanupConfig) -> Result<()> {
    let storage = CosmosStorage::connect(config).await?;
    let shutdown = storage.token_cleanup(cleanup).start();

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    let _ = shutdown.send(true);
    Ok(())
}
