//! Periodic removal of expired grants.

use std::time::Duration;

use idstore_core::StoreResult;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info};

use crate::grants::GrantStore;

/// Token cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCleanupConfig {
    /// Whether hosts should start the background sweep.
    /// Default: false
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between sweeps.
    /// Default: 3600
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    3600
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
        }
    }
}

impl TokenCleanupConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_secs == 0 {
            return Err("cleanup.interval_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// Background task calling [`GrantStore::remove_expired`] on a fixed interval.
#[derive(Debug)]
pub struct TokenCleanup {
    grants: GrantStore,
    config: TokenCleanupConfig,
}

impl TokenCleanup {
    pub fn new(grants: GrantStore, config: TokenCleanupConfig) -> Self {
        Self { grants, config }
    }

    /// Runs a single sweep.
    pub async fn run_once(&self) -> StoreResult<u64> {
        self.grants.remove_expired().await
    }

    /// Starts sweeping in a background task. The first sweep runs
    /// immediately.
    ///
    /// Returns a shutdown sender; send `true` (or drop it) to stop the task.
    pub fn start(self) -> watch::Sender<bool> {
        let (shutdown_tx, _task) = self.spawn();
        shutdown_tx
    }

    /// Like [`TokenCleanup::start`], also returning the task handle.
    pub fn spawn(self) -> (watch::Sender<bool>, JoinHandle<()>) {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            info!(
                interval_secs = self.config.interval_secs,
                "Token cleanup started"
            );

            let mut ticker = interval(Duration::from_secs(self.config.interval_secs.max(1)));

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!(error = %e, "Token cleanup sweep failed");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        // A dropped sender can never signal again.
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("Token cleanup shutting down");
                            break;
                        }
                    }
                }
            }
        });

        (shutdown_tx, task)
    }
}
