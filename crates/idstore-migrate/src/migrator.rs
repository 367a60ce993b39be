//! Copies configuration records from a source into the document store.

use std::sync::Arc;

use idstore_cosmos::ConfigurationStore;
use idstore_cosmos::entities::{ApiResourceEntity, ClientEntity, IdentityResourceEntity};
use tracing::{error, info};

use crate::{ConfigurationSource, MigrationError};

/// Number of records written per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub clients: usize,
    pub api_resources: usize,
    pub identity_resources: usize,
}

impl MigrationReport {
    pub fn total(&self) -> usize {
        self.clients + self.api_resources + self.identity_resources
    }
}

/// Batch writer from a [`ConfigurationSource`] to a [`ConfigurationStore`].
pub struct Migrator {
    source: Arc<dyn ConfigurationSource>,
    target: ConfigurationStore,
}

impl Migrator {
    pub fn new(source: Arc<dyn ConfigurationSource>, target: ConfigurationStore) -> Self {
        Self { source, target }
    }

    /// Reads every record from the source, then adds each one to the target.
    ///
    /// Nothing is written if reading fails. A write failure stops the run;
    /// records already written stay in place.
    pub async fn run(&self) -> Result<MigrationReport, MigrationError> {
        let clients = self.source.clients().await?;
        let api_resources = self.source.api_resources().await?;
        let identity_resources = self.source.identity_resources().await?;

        info!(
            clients = clients.len(),
            api_resources = api_resources.len(),
            identity_resources = identity_resources.len(),
            "Loaded configuration from source"
        );

        let mut report = MigrationReport::default();

        for client in &clients {
            self.target.add_client(ClientEntity::from(client)).await?;
            report.clients += 1;
        }

        for resource in &api_resources {
            self.target
                .add_api_resource(ApiResourceEntity::from(resource))
                .await?;
            report.api_resources += 1;
        }

        for resource in &identity_resources {
            self.target
                .add_identity_resource(IdentityResourceEntity::from(resource))
                .await?;
            report.identity_resources += 1;
        }

        Ok(report)
    }

    /// Runs the migration, logging the outcome. Returns `false` on any failure.
    pub async fn migrate(&self) -> bool {
        match self.run().await {
            Ok(report) => {
                info!(
                    clients = report.clients,
                    api_resources = report.api_resources,
                    identity_resources = report.identity_resources,
                    "Migration completed"
                );
                true
            }
            Err(e) => {
                error!(error = %e, source_side = e.is_source_error(), "Migration failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
