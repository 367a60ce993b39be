//! Database and container provisioning.
//!
//! Both steps are create-if-absent: a `Conflict` from the backend means the
//! resource is already there and counts as success, so any number of processes
//! may provision the same account concurrently.

use std::sync::Arc;

use idstore_core::StoreResult;
use tracing::{debug, info};

use crate::backend::{ContainerLink, ContainerProperties, DocumentBackend};
use crate::collections::CollectionName;
use crate::config::CosmosDbConfig;
use crate::container::Container;

/// Whether a provisioning call created the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    AlreadyExists,
}

/// Provisions containers inside one database.
#[derive(Debug, Clone)]
pub struct ContainerProvisioner {
    backend: Arc<dyn DocumentBackend>,
    database: String,
}

impl ContainerProvisioner {
    /// Ensures the database exists and returns a provisioner for it.
    ///
    /// # Errors
    ///
    /// Propagates any backend error other than "already exists".
    pub async fn ensure(backend: Arc<dyn DocumentBackend>, database: &str) -> StoreResult<Self> {
        let outcome = absorb_conflict(backend.create_database(database).await)?;
        match outcome {
            ProvisionOutcome::Created => info!(database, "created database"),
            ProvisionOutcome::AlreadyExists => debug!(database, "database already exists"),
        }
        Ok(Self {
            backend,
            database: database.to_string(),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Ensures a container exists and returns a handle to it.
    ///
    /// Throughput only applies when the container is created; an existing
    /// container keeps its current definition.
    pub async fn ensure_container(
        &self,
        properties: &ContainerProperties,
        throughput: u32,
    ) -> StoreResult<Container> {
        let outcome = absorb_conflict(
            self.backend
                .create_container(&self.database, properties, throughput)
                .await,
        )?;
        match outcome {
            ProvisionOutcome::Created => info!(
                database = %self.database,
                container = %properties.id,
                throughput,
                "created container"
            ),
            ProvisionOutcome::AlreadyExists => debug!(
                database = %self.database,
                container = %properties.id,
                "container already exists"
            ),
        }
        Ok(Container::new(
            Arc::clone(&self.backend),
            ContainerLink::new(self.database.clone(), properties.id.clone()),
        ))
    }

    /// Ensures one of the known collections with its configured throughput.
    pub async fn ensure_collection(
        &self,
        collection: CollectionName,
        config: &CosmosDbConfig,
    ) -> StoreResult<Container> {
        self.ensure_container(
            &collection.container_properties(),
            config.reserve_units_for(collection),
        )
        .await
    }
}

fn absorb_conflict(result: StoreResult<()>) -> StoreResult<ProvisionOutcome> {
    match result {
        Ok(()) => Ok(ProvisionOutcome::Created),
        Err(e) if e.is_conflict() => Ok(ProvisionOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let backend = Arc::new(InMemoryBackend::new());
        let config = CosmosDbConfig::memory().with_reserve_units(CollectionName::Clients, 400);

        for _ in 0..2 {
            let provisioner = ContainerProvisioner::ensure(backend.clone(), "db")
                .await
                .unwrap();
            let container = provisioner
                .ensure_collection(CollectionName::Clients, &config)
                .await
                .unwrap();
            assert_eq!(container.link(), &ContainerLink::new("db", "clients"));
        }

        let link = ContainerLink::new("db", "clients");
        assert_eq!(backend.container_throughput(&link), Some(400));
    }

    #[tokio::test]
    async fn test_concurrent_ensure() {
        let backend = Arc::new(InMemoryBackend::new());
        let config = CosmosDbConfig::memory();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let backend = backend.clone();
                let config = config.clone();
                tokio::spawn(async move {
                    let provisioner = ContainerProvisioner::ensure(backend, "db").await?;
                    provisioner
                        .ensure_collection(CollectionName::PersistedGrants, &config)
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }
    }

    #[test]
    fn test_absorb_conflict() {
        use idstore_core::StoreError;
        assert_eq!(absorb_conflict(Ok(())).unwrap(), ProvisionOutcome::Created);
        assert_eq!(
            absorb_conflict(Err(StoreError::conflict("exists"))).unwrap(),
            ProvisionOutcome::AlreadyExists
        );
        assert!(
            absorb_conflict(Err(StoreError::unavailable("down")))
                .unwrap_err()
                .is_unavailable()
        );
    }
}
