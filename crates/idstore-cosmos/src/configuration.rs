//! Configuration store: clients, API resources and identity resources.
//!
//! Configuration is append-only at this layer. Adds assign a fresh id and
//! never deduplicate on the natural key, so two clients with the same
//! `clientId` become two documents; seeding checks for existence first.

use std::sync::Arc;

use idstore_core::StoreResult;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::backend::DocumentBackend;
use crate::collections::CollectionName;
use crate::config::CosmosDbConfig;
use crate::container::{Container, Query};
use crate::entities::{ApiResourceEntity, ClientEntity, Document, IdentityResourceEntity};
use crate::provisioner::ContainerProvisioner;

/// Access to the three configuration containers.
#[derive(Debug, Clone)]
pub struct ConfigurationStore {
    clients: Container,
    api_resources: Container,
    identity_resources: Container,
}

impl ConfigurationStore {
    /// Provisions the configuration containers and returns a store over them.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or provisioning fails.
    pub async fn connect(
        backend: Arc<dyn DocumentBackend>,
        config: &CosmosDbConfig,
    ) -> StoreResult<Self> {
        config.validate()?;
        let provisioner = ContainerProvisioner::ensure(backend, config.database_name()).await?;
        Ok(Self {
            clients: provisioner
                .ensure_collection(CollectionName::Clients, config)
                .await?,
            api_resources: provisioner
                .ensure_collection(CollectionName::ApiResources, config)
                .await?,
            identity_resources: provisioner
                .ensure_collection(CollectionName::IdentityResources, config)
                .await?,
        })
    }

    /// Builds a store over already provisioned containers.
    pub fn new(
        clients: Container,
        api_resources: Container,
        identity_resources: Container,
    ) -> Self {
        Self {
            clients,
            api_resources,
            identity_resources,
        }
    }

    // ===== Adds =====

    /// Stores a new client document and returns it with its assigned id.
    pub async fn add_client(&self, entity: ClientEntity) -> StoreResult<ClientEntity> {
        add(&self.clients, entity).await
    }

    /// Stores a new API resource document and returns it with its assigned id.
    pub async fn add_api_resource(
        &self,
        entity: ApiResourceEntity,
    ) -> StoreResult<ApiResourceEntity> {
        add(&self.api_resources, entity).await
    }

    /// Stores a new identity resource document and returns it with its
    /// assigned id.
    pub async fn add_identity_resource(
        &self,
        entity: IdentityResourceEntity,
    ) -> StoreResult<IdentityResourceEntity> {
        add(&self.identity_resources, entity).await
    }

    // ===== Queries =====

    /// Clients, optionally restricted to one `clientId` partition.
    pub fn query_clients(&self, partition_key: Option<&str>) -> Query<ClientEntity> {
        self.clients.query(partition_key)
    }

    /// API resources, optionally restricted to one `name` partition.
    pub fn query_api_resources(&self, partition_key: Option<&str>) -> Query<ApiResourceEntity> {
        self.api_resources.query(partition_key)
    }

    /// Identity resources, optionally restricted to one `name` partition.
    pub fn query_identity_resources(
        &self,
        partition_key: Option<&str>,
    ) -> Query<IdentityResourceEntity> {
        self.identity_resources.query(partition_key)
    }
}

async fn add<T>(container: &Container, mut entity: T) -> StoreResult<T>
where
    T: Document + Serialize + DeserializeOwned,
{
    entity.set_id(Uuid::new_v4().to_string());
    let stored = container.create(&entity).await?;
    debug!(
        container = %container.link(),
        id = stored.id(),
        partition_key = stored.partition_key(),
        "document added"
    );
    Ok(stored)
}
