//! Partitioned document store backend for idstore
//!
//! Stores authorization server data in four containers of a Cosmos DB style
//! database:
//!
//! - `clients` (partition `/clientId`)
//! - `apiResources` (partition `/name`)
//! - `identityResources` (partition `/name`)
//! - `persistedGrants` (partition `/clientId`, unique `(clientId, subjectId, type)`)
//!
//! Containers are provisioned once when [`CosmosStorage`] is created; every
//! store handed out afterwards shares the same backend connection and
//! container handles.
//!
//! # Example
//!
//! ```ignore
//! use idstore_cosmos::{CosmosDbConfig, CosmosStorage};
//! use idstore_core::ClientStore;
//!
//! let config = CosmosDbConfig::rest("https://account.documents.azure.com:443/", key);
//! let storage = CosmosStorage::connect(&config).await?;
//!
//! let client = storage.client_store().find_client_by_id("web").await?;
//! let removed = storage.grants().remove_expired().await?;
//! ```

pub mod backend;
pub mod cleanup;
pub mod collections;
pub mod config;
pub mod configuration;
pub mod container;
pub mod entities;
pub mod grants;
mod mapping;
pub mod provisioner;
pub mod seed;
pub mod stores;

use std::sync::Arc;

use idstore_core::StoreResult;

pub use backend::{DocumentBackend, InMemoryBackend, RestBackend};
pub use cleanup::{TokenCleanup, TokenCleanupConfig};
pub use collections::CollectionName;
pub use config::{BackendKind, CosmosDbConfig};
pub use configuration::ConfigurationStore;
pub use container::{Container, Query};
pub use grants::{GrantFilter, GrantStore};
pub use provisioner::ContainerProvisioner;
pub use seed::{SeedData, SeedReport, ensure_seed_data};
pub use stores::{CosmosClientStore, CosmosPersistedGrantStore, CosmosResourceStore};

// =============================================================================
// Storage handle
// =============================================================================

/// Provisioned storage: one backend connection and the four container handles.
///
/// Build it once at start-up and clone it freely; clones share everything.
#[derive(Debug, Clone)]
pub struct CosmosStorage {
    inner: Arc<Provisioned>,
}

#[derive(Debug)]
struct Provisioned {
    database: String,
    configuration: ConfigurationStore,
    grants: GrantStore,
}

impl CosmosStorage {
    /// Validates the configuration, opens the configured backend and
    /// provisions every container.
    ///
    /// # Errors
    ///
    /// `StoreError::Invalid` for bad configuration (before any I/O), or the
    /// backend error that stopped provisioning.
    pub async fn connect(config: &CosmosDbConfig) -> StoreResult<Self> {
        config.validate()?;
        let backend: Arc<dyn DocumentBackend> = match config.backend {
            BackendKind::Rest => Arc::new(RestBackend::from_config(config)?),
            BackendKind::Memory => Arc::new(InMemoryBackend::new()),
        };
        Self::with_backend(backend, config).await
    }

    /// Provisions every container on an existing backend.
    pub async fn with_backend(
        backend: Arc<dyn DocumentBackend>,
        config: &CosmosDbConfig,
    ) -> StoreResult<Self> {
        config.validate()?;
        let provisioner = ContainerProvisioner::ensure(backend, config.database_name()).await?;

        let clients = provisioner
            .ensure_collection(CollectionName::Clients, config)
            .await?;
        let identity = provisioner
            .ensure_collection(CollectionName::IdentityResources, config)
            .await?;
        let api = provisioner
            .ensure_collection(CollectionName::ApiResources, config)
            .await?;
        let grants = provisioner
            .ensure_collection(CollectionName::PersistedGrants, config)
            .await?;

        tracing::info!(database = provisioner.database(), "document storage ready");

        Ok(Self {
            inner: Arc::new(Provisioned {
                database: provisioner.database().to_string(),
                configuration: ConfigurationStore::new(clients, api, identity),
                grants: GrantStore::new(grants),
            }),
        })
    }

    /// Database holding the containers.
    pub fn database(&self) -> &str {
        &self.inner.database
    }

    /// Configuration store (clients, API and identity resources).
    pub fn configuration(&self) -> ConfigurationStore {
        self.inner.configuration.clone()
    }

    /// Grant store.
    pub fn grants(&self) -> GrantStore {
        self.inner.grants.clone()
    }

    pub fn client_store(&self) -> CosmosClientStore {
        CosmosClientStore::new(self.configuration())
    }

    pub fn resource_store(&self) -> CosmosResourceStore {
        CosmosResourceStore::new(self.configuration())
    }

    pub fn persisted_grant_store(&self) -> CosmosPersistedGrantStore {
        CosmosPersistedGrantStore::new(self.grants())
    }

    /// Token cleanup task over this storage's grants.
    pub fn token_cleanup(&self, config: TokenCleanupConfig) -> TokenCleanup {
        TokenCleanup::new(self.grants(), config)
    }
}
