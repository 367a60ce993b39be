//! `idstore-core` store traits backed by the document stores.

use async_trait::async_trait;
use idstore_core::{
    ApiResource, Client, ClientStore, IdentityResource, PersistedGrant, PersistedGrantStore,
    ResourceStore, Resources, StoreResult,
};
use tracing::debug;

use crate::configuration::ConfigurationStore;
use crate::entities::PersistedGrantEntity;
use crate::grants::GrantStore;

// =============================================================================
// Clients
// =============================================================================

/// [`ClientStore`] over the `clients` container.
#[derive(Debug, Clone)]
pub struct CosmosClientStore {
    configuration: ConfigurationStore,
}

impl CosmosClientStore {
    pub fn new(configuration: ConfigurationStore) -> Self {
        Self { configuration }
    }
}

#[async_trait]
impl ClientStore for CosmosClientStore {
    async fn find_client_by_id(&self, client_id: &str) -> StoreResult<Option<Client>> {
        let entity = self
            .configuration
            .query_clients(Some(client_id))
            .eq("clientId", client_id)
            .first()
            .await?;
        Ok(entity.map(Client::from))
    }
}

// =============================================================================
// Resources
// =============================================================================

/// [`ResourceStore`] over the `identityResources` and `apiResources`
/// containers.
#[derive(Debug, Clone)]
pub struct CosmosResourceStore {
    configuration: ConfigurationStore,
}

impl CosmosResourceStore {
    pub fn new(configuration: ConfigurationStore) -> Self {
        Self { configuration }
    }
}

#[async_trait]
impl ResourceStore for CosmosResourceStore {
    async fn find_identity_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StoreResult<Vec<IdentityResource>> {
        if scope_names.is_empty() {
            return Ok(Vec::new());
        }
        let entities = self
            .configuration
            .query_identity_resources(None)
            .is_in("name", scope_names.iter().map(String::as_str))
            .fetch_all()
            .await?;
        Ok(entities.into_iter().map(IdentityResource::from).collect())
    }

    async fn find_api_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StoreResult<Vec<ApiResource>> {
        if scope_names.is_empty() {
            return Ok(Vec::new());
        }
        // Scopes are nested inside the resource document, so match client-side.
        let entities = self
            .configuration
            .query_api_resources(None)
            .fetch_all()
            .await?;
        Ok(entities
            .into_iter()
            .filter(|api| api.has_any_scope(scope_names))
            .map(ApiResource::from)
            .collect())
    }

    async fn find_api_resource(&self, name: &str) -> StoreResult<Option<ApiResource>> {
        let entity = self
            .configuration
            .query_api_resources(Some(name))
            .eq("name", name)
            .first()
            .await?;
        Ok(entity.map(ApiResource::from))
    }

    async fn get_all_resources(&self) -> StoreResult<Resources> {
        let identity = self
            .configuration
            .query_identity_resources(None)
            .fetch_all()
            .await?;
        let api = self
            .configuration
            .query_api_resources(None)
            .fetch_all()
            .await?;
        Ok(Resources::new(
            identity.into_iter().map(IdentityResource::from).collect(),
            api.into_iter().map(ApiResource::from).collect(),
        ))
    }
}

// =============================================================================
// Persisted grants
// =============================================================================

/// [`PersistedGrantStore`] over the `persistedGrants` container.
#[derive(Debug, Clone)]
pub struct CosmosPersistedGrantStore {
    grants: GrantStore,
}

impl CosmosPersistedGrantStore {
    pub fn new(grants: GrantStore) -> Self {
        Self { grants }
    }

    /// Overwrites `existing` with `grant`.
    ///
    /// The partition key is immutable, so a grant that moved to another client
    /// is written to the new partition first and the old document is removed
    /// only once that write succeeded.
    async fn overwrite(
        &self,
        existing: PersistedGrantEntity,
        grant: &PersistedGrant,
    ) -> StoreResult<()> {
        if existing.client_id != grant.client_id {
            self.insert(grant).await?;
            self.grants.remove_entity(&existing).await?;
            return Ok(());
        }
        self.replace(existing, grant).await
    }

    async fn replace(
        &self,
        mut existing: PersistedGrantEntity,
        grant: &PersistedGrant,
    ) -> StoreResult<()> {
        existing.apply(grant);
        self.grants.update(&existing).await?;
        Ok(())
    }

    /// Adds the grant. A `Conflict` on the `(client, subject, type)` slot
    /// becomes an update of the document holding it.
    async fn insert(&self, grant: &PersistedGrant) -> StoreResult<()> {
        let err = match self.grants.add(PersistedGrantEntity::from(grant)).await {
            Ok(_) => return Ok(()),
            Err(e) if e.is_conflict() => e,
            Err(e) => return Err(e),
        };

        debug!(
            client_id = %grant.client_id,
            grant_type = %grant.grant_type,
            "grant add conflicted, retrying as update"
        );
        match self
            .grants
            .find_by_unique_key(&grant.client_id, &grant.subject_id, &grant.grant_type)
            .await?
        {
            // The holder shares the grant's partition, so this is in place.
            Some(holder) => self.replace(holder, grant).await,
            None => Err(err),
        }
    }
}

#[async_trait]
impl PersistedGrantStore for CosmosPersistedGrantStore {
    async fn store(&self, grant: &PersistedGrant) -> StoreResult<()> {
        match self.grants.get(&grant.key).await? {
            Some(existing) => self.overwrite(existing, grant).await,
            None => self.insert(grant).await,
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<PersistedGrant>> {
        Ok(self.grants.get(key).await?.map(PersistedGrant::from))
    }

    async fn get_all(&self, subject_id: &str) -> StoreResult<Vec<PersistedGrant>> {
        Ok(self
            .grants
            .get_all(subject_id)
            .await?
            .into_iter()
            .map(PersistedGrant::from)
            .collect())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.grants.remove(key).await
    }

    async fn remove_all(&self, subject_id: &str, client_id: &str) -> StoreResult<()> {
        self.grants.remove_all(subject_id, client_id).await.map(|_| ())
    }

    async fn remove_all_of_type(
        &self,
        subject_id: &str,
        client_id: &str,
        grant_type: &str,
    ) -> StoreResult<()> {
        self.grants
            .remove_all_of_type(subject_id, client_id, grant_type)
            .await
            .map(|_| ())
    }
}
