//! Seeding configuration data.
//!
//! Each record is added only if its partition is still empty, so seeding can
//! run on every start without duplicating documents.

use idstore_core::{ApiResource, Client, IdentityResource, StoreResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::configuration::ConfigurationStore;
use crate::entities::{ApiResourceEntity, ClientEntity, IdentityResourceEntity};

/// Configuration records to seed, usually read from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub clients: Vec<Client>,
    pub identity_resources: Vec<IdentityResource>,
    pub api_resources: Vec<ApiResource>,
}

impl SeedData {
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Number of records added per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub clients: usize,
    pub identity_resources: usize,
    pub api_resources: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.clients + self.identity_resources + self.api_resources
    }
}

/// Adds every seed record whose partition holds no document yet.
pub async fn ensure_seed_data(
    store: &ConfigurationStore,
    seed: &SeedData,
) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();

    for client in &seed.clients {
        let existing = store
            .query_clients(Some(&client.client_id))
            .first()
            .await?;
        if existing.is_none() {
            store.add_client(ClientEntity::from(client)).await?;
            report.clients += 1;
        }
    }

    for resource in &seed.identity_resources {
        let existing = store
            .query_identity_resources(Some(&resource.name))
            .first()
            .await?;
        if existing.is_none() {
            store
                .add_identity_resource(IdentityResourceEntity::from(resource))
                .await?;
            report.identity_resources += 1;
        }
    }

    for resource in &seed.api_resources {
        let existing = store
            .query_api_resources(Some(&resource.name))
            .first()
            .await?;
        if existing.is_none() {
            store
                .add_api_resource(ApiResourceEntity::from(resource))
                .await?;
            report.api_resources += 1;
        }
    }

    info!(
        clients = report.clients,
        identity_resources = report.identity_resources,
        api_resources = report.api_resources,
        "seed data ensured"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::config::CosmosDbConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store =
            ConfigurationStore::connect(Arc::new(InMemoryBackend::new()), &CosmosDbConfig::memory())
                .await
                .unwrap();
        let seed = SeedData::from_json(
            br#"{
                "clients": [{"clientId": "web", "allowedScopes": ["openid", "api1"]}],
                "identityResources": [{"name": "openid", "userClaims": ["sub"]}],
                "apiResources": [{"name": "api1", "scopes": [{"name": "api1"}]}]
            }"#,
        )
        .unwrap();

        let first = ensure_seed_data(&store, &seed).await.unwrap();
        assert_eq!(first.total(), 3);

        let second = ensure_seed_data(&store, &seed).await.unwrap();
        assert_eq!(second, SeedReport::default());
        assert_eq!(store.query_clients(None).fetch_all().await.unwrap().len(), 1);
    }
}
