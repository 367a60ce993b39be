//! Where migrated configuration comes from.

use async_trait::async_trait;
use idstore_core::{ApiResource, Client, IdentityResource};

use crate::MigrationError;

/// A read-only source of configuration records.
#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    /// Every client with all of its child collections loaded.
    async fn clients(&self) -> Result<Vec<Client>, MigrationError>;

    /// Every API resource with scopes (and scope claims), secrets, claims and
    /// properties loaded.
    async fn api_resources(&self) -> Result<Vec<ApiResource>, MigrationError>;

    /// Every identity resource with claims and properties loaded.
    async fn identity_resources(&self) -> Result<Vec<IdentityResource>, MigrationError>;
}

/// Source backed by in-memory lists.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub clients: Vec<Client>,
    pub api_resources: Vec<ApiResource>,
    pub identity_resources: Vec<IdentityResource>,
}

#[async_trait]
impl ConfigurationSource for StaticSource {
    async fn clients(&self) -> Result<Vec<Client>, MigrationError> {
        Ok(self.clients.clone())
    }

    async fn api_resources(&self) -> Result<Vec<ApiResource>, MigrationError> {
        Ok(self.api_resources.clone())
    }

    async fn identity_resources(&self) -> Result<Vec<IdentityResource>, MigrationError> {
        Ok(self.identity_resources.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn static_source_returns_its_records() {
        let source = StaticSource {
            clients: vec![Client::new("web"), Client::new("worker")],
            ..StaticSource::default()
        };
        block_on(async {
            let clients = source.clients().await.unwrap();
            assert_eq!(clients.len(), 2);
            assert_eq!(clients[1].client_id, "worker");
            assert!(source.api_resources().await.unwrap().is_empty());
            assert!(source.identity_resources().await.unwrap().is_empty());
        });
    }
}
