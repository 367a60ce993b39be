//! Document backends.
//!
//! [`DocumentBackend`] is the narrow surface the stores need from a
//! partitioned document database. Two implementations ship with the crate:
//!
//! - [`RestBackend`]: Cosmos DB SQL API over HTTPS, master-key auth
//! - [`InMemoryBackend`]: process-local, same conflict and not-found semantics
//!
//! Errors follow one mapping in both backends: an existing id or unique key
//! violation is `StoreError::Conflict`, a missing database, container or
//! document is `StoreError::NotFound`, a rejected request is
//! `StoreError::Invalid`, and everything transport related is
//! `StoreError::StorageUnavailable`.

mod memory;
pub mod policy;
pub mod query;
mod rest;

use std::fmt;

use async_trait::async_trait;
use idstore_core::StoreResult;
use serde_json::Value;

pub use memory::InMemoryBackend;
pub use policy::ContainerProperties;
pub use query::DocumentQuery;
pub use rest::RestBackend;

/// Address of a container inside a database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerLink {
    pub database: String,
    pub container: String,
}

impl ContainerLink {
    pub fn new(database: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            container: container.into(),
        }
    }

    /// Resource link, e.g. `dbs/IdentityServer/colls/clients`.
    #[must_use]
    pub fn resource_link(&self) -> String {
        format!("dbs/{}/colls/{}", self.database, self.container)
    }
}

impl fmt::Display for ContainerLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.database, self.container)
    }
}

/// Partitioned document database operations.
///
/// Every document carries a string `id` that is unique within its logical
/// partition. Partition key values are passed explicitly; a document whose
/// partition property disagrees with the passed value is rejected.
#[async_trait]
pub trait DocumentBackend: Send + Sync + fmt::Debug {
    /// Creates a database.
    ///
    /// # Errors
    ///
    /// `StoreError::Conflict` if the database already exists.
    async fn create_database(&self, database: &str) -> StoreResult<()>;

    /// Creates a container with the given reserved throughput.
    ///
    /// # Errors
    ///
    /// `StoreError::Conflict` if the container already exists,
    /// `StoreError::NotFound` if the database does not.
    async fn create_container(
        &self,
        database: &str,
        properties: &ContainerProperties,
        throughput: u32,
    ) -> StoreResult<()>;

    /// Inserts a new document and returns it as stored.
    async fn create_document(
        &self,
        link: &ContainerLink,
        partition_key: &str,
        document: Value,
    ) -> StoreResult<Value>;

    /// Replaces the document with the given id and returns it as stored.
    async fn replace_document(
        &self,
        link: &ContainerLink,
        id: &str,
        partition_key: &str,
        document: Value,
    ) -> StoreResult<Value>;

    /// Deletes the document with the given id.
    async fn delete_document(
        &self,
        link: &ContainerLink,
        id: &str,
        partition_key: &str,
    ) -> StoreResult<()>;

    /// Runs a query, scoped to one partition when `partition_key` is set and
    /// across all partitions otherwise. Returns every page.
    async fn query_documents(
        &self,
        link: &ContainerLink,
        query: &DocumentQuery,
        partition_key: Option<&str>,
    ) -> StoreResult<Vec<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_link() {
        let link = ContainerLink::new("IdentityServer", "clients");
        assert_eq!(link.resource_link(), "dbs/IdentityServer/colls/clients");
        assert_eq!(link.to_string(), "IdentityServer/clients");
    }
}
