//! Process-local document backend.
//!
//! Mirrors the behaviour of the remote service closely enough for the stores'
//! tests and for local runs: ids are unique per logical partition, unique key
//! policies are enforced per logical partition, and missing resources report
//! `NotFound`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use idstore_core::{StoreError, StoreResult};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::policy::ContainerProperties;
use super::query::DocumentQuery;
use super::{ContainerLink, DocumentBackend};

/// (partition key value, document id)
type DocumentKey = (String, String);

#[derive(Debug)]
struct MemoryContainer {
    properties: ContainerProperties,
    throughput: u32,
    documents: BTreeMap<DocumentKey, Value>,
}

impl MemoryContainer {
    fn partition_value<'a>(&self, document: &'a Value) -> Option<&'a str> {
        document
            .get(self.properties.partition_key_property())
            .and_then(Value::as_str)
    }

    /// Returns the unique key that `document` would violate, if any.
    fn unique_violation(&self, partition_key: &str, id: &str, document: &Value) -> Option<String> {
        let policy = self.properties.unique_key_policy.as_ref()?;
        for unique_key in &policy.unique_keys {
            let wanted: Vec<Option<&Value>> = unique_key
                .paths
                .iter()
                .map(|p| document.get(p.trim_start_matches('/')))
                .collect();

            let clash = self
                .documents
                .iter()
                .filter(|((pk, other_id), _)| pk == partition_key && other_id != id)
                .any(|(_, other)| {
                    unique_key
                        .paths
                        .iter()
                        .map(|p| other.get(p.trim_start_matches('/')))
                        .eq(wanted.iter().copied())
                });
            if clash {
                return Some(unique_key.paths.join(", "));
            }
        }
        None
    }
}

/// In-memory [`DocumentBackend`].
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    databases: DashMap<String, ()>,
    containers: DashMap<ContainerLink, MemoryContainer>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Throughput a container was created with.
    pub fn container_throughput(&self, link: &ContainerLink) -> Option<u32> {
        self.containers.get(link).map(|c| c.throughput)
    }

    /// Definition a container was created with.
    pub fn container_properties(&self, link: &ContainerLink) -> Option<ContainerProperties> {
        self.containers.get(link).map(|c| c.properties.clone())
    }

    /// Number of documents in a container.
    pub fn document_count(&self, link: &ContainerLink) -> usize {
        self.containers
            .get(link)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }
}

fn document_id(document: &Value) -> StoreResult<String> {
    match document.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(StoreError::invalid("document must have a non-empty string id")),
    }
}

fn stamp(mut document: Value) -> Value {
    if let Value::Object(map) = &mut document {
        map.insert(
            "_ts".to_string(),
            Value::from(OffsetDateTime::now_utc().unix_timestamp()),
        );
        map.insert(
            "_etag".to_string(),
            Value::from(format!("\"{}\"", Uuid::new_v4())),
        );
    }
    document
}

fn container_not_found(link: &ContainerLink) -> StoreError {
    StoreError::not_found(format!("container {link} does not exist"))
}

fn check_partition(
    container: &MemoryContainer,
    partition_key: &str,
    document: &Value,
) -> StoreResult<()> {
    match container.partition_value(document) {
        Some(value) if value == partition_key => Ok(()),
        _ => Err(StoreError::invalid(format!(
            "partition key '{partition_key}' does not match the document's /{}",
            container.properties.partition_key_property()
        ))),
    }
}

#[async_trait]
impl DocumentBackend for InMemoryBackend {
    async fn create_database(&self, database: &str) -> StoreResult<()> {
        match self.databases.entry(database.to_string()) {
            Entry::Occupied(_) => Err(StoreError::conflict(format!(
                "database {database} already exists"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(())
            }
        }
    }

    async fn create_container(
        &self,
        database: &str,
        properties: &ContainerProperties,
        throughput: u32,
    ) -> StoreResult<()> {
        if !self.databases.contains_key(database) {
            return Err(StoreError::not_found(format!(
                "database {database} does not exist"
            )));
        }
        let link = ContainerLink::new(database, properties.id.clone());
        match self.containers.entry(link) {
            Entry::Occupied(slot) => Err(StoreError::conflict(format!(
                "container {} already exists",
                slot.key()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(MemoryContainer {
                    properties: properties.clone(),
                    throughput,
                    documents: BTreeMap::new(),
                });
                Ok(())
            }
        }
    }

    async fn create_document(
        &self,
        link: &ContainerLink,
        partition_key: &str,
        document: Value,
    ) -> StoreResult<Value> {
        let mut container = self
            .containers
            .get_mut(link)
            .ok_or_else(|| container_not_found(link))?;

        let id = document_id(&document)?;
        check_partition(&container, partition_key, &document)?;

        let key = (partition_key.to_string(), id.clone());
        if container.documents.contains_key(&key) {
            return Err(StoreError::conflict(format!(
                "document {id} already exists in {link}"
            )));
        }
        if let Some(paths) = container.unique_violation(partition_key, &id, &document) {
            return Err(StoreError::conflict(format!(
                "unique key ({paths}) violated in {link}"
            )));
        }

        let stored = stamp(document);
        container.documents.insert(key, stored.clone());
        Ok(stored)
    }

    async fn replace_document(
        &self,
        link: &ContainerLink,
        id: &str,
        partition_key: &str,
        document: Value,
    ) -> StoreResult<Value> {
        let mut container = self
            .containers
            .get_mut(link)
            .ok_or_else(|| container_not_found(link))?;

        if document_id(&document)? != id {
            return Err(StoreError::invalid("document id does not match the target id"));
        }
        check_partition(&container, partition_key, &document)?;

        let key = (partition_key.to_string(), id.to_string());
        if !container.documents.contains_key(&key) {
            return Err(StoreError::not_found(format!(
                "document {id} not found in {link}"
            )));
        }
        if let Some(paths) = container.unique_violation(partition_key, id, &document) {
            return Err(StoreError::conflict(format!(
                "unique key ({paths}) violated in {link}"
            )));
        }

        let stored = stamp(document);
        container.documents.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete_document(
        &self,
        link: &ContainerLink,
        id: &str,
        partition_key: &str,
    ) -> StoreResult<()> {
        let mut container = self
            .containers
            .get_mut(link)
            .ok_or_else(|| container_not_found(link))?;

        container
            .documents
            .remove(&(partition_key.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("document {id} not found in {link}")))
    }

    async fn query_documents(
        &self,
        link: &ContainerLink,
        query: &DocumentQuery,
        partition_key: Option<&str>,
    ) -> StoreResult<Vec<Value>> {
        let container = self
            .containers
            .get(link)
            .ok_or_else(|| container_not_found(link))?;

        Ok(container
            .documents
            .iter()
            .filter(|((pk, _), _)| partition_key.is_none_or(|wanted| pk == wanted))
            .filter(|(_, doc)| query.matches(doc))
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::CollectionName;
    use serde_json::json;

    async fn backend_with(collection: CollectionName) -> (InMemoryBackend, ContainerLink) {
        let backend = InMemoryBackend::new();
        backend.create_database("db").await.unwrap();
        backend
            .create_container("db", &collection.container_properties(), 400)
            .await
            .unwrap();
        (backend, ContainerLink::new("db", collection.container_id()))
    }

    fn grant(id: &str, client: &str, subject: &str, kind: &str) -> Value {
        json!({"id": id, "clientId": client, "subjectId": subject, "type": kind})
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let backend = InMemoryBackend::new();
        backend.create_database("db").await.unwrap();
        assert!(backend.create_database("db").await.unwrap_err().is_conflict());

        let props = CollectionName::Clients.container_properties();
        backend.create_container("db", &props, 400).await.unwrap();
        let err = backend.create_container("db", &props, 400).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_container_requires_database() {
        let backend = InMemoryBackend::new();
        let props = CollectionName::Clients.container_properties();
        let err = backend.create_container("nope", &props, 400).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unique_key_enforced_per_partition() {
        let (backend, link) = backend_with(CollectionName::PersistedGrants).await;

        backend
            .create_document(&link, "web", grant("1", "web", "alice", "refresh_token"))
            .await
            .unwrap();

        let err = backend
            .create_document(&link, "web", grant("2", "web", "alice", "refresh_token"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        backend
            .create_document(&link, "web", grant("3", "web", "alice", "user_consent"))
            .await
            .unwrap();
        backend
            .create_document(&link, "spa", grant("4", "spa", "alice", "refresh_token"))
            .await
            .unwrap();
        assert_eq!(backend.document_count(&link), 3);
    }

    #[tokio::test]
    async fn test_partition_mismatch_rejected() {
        let (backend, link) = backend_with(CollectionName::PersistedGrants).await;
        let err = backend
            .create_document(&link, "other", grant("1", "web", "alice", "t"))
            .await
            .unwrap_err();
        assert!(err.is_invalid());
    }

    #[tokio::test]
    async fn test_replace_and_delete_missing() {
        let (backend, link) = backend_with(CollectionName::PersistedGrants).await;

        let err = backend
            .replace_document(&link, "1", "web", grant("1", "web", "alice", "t"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = backend.delete_document(&link, "1", "web").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_replace_keeps_single_document() {
        let (backend, link) = backend_with(CollectionName::PersistedGrants).await;
        backend
            .create_document(&link, "web", grant("1", "web", "alice", "t"))
            .await
            .unwrap();

        let mut updated = grant("1", "web", "alice", "t");
        updated["data"] = json!("new");
        let stored = backend
            .replace_document(&link, "1", "web", updated)
            .await
            .unwrap();
        assert_eq!(stored["data"], "new");
        assert!(stored.get("_etag").is_some());
        assert_eq!(backend.document_count(&link), 1);
    }

    #[tokio::test]
    async fn test_query_partition_scope() {
        let (backend, link) = backend_with(CollectionName::PersistedGrants).await;
        backend
            .create_document(&link, "web", grant("1", "web", "alice", "a"))
            .await
            .unwrap();
        backend
            .create_document(&link, "spa", grant("2", "spa", "alice", "a"))
            .await
            .unwrap();

        let query = DocumentQuery::all().eq("subjectId", "alice");
        assert_eq!(backend.query_documents(&link, &query, None).await.unwrap().len(), 2);
        let scoped = backend
            .query_documents(&link, &query, Some("spa"))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0]["id"], "2");
    }

    #[tokio::test]
    async fn test_missing_container() {
        let backend = InMemoryBackend::new();
        let link = ContainerLink::new("db", "clients");
        let err = backend
            .query_documents(&link, &DocumentQuery::all(), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
