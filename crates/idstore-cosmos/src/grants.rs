//! Grant store: persisted grants in the `persistedGrants` container.
//!
//! Bulk removals and the expiration sweep are scan-then-delete: the matching
//! documents are loaded first and deleted one at a time. They are not atomic
//! across the matching set; a document that disappears between the scan and
//! its delete is skipped.

use std::sync::Arc;

use idstore_core::{StoreError, StoreResult};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{DocumentBackend, DocumentQuery};
use crate::collections::CollectionName;
use crate::config::CosmosDbConfig;
use crate::container::Container;
use crate::entities::{Document, PersistedGrantEntity, timestamp};
use crate::provisioner::ContainerProvisioner;

// Stored property names.
const KEY: &str = "key";
const TYPE: &str = "type";
const SUBJECT_ID: &str = "subjectId";
const CLIENT_ID: &str = "clientId";
const EXPIRATION: &str = "expiration";

/// Predicate over grants used by bulk removal.
///
/// Unset fields match anything. Setting `client_id` scopes the scan to a
/// single partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantFilter {
    pub key: Option<String>,
    pub subject_id: Option<String>,
    pub client_id: Option<String>,
    pub grant_type: Option<String>,
}

impl GrantFilter {
    pub fn subject_and_client(subject_id: &str, client_id: &str) -> Self {
        Self {
            subject_id: Some(subject_id.to_string()),
            client_id: Some(client_id.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, grant_type: &str) -> Self {
        self.grant_type = Some(grant_type.to_string());
        self
    }

    fn to_query(&self) -> DocumentQuery {
        let mut query = DocumentQuery::all();
        if let Some(key) = &self.key {
            query = query.eq(KEY, key.as_str());
        }
        if let Some(subject_id) = &self.subject_id {
            query = query.eq(SUBJECT_ID, subject_id.as_str());
        }
        if let Some(client_id) = &self.client_id {
            query = query.eq(CLIENT_ID, client_id.as_str());
        }
        if let Some(grant_type) = &self.grant_type {
            query = query.eq(TYPE, grant_type.as_str());
        }
        query
    }
}

/// Access to the persisted grants container.
#[derive(Debug, Clone)]
pub struct GrantStore {
    grants: Container,
}

impl GrantStore {
    /// Provisions the grants container and returns a store over it.
    pub async fn connect(
        backend: Arc<dyn DocumentBackend>,
        config: &CosmosDbConfig,
    ) -> StoreResult<Self> {
        config.validate()?;
        let provisioner = ContainerProvisioner::ensure(backend, config.database_name()).await?;
        let grants = provisioner
            .ensure_collection(CollectionName::PersistedGrants, config)
            .await?;
        Ok(Self::new(grants))
    }

    pub fn new(grants: Container) -> Self {
        Self { grants }
    }

    /// Inserts a grant under a fresh id.
    ///
    /// # Errors
    ///
    /// `StoreError::Conflict` if a grant with the same
    /// `(clientId, subjectId, type)` already exists.
    pub async fn add(&self, mut entity: PersistedGrantEntity) -> StoreResult<PersistedGrantEntity> {
        entity.id = Uuid::new_v4().to_string();
        let stored = self.grants.create(&entity).await?;
        debug!(
            id = %stored.id,
            client_id = %stored.client_id,
            grant_type = %stored.grant_type,
            "grant added"
        );
        Ok(stored)
    }

    /// Looks a grant up by its key.
    pub async fn get(&self, key: &str) -> StoreResult<Option<PersistedGrantEntity>> {
        let matches = self
            .find(&GrantFilter {
                key: Some(key.to_string()),
                ..GrantFilter::default()
            })
            .await?;
        if matches.len() > 1 {
            warn!(count = matches.len(), "several grants share one key, using the first");
        }
        Ok(matches.into_iter().next())
    }

    /// All grants issued for a subject.
    pub async fn get_all(&self, subject_id: &str) -> StoreResult<Vec<PersistedGrantEntity>> {
        self.find(&GrantFilter {
            subject_id: Some(subject_id.to_string()),
            ..GrantFilter::default()
        })
        .await
    }

    /// The grant holding the `(clientId, subjectId, type)` slot, if any.
    pub async fn find_by_unique_key(
        &self,
        client_id: &str,
        subject_id: &str,
        grant_type: &str,
    ) -> StoreResult<Option<PersistedGrantEntity>> {
        let filter = GrantFilter::subject_and_client(subject_id, client_id).with_type(grant_type);
        Ok(self.find(&filter).await?.into_iter().next())
    }

    /// Every grant matching the filter.
    pub async fn find(&self, filter: &GrantFilter) -> StoreResult<Vec<PersistedGrantEntity>> {
        self.grants
            .fetch(&filter.to_query(), filter.client_id.as_deref())
            .await
    }

    /// Replaces the stored grant with the entity's own id.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the entity has no id or no document with that
    /// id exists in its partition.
    pub async fn update(&self, entity: &PersistedGrantEntity) -> StoreResult<PersistedGrantEntity> {
        self.grants.replace(entity).await
    }

    /// Removes the grant with the given key. A missing key is not an error.
    pub async fn remove(&self, key: &str) -> StoreResult<()> {
        let removed = self
            .remove_where(&GrantFilter {
                key: Some(key.to_string()),
                ..GrantFilter::default()
            })
            .await?;
        debug!(removed, "grant removed by key");
        Ok(())
    }

    /// Removes one stored grant. Returns `false` if it was already gone.
    pub async fn remove_entity(&self, entity: &PersistedGrantEntity) -> StoreResult<bool> {
        match self.grants.delete(entity.id(), entity.partition_key()).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Removes every grant for a subject/client pair, whatever its type.
    pub async fn remove_all(&self, subject_id: &str, client_id: &str) -> StoreResult<u64> {
        self.remove_where(&GrantFilter::subject_and_client(subject_id, client_id))
            .await
    }

    /// Removes every grant of one type for a subject/client pair.
    pub async fn remove_all_of_type(
        &self,
        subject_id: &str,
        client_id: &str,
        grant_type: &str,
    ) -> StoreResult<u64> {
        let filter = GrantFilter::subject_and_client(subject_id, client_id).with_type(grant_type);
        self.remove_where(&filter).await
    }

    /// Removes every grant matching the filter and returns how many were
    /// deleted.
    pub async fn remove_where(&self, filter: &GrantFilter) -> StoreResult<u64> {
        let candidates = self.find(filter).await?;
        self.remove_each(candidates).await
    }

    /// Removes every grant that expired before now.
    pub async fn remove_expired(&self) -> StoreResult<u64> {
        self.remove_expired_at(OffsetDateTime::now_utc()).await
    }

    /// Removes every grant whose expiration is strictly before `now`. Grants
    /// without an expiration are kept.
    pub async fn remove_expired_at(&self, now: OffsetDateTime) -> StoreResult<u64> {
        let cutoff = timestamp::format(now).map_err(|e| {
            StoreError::unavailable(format!("unrepresentable clock value {now}: {e}"))
        })?;
        let query = DocumentQuery::all().lt(EXPIRATION, cutoff);

        let candidates: Vec<PersistedGrantEntity> = self
            .grants
            .fetch::<PersistedGrantEntity>(&query, None)
            .await?
            .into_iter()
            .filter(|grant| grant.is_expired_at(now))
            .collect();

        let removed = self.remove_each(candidates).await?;
        if removed > 0 {
            info!(removed, "removed expired grants");
        }
        Ok(removed)
    }

    async fn remove_each(&self, candidates: Vec<PersistedGrantEntity>) -> StoreResult<u64> {
        let mut removed = 0;
        for grant in &candidates {
            if self.remove_entity(grant).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use time::Duration;

    async fn store() -> GrantStore {
        GrantStore::connect(Arc::new(InMemoryBackend::new()), &CosmosDbConfig::memory())
            .await
            .unwrap()
    }

    fn grant(key: &str, client: &str, subject: &str, kind: &str) -> PersistedGrantEntity {
        PersistedGrantEntity {
            id: String::new(),
            key: key.into(),
            grant_type: kind.into(),
            subject_id: subject.into(),
            client_id: client.into(),
            creation_time: OffsetDateTime::now_utc(),
            expiration: None,
            data: "{}".into(),
        }
    }

    #[test]
    fn test_filter_query() {
        let sql = GrantFilter::subject_and_client("alice", "web")
            .with_type("refresh_token")
            .to_query()
            .to_sql();
        assert_eq!(
            sql.query,
            "SELECT * FROM c WHERE c.subjectId = @p0 AND c.clientId = @p1 AND c.type = @p2"
        );
    }

    #[tokio::test]
    async fn test_update_requires_existing_id() {
        let store = store().await;
        let err = store.update(&grant("k", "web", "alice", "t")).await.unwrap_err();
        assert!(err.is_not_found());

        let mut phantom = grant("k", "web", "alice", "t");
        phantom.id = "missing".into();
        assert!(store.update(&phantom).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let store = store().await;
        let mut stored = store.add(grant("k", "web", "alice", "t")).await.unwrap();
        stored.data = "changed".into();
        store.update(&stored).await.unwrap();

        let found = store.get("k").await.unwrap().unwrap();
        assert_eq!(found.id, stored.id);
        assert_eq!(found.data, "changed");
    }

    #[tokio::test]
    async fn test_remove_all_of_type() {
        let store = store().await;
        store.add(grant("1", "web", "alice", "refresh_token")).await.unwrap();
        store.add(grant("2", "web", "alice", "user_consent")).await.unwrap();

        let removed = store
            .remove_all_of_type("alice", "web", "user_consent")
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("1").await.unwrap().is_some());
        assert!(store.get("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sweep_keeps_grants_without_expiration() {
        let store = store().await;
        let now = OffsetDateTime::now_utc();
        let mut expired = grant("old", "web", "alice", "refresh_token");
        expired.expiration = Some(now - Duration::minutes(5));
        store.add(expired).await.unwrap();
        store.add(grant("forever", "web", "alice", "user_consent")).await.unwrap();

        assert_eq!(store.remove_expired_at(now).await.unwrap(), 1);
        assert!(store.get("forever").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_is_strict_at_boundary() {
        let store = store().await;
        let now = OffsetDateTime::now_utc();
        let mut boundary = grant("edge", "web", "alice", "refresh_token");
        boundary.expiration = Some(now);
        store.add(boundary).await.unwrap();

        assert_eq!(store.remove_expired_at(now).await.unwrap(), 0);
        assert!(store.get("edge").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_at_calendar_edges() {
        let store = store().await;
        let mut expired = grant("old", "web", "alice", "refresh_token");
        expired.expiration = Some(OffsetDateTime::now_utc() - Duration::days(1));
        store.add(expired).await.unwrap();

        let earliest = time::PrimitiveDateTime::MIN.assume_utc();
        assert_eq!(store.remove_expired_at(earliest).await.unwrap(), 0);

        let latest = time::PrimitiveDateTime::MAX.assume_utc();
        assert_eq!(store.remove_expired_at(latest).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_entity_twice() {
        let store = store().await;
        let stored = store.add(grant("k", "web", "alice", "t")).await.unwrap();
        assert!(store.remove_entity(&stored).await.unwrap());
        assert!(!store.remove_entity(&stored).await.unwrap());
    }
}
