//! Persisted grant store trait.
//!
//! # Consistency
//!
//! Backends without multi-document transactions implement [`store`] as
//! "look up by key, then insert or replace". Two concurrent stores for the same
//! key can both observe absence; the backend's uniqueness constraint over
//! `(client_id, subject_id, grant_type)` is what keeps a single record, and the
//! losing insert must be turned into an update rather than reported.
//!
//! [`store`]: PersistedGrantStore::store

use async_trait::async_trait;

use crate::StoreResult;
use crate::types::PersistedGrant;

/// Storage for persisted grants.
#[async_trait]
pub trait PersistedGrantStore: Send + Sync {
    /// Insert the grant, or replace the existing grant with the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn store(&self, grant: &PersistedGrant) -> StoreResult<()>;

    /// Find a grant by key.
    ///
    /// Absence is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> StoreResult<Option<PersistedGrant>>;

    /// Every grant issued for a subject, in no particular order.
    async fn get_all(&self, subject_id: &str) -> StoreResult<Vec<PersistedGrant>>;

    /// Remove the grant with the given key. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Remove every grant for the subject/client pair, whatever its type.
    async fn remove_all(&self, subject_id: &str, client_id: &str) -> StoreResult<()>;

    /// Remove every grant of one type for the subject/client pair.
    async fn remove_all_of_type(
        &self,
        subject_id: &str,
        client_id: &str,
        grant_type: &str,
    ) -> StoreResult<()>;
}
