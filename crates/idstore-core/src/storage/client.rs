//! Client store trait.

use async_trait::async_trait;

use crate::StoreResult;
use crate::types::Client;

/// Read access to client registrations.
///
/// # Example
///
/// ```ignore
/// use idstore_core::ClientStore;
///
/// async fn example(store: &impl ClientStore) {
///     if let Some(client) = store.find_client_by_id("spa").await? {
///         println!("Found client: {:?}", client.client_name);
///     }
/// }
/// ```
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Find a client by its OAuth `client_id`.
    ///
    /// Returns `None` if no client is registered under that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_client_by_id(&self, client_id: &str) -> StoreResult<Option<Client>>;
}
