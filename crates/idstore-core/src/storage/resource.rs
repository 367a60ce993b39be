//! Resource store trait.

use async_trait::async_trait;

use crate::StoreResult;
use crate::types::{ApiResource, IdentityResource, Resources};

/// Read access to identity and API resources.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Identity resources whose name is one of `scope_names`.
    async fn find_identity_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StoreResult<Vec<IdentityResource>>;

    /// API resources exposing at least one scope named in `scope_names`.
    async fn find_api_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StoreResult<Vec<ApiResource>>;

    /// The API resource with the given name, if any.
    async fn find_api_resource(&self, name: &str) -> StoreResult<Option<ApiResource>>;

    /// Every identity and API resource.
    async fn get_all_resources(&self) -> StoreResult<Resources>;
}
