//! Stored document shapes.
//!
//! Entities are what lands in the containers: camelCase property names, a
//! string `id` assigned on insert, nested child records instead of flat string
//! lists, and enum settings as their integer codes. Backend metadata
//! (`_rid`, `_self`, `_etag`, `_ts`) is ignored on read.

mod client;
mod grant;
mod resource;
pub mod timestamp;

pub use client::{
    ClientClaimEntity, ClientCorsOriginEntity, ClientEntity, ClientGrantTypeEntity,
    ClientIdpRestrictionEntity, ClientPostLogoutRedirectUriEntity, ClientRedirectUriEntity,
    ClientScopeEntity,
};
pub use grant::PersistedGrantEntity;
pub use resource::{ApiResourceEntity, ApiScopeEntity, IdentityResourceEntity};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A client or API secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretEntity {
    #[serde(default)]
    pub description: Option<String>,
    pub value: String,
    #[serde(default, with = "timestamp::option")]
    pub expiration: Option<OffsetDateTime>,
    #[serde(rename = "type")]
    pub secret_type: String,
}

/// A claim type requested by a resource or scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaimEntity {
    #[serde(rename = "type")]
    pub claim_type: String,
}

/// A free-form key/value setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyEntity {
    pub key: String,
    pub value: String,
}

/// Entities stored in a container with a string id.
pub trait Document {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    /// Value of the container's partition key property.
    fn partition_key(&self) -> &str;
}
