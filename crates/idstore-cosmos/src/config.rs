//! Connection and provisioning configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [cosmos]
//! endpoint_url = "https://my-account.documents.azure.com:443/"
//! primary_key = "..."
//! database_name = "IdentityServer"
//!
//! [[cosmos.collections]]
//! collection = "persisted_grants"
//! reserve_units = 4000
//! ```

use std::time::Duration;

use idstore_core::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

use crate::collections::CollectionName;

/// Database used when none is configured.
pub const DEFAULT_DATABASE_NAME: &str = "IdentityServer";

/// Throughput (request units per second) reserved for a container when the
/// collection table has no entry for it.
pub const DEFAULT_RESERVE_UNITS: u32 = 1000;

/// Which document backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote Cosmos DB SQL API over HTTPS.
    #[default]
    Rest,
    /// Process-local store, for tests and local runs.
    Memory,
}

/// Per-collection throughput override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionThroughput {
    pub collection: CollectionName,
    pub reserve_units: u32,
}

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosmosDbConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Account endpoint, e.g. `https://account.documents.azure.com:443/`.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Base64 master key of the account.
    #[serde(default)]
    pub primary_key: Option<String>,

    /// Database name (default: `IdentityServer`).
    #[serde(default)]
    pub database_name: Option<String>,

    #[serde(default)]
    pub collections: Vec<CollectionThroughput>,

    /// Per-request timeout applied by the HTTP client.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Page size requested from the backend for queries.
    #[serde(default = "default_max_item_count")]
    pub max_item_count: u32,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_max_item_count() -> u32 {
    100
}

impl Default for CosmosDbConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            endpoint_url: None,
            primary_key: None,
            database_name: None,
            collections: Vec::new(),
            request_timeout_ms: default_request_timeout_ms(),
            max_item_count: default_max_item_count(),
        }
    }
}

impl CosmosDbConfig {
    /// Configuration for the in-memory backend.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            backend: BackendKind::Memory,
            ..Self::default()
        }
    }

    /// Configuration for a remote account.
    #[must_use]
    pub fn rest(endpoint_url: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            backend: BackendKind::Rest,
            endpoint_url: Some(endpoint_url.into()),
            primary_key: Some(primary_key.into()),
            ..Self::default()
        }
    }

    /// Sets the database name.
    #[must_use]
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    /// Overrides the throughput of one collection.
    #[must_use]
    pub fn with_reserve_units(mut self, collection: CollectionName, reserve_units: u32) -> Self {
        self.collections.retain(|c| c.collection != collection);
        self.collections.push(CollectionThroughput {
            collection,
            reserve_units,
        });
        self
    }

    /// Checks required values without touching the network.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Invalid` if the REST backend is selected and the
    /// endpoint or key is missing, or if a numeric setting is zero.
    pub fn validate(&self) -> StoreResult<()> {
        if self.backend == BackendKind::Rest {
            if is_blank(self.endpoint_url.as_deref()) {
                return Err(StoreError::invalid("cosmos.endpoint_url is required"));
            }
            if is_blank(self.primary_key.as_deref()) {
                return Err(StoreError::invalid("cosmos.primary_key is required"));
            }
        }
        if self
            .database_name
            .as_deref()
            .is_some_and(|n| n.trim().is_empty())
        {
            return Err(StoreError::invalid("cosmos.database_name must not be empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(StoreError::invalid("cosmos.request_timeout_ms must be > 0"));
        }
        if self.max_item_count == 0 {
            return Err(StoreError::invalid("cosmos.max_item_count must be > 0"));
        }
        if let Some(c) = self.collections.iter().find(|c| c.reserve_units == 0) {
            return Err(StoreError::invalid(format!(
                "cosmos.collections: reserve_units for {} must be > 0",
                c.collection
            )));
        }
        Ok(())
    }

    /// The configured database name, or the default.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.database_name
            .as_deref()
            .unwrap_or(DEFAULT_DATABASE_NAME)
    }

    /// Reserved throughput for a collection.
    #[must_use]
    pub fn reserve_units_for(&self, collection: CollectionName) -> u32 {
        self.collections
            .iter()
            .find(|c| c.collection == collection)
            .map(|c| c.reserve_units)
            .unwrap_or(DEFAULT_RESERVE_UNITS)
    }

    /// HTTP request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}
