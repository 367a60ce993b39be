//! The four containers managed by this crate and their policies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::policy::{
    ContainerProperties, IncludedPath, IndexingMode, IndexingPolicy, PartitionKeyDefinition,
    UniqueKey, UniqueKeyPolicy,
};

/// Logical collections, one per record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionName {
    Clients,
    ApiResources,
    IdentityResources,
    PersistedGrants,
}

impl CollectionName {
    /// All collections, in provisioning order.
    pub const ALL: [CollectionName; 4] = [
        Self::Clients,
        Self::IdentityResources,
        Self::ApiResources,
        Self::PersistedGrants,
    ];

    /// Container id in the backend.
    #[must_use]
    pub fn container_id(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::ApiResources => "apiResources",
            Self::IdentityResources => "identityResources",
            Self::PersistedGrants => "persistedGrants",
        }
    }

    /// Partition key path of the container.
    #[must_use]
    pub fn partition_key_path(&self) -> &'static str {
        match self {
            Self::Clients | Self::PersistedGrants => "/clientId",
            Self::ApiResources | Self::IdentityResources => "/name",
        }
    }

    /// Full container definition: partition key, indexing and unique keys.
    #[must_use]
    pub fn container_properties(&self) -> ContainerProperties {
        let properties = ContainerProperties::new(
            self.container_id(),
            PartitionKeyDefinition::hash(self.partition_key_path()),
        );

        match self {
            Self::PersistedGrants => properties
                .with_indexing_policy(IndexingPolicy {
                    automatic: true,
                    indexing_mode: IndexingMode::Consistent,
                    included_paths: vec![
                        IncludedPath::new("/expiration/?"),
                        IncludedPath::new("/*"),
                    ],
                    excluded_paths: Vec::new(),
                })
                .with_unique_key_policy(UniqueKeyPolicy {
                    unique_keys: vec![UniqueKey::new(["/clientId", "/subjectId", "/type"])],
                }),
            _ => properties.with_indexing_policy(IndexingPolicy::consistent()),
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.container_id())
    }
}
