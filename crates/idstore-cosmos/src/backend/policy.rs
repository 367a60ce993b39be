//! Container definitions in the wire shape of the Cosmos DB REST API.

use serde::{Deserialize, Serialize};

/// Body of a create-collection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerProperties {
    pub id: String,
    pub partition_key: PartitionKeyDefinition,
    pub indexing_policy: IndexingPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_key_policy: Option<UniqueKeyPolicy>,
}

impl ContainerProperties {
    pub fn new(id: impl Into<String>, partition_key: PartitionKeyDefinition) -> Self {
        Self {
            id: id.into(),
            partition_key,
            indexing_policy: IndexingPolicy::consistent(),
            unique_key_policy: None,
        }
    }

    #[must_use]
    pub fn with_indexing_policy(mut self, policy: IndexingPolicy) -> Self {
        self.indexing_policy = policy;
        self
    }

    #[must_use]
    pub fn with_unique_key_policy(mut self, policy: UniqueKeyPolicy) -> Self {
        self.unique_key_policy = Some(policy);
        self
    }

    /// Property name of the (single-path) partition key, without the slash.
    #[must_use]
    pub fn partition_key_property(&self) -> &str {
        self.partition_key
            .paths
            .first()
            .map(|p| p.trim_start_matches('/'))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyDefinition {
    pub paths: Vec<String>,
    pub kind: PartitionKind,
}

impl PartitionKeyDefinition {
    pub fn hash(path: impl Into<String>) -> Self {
        Self {
            paths: vec![path.into()],
            kind: PartitionKind::Hash,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionKind {
    Hash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexingMode {
    Consistent,
    Lazy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingPolicy {
    pub automatic: bool,
    pub indexing_mode: IndexingMode,
    #[serde(default)]
    pub included_paths: Vec<IncludedPath>,
    #[serde(default)]
    pub excluded_paths: Vec<ExcludedPath>,
}

impl IndexingPolicy {
    /// Automatic, consistent indexing of every path.
    pub fn consistent() -> Self {
        Self {
            automatic: true,
            indexing_mode: IndexingMode::Consistent,
            included_paths: vec![IncludedPath::new("/*")],
            excluded_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedPath {
    pub path: String,
}

impl IncludedPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedPath {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueKeyPolicy {
    pub unique_keys: Vec<UniqueKey>,
}

/// Combination of paths whose values must be unique within a logical partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKey {
    pub paths: Vec<String>,
}

impl UniqueKey {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let props = ContainerProperties::new(
            "persistedGrants",
            PartitionKeyDefinition::hash("/clientId"),
        )
        .with_unique_key_policy(UniqueKeyPolicy {
            unique_keys: vec![UniqueKey::new(["/clientId", "/subjectId", "/type"])],
        });

        assert_json_eq!(
            serde_json::to_value(&props).unwrap(),
            json!({
                "id": "persistedGrants",
                "partitionKey": { "paths": ["/clientId"], "kind": "Hash" },
                "indexingPolicy": {
                    "automatic": true,
                    "indexingMode": "consistent",
                    "includedPaths": [{ "path": "/*" }],
                    "excludedPaths": []
                },
                "uniqueKeyPolicy": {
                    "uniqueKeys": [{ "paths": ["/clientId", "/subjectId", "/type"] }]
                }
            })
        );
    }

    #[test]
    fn test_partition_key_property() {
        let props = ContainerProperties::new("clients", PartitionKeyDefinition::hash("/clientId"));
        assert_eq!(props.partition_key_property(), "clientId");
    }
}
