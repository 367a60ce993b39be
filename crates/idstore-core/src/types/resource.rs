//! API and identity resource types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::secret::Secret;

// =============================================================================
// Scope
// =============================================================================

/// A scope exposed by an [`ApiResource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scope {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub emphasize: bool,
    pub show_in_discovery_document: bool,
    /// Claim types included in tokens requested with this scope.
    pub user_claims: Vec<String>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            name: String::new(),
            display_name: None,
            description: None,
            required: false,
            emphasize: false,
            show_in_discovery_document: true,
            user_claims: Vec::new(),
        }
    }
}

impl Scope {
    /// Creates a scope with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// =============================================================================
// API Resource
// =============================================================================

/// A protected API and the scopes it exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiResource {
    pub name: String,
    pub enabled: bool,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub api_secrets: Vec<Secret>,
    pub scopes: Vec<Scope>,
    pub user_claims: Vec<String>,
    pub properties: BTreeMap<String, String>,
}

impl Default for ApiResource {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            display_name: None,
            description: None,
            api_secrets: Vec::new(),
            scopes: Vec::new(),
            user_claims: Vec::new(),
            properties: BTreeMap::new(),
        }
    }
}

impl ApiResource {
    /// Creates an API resource exposing a single scope of the same name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            scopes: vec![Scope::new(name.clone())],
            name,
            ..Self::default()
        }
    }

    /// Returns `true` if any of this resource's scopes is named in `names`.
    #[must_use]
    pub fn has_any_scope<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.scopes
            .iter()
            .any(|scope| names.iter().any(|n| n.as_ref() == scope.name))
    }
}

// =============================================================================
// Identity Resource
// =============================================================================

/// An identity scope such as `openid`, `profile` or `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityResource {
    pub name: String,
    pub enabled: bool,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub emphasize: bool,
    pub show_in_discovery_document: bool,
    pub user_claims: Vec<String>,
    pub properties: BTreeMap<String, String>,
}

impl Default for IdentityResource {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            display_name: None,
            description: None,
            required: false,
            emphasize: false,
            show_in_discovery_document: true,
            user_claims: Vec::new(),
            properties: BTreeMap::new(),
        }
    }
}

impl IdentityResource {
    /// Creates an identity resource carrying the given claim types.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, user_claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            user_claims: user_claims.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

// =============================================================================
// Resources
// =============================================================================

/// Every identity and API resource known to the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resources {
    pub identity_resources: Vec<IdentityResource>,
    pub api_resources: Vec<ApiResource>,
}

impl Resources {
    /// Creates a resource set.
    #[must_use]
    pub fn new(identity_resources: Vec<IdentityResource>, api_resources: Vec<ApiResource>) -> Self {
        Self {
            identity_resources,
            api_resources,
        }
    }

    /// Names of all identity resources plus all API scopes, deduplicated.
    #[must_use]
    pub fn scope_names(&self) -> BTreeSet<&str> {
        self.identity_resources
            .iter()
            .map(|r| r.name.as_str())
            .chain(
                self.api_resources
                    .iter()
                    .flat_map(|r| r.scopes.iter().map(|s| s.name.as_str())),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_resource_scope_match() {
        let mut api = ApiResource::new("orders");
        api.scopes.push(Scope::new("orders.read"));

        assert!(api.has_any_scope(&["orders.read"]));
        assert!(api.has_any_scope(&["unknown", "orders"]));
        assert!(!api.has_any_scope(&["billing"]));
        assert!(!api.has_any_scope::<&str>(&[]));
    }

    #[test]
    fn test_scope_names_union() {
        let resources = Resources::new(
            vec![
                IdentityResource::new("openid", ["sub"]),
                IdentityResource::new("profile", ["name"]),
            ],
            vec![ApiResource::new("api1"), ApiResource::new("openid")],
        );
        let names: Vec<&str> = resources.scope_names().into_iter().collect();
        assert_eq!(names, vec!["api1", "openid", "profile"]);
    }

    #[test]
    fn test_identity_resource_defaults() {
        let resource: IdentityResource = serde_json::from_str(r#"{"name":"email"}"#).unwrap();
        assert!(resource.enabled);
        assert!(resource.show_in_discovery_document);
        assert!(resource.user_claims.is_empty());
    }
}
