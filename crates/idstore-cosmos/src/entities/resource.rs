use serde::{Deserialize, Serialize};

use super::{Document, PropertyEntity, SecretEntity, UserClaimEntity};

/// Stored API resource document (container `apiResources`, partition `/name`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceEntity {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub enabled: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub secrets: Vec<SecretEntity>,
    #[serde(default)]
    pub scopes: Vec<ApiScopeEntity>,
    #[serde(default)]
    pub user_claims: Vec<UserClaimEntity>,
    #[serde(default)]
    pub properties: Vec<PropertyEntity>,
}

impl ApiResourceEntity {
    pub fn has_any_scope<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.scopes
            .iter()
            .any(|scope| names.iter().any(|n| n.as_ref() == scope.name))
    }
}

impl Document for ApiResourceEntity {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn partition_key(&self) -> &str {
        &self.name
    }
}

/// Scope nested inside an [`ApiResourceEntity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiScopeEntity {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub emphasize: bool,
    #[serde(default = "default_true")]
    pub show_in_discovery_document: bool,
    #[serde(default)]
    pub user_claims: Vec<UserClaimEntity>,
}

/// Stored identity resource document (container `identityResources`,
/// partition `/name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResourceEntity {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub enabled: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub emphasize: bool,
    #[serde(default = "default_true")]
    pub show_in_discovery_document: bool,
    #[serde(default)]
    pub user_claims: Vec<UserClaimEntity>,
    #[serde(default)]
    pub properties: Vec<PropertyEntity>,
}

impl Document for IdentityResourceEntity {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn partition_key(&self) -> &str {
        &self.name
    }
}

fn default_true() -> bool {
    true
}
