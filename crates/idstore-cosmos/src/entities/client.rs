use serde::{Deserialize, Serialize};

use super::{Document, PropertyEntity, SecretEntity};

/// Stored client document (container `clients`, partition `/clientId`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientEntity {
    #[serde(default)]
    pub id: String,
    pub client_id: String,
    pub protocol_type: String,
    pub enabled: bool,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_uri: Option<String>,
    #[serde(default)]
    pub logo_uri: Option<String>,

    #[serde(default)]
    pub client_secrets: Vec<SecretEntity>,
    pub require_client_secret: bool,

    pub require_consent: bool,
    pub allow_remember_consent: bool,
    #[serde(default)]
    pub consent_lifetime: Option<i32>,

    #[serde(default)]
    pub allowed_grant_types: Vec<ClientGrantTypeEntity>,
    pub require_pkce: bool,
    pub allow_plain_text_pkce: bool,
    pub allow_access_tokens_via_browser: bool,
    pub allow_offline_access: bool,

    #[serde(default)]
    pub redirect_uris: Vec<ClientRedirectUriEntity>,
    #[serde(default)]
    pub post_logout_redirect_uris: Vec<ClientPostLogoutRedirectUriEntity>,
    #[serde(default)]
    pub front_channel_logout_uri: Option<String>,
    #[serde(default)]
    pub allowed_scopes: Vec<ClientScopeEntity>,
    #[serde(default)]
    pub allowed_cors_origins: Vec<ClientCorsOriginEntity>,

    pub identity_token_lifetime: i32,
    pub access_token_lifetime: i32,
    pub authorization_code_lifetime: i32,
    pub absolute_refresh_token_lifetime: i32,
    pub sliding_refresh_token_lifetime: i32,
    /// 0 = re-use, 1 = one time only.
    pub refresh_token_usage: i32,
    /// 0 = sliding, 1 = absolute.
    pub refresh_token_expiration: i32,
    pub update_access_token_claims_on_refresh: bool,
    /// 0 = JWT, 1 = reference.
    pub access_token_type: i32,

    pub enable_local_login: bool,
    #[serde(default)]
    pub identity_provider_restrictions: Vec<ClientIdpRestrictionEntity>,

    #[serde(default)]
    pub claims: Vec<ClientClaimEntity>,
    pub always_send_client_claims: bool,
    #[serde(default)]
    pub client_claims_prefix: Option<String>,

    #[serde(default)]
    pub properties: Vec<PropertyEntity>,
}

impl Document for ClientEntity {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn partition_key(&self) -> &str {
        &self.client_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientGrantTypeEntity {
    pub grant_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRedirectUriEntity {
    pub redirect_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPostLogoutRedirectUriEntity {
    pub post_logout_redirect_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientScopeEntity {
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCorsOriginEntity {
    pub origin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdpRestrictionEntity {
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientClaimEntity {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}
