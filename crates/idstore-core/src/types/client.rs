//! OAuth 2.0 / OpenID Connect client registration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::secret::Secret;

// =============================================================================
// Token Settings
// =============================================================================

/// Whether a refresh token handle is reused or rotated on every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenUsage {
    /// The same handle is returned on refresh.
    ReUse,
    /// A new handle is issued on every refresh.
    #[default]
    OneTimeOnly,
}

/// How the refresh token lifetime is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenExpiration {
    /// Lifetime is renewed on every use, bounded by the absolute lifetime.
    Sliding,
    /// Token expires at a fixed point in time.
    #[default]
    Absolute,
}

/// Access token format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessTokenType {
    /// Self-contained JWT.
    #[default]
    Jwt,
    /// Opaque handle backed by a persisted grant.
    Reference,
}

/// A claim emitted for every token issued to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientClaim {
    /// Claim type.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

impl ClientClaim {
    /// Creates a claim.
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// OAuth 2.0 / OIDC client registration.
///
/// Lifetimes are in seconds. Missing fields fall back to the authorization
/// server defaults when deserialised, so seed files only need the fields they
/// care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,
    pub protocol_type: String,
    pub enabled: bool,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub client_uri: Option<String>,
    pub logo_uri: Option<String>,

    pub client_secrets: Vec<Secret>,
    pub require_client_secret: bool,

    pub require_consent: bool,
    pub allow_remember_consent: bool,
    pub consent_lifetime: Option<i32>,

    pub allowed_grant_types: Vec<String>,
    pub require_pkce: bool,
    pub allow_plain_text_pkce: bool,
    pub allow_access_tokens_via_browser: bool,
    pub allow_offline_access: bool,

    pub redirect_uris: Vec<String>,
    pub post_logout_redirect_uris: Vec<String>,
    pub front_channel_logout_uri: Option<String>,
    pub allowed_scopes: Vec<String>,
    pub allowed_cors_origins: Vec<String>,

    pub identity_token_lifetime: i32,
    pub access_token_lifetime: i32,
    pub authorization_code_lifetime: i32,
    pub absolute_refresh_token_lifetime: i32,
    pub sliding_refresh_token_lifetime: i32,
    pub refresh_token_usage: TokenUsage,
    pub refresh_token_expiration: TokenExpiration,
    pub update_access_token_claims_on_refresh: bool,
    pub access_token_type: AccessTokenType,

    pub enable_local_login: bool,
    pub identity_provider_restrictions: Vec<String>,

    pub claims: Vec<ClientClaim>,
    pub always_send_client_claims: bool,
    pub client_claims_prefix: String,

    /// Free-form key/value settings.
    pub properties: BTreeMap<String, String>,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            protocol_type: "oidc".to_string(),
            enabled: true,
            client_name: None,
            description: None,
            client_uri: None,
            logo_uri: None,
            client_secrets: Vec::new(),
            require_client_secret: true,
            require_consent: true,
            allow_remember_consent: true,
            consent_lifetime: None,
            allowed_grant_types: Vec::new(),
            require_pkce: false,
            allow_plain_text_pkce: false,
            allow_access_tokens_via_browser: false,
            allow_offline_access: false,
            redirect_uris: Vec::new(),
            post_logout_redirect_uris: Vec::new(),
            front_channel_logout_uri: None,
            allowed_scopes: Vec::new(),
            allowed_cors_origins: Vec::new(),
            identity_token_lifetime: 300,
            access_token_lifetime: 3600,
            authorization_code_lifetime: 300,
            absolute_refresh_token_lifetime: 2_592_000,
            sliding_refresh_token_lifetime: 1_296_000,
            refresh_token_usage: TokenUsage::default(),
            refresh_token_expiration: TokenExpiration::default(),
            update_access_token_claims_on_refresh: false,
            access_token_type: AccessTokenType::default(),
            enable_local_login: true,
            identity_provider_restrictions: Vec::new(),
            claims: Vec::new(),
            always_send_client_claims: false,
            client_claims_prefix: "client_".to_string(),
            properties: BTreeMap::new(),
        }
    }
}

impl Client {
    /// Creates a client with default settings.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if the client may use the given grant type.
    #[must_use]
    pub fn allows_grant_type(&self, grant_type: &str) -> bool {
        self.allowed_grant_types.iter().any(|g| g == grant_type)
    }

    /// Returns `true` if the client may request the given scope.
    #[must_use]
    pub fn allows_scope(&self, scope: &str) -> bool {
        self.allowed_scopes.iter().any(|s| s == scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_on_partial_json() {
        let client: Client =
            serde_json::from_str(r#"{"clientId":"spa","allowedScopes":["openid"]}"#).unwrap();
        assert_eq!(client.client_id, "spa");
        assert!(client.enabled);
        assert_eq!(client.access_token_lifetime, 3600);
        assert_eq!(client.refresh_token_usage, TokenUsage::OneTimeOnly);
        assert!(client.allows_scope("openid"));
        assert!(!client.allows_scope("api1"));
    }

    #[test]
    fn test_grant_type_check() {
        let mut client = Client::new("svc");
        client.allowed_grant_types = vec!["client_credentials".into()];
        assert!(client.allows_grant_type("client_credentials"));
        assert!(!client.allows_grant_type("authorization_code"));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_value(TokenUsage::OneTimeOnly).unwrap(),
            serde_json::json!("oneTimeOnly")
        );
        assert_eq!(
            serde_json::to_value(AccessTokenType::Reference).unwrap(),
            serde_json::json!("reference")
        );
    }
}
