use idstore_core::{AccessTokenType, Client, ClientClaim, TokenExpiration, TokenUsage};

use super::{properties_from_entities, properties_to_entities};
use crate::entities::{
    ClientClaimEntity, ClientCorsOriginEntity, ClientEntity, ClientGrantTypeEntity,
    ClientIdpRestrictionEntity, ClientPostLogoutRedirectUriEntity, ClientRedirectUriEntity,
    ClientScopeEntity,
};

// ---- Enum codes ----

fn token_usage_code(usage: TokenUsage) -> i32 {
    match usage {
        TokenUsage::ReUse => 0,
        TokenUsage::OneTimeOnly => 1,
    }
}

fn token_usage_from_code(code: i32) -> TokenUsage {
    match code {
        0 => TokenUsage::ReUse,
        1 => TokenUsage::OneTimeOnly,
        _ => TokenUsage::default(),
    }
}

fn token_expiration_code(expiration: TokenExpiration) -> i32 {
    match expiration {
        TokenExpiration::Sliding => 0,
        TokenExpiration::Absolute => 1,
    }
}

fn token_expiration_from_code(code: i32) -> TokenExpiration {
    match code {
        0 => TokenExpiration::Sliding,
        1 => TokenExpiration::Absolute,
        _ => TokenExpiration::default(),
    }
}

fn access_token_type_code(token_type: AccessTokenType) -> i32 {
    match token_type {
        AccessTokenType::Jwt => 0,
        AccessTokenType::Reference => 1,
    }
}

fn access_token_type_from_code(code: i32) -> AccessTokenType {
    match code {
        0 => AccessTokenType::Jwt,
        1 => AccessTokenType::Reference,
        _ => AccessTokenType::default(),
    }
}

// ---- Client ----

impl From<&Client> for ClientEntity {
    fn from(client: &Client) -> Self {
        Self {
            id: String::new(),
            client_id: client.client_id.clone(),
            protocol_type: client.protocol_type.clone(),
            enabled: client.enabled,
            client_name: client.client_name.clone(),
            description: client.description.clone(),
            client_uri: client.client_uri.clone(),
            logo_uri: client.logo_uri.clone(),
            client_secrets: client.client_secrets.iter().map(Into::into).collect(),
            require_client_secret: client.require_client_secret,
            require_consent: client.require_consent,
            allow_remember_consent: client.allow_remember_consent,
            consent_lifetime: client.consent_lifetime,
            allowed_grant_types: client
                .allowed_grant_types
                .iter()
                .map(|grant_type| ClientGrantTypeEntity {
                    grant_type: grant_type.clone(),
                })
                .collect(),
            require_pkce: client.require_pkce,
            allow_plain_text_pkce: client.allow_plain_text_pkce,
            allow_access_tokens_via_browser: client.allow_access_tokens_via_browser,
            allow_offline_access: client.allow_offline_access,
            redirect_uris: client
                .redirect_uris
                .iter()
                .map(|uri| ClientRedirectUriEntity {
                    redirect_uri: uri.clone(),
                })
                .collect(),
            post_logout_redirect_uris: client
                .post_logout_redirect_uris
                .iter()
                .map(|uri| ClientPostLogoutRedirectUriEntity {
                    post_logout_redirect_uri: uri.clone(),
                })
                .collect(),
            front_channel_logout_uri: client.front_channel_logout_uri.clone(),
            allowed_scopes: client
                .allowed_scopes
                .iter()
                .map(|scope| ClientScopeEntity {
                    scope: scope.clone(),
                })
                .collect(),
            allowed_cors_origins: client
                .allowed_cors_origins
                .iter()
                .map(|origin| ClientCorsOriginEntity {
                    origin: origin.clone(),
                })
                .collect(),
            identity_token_lifetime: client.identity_token_lifetime,
            access_token_lifetime: client.access_token_lifetime,
            authorization_code_lifetime: client.authorization_code_lifetime,
            absolute_refresh_token_lifetime: client.absolute_refresh_token_lifetime,
            sliding_refresh_token_lifetime: client.sliding_refresh_token_lifetime,
            refresh_token_usage: token_usage_code(client.refresh_token_usage),
            refresh_token_expiration: token_expiration_code(client.refresh_token_expiration),
            update_access_token_claims_on_refresh: client.update_access_token_claims_on_refresh,
            access_token_type: access_token_type_code(client.access_token_type),
            enable_local_login: client.enable_local_login,
            identity_provider_restrictions: client
                .identity_provider_restrictions
                .iter()
                .map(|provider| ClientIdpRestrictionEntity {
                    provider: provider.clone(),
                })
                .collect(),
            claims: client
                .claims
                .iter()
                .map(|claim| ClientClaimEntity {
                    claim_type: claim.claim_type.clone(),
                    value: claim.value.clone(),
                })
                .collect(),
            always_send_client_claims: client.always_send_client_claims,
            client_claims_prefix: Some(client.client_claims_prefix.clone()),
            properties: properties_to_entities(&client.properties),
        }
    }
}

impl From<ClientEntity> for Client {
    fn from(entity: ClientEntity) -> Self {
        let defaults = Client::default();
        Self {
            client_id: entity.client_id,
            protocol_type: entity.protocol_type,
            enabled: entity.enabled,
            client_name: entity.client_name,
            description: entity.description,
            client_uri: entity.client_uri,
            logo_uri: entity.logo_uri,
            client_secrets: entity.client_secrets.into_iter().map(Into::into).collect(),
            require_client_secret: entity.require_client_secret,
            require_consent: entity.require_consent,
            allow_remember_consent: entity.allow_remember_consent,
            consent_lifetime: entity.consent_lifetime,
            allowed_grant_types: entity
                .allowed_grant_types
                .into_iter()
                .map(|g| g.grant_type)
                .collect(),
            require_pkce: entity.require_pkce,
            allow_plain_text_pkce: entity.allow_plain_text_pkce,
            allow_access_tokens_via_browser: entity.allow_access_tokens_via_browser,
            allow_offline_access: entity.allow_offline_access,
            redirect_uris: entity
                .redirect_uris
                .into_iter()
                .map(|u| u.redirect_uri)
                .collect(),
            post_logout_redirect_uris: entity
                .post_logout_redirect_uris
                .into_iter()
                .map(|u| u.post_logout_redirect_uri)
                .collect(),
            front_channel_logout_uri: entity.front_channel_logout_uri,
            allowed_scopes: entity.allowed_scopes.into_iter().map(|s| s.scope).collect(),
            allowed_cors_origins: entity
                .allowed_cors_origins
                .into_iter()
                .map(|o| o.origin)
                .collect(),
            identity_token_lifetime: entity.identity_token_lifetime,
            access_token_lifetime: entity.access_token_lifetime,
            authorization_code_lifetime: entity.authorization_code_lifetime,
            absolute_refresh_token_lifetime: entity.absolute_refresh_token_lifetime,
            sliding_refresh_token_lifetime: entity.sliding_refresh_token_lifetime,
            refresh_token_usage: token_usage_from_code(entity.refresh_token_usage),
            refresh_token_expiration: token_expiration_from_code(entity.refresh_token_expiration),
            update_access_token_claims_on_refresh: entity.update_access_token_claims_on_refresh,
            access_token_type: access_token_type_from_code(entity.access_token_type),
            enable_local_login: entity.enable_local_login,
            identity_provider_restrictions: entity
                .identity_provider_restrictions
                .into_iter()
                .map(|r| r.provider)
                .collect(),
            claims: entity
                .claims
                .into_iter()
                .map(|c| ClientClaim::new(c.claim_type, c.value))
                .collect(),
            always_send_client_claims: entity.always_send_client_claims,
            client_claims_prefix: entity
                .client_claims_prefix
                .unwrap_or(defaults.client_claims_prefix),
            properties: properties_from_entities(entity.properties),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_client() -> Client {
        let mut client = Client::new("web");
        client.allowed_grant_types = vec!["authorization_code".into()];
        client.allowed_scopes = vec!["openid".into(), "api1".into()];
        client.redirect_uris = vec!["https://app/cb".into()];
        client.refresh_token_usage = TokenUsage::ReUse;
        client.access_token_type = AccessTokenType::Reference;
        client.claims = vec![ClientClaim::new("tenant", "acme")];
        client.properties.insert("theme".into(), "dark".into());
        client
    }

    #[test]
    fn test_nested_document_shape() {
        let entity = ClientEntity::from(&sample_client());
        let json = serde_json::to_value(&entity).unwrap();

        assert_eq!(json["clientId"], "web");
        assert_eq!(json["allowedScopes"][1]["scope"], "api1");
        assert_eq!(json["allowedGrantTypes"][0]["grantType"], "authorization_code");
        assert_eq!(json["redirectUris"][0]["redirectUri"], "https://app/cb");
        assert_eq!(json["claims"][0]["type"], "tenant");
        assert_eq!(json["refreshTokenUsage"], 0);
        assert_eq!(json["accessTokenType"], 1);
    }

    #[test]
    fn test_entity_to_client_preserves_fields() {
        let client = sample_client();
        assert_eq!(Client::from(ClientEntity::from(&client)), client);
    }

    #[test]
    fn test_unknown_enum_code_falls_back() {
        let mut entity = ClientEntity::from(&Client::new("svc"));
        entity.refresh_token_usage = 7;
        entity.access_token_type = -1;
        entity.client_claims_prefix = None;
        let client = Client::from(entity);
        assert_eq!(client.refresh_token_usage, TokenUsage::OneTimeOnly);
        assert_eq!(client.access_token_type, AccessTokenType::Jwt);
        assert_eq!(client.client_claims_prefix, "client_");
    }
}
