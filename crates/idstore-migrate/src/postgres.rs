//! PostgreSQL source over the IdentityServer Entity Framework schema.
//!
//! Parent tables are read once, child tables once each, and children are
//! attached by foreign key in memory. Rows are converted into stored entity
//! shapes first (integer enum codes, nested child records) and then into
//! domain models through the regular entity mappers.

use std::collections::HashMap;

use async_trait::async_trait;
use idstore_core::{ApiResource, Client, IdentityResource};
use idstore_cosmos::entities::{
    ApiResourceEntity, ApiScopeEntity, ClientClaimEntity, ClientCorsOriginEntity, ClientEntity,
    ClientGrantTypeEntity, ClientIdpRestrictionEntity, ClientPostLogoutRedirectUriEntity,
    ClientRedirectUriEntity, ClientScopeEntity, IdentityResourceEntity, PropertyEntity,
    SecretEntity, UserClaimEntity,
};
use sqlx_core::pool::{Pool, PoolOptions};
use sqlx_core::query::query;
use sqlx_core::row::Row;
use sqlx_postgres::{PgRow, Postgres};
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

use crate::{ConfigurationSource, MigrationError};

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

type Grouped<T> = HashMap<i32, Vec<T>>;
type RowMapper<T> = fn(&PgRow) -> Result<(i32, T), sqlx_core::Error>;

// =============================================================================
// Queries
// =============================================================================

const CLIENTS_SQL: &str = r#"
    SELECT "Id", "Enabled", "ClientId", "ProtocolType", "RequireClientSecret",
           "ClientName", "Description", "ClientUri", "LogoUri", "RequireConsent",
           "AllowRememberConsent", "RequirePkce", "AllowPlainTextPkce",
           "AllowAccessTokensViaBrowser", "FrontChannelLogoutUri", "AllowOfflineAccess",
           "IdentityTokenLifetime", "AccessTokenLifetime", "AuthorizationCodeLifetime",
           "ConsentLifetime", "AbsoluteRefreshTokenLifetime", "SlidingRefreshTokenLifetime",
           "RefreshTokenUsage", "UpdateAccessTokenClaimsOnRefresh", "RefreshTokenExpiration",
           "AccessTokenType", "EnableLocalLogin", "AlwaysSendClientClaims", "ClientClaimsPrefix"
    FROM "Clients"
    ORDER BY "Id"
"#;

const CLIENT_SECRETS_SQL: &str = r#"
    SELECT "ClientId", "Description", "Value", "Expiration", "Type"
    FROM "ClientSecrets"
    ORDER BY "Id"
"#;
const CLIENT_GRANT_TYPES_SQL: &str =
    r#"SELECT "ClientId", "GrantType" FROM "ClientGrantTypes" ORDER BY "Id""#;
const CLIENT_REDIRECT_URIS_SQL: &str =
    r#"SELECT "ClientId", "RedirectUri" FROM "ClientRedirectUris" ORDER BY "Id""#;
const CLIENT_POST_LOGOUT_URIS_SQL: &str = r#"
    SELECT "ClientId", "PostLogoutRedirectUri"
    FROM "ClientPostLogoutRedirectUris"
    ORDER BY "Id"
"#;
const CLIENT_SCOPES_SQL: &str = r#"SELECT "ClientId", "Scope" FROM "ClientScopes" ORDER BY "Id""#;
const CLIENT_CORS_ORIGINS_SQL: &str =
    r#"SELECT "ClientId", "Origin" FROM "ClientCorsOrigins" ORDER BY "Id""#;
const CLIENT_IDP_RESTRICTIONS_SQL: &str =
    r#"SELECT "ClientId", "Provider" FROM "ClientIdPRestrictions" ORDER BY "Id""#;
const CLIENT_CLAIMS_SQL: &str =
    r#"SELECT "ClientId", "Type", "Value" FROM "ClientClaims" ORDER BY "Id""#;
const CLIENT_PROPERTIES_SQL: &str =
    r#"SELECT "ClientId", "Key", "Value" FROM "ClientProperties" ORDER BY "Id""#;

const API_RESOURCES_SQL: &str = r#"
    SELECT "Id", "Enabled", "Name", "DisplayName", "Description"
    FROM "ApiResources"
    ORDER BY "Id"
"#;
const API_SECRETS_SQL: &str = r#"
    SELECT "ApiResourceId", "Description", "Value", "Expiration", "Type"
    FROM "ApiSecrets"
    ORDER BY "Id"
"#;
const API_SCOPES_SQL: &str = r#"
    SELECT "Id", "ApiResourceId", "Name", "DisplayName", "Description", "Required",
           "Emphasize", "ShowInDiscoveryDocument"
    FROM "ApiScopes"
    ORDER BY "Id"
"#;
const API_SCOPE_CLAIMS_SQL: &str =
    r#"SELECT "ApiScopeId", "Type" FROM "ApiScopeClaims" ORDER BY "Id""#;
const API_CLAIMS_SQL: &str = r#"SELECT "ApiResourceId", "Type" FROM "ApiClaims" ORDER BY "Id""#;
const API_PROPERTIES_SQL: &str =
    r#"SELECT "ApiResourceId", "Key", "Value" FROM "ApiProperties" ORDER BY "Id""#;

const IDENTITY_RESOURCES_SQL: &str = r#"
    SELECT "Id", "Enabled", "Name", "DisplayName", "Description", "Required",
           "Emphasize", "ShowInDiscoveryDocument"
    FROM "IdentityResources"
    ORDER BY "Id"
"#;
const IDENTITY_CLAIMS_SQL: &str =
    r#"SELECT "IdentityResourceId", "Type" FROM "IdentityClaims" ORDER BY "Id""#;
const IDENTITY_PROPERTIES_SQL: &str =
    r#"SELECT "IdentityResourceId", "Key", "Value" FROM "IdentityProperties" ORDER BY "Id""#;

// =============================================================================
// Source
// =============================================================================

/// Reads configuration from an IdentityServer EF database on PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    /// Create a source with an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a source by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, MigrationError> {
        let pool = PoolOptions::<Postgres>::new()
            .max_connections(4)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    async fn rows(&self, sql: &'static str) -> Result<Vec<PgRow>, MigrationError> {
        Ok(query(sql).fetch_all(&self.pool).await?)
    }

    /// Loads a child table grouped by its foreign key column.
    async fn grouped<T>(
        &self,
        sql: &'static str,
        map: RowMapper<T>,
    ) -> Result<Grouped<T>, MigrationError> {
        let mut grouped: Grouped<T> = HashMap::new();
        for row in &self.rows(sql).await? {
            let (parent, item) = map(row)?;
            grouped.entry(parent).or_default().push(item);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl ConfigurationSource for PostgresSource {
    async fn clients(&self) -> Result<Vec<Client>, MigrationError> {
        let mut secrets = self.grouped(CLIENT_SECRETS_SQL, secret_row).await?;
        let mut grant_types = self
            .grouped(CLIENT_GRANT_TYPES_SQL, |row| {
                Ok((
                    row.try_get("ClientId")?,
                    ClientGrantTypeEntity {
                        grant_type: row.try_get("GrantType")?,
                    },
                ))
            })
            .await?;
        let mut redirect_uris = self
            .grouped(CLIENT_REDIRECT_URIS_SQL, |row| {
                Ok((
                    row.try_get("ClientId")?,
                    ClientRedirectUriEntity {
                        redirect_uri: row.try_get("RedirectUri")?,
                    },
                ))
            })
            .await?;
        let mut post_logout_uris = self
            .grouped(CLIENT_POST_LOGOUT_URIS_SQL, |row| {
                Ok((
                    row.try_get("ClientId")?,
                    ClientPostLogoutRedirectUriEntity {
                        post_logout_redirect_uri: row.try_get("PostLogoutRedirectUri")?,
                    },
                ))
            })
            .await?;
        let mut scopes = self
            .grouped(CLIENT_SCOPES_SQL, |row| {
                Ok((
                    row.try_get("ClientId")?,
                    ClientScopeEntity {
                        scope: row.try_get("Scope")?,
                    },
                ))
            })
            .await?;
        let mut cors_origins = self
            .grouped(CLIENT_CORS_ORIGINS_SQL, |row| {
                Ok((
                    row.try_get("ClientId")?,
                    ClientCorsOriginEntity {
                        origin: row.try_get("Origin")?,
                    },
                ))
            })
            .await?;
        let mut idp_restrictions = self
            .grouped(CLIENT_IDP_RESTRICTIONS_SQL, |row| {
                Ok((
                    row.try_get("ClientId")?,
                    ClientIdpRestrictionEntity {
                        provider: row.try_get("Provider")?,
                    },
                ))
            })
            .await?;
        let mut claims = self
            .grouped(CLIENT_CLAIMS_SQL, |row| {
                Ok((
                    row.try_get("ClientId")?,
                    ClientClaimEntity {
                        claim_type: row.try_get("Type")?,
                        value: row.try_get("Value")?,
                    },
                ))
            })
            .await?;
        let mut properties = self
            .grouped(CLIENT_PROPERTIES_SQL, |row| {
                Ok((row.try_get("ClientId")?, property(row)?))
            })
            .await?;

        let mut clients = Vec::new();
        for row in &self.rows(CLIENTS_SQL).await? {
            let (id, mut entity) = client_row(row)?;
            entity.client_secrets = secrets.remove(&id).unwrap_or_default();
            entity.allowed_grant_types = grant_types.remove(&id).unwrap_or_default();
            entity.redirect_uris = redirect_uris.remove(&id).unwrap_or_default();
            entity.post_logout_redirect_uris = post_logout_uris.remove(&id).unwrap_or_default();
            entity.allowed_scopes = scopes.remove(&id).unwrap_or_default();
            entity.allowed_cors_origins = cors_origins.remove(&id).unwrap_or_default();
            entity.identity_provider_restrictions =
                idp_restrictions.remove(&id).unwrap_or_default();
            entity.claims = claims.remove(&id).unwrap_or_default();
            entity.properties = properties.remove(&id).unwrap_or_default();
            clients.push(Client::from(entity));
        }

        debug!(count = clients.len(), "loaded clients");
        Ok(clients)
    }

    async fn api_resources(&self) -> Result<Vec<ApiResource>, MigrationError> {
        let mut secrets = self.grouped(API_SECRETS_SQL, secret_row).await?;
        let mut claims = self
            .grouped(API_CLAIMS_SQL, |row| {
                Ok((row.try_get("ApiResourceId")?, user_claim(row)?))
            })
            .await?;
        let mut properties = self
            .grouped(API_PROPERTIES_SQL, |row| {
                Ok((row.try_get("ApiResourceId")?, property(row)?))
            })
            .await?;
        let mut scope_claims = self
            .grouped(API_SCOPE_CLAIMS_SQL, |row| {
                Ok((row.try_get("ApiScopeId")?, user_claim(row)?))
            })
            .await?;

        let mut scopes: Grouped<ApiScopeEntity> = HashMap::new();
        for row in &self.rows(API_SCOPES_SQL).await? {
            let scope_id: i32 = row.try_get("Id")?;
            let resource_id: i32 = row.try_get("ApiResourceId")?;
            scopes.entry(resource_id).or_default().push(ApiScopeEntity {
                name: row.try_get("Name")?,
                display_name: row.try_get("DisplayName")?,
                description: row.try_get("Description")?,
                required: row.try_get("Required")?,
                emphasize: row.try_get("Emphasize")?,
                show_in_discovery_document: row.try_get("ShowInDiscoveryDocument")?,
                user_claims: scope_claims.remove(&scope_id).unwrap_or_default(),
            });
        }

        let mut resources = Vec::new();
        for row in &self.rows(API_RESOURCES_SQL).await? {
            let id: i32 = row.try_get("Id")?;
            let entity = ApiResourceEntity {
                id: String::new(),
                name: row.try_get("Name")?,
                enabled: row.try_get("Enabled")?,
                display_name: row.try_get("DisplayName")?,
                description: row.try_get("Description")?,
                secrets: secrets.remove(&id).unwrap_or_default(),
                scopes: scopes.remove(&id).unwrap_or_default(),
                user_claims: claims.remove(&id).unwrap_or_default(),
                properties: properties.remove(&id).unwrap_or_default(),
            };
            resources.push(ApiResource::from(entity));
        }

        debug!(count = resources.len(), "loaded api resources");
        Ok(resources)
    }

    async fn identity_resources(&self) -> Result<Vec<IdentityResource>, MigrationError> {
        let mut claims = self
            .grouped(IDENTITY_CLAIMS_SQL, |row| {
                Ok((row.try_get("IdentityResourceId")?, user_claim(row)?))
            })
            .await?;
        let mut properties = self
            .grouped(IDENTITY_PROPERTIES_SQL, |row| {
                Ok((row.try_get("IdentityResourceId")?, property(row)?))
            })
            .await?;

        let mut resources = Vec::new();
        for row in &self.rows(IDENTITY_RESOURCES_SQL).await? {
            let id: i32 = row.try_get("Id")?;
            let entity = IdentityResourceEntity {
                id: String::new(),
                name: row.try_get("Name")?,
                enabled: row.try_get("Enabled")?,
                display_name: row.try_get("DisplayName")?,
                description: row.try_get("Description")?,
                required: row.try_get("Required")?,
                emphasize: row.try_get("Emphasize")?,
                show_in_discovery_document: row.try_get("ShowInDiscoveryDocument")?,
                user_claims: claims.remove(&id).unwrap_or_default(),
                properties: properties.remove(&id).unwrap_or_default(),
            };
            resources.push(IdentityResource::from(entity));
        }

        debug!(count = resources.len(), "loaded identity resources");
        Ok(resources)
    }
}

// =============================================================================
// Row mapping
// =============================================================================

fn client_row(row: &PgRow) -> Result<(i32, ClientEntity), sqlx_core::Error> {
    let entity = ClientEntity {
        id: String::new(),
        client_id: row.try_get("ClientId")?,
        protocol_type: row.try_get("ProtocolType")?,
        enabled: row.try_get("Enabled")?,
        client_name: row.try_get("ClientName")?,
        description: row.try_get("Description")?,
        client_uri: row.try_get("ClientUri")?,
        logo_uri: row.try_get("LogoUri")?,
        client_secrets: Vec::new(),
        require_client_secret: row.try_get("RequireClientSecret")?,
        require_consent: row.try_get("RequireConsent")?,
        allow_remember_consent: row.try_get("AllowRememberConsent")?,
        consent_lifetime: row.try_get("ConsentLifetime")?,
        allowed_grant_types: Vec::new(),
        require_pkce: row.try_get("RequirePkce")?,
        allow_plain_text_pkce: row.try_get("AllowPlainTextPkce")?,
        allow_access_tokens_via_browser: row.try_get("AllowAccessTokensViaBrowser")?,
        allow_offline_access: row.try_get("AllowOfflineAccess")?,
        redirect_uris: Vec::new(),
        post_logout_redirect_uris: Vec::new(),
        front_channel_logout_uri: row.try_get("FrontChannelLogoutUri")?,
        allowed_scopes: Vec::new(),
        allowed_cors_origins: Vec::new(),
        identity_token_lifetime: row.try_get("IdentityTokenLifetime")?,
        access_token_lifetime: row.try_get("AccessTokenLifetime")?,
        authorization_code_lifetime: row.try_get("AuthorizationCodeLifetime")?,
        absolute_refresh_token_lifetime: row.try_get("AbsoluteRefreshTokenLifetime")?,
        sliding_refresh_token_lifetime: row.try_get("SlidingRefreshTokenLifetime")?,
        refresh_token_usage: row.try_get("RefreshTokenUsage")?,
        refresh_token_expiration: row.try_get("RefreshTokenExpiration")?,
        update_access_token_claims_on_refresh: row.try_get("UpdateAccessTokenClaimsOnRefresh")?,
        access_token_type: row.try_get("AccessTokenType")?,
        enable_local_login: row.try_get("EnableLocalLogin")?,
        identity_provider_restrictions: Vec::new(),
        claims: Vec::new(),
        always_send_client_claims: row.try_get("AlwaysSendClientClaims")?,
        client_claims_prefix: row.try_get("ClientClaimsPrefix")?,
        properties: Vec::new(),
    };
    Ok((row.try_get("Id")?, entity))
}

/// `ClientSecrets` and `ApiSecrets` share a layout apart from the key column,
/// which is always selected first.
fn secret_row(row: &PgRow) -> Result<(i32, SecretEntity), sqlx_core::Error> {
    let secret = SecretEntity {
        description: row.try_get("Description")?,
        value: row.try_get("Value")?,
        expiration: timestamp(row, "Expiration")?,
        secret_type: row.try_get("Type")?,
    };
    Ok((row.try_get(0_usize)?, secret))
}

fn user_claim(row: &PgRow) -> Result<UserClaimEntity, sqlx_core::Error> {
    Ok(UserClaimEntity {
        claim_type: row.try_get("Type")?,
    })
}

fn property(row: &PgRow) -> Result<PropertyEntity, sqlx_core::Error> {
    Ok(PropertyEntity {
        key: row.try_get("Key")?,
        value: row.try_get("Value")?,
    })
}

/// Reads a `timestamptz` or `timestamp` column; the latter is taken as UTC.
fn timestamp(row: &PgRow, column: &str) -> Result<Option<OffsetDateTime>, sqlx_core::Error> {
    match row.try_get::<Option<OffsetDateTime>, _>(column) {
        Ok(value) => Ok(value),
        Err(sqlx_core::Error::ColumnDecode { .. }) => Ok(row
            .try_get::<Option<PrimitiveDateTime>, _>(column)?
            .map(PrimitiveDateTime::assume_utc)),
        Err(e) => Err(e),
    }
}
