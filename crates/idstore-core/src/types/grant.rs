//! Persisted grant domain type.
//!
//! A persisted grant is the server-side half of an issued artifact: a refresh
//! token, an authorization code, a reference access token or a consent
//! decision. The payload is opaque to the storage layer.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Grant type used for authorization codes.
pub const AUTHORIZATION_CODE: &str = "authorization_code";
/// Grant type used for reference access tokens.
pub const REFERENCE_TOKEN: &str = "reference_token";
/// Grant type used for refresh tokens.
pub const REFRESH_TOKEN: &str = "refresh_token";
/// Grant type used for remembered user consent.
pub const USER_CONSENT: &str = "user_consent";

/// Server-side record behind an issued token or consent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedGrant {
    /// Lookup handle (usually a hash of the token value).
    pub key: String,

    /// Grant type, e.g. `refresh_token`.
    #[serde(rename = "type")]
    pub grant_type: String,

    /// Subject (end user) the grant was issued for.
    pub subject_id: String,

    /// Client the grant was issued to.
    pub client_id: String,

    /// When the grant was created.
    #[serde(with = "time::serde::rfc3339")]
    pub creation_time: OffsetDateTime,

    /// When the grant expires; `None` means it never expires.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expiration: Option<OffsetDateTime>,

    /// Opaque serialized payload.
    pub data: String,
}

impl PersistedGrant {
    /// Returns `true` if the grant expired before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expiration.map(|exp| exp < now).unwrap_or(false)
    }

    /// Returns `true` if the grant has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }
}
