//! Shared secret type for clients and API resources.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Secret type for plain shared secrets (stored hashed).
pub const SHARED_SECRET: &str = "SharedSecret";

/// A client or API secret.
///
/// `value` holds whatever the authorization server persisted (normally a
/// SHA-256 hash); this layer never hashes or compares secrets itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    /// Stored secret value.
    pub value: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the secret stops being accepted.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expiration: Option<OffsetDateTime>,

    /// Secret type, e.g. `SharedSecret` or `X509Thumbprint`.
    #[serde(rename = "type", default = "default_secret_type")]
    pub secret_type: String,
}

fn default_secret_type() -> String {
    SHARED_SECRET.to_string()
}

impl Secret {
    /// Creates a shared secret with the given (already hashed) value.
    #[must_use]
    pub fn shared(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
            expiration: None,
            secret_type: default_secret_type(),
        }
    }

    /// Returns `true` if the secret has an expiration in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expiration
            .map(|exp| exp < OffsetDateTime::now_utc())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_shared_secret_defaults() {
        let secret = Secret::shared("abc");
        assert_eq!(secret.secret_type, SHARED_SECRET);
        assert!(!secret.is_expired());
    }

    #[test]
    fn test_expired_secret() {
        let mut secret = Secret::shared("abc");
        secret.expiration = Some(OffsetDateTime::now_utc() - Duration::minutes(1));
        assert!(secret.is_expired());
    }

    #[test]
    fn test_missing_type_defaults_on_deserialize() {
        let secret: Secret = serde_json::from_str(r#"{"value":"x"}"#).unwrap();
        assert_eq!(secret.secret_type, SHARED_SECRET);
    }
}
