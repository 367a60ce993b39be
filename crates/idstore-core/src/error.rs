//! Storage error taxonomy.
//!
//! Every backend maps its failures onto [`StoreError`] so the authorization
//! server can tell absence, uniqueness violations and outages apart.

/// Errors that can occur during configuration or grant storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached, rejected the credentials, or failed.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Description of the transport or backend failure.
        message: String,
    },

    /// The target of an update or lookup does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Description of the missing record.
        message: String,
    },

    /// A uniqueness constraint was violated on insert.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting record.
        message: String,
    },

    /// Required configuration is missing or a request was malformed.
    #[error("Invalid: {message}")]
    Invalid {
        /// Description of what is invalid.
        message: String,
    },

    /// A stored document could not be converted to or from its entity shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    // -------------------------------------------------------------------------
    // Constructor Methods
    // -------------------------------------------------------------------------

    /// Creates a new `StorageUnavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `Invalid` error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    // -------------------------------------------------------------------------
    // Predicate Methods
    // -------------------------------------------------------------------------

    /// Returns `true` if this is a `StorageUnavailable` error.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }

    /// Returns `true` if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns `true` if this is an `Invalid` error.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// Returns `true` if the caller caused the error (4xx equivalent).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Conflict { .. } | Self::Invalid { .. }
        )
    }

    /// Returns `true` if the backend caused the error (5xx equivalent).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. } | Self::Serialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = StoreError::not_found("PersistedGrant abc");
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(err.to_string(), "Not found: PersistedGrant abc");
    }

    #[test]
    fn test_conflict() {
        let err = StoreError::conflict("unique key violated");
        assert!(err.is_conflict());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_unavailable() {
        let err = StoreError::unavailable("connection refused");
        assert!(err.is_unavailable());
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_invalid() {
        let err = StoreError::invalid("endpoint_url is required");
        assert!(err.is_invalid());
        assert_eq!(err.to_string(), "Invalid: endpoint_url is required");
    }

    #[test]
    fn test_serialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoreError::from(json_err);
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
    }
}
