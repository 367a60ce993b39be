use idstore_core::StoreError;

/// Errors that can stop a migration.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Reading from the relational source failed.
    #[error("Source database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// The source returned data that cannot be migrated.
    #[error("Invalid source data: {0}")]
    InvalidSource(String),

    /// Writing to the document store failed.
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),
}

impl MigrationError {
    #[must_use]
    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSource(message.into())
    }

    /// Returns `true` if the failure happened on the reading side.
    #[must_use]
    pub fn is_source_error(&self) -> bool {
        matches!(self, Self::Database(_) | Self::InvalidSource(_))
    }

    /// Returns `true` if the failure happened on the writing side.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
