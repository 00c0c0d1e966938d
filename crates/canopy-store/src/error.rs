use canopy_types::EntryId;

/// Errors from record table operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record was not found.
    #[error("record not found: {0}")]
    NotFound(EntryId),

    /// Attempted to store a record under the reserved sentinel id.
    #[error("cannot store a record under the sentinel id")]
    SentinelId,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
