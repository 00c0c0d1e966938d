//! Error types for the index crate.

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Flush failed in the backing collection.
    #[error("index {name:?} flush failed: {reason}")]
    Flush { name: String, reason: String },

    /// I/O error from a persistent backing collection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
