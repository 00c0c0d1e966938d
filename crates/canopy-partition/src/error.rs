use canopy_types::TypeError;

/// Errors produced by partition operations.
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    /// The partition has not been initialized (or was destroyed).
    #[error("partition is not initialized")]
    NotInitialized,

    /// `initialize` was called on an already-initialized partition.
    #[error("partition is already initialized")]
    AlreadyInitialized,

    /// A thread panicked while holding the partition lock.
    #[error("partition lock poisoned")]
    LockPoisoned,

    /// The kind-marker attribute is missing from an entry being added.
    #[error("entry has no {attribute} attribute")]
    SchemaViolation { attribute: String },

    /// The parent path of an add or move target does not resolve.
    #[error("parent entry not found: {0}")]
    ParentNotFound(String),

    /// The path or id does not resolve to a stored entry.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// An alias names itself as its target.
    #[error("alias {0} references itself as target")]
    AliasSelfReference(String),

    /// An alias names one of its own descendants as its target.
    #[error("alias {alias} creates a cycle: target {target} lies in its own subtree")]
    AliasCycle { alias: String, target: String },

    /// An alias target falls outside this partition's namespace.
    #[error("alias target {target} is outside the namespace rooted at {suffix}")]
    AliasExternalTarget { target: String, suffix: String },

    /// An alias target does not resolve to any entry.
    #[error("alias {alias} has dangling target {target}")]
    AliasDanglingTarget { alias: String, target: String },

    /// An alias target is itself an alias.
    #[error("alias target {target} is itself an alias; alias chaining is not permitted")]
    AliasChaining { target: String },

    /// A query named an attribute that has no value index.
    #[error("no index registered for attribute {0}")]
    IndexNotFound(String),

    /// The engine cannot perform the requested operation.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A supplied path failed to parse.
    #[error(transparent)]
    InvalidPath(#[from] TypeError),

    /// Record table failure.
    #[error("store error: {0}")]
    Store(#[from] canopy_store::StoreError),

    /// Index failure.
    #[error("index error: {0}")]
    Index(#[from] canopy_index::IndexError),
}

/// Result alias for partition operations.
pub type PartitionResult<T> = Result<T, PartitionError>;
