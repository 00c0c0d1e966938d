use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid path component {component:?}: {reason}")]
    InvalidComponent { component: String, reason: String },

    #[error("invalid attribute name {0:?}")]
    InvalidAttributeName(String),
}
