//! Error types for the store crate.

use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document referenced by an update does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Update payload was not a JSON object.
    #[error("update payload must be a JSON object")]
    InvalidUpdate,

    /// A lock was poisoned.
    #[error("lock error")]
    Lock,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
