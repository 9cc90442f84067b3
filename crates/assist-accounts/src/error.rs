//! Error types for the accounts crate.

use assist_core::ErrorKind;
use assist_store::StoreError;
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Malformed or rejected input.
    #[error("{0}")]
    Validation(String),

    /// The email already belongs to an account.
    #[error("account already exists for {0}")]
    AlreadyExists(String),

    /// Verification was not completed before account creation.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// Referenced user or document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Record serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AccountError {
    /// Structured classification for the API boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Store(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }
}
