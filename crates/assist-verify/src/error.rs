//! Error types for the verification crate.

use assist_core::ErrorKind;
use assist_store::StoreError;
use thiserror::Error;

/// Errors that can occur during verification operations.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Malformed input (email shape, code shape).
    #[error("{0}")]
    Validation(String),

    /// The email already belongs to an account.
    #[error("email already registered: {0}")]
    Conflict(String),

    /// Too many requests or too many wrong codes.
    #[error("{0}")]
    RateLimit(String),

    /// No live verification record under this id.
    #[error("verification not found: {0}")]
    NotFound(String),

    /// The code's validity window has elapsed.
    #[error("verification code expired: {0}")]
    Expired(String),

    /// Wrong code.
    #[error("verification code does not match ({remaining} attempts left)")]
    Mismatch { remaining: u32 },

    /// Code could not be delivered.
    #[error("code delivery failed: {0}")]
    Delivery(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Record serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VerifyError {
    /// Structured classification for the API boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::RateLimit(_) => ErrorKind::RateLimit,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Expired(_) => ErrorKind::Expired,
            Self::Mismatch { .. } => ErrorKind::Mismatch,
            Self::Delivery(_) | Self::Store(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }
}
