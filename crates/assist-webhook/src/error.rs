//! Error types for the webhook crate.

use assist_store::StoreError;
use thiserror::Error;

use crate::signature::SignatureError;

/// Errors that can occur handling a webhook request.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Bad or missing signature; the caller gets a 400.
    #[error("signature verification failed: {0}")]
    Signature(#[from] SignatureError),

    /// Event payload did not parse.
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Store error; the caller gets a 500 and the provider redelivers.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl WebhookError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Signature(_) | Self::Malformed(_) => 400,
            Self::Store(_) => 500,
        }
    }
}
