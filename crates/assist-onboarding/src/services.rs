//! Injected backing services.
//!
//! The flow never talks to a concrete backend; it sees these traits. The
//! server wires them to the real verification/account services, tests wire
//! them to doubles.

use async_trait::async_trait;
use thiserror::Error;

use assist_core::{ErrorKind, UserType};

use crate::flow::SignupForm;

/// Error surfaced by a backing service, already classified.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Pre-auth verification calls the flow depends on.
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Returns the opaque verification id.
    async fn request_code(&self, email: &str, user_type: UserType)
    -> Result<String, ServiceError>;

    async fn verify_code(&self, verification_id: &str, code: &str) -> Result<(), ServiceError>;
}

/// Everything the flow hands over when creating the account.
#[derive(Debug, Clone)]
pub struct AccountSubmission {
    pub verification_id: String,
    pub password: String,
    pub form: SignupForm,
}

/// Account creation call the flow depends on.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Returns the new user id.
    async fn create_account(&self, submission: AccountSubmission) -> Result<String, ServiceError>;
}
