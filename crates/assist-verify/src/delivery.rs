//! Code delivery sinks.
//!
//! Production deployments send mail; this repository carries the
//! development sink (log the code) and the test doubles. The sink is
//! injected so the flow is identical regardless of where codes end up.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use assist_core::config::CodeDeliveryMode;

use crate::error::VerifyError;

/// Trait for delivering one-time codes to an email address.
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), VerifyError>;
}

/// Create a delivery sink based on configuration.
pub fn create_delivery(mode: CodeDeliveryMode) -> Arc<dyn CodeDelivery> {
    match mode {
        CodeDeliveryMode::Log => Arc::new(LogDelivery),
        CodeDeliveryMode::Null => Arc::new(NullDelivery),
    }
}

/// Logs the code at info level. Development only.
pub struct LogDelivery;

#[async_trait]
impl CodeDelivery for LogDelivery {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), VerifyError> {
        tracing::info!(email, code, "verification code issued");
        Ok(())
    }
}

/// Swallows the code.
pub struct NullDelivery;

#[async_trait]
impl CodeDelivery for NullDelivery {
    async fn deliver(&self, _email: &str, _code: &str) -> Result<(), VerifyError> {
        Ok(())
    }
}

/// Records the last delivered code, for tests that need to submit it back.
#[derive(Default)]
pub struct CapturingDelivery {
    last: Mutex<Option<(String, String)>>,
}

impl CapturingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently delivered `(email, code)` pair.
    pub fn last(&self) -> Option<(String, String)> {
        self.last.lock().expect("delivery lock").clone()
    }

    pub fn last_code(&self) -> Option<String> {
        self.last().map(|(_, code)| code)
    }
}

#[async_trait]
impl CodeDelivery for CapturingDelivery {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), VerifyError> {
        *self.last.lock().expect("delivery lock") = Some((email.to_string(), code.to_string()));
        Ok(())
    }
}
