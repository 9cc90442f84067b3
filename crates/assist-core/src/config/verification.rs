//! Pre-auth verification settings.

use serde::{Deserialize, Serialize};

/// Where one-time codes are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeDeliveryMode {
    /// Log the code at info level. Development only.
    Log,
    /// Swallow the code. Useful for tests that inject their own sink.
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationConfig {
    /// Validity window of a one-time code, in seconds.
    #[serde(default = "default_code_ttl_secs")]
    pub code_ttl_secs: i64,

    /// Minimum interval between code requests for the same email.
    #[serde(default = "default_resend_cooldown_secs")]
    pub resend_cooldown_secs: i64,

    /// Wrong-code attempts allowed before the record locks out.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_delivery")]
    pub delivery: CodeDeliveryMode,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: default_code_ttl_secs(),
            resend_cooldown_secs: default_resend_cooldown_secs(),
            max_attempts: default_max_attempts(),
            delivery: default_delivery(),
        }
    }
}

fn default_code_ttl_secs() -> i64 {
    600
}

fn default_resend_cooldown_secs() -> i64 {
    60
}

fn default_max_attempts() -> u32 {
    5
}

fn default_delivery() -> CodeDeliveryMode {
    CodeDeliveryMode::Log
}
