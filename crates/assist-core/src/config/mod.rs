//! Configuration types for the Assist platform.
//!
//! Configuration is loaded from a single YAML file (`assist.yaml`) and
//! combined with environment-variable overrides for secrets. Every section
//! has sensible defaults so a missing file still yields a runnable dev setup
//! (memory store, log-based code delivery, empty webhook secret).

pub mod server;
pub mod store;
pub mod stripe;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};
pub use stripe::StripeConfig;
pub use verification::{CodeDeliveryMode, VerificationConfig};

/// Complete Assist configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistConfig {
    /// Project name, for log lines and health payloads.
    #[serde(default)]
    pub project: Option<String>,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// Payment processor webhook settings.
    #[serde(default)]
    pub stripe: StripeConfig,

    /// Pre-auth verification settings.
    #[serde(default)]
    pub verification: VerificationConfig,
}

impl AssistConfig {
    /// Load configuration from a YAML file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
        let mut config: AssistConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Secrets come from the environment, never from the YAML file.
    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("STRIPE_WEBHOOK_SECRET") {
            if !secret.is_empty() {
                self.stripe.webhook_secret = secret;
            }
        }
        if let Ok(addr) = std::env::var("ASSIST_BIND_ADDR") {
            if !addr.is_empty() {
                self.server.bind_addr = addr;
            }
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(String, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(String, #[source] serde_yaml::Error),
}
