//! Payment processor webhook settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeConfig {
    /// Shared secret used to verify the `stripe-signature` header.
    /// Overridden by `STRIPE_WEBHOOK_SECRET`; never commit a real value.
    #[serde(default)]
    pub webhook_secret: String,

    /// Maximum accepted age of a signed payload, in seconds.
    #[serde(default = "default_signature_tolerance_secs")]
    pub signature_tolerance_secs: i64,

    /// How long processed event ids are retained for replay suppression.
    #[serde(default = "default_event_ledger_ttl_secs")]
    pub event_ledger_ttl_secs: i64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            webhook_secret: String::new(),
            signature_tolerance_secs: default_signature_tolerance_secs(),
            event_ledger_ttl_secs: default_event_ledger_ttl_secs(),
        }
    }
}

fn default_signature_tolerance_secs() -> i64 {
    300
}

fn default_event_ledger_ttl_secs() -> i64 {
    3 * 24 * 60 * 60
}
