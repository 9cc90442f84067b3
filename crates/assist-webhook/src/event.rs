//! Stripe event envelope.
//!
//! Only the fields the handlers read are modeled; everything else stays in
//! the raw `object` value.

use serde::Deserialize;
use serde_json::Value;

/// The envelope every webhook delivery carries.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    /// Event id (`evt_...`); the idempotency key.
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

impl StripeEvent {
    pub fn object(&self) -> &Value {
        &self.data.object
    }

    /// `data.object.metadata.userId`, when present and non-empty.
    pub fn metadata_user_id(&self) -> Option<&str> {
        self.object()
            .get("metadata")
            .and_then(|m| m.get("userId"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// `data.object.customer`.
    pub fn customer_id(&self) -> Option<&str> {
        self.object().get("customer").and_then(Value::as_str)
    }

    /// String field on the object.
    pub fn object_str(&self, field: &str) -> Option<&str> {
        self.object().get(field).and_then(Value::as_str)
    }

    /// Integer field on the object.
    pub fn object_i64(&self, field: &str) -> Option<i64> {
        self.object().get(field).and_then(Value::as_i64)
    }

    /// Recurring plan amount in cents, wherever the processor put it.
    pub fn plan_amount_cents(&self) -> Option<i64> {
        let object = self.object();
        object
            .get("plan")
            .and_then(|p| p.get("amount"))
            .and_then(Value::as_i64)
            .or_else(|| {
                object
                    .pointer("/items/data/0/price/unit_amount")
                    .and_then(Value::as_i64)
            })
    }
}
