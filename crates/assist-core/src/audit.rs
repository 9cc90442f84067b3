//! Audit trail entries.
//!
//! Every mutation performed on behalf of an external actor (webhook events,
//! account creation) writes one of these to `auditLogs` in the same batch as
//! its effects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in `auditLogs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,

    /// Who caused the mutation ("stripe", "onboarding", a user id).
    pub actor: String,
    /// What happened (e.g. "subscription.updated", "account.created").
    pub action: String,
    /// Document path the mutation touched (e.g. "subscribers/u1").
    pub subject: String,

    /// Free-form context for the entry.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub detail: serde_json::Value,
}

impl AuditRecord {
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            actor: actor.into(),
            action: action.into(),
            subject: subject.into(),
            detail: serde_json::Value::Null,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }

    /// Format the entry as a human-readable log line.
    pub fn to_log_line(&self) -> String {
        format!(
            "[{}] actor={} action={} subject={}",
            self.occurred_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.actor,
            self.action,
            self.subject,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_line_carries_core_fields() {
        let record = AuditRecord::new("stripe", "subscription.deleted", "subscribers/u1");
        let line = record.to_log_line();
        assert!(line.contains("actor=stripe"));
        assert!(line.contains("action=subscription.deleted"));
        assert!(line.contains("subject=subscribers/u1"));
    }

    #[test]
    fn null_detail_is_omitted_from_json() {
        let record = AuditRecord::new("onboarding", "account.created", "users/u1");
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("detail").is_none());
    }
}
