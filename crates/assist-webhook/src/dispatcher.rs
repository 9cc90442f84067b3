//! Event dispatch with replay suppression.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use assist_core::collections::PROCESSED_WEBHOOK_EVENTS;
use assist_core::config::StripeConfig;
use assist_store::{DocumentStore, WriteBatch};

use crate::error::WebhookError;
use crate::event::StripeEvent;
use crate::{handlers, signature};

/// Ledger entry recording that an event id was handled.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessedEvent {
    event_id: String,
    event_type: String,
    processed_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// How a delivery was resolved. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A handler ran and its batch was committed.
    Processed,
    /// The event id was already in the ledger; nothing was written.
    Duplicate,
    /// The event was valid but not actionable (unknown type, missing
    /// attribution); nothing was written.
    Ignored,
}

/// Verifies, deduplicates, and dispatches webhook deliveries.
pub struct WebhookDispatcher {
    store: Arc<dyn DocumentStore>,
    config: StripeConfig,
}

impl WebhookDispatcher {
    pub fn new(store: Arc<dyn DocumentStore>, config: StripeConfig) -> Self {
        Self { store, config }
    }

    /// Handle one delivery: raw body plus the `stripe-signature` header.
    pub async fn handle(&self, header: &str, payload: &[u8]) -> Result<Outcome, WebhookError> {
        signature::verify(
            &self.config.webhook_secret,
            header,
            payload,
            self.config.signature_tolerance_secs,
        )?;

        let event: StripeEvent = serde_json::from_slice(payload)?;

        if self.already_processed(&event.id).await? {
            tracing::info!(event_id = %event.id, "duplicate delivery suppressed");
            return Ok(Outcome::Duplicate);
        }

        let batch = match event.event_type.as_str() {
            "customer.subscription.created" | "customer.subscription.updated" => {
                handlers::subscription_upserted(self.store.as_ref(), &event).await?
            }
            "customer.subscription.deleted" => {
                handlers::subscription_deleted(self.store.as_ref(), &event).await?
            }
            "invoice.paid" => handlers::invoice_paid(self.store.as_ref(), &event).await?,
            "invoice.payment_failed" => {
                handlers::invoice_payment_failed(self.store.as_ref(), &event).await?
            }
            other => {
                tracing::info!(event_id = %event.id, event_type = other, "unhandled event type");
                return Ok(Outcome::Ignored);
            }
        };

        let Some(batch) = batch else {
            return Ok(Outcome::Ignored);
        };

        // The ledger entry rides in the same batch as the handler's
        // effects, so a replay can never observe half of them.
        let batch = self.with_ledger_entry(batch, &event)?;
        self.store.commit(batch).await?;

        tracing::info!(event_id = %event.id, event_type = %event.event_type, "event processed");
        Ok(Outcome::Processed)
    }

    async fn already_processed(&self, event_id: &str) -> Result<bool, WebhookError> {
        let Some(doc) = self.store.get(PROCESSED_WEBHOOK_EVENTS, event_id).await? else {
            return Ok(false);
        };
        match serde_json::from_value::<ProcessedEvent>(doc) {
            // An expired ledger entry no longer blocks reprocessing.
            Ok(entry) => Ok(entry.expires_at > Utc::now()),
            Err(e) => {
                tracing::warn!(event_id, "unreadable ledger entry treated as processed: {}", e);
                Ok(true)
            }
        }
    }

    fn with_ledger_entry(
        &self,
        batch: WriteBatch,
        event: &StripeEvent,
    ) -> Result<WriteBatch, WebhookError> {
        let now = Utc::now();
        let entry = ProcessedEvent {
            event_id: event.id.clone(),
            event_type: event.event_type.clone(),
            processed_at: now,
            expires_at: now + Duration::seconds(self.config.event_ledger_ttl_secs),
        };
        Ok(batch.set(
            PROCESSED_WEBHOOK_EVENTS,
            &event.id,
            serde_json::to_value(&entry)?,
        ))
    }

    /// Drop expired ledger entries. Callers run this on a timer.
    pub async fn prune_ledger(&self) -> Result<usize, WebhookError> {
        let now = Utc::now();
        let mut removed = 0usize;
        for (id, doc) in self.store.list(PROCESSED_WEBHOOK_EVENTS).await? {
            let expired = serde_json::from_value::<ProcessedEvent>(doc)
                .map(|entry| entry.expires_at <= now)
                .unwrap_or(false);
            if expired {
                self.store.delete(PROCESSED_WEBHOOK_EVENTS, &id).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "pruned webhook ledger");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_core::collections::{NOTIFICATIONS, PAYMENT_HISTORY, SUBSCRIBERS};
    use assist_store::MemoryStore;

    const SECRET: &str = "whsec_test";

    fn dispatcher(store: Arc<MemoryStore>) -> WebhookDispatcher {
        WebhookDispatcher::new(
            store,
            StripeConfig {
                webhook_secret: SECRET.into(),
                ..Default::default()
            },
        )
    }

    fn signed(payload: &[u8]) -> String {
        let now = Utc::now().timestamp();
        format!("t={},v1={}", now, signature::sign(SECRET, now, payload))
    }

    async fn seed_subscriber(store: &MemoryStore, user_id: &str) {
        store
            .set(
                SUBSCRIBERS,
                user_id,
                json!({
                    "userId": user_id,
                    "profile": {},
                    "subscription": {
                        "customerId": "cus_1",
                        "subscriptionId": "sub_1",
                        "status": "active",
                    },
                    "createdAt": Utc::now(),
                }),
            )
            .await
            .unwrap();
    }

    fn invoice_failed_payload(event_id: &str) -> Vec<u8> {
        json!({
            "id": event_id,
            "type": "invoice.payment_failed",
            "data": {"object": {
                "id": "in_9",
                "customer": "cus_1",
                "amount_due": 2500,
                "currency": "usd",
                "metadata": {"userId": "u1"},
            }}
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn bad_signature_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = dispatcher(store.clone());
        let payload = invoice_failed_payload("evt_1");

        let err = dispatcher
            .handle("t=1,v1=deadbeef", &payload)
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert!(store.list(PAYMENT_HISTORY).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn payment_failed_writes_one_payment_and_one_notification() {
        let store = Arc::new(MemoryStore::new());
        seed_subscriber(&store, "u1").await;
        let dispatcher = dispatcher(store.clone());
        let payload = invoice_failed_payload("evt_1");

        let outcome = dispatcher.handle(&signed(&payload), &payload).await.unwrap();
        assert_eq!(outcome, Outcome::Processed);

        let payments = store.list(PAYMENT_HISTORY).await.unwrap();
        let notifications = store.list(NOTIFICATIONS).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(notifications.len(), 1);
        assert_eq!(payments[0].1["invoiceId"], "in_9");
        assert_eq!(notifications[0].1["invoiceId"], "in_9");
        assert_eq!(payments[0].1["status"], "failed");
    }

    #[tokio::test]
    async fn replayed_event_is_suppressed() {
        let store = Arc::new(MemoryStore::new());
        seed_subscriber(&store, "u1").await;
        let dispatcher = dispatcher(store.clone());
        let payload = invoice_failed_payload("evt_1");

        assert_eq!(
            dispatcher.handle(&signed(&payload), &payload).await.unwrap(),
            Outcome::Processed
        );
        assert_eq!(
            dispatcher.handle(&signed(&payload), &payload).await.unwrap(),
            Outcome::Duplicate
        );

        // Still exactly one of each; the redelivery double-write gap is
        // closed.
        assert_eq!(store.list(PAYMENT_HISTORY).await.unwrap().len(), 1);
        assert_eq!(store.list(NOTIFICATIONS).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deletion_without_user_id_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        seed_subscriber(&store, "u1").await;
        let dispatcher = dispatcher(store.clone());

        let payload = json!({
            "id": "evt_2",
            "type": "customer.subscription.deleted",
            "data": {"object": {"id": "sub_1", "customer": "cus_1"}}
        })
        .to_string()
        .into_bytes();

        let outcome = dispatcher.handle(&signed(&payload), &payload).await.unwrap();
        assert_eq!(outcome, Outcome::Ignored);

        // No audit entry, no ledger entry, subscription untouched.
        assert!(store.list("auditLogs").await.unwrap().is_empty());
        assert!(store.list("processedWebhookEvents").await.unwrap().is_empty());
        let doc = store.get(SUBSCRIBERS, "u1").await.unwrap().unwrap();
        assert_eq!(doc["subscription"]["status"], "active");
    }

    #[tokio::test]
    async fn deletion_with_user_id_cancels_subscription() {
        let store = Arc::new(MemoryStore::new());
        seed_subscriber(&store, "u1").await;
        let dispatcher = dispatcher(store.clone());

        let payload = json!({
            "id": "evt_3",
            "type": "customer.subscription.deleted",
            "data": {"object": {
                "id": "sub_1",
                "customer": "cus_1",
                "metadata": {"userId": "u1"},
            }}
        })
        .to_string()
        .into_bytes();

        let outcome = dispatcher.handle(&signed(&payload), &payload).await.unwrap();
        assert_eq!(outcome, Outcome::Processed);

        let doc = store.get(SUBSCRIBERS, "u1").await.unwrap().unwrap();
        assert_eq!(doc["subscription"]["status"], "canceled");
        assert_eq!(store.list("auditLogs").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn subscription_update_resolves_user_by_customer() {
        let store = Arc::new(MemoryStore::new());
        seed_subscriber(&store, "u1").await;
        let dispatcher = dispatcher(store.clone());

        let payload = json!({
            "id": "evt_4",
            "type": "customer.subscription.updated",
            "data": {"object": {
                "id": "sub_1",
                "customer": "cus_1",
                "status": "past_due",
                "plan": {"amount": 2500},
            }}
        })
        .to_string()
        .into_bytes();

        let outcome = dispatcher.handle(&signed(&payload), &payload).await.unwrap();
        assert_eq!(outcome, Outcome::Processed);

        let doc = store.get(SUBSCRIBERS, "u1").await.unwrap().unwrap();
        assert_eq!(doc["subscription"]["status"], "past_due");
        assert_eq!(doc["subscription"]["planAmountCents"], 2500);
    }

    #[tokio::test]
    async fn unknown_event_type_is_acknowledged() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = dispatcher(store.clone());

        let payload = json!({
            "id": "evt_5",
            "type": "charge.refunded",
            "data": {"object": {}}
        })
        .to_string()
        .into_bytes();

        let outcome = dispatcher.handle(&signed(&payload), &payload).await.unwrap();
        assert_eq!(outcome, Outcome::Ignored);
    }

    #[tokio::test]
    async fn prune_removes_expired_entries() {
        let store = Arc::new(MemoryStore::new());
        seed_subscriber(&store, "u1").await;
        let dispatcher = WebhookDispatcher::new(
            store.clone(),
            StripeConfig {
                webhook_secret: SECRET.into(),
                event_ledger_ttl_secs: -1, // entries expire immediately
                ..Default::default()
            },
        );
        let payload = invoice_failed_payload("evt_6");
        dispatcher.handle(&signed(&payload), &payload).await.unwrap();

        assert_eq!(dispatcher.prune_ledger().await.unwrap(), 1);
        assert!(store.list("processedWebhookEvents").await.unwrap().is_empty());
    }
}
