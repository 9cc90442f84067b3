//! Per-event-type handlers.
//!
//! Each handler inspects the event, resolves the affected user, and returns
//! the batch of writes to apply, or `None` when the event cannot be
//! attributed and must be acknowledged without writing anything. The
//! dispatcher owns committing the batch.

use chrono::{DateTime, Utc};
use serde_json::json;

use assist_core::collections::{self, AUDIT_LOGS, NOTIFICATIONS, PAYMENT_HISTORY, SUBSCRIBERS};
use assist_core::{
    AuditRecord, NotificationKind, NotificationRecord, PaymentRecord, PaymentStatus,
    SubscriberRecord, SubscriptionFields, SubscriptionStatus,
};
use assist_store::{DocumentStore, WriteBatch};

use crate::error::WebhookError;
use crate::event::StripeEvent;

/// `customer.subscription.created` / `customer.subscription.updated`:
/// refresh the subscriber's subscription fields and write an audit entry.
pub async fn subscription_upserted(
    store: &dyn DocumentStore,
    event: &StripeEvent,
) -> Result<Option<WriteBatch>, WebhookError> {
    let Some(user_id) = resolve_user(store, event).await? else {
        tracing::warn!(event_id = %event.id, "subscription event without resolvable user");
        return Ok(None);
    };
    if store.get(SUBSCRIBERS, &user_id).await?.is_none() {
        tracing::warn!(event_id = %event.id, user_id, "subscription event for unknown subscriber");
        return Ok(None);
    }

    let subscription = SubscriptionFields {
        customer_id: event.customer_id().unwrap_or_default().to_string(),
        subscription_id: event.object_str("id").unwrap_or_default().to_string(),
        status: SubscriptionStatus::parse(event.object_str("status").unwrap_or_default()),
        plan_amount_cents: event.plan_amount_cents(),
        current_period_end: event
            .object_i64("current_period_end")
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
    };

    let subject = collections::doc_path(SUBSCRIBERS, &user_id);
    let audit = AuditRecord::new("stripe", &event.event_type, subject)
        .with_detail(json!({"eventId": event.id, "status": subscription.status}));

    let batch = WriteBatch::new()
        .update(
            SUBSCRIBERS,
            &user_id,
            json!({"subscription": serde_json::to_value(&subscription)?}),
        )
        .set(AUDIT_LOGS, audit.event_id.to_string(), serde_json::to_value(&audit)?);
    Ok(Some(batch))
}

/// `customer.subscription.deleted`: mark the subscription canceled.
///
/// A deletion without `metadata.userId` is logged and acknowledged without
/// writing any document.
pub async fn subscription_deleted(
    store: &dyn DocumentStore,
    event: &StripeEvent,
) -> Result<Option<WriteBatch>, WebhookError> {
    let Some(user_id) = event.metadata_user_id() else {
        tracing::warn!(event_id = %event.id, "subscription.deleted without metadata.userId; skipping");
        return Ok(None);
    };

    let Some(doc) = store.get(SUBSCRIBERS, user_id).await? else {
        tracing::warn!(event_id = %event.id, user_id, "subscription.deleted for unknown subscriber");
        return Ok(None);
    };
    let subscriber: SubscriberRecord = serde_json::from_value(doc)?;
    let subscription = subscriber.subscription.map(|mut s| {
        s.status = SubscriptionStatus::Canceled;
        s
    });

    let subject = collections::doc_path(SUBSCRIBERS, user_id);
    let audit = AuditRecord::new("stripe", &event.event_type, subject)
        .with_detail(json!({"eventId": event.id}));

    let batch = WriteBatch::new()
        .update(
            SUBSCRIBERS,
            user_id,
            json!({"subscription": serde_json::to_value(&subscription)?}),
        )
        .set(AUDIT_LOGS, audit.event_id.to_string(), serde_json::to_value(&audit)?);
    Ok(Some(batch))
}

/// `invoice.paid`: one payment-history entry plus one notification.
pub async fn invoice_paid(
    store: &dyn DocumentStore,
    event: &StripeEvent,
) -> Result<Option<WriteBatch>, WebhookError> {
    invoice_event(store, event, PaymentStatus::Paid).await
}

/// `invoice.payment_failed`: one payment-history entry plus one
/// notification prompting the user to update their payment method.
pub async fn invoice_payment_failed(
    store: &dyn DocumentStore,
    event: &StripeEvent,
) -> Result<Option<WriteBatch>, WebhookError> {
    invoice_event(store, event, PaymentStatus::Failed).await
}

async fn invoice_event(
    store: &dyn DocumentStore,
    event: &StripeEvent,
    status: PaymentStatus,
) -> Result<Option<WriteBatch>, WebhookError> {
    let Some(invoice_id) = event.object_str("id") else {
        tracing::warn!(event_id = %event.id, "invoice event without an invoice id");
        return Ok(None);
    };
    let Some(user_id) = resolve_user(store, event).await? else {
        tracing::warn!(event_id = %event.id, invoice_id, "invoice event without resolvable user");
        return Ok(None);
    };

    let amount_cents = match status {
        PaymentStatus::Paid => event
            .object_i64("amount_paid")
            .or_else(|| event.object_i64("amount_due")),
        PaymentStatus::Failed => event.object_i64("amount_due"),
    }
    .unwrap_or(0);
    let currency = event.object_str("currency").unwrap_or("usd");

    let payment = PaymentRecord::new(&user_id, invoice_id, amount_cents, currency, status);
    let notification = match status {
        PaymentStatus::Paid => NotificationRecord::new(
            &user_id,
            NotificationKind::PaymentReceived,
            "Thank you for your donation",
            format!("Your payment of {} was received.", format_amount(amount_cents, currency)),
        ),
        PaymentStatus::Failed => NotificationRecord::new(
            &user_id,
            NotificationKind::PaymentFailed,
            "Payment failed",
            "We couldn't process your payment. Please update your payment method.",
        ),
    }
    .with_invoice(invoice_id);

    let batch = WriteBatch::new()
        .set(PAYMENT_HISTORY, &payment.id, serde_json::to_value(&payment)?)
        .set(
            NOTIFICATIONS,
            &notification.id,
            serde_json::to_value(&notification)?,
        );
    Ok(Some(batch))
}

/// Attribute an event to a user: `metadata.userId` wins, then the customer
/// id is matched against subscriber records.
async fn resolve_user(
    store: &dyn DocumentStore,
    event: &StripeEvent,
) -> Result<Option<String>, WebhookError> {
    if let Some(user_id) = event.metadata_user_id() {
        return Ok(Some(user_id.to_string()));
    }
    let Some(customer_id) = event.customer_id() else {
        return Ok(None);
    };
    let hits = store
        .find(SUBSCRIBERS, "subscription.customerId", &json!(customer_id))
        .await?;
    Ok(hits.into_iter().next().map(|(id, _)| id))
}

fn format_amount(amount_cents: i64, currency: &str) -> String {
    format!("{:.2} {}", amount_cents as f64 / 100.0, currency.to_uppercase())
}
