//! Read-only projections for dashboard screens.
//!
//! Each dashboard screen fetches one of these by user id on mount and on
//! pull-to-refresh. Projections never write.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use assist_core::collections::{APPLICANTS, PAYMENT_HISTORY, SUBSCRIBERS, USERS};
use assist_core::{
    ApplicantRecord, PaymentRecord, ProfileFields, SubscriberRecord, SubscriptionFields,
    UserRecord, UserType,
};
use assist_store::DocumentStore;

use crate::error::AccountError;
use crate::profile::ProfileService;

/// What the profile/settings screen shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub user_type: UserType,
    pub profile: ProfileFields,
    pub profile_completed: bool,
}

/// What the subscriber dashboard shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub user_id: String,
    pub donation_amount_cents: Option<i64>,
    pub subscription: Option<SubscriptionFields>,
    pub recent_payments: Vec<PaymentRecord>,
}

/// What the applicant dashboard shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub user_id: String,
    pub assistance_type: Option<String>,
    pub profile: ProfileFields,
}

/// Fetches per-screen projections for the current user.
pub struct ProjectionService {
    store: Arc<dyn DocumentStore>,
    profiles: ProfileService,
}

impl ProjectionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            profiles: ProfileService::new(store.clone()),
            store,
        }
    }

    pub async fn profile_view(&self, user_id: &str) -> Result<ProfileView, AccountError> {
        let doc = self
            .store
            .get(USERS, user_id)
            .await?
            .ok_or_else(|| AccountError::NotFound(format!("users/{}", user_id)))?;
        let user: UserRecord = serde_json::from_value(doc)?;
        let profile = self.profiles.display_profile(user_id).await?;

        Ok(ProfileView {
            user_id: user.id,
            email: user.email,
            display_name: user.display_name,
            user_type: user.user_type,
            profile,
            profile_completed: user.profile_completed,
        })
    }

    pub async fn subscription_view(&self, user_id: &str) -> Result<SubscriptionView, AccountError> {
        let doc = self
            .store
            .get(SUBSCRIBERS, user_id)
            .await?
            .ok_or_else(|| AccountError::NotFound(format!("subscribers/{}", user_id)))?;
        let subscriber: SubscriberRecord = serde_json::from_value(doc)?;

        let mut payments: Vec<PaymentRecord> = Vec::new();
        for (_, doc) in self
            .store
            .find(PAYMENT_HISTORY, "userId", &json!(user_id))
            .await?
        {
            payments.push(serde_json::from_value(doc)?);
        }
        payments.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

        Ok(SubscriptionView {
            user_id: subscriber.user_id,
            donation_amount_cents: subscriber.donation_amount_cents,
            subscription: subscriber.subscription,
            recent_payments: payments,
        })
    }

    pub async fn application_view(&self, user_id: &str) -> Result<ApplicationView, AccountError> {
        let doc = self
            .store
            .get(APPLICANTS, user_id)
            .await?
            .ok_or_else(|| AccountError::NotFound(format!("applicants/{}", user_id)))?;
        let applicant: ApplicantRecord = serde_json::from_value(doc)?;
        let profile = self.profiles.display_profile(user_id).await?;

        Ok(ApplicationView {
            user_id: applicant.user_id,
            assistance_type: applicant.assistance_type,
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_store::MemoryStore;
    use chrono::Utc;

    #[tokio::test]
    async fn subscription_view_orders_payments_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let subscriber = SubscriberRecord {
            user_id: "u1".into(),
            donation_amount_cents: Some(2500),
            subscription: None,
            profile: ProfileFields::default(),
            created_at: Utc::now(),
        };
        store
            .set(SUBSCRIBERS, "u1", serde_json::to_value(&subscriber).unwrap())
            .await
            .unwrap();

        for (id, ts) in [("p1", "2026-01-01T00:00:00Z"), ("p2", "2026-02-01T00:00:00Z")] {
            store
                .set(
                    PAYMENT_HISTORY,
                    id,
                    json!({
                        "id": id,
                        "userId": "u1",
                        "invoiceId": format!("in_{}", id),
                        "amountCents": 2500,
                        "currency": "usd",
                        "status": "paid",
                        "occurredAt": ts,
                    }),
                )
                .await
                .unwrap();
        }

        let view = ProjectionService::new(store)
            .subscription_view("u1")
            .await
            .unwrap();
        assert_eq!(view.recent_payments.len(), 2);
        assert_eq!(view.recent_payments[0].id, "p2");
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let service = ProjectionService::new(Arc::new(MemoryStore::new()));
        let err = service.profile_view("ghost").await.unwrap_err();
        assert!(matches!(err, AccountError::NotFound(_)));
    }
}
