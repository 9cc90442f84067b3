//! Verification service.

use chrono::{Duration, Utc};
use rand::Rng;
use serde_json::json;
use std::sync::Arc;

use assist_core::collections::PRE_VERIFICATION_CODES;
use assist_core::config::VerificationConfig;
use assist_core::{UserType, collections};
use assist_store::{DocumentStore, WriteBatch};

use crate::delivery::CodeDelivery;
use crate::error::VerifyError;
use crate::record::VerificationRecord;

/// Issues and checks pre-auth verification codes.
pub struct VerificationService {
    store: Arc<dyn DocumentStore>,
    delivery: Arc<dyn CodeDelivery>,
    config: VerificationConfig,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        delivery: Arc<dyn CodeDelivery>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            store,
            delivery,
            config,
        }
    }

    /// Request a verification code for `(email, user_type)`.
    ///
    /// Supersedes every earlier live record for the email, stores a fresh
    /// record, delivers the code, and returns the new record's id. Calling
    /// this again acts as a resend: the old id stops verifying.
    pub async fn request_code(
        &self,
        email: &str,
        user_type: UserType,
    ) -> Result<String, VerifyError> {
        let email = normalize_email(email)?;

        // Duplicate-registration check against the base user records.
        let registered = self
            .store
            .find(collections::USERS, "email", &json!(email))
            .await?;
        if !registered.is_empty() {
            return Err(VerifyError::Conflict(email));
        }

        let existing = self.live_records_for(&email).await?;
        let cooldown = Duration::seconds(self.config.resend_cooldown_secs);
        if existing
            .iter()
            .any(|r| Utc::now() - r.created_at < cooldown)
        {
            return Err(VerifyError::RateLimit(format!(
                "a code was sent to {} moments ago; wait before requesting another",
                email
            )));
        }

        let record = VerificationRecord::new(
            email.clone(),
            generate_code(),
            user_type,
            Duration::seconds(self.config.code_ttl_secs),
        );

        let mut batch = WriteBatch::new();
        for old in &existing {
            batch = batch.update(
                PRE_VERIFICATION_CODES,
                &old.id,
                json!({"superseded": true}),
            );
        }
        batch = batch.set(
            PRE_VERIFICATION_CODES,
            &record.id,
            serde_json::to_value(&record)?,
        );
        self.store.commit(batch).await?;

        tracing::info!(
            verification_id = %record.id,
            user_type = %user_type,
            superseded = existing.len(),
            "verification code requested"
        );
        self.delivery.deliver(&email, &record.code).await?;

        Ok(record.id)
    }

    /// Alias for a fresh request; the previous id stops verifying.
    pub async fn resend_code(
        &self,
        email: &str,
        user_type: UserType,
    ) -> Result<String, VerifyError> {
        self.request_code(email, user_type).await
    }

    /// Check a submitted code against the record.
    ///
    /// On success the record is marked verified and left in place for
    /// account creation to consume.
    pub async fn verify_code(&self, id: &str, code: &str) -> Result<(), VerifyError> {
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VerifyError::Validation(
                "code must be six digits".to_string(),
            ));
        }

        let record = self.fetch(id).await?;
        let Some(record) = record else {
            return Err(VerifyError::NotFound(id.to_string()));
        };

        if record.superseded {
            // A newer request replaced this id; from the caller's side the
            // record no longer exists.
            return Err(VerifyError::NotFound(id.to_string()));
        }
        if record.is_expired() {
            return Err(VerifyError::Expired(id.to_string()));
        }
        if record.verified {
            return Ok(());
        }
        if record.attempts >= self.config.max_attempts {
            return Err(VerifyError::RateLimit(
                "too many incorrect codes; request a new one".to_string(),
            ));
        }

        if record.code != code {
            let attempts = record.attempts + 1;
            self.store
                .update(PRE_VERIFICATION_CODES, id, json!({"attempts": attempts}))
                .await?;
            let remaining = self.config.max_attempts.saturating_sub(attempts);
            return Err(VerifyError::Mismatch { remaining });
        }

        self.store
            .update(PRE_VERIFICATION_CODES, id, json!({"verified": true}))
            .await?;
        tracing::info!(verification_id = %id, "email verified");
        Ok(())
    }

    /// Fetch a record by id.
    pub async fn fetch(&self, id: &str) -> Result<Option<VerificationRecord>, VerifyError> {
        let doc = self.store.get(PRE_VERIFICATION_CODES, id).await?;
        Ok(doc.map(serde_json::from_value).transpose()?)
    }

    async fn live_records_for(&self, email: &str) -> Result<Vec<VerificationRecord>, VerifyError> {
        let docs = self
            .store
            .find(PRE_VERIFICATION_CODES, "email", &json!(email))
            .await?;
        let mut records = Vec::new();
        for (_, doc) in docs {
            let record: VerificationRecord = serde_json::from_value(doc)?;
            if record.is_live() {
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

fn normalize_email(email: &str) -> Result<String, VerifyError> {
    let email = email.trim().to_ascii_lowercase();
    let invalid = || VerifyError::Validation(format!("invalid email address: {}", email));

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::CapturingDelivery;
    use assist_store::MemoryStore;

    fn service_with(
        config: VerificationConfig,
    ) -> (VerificationService, Arc<CapturingDelivery>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let delivery = Arc::new(CapturingDelivery::new());
        let service =
            VerificationService::new(store.clone(), delivery.clone(), config);
        (service, delivery, store)
    }

    fn no_cooldown() -> VerificationConfig {
        VerificationConfig {
            resend_cooldown_secs: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn request_then_verify_succeeds() {
        let (service, delivery, _) = service_with(no_cooldown());

        let id = service
            .request_code("Jane@X.com", UserType::Applicant)
            .await
            .unwrap();
        let code = delivery.last_code().unwrap();

        service.verify_code(&id, &code).await.unwrap();
        let record = service.fetch(&id).await.unwrap().unwrap();
        assert!(record.verified);
        assert_eq!(record.email, "jane@x.com");
    }

    #[tokio::test]
    async fn second_request_invalidates_first_code() {
        let (service, delivery, _) = service_with(no_cooldown());

        let first_id = service
            .request_code("jane@x.com", UserType::Applicant)
            .await
            .unwrap();
        let first_code = delivery.last_code().unwrap();

        let second_id = service
            .request_code("jane@x.com", UserType::Applicant)
            .await
            .unwrap();
        assert_ne!(first_id, second_id);

        // The first id must no longer verify, even with its correct code.
        let err = service.verify_code(&first_id, &first_code).await.unwrap_err();
        assert!(matches!(err, VerifyError::NotFound(_)));

        // The second id still works.
        let second_code = delivery.last_code().unwrap();
        service.verify_code(&second_id, &second_code).await.unwrap();
    }

    #[tokio::test]
    async fn expired_code_reports_expiry_not_generic_error() {
        let config = VerificationConfig {
            code_ttl_secs: -1, // already expired
            resend_cooldown_secs: 0,
            ..Default::default()
        };
        let (service, delivery, _) = service_with(config);

        let id = service
            .request_code("jane@x.com", UserType::Subscriber)
            .await
            .unwrap();
        let code = delivery.last_code().unwrap();

        let err = service.verify_code(&id, &code).await.unwrap_err();
        assert!(matches!(err, VerifyError::Expired(_)));
    }

    #[tokio::test]
    async fn wrong_code_counts_attempts_then_locks_out() {
        let config = VerificationConfig {
            max_attempts: 2,
            resend_cooldown_secs: 0,
            ..Default::default()
        };
        let (service, delivery, _) = service_with(config);

        let id = service
            .request_code("jane@x.com", UserType::Applicant)
            .await
            .unwrap();
        let code = delivery.last_code().unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert!(matches!(
            service.verify_code(&id, wrong).await.unwrap_err(),
            VerifyError::Mismatch { remaining: 1 }
        ));
        assert!(matches!(
            service.verify_code(&id, wrong).await.unwrap_err(),
            VerifyError::Mismatch { remaining: 0 }
        ));
        // Even the right code is refused once locked out.
        assert!(matches!(
            service.verify_code(&id, &code).await.unwrap_err(),
            VerifyError::RateLimit(_)
        ));
    }

    #[tokio::test]
    async fn repeated_request_within_cooldown_is_rate_limited() {
        let (service, _, _) = service_with(VerificationConfig::default());

        service
            .request_code("jane@x.com", UserType::Applicant)
            .await
            .unwrap();
        let err = service
            .request_code("jane@x.com", UserType::Applicant)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::RateLimit(_)));
    }

    #[tokio::test]
    async fn registered_email_conflicts() {
        let (service, _, store) = service_with(no_cooldown());
        store
            .set("users", "u1", json!({"email": "jane@x.com"}))
            .await
            .unwrap();

        let err = service
            .request_code("jane@x.com", UserType::Subscriber)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Conflict(_)));
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let (service, _, _) = service_with(no_cooldown());
        for bad in ["", "jane", "jane@", "@x.com", "jane@nodot", "a b@x.com"] {
            let err = service
                .request_code(bad, UserType::Applicant)
                .await
                .unwrap_err();
            assert!(matches!(err, VerifyError::Validation(_)), "email: {bad:?}");
        }
    }
}
