//! Account creation.

use chrono::Utc;
use rand::RngCore;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use assist_core::collections::{
    self, APPLICANTS, AUDIT_LOGS, CREDENTIALS, PRE_VERIFICATION_CODES, SUBSCRIBERS, USERS,
};
use assist_core::{
    ApplicantRecord, AuditRecord, ProfileFields, SubscriberRecord, UserRecord, UserType,
};
use assist_store::{DocumentStore, WriteBatch};
use assist_verify::VerificationRecord;

use crate::error::AccountError;

const MIN_PASSWORD_LEN: usize = 8;

/// Validated profile input collected during onboarding.
///
/// Every field is required and non-empty at this boundary; the stored
/// documents relax that to optional fields.
#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl ProfileInput {
    fn validate(&self) -> Result<(), AccountError> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AccountError::Validation(format!("{} is required", name)));
            }
        }
        Ok(())
    }

    fn to_fields(&self) -> ProfileFields {
        ProfileFields {
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            phone: Some(self.phone.clone()),
            address: Some(self.address.clone()),
            city: Some(self.city.clone()),
            state: Some(self.state.clone()),
            zip: Some(self.zip.clone()),
        }
    }
}

/// User-type-specific signup details.
#[derive(Debug, Clone)]
pub enum SignupIntent {
    Subscriber {
        /// Custom donation amount as entered, e.g. "25" or "25.50".
        donation_amount: Option<String>,
    },
    Applicant {
        assistance_type: String,
    },
}

impl SignupIntent {
    fn user_type(&self) -> UserType {
        match self {
            Self::Subscriber { .. } => UserType::Subscriber,
            Self::Applicant { .. } => UserType::Applicant,
        }
    }
}

/// Everything needed to turn a verified record into an account.
#[derive(Debug, Clone)]
pub struct CreateAccountRequest {
    pub verification_id: String,
    pub password: String,
    pub profile: ProfileInput,
    pub intent: SignupIntent,
}

/// Creates accounts from verified pre-auth records.
pub struct AccountService {
    store: Arc<dyn DocumentStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Atomically create the credential stub and every associated document
    /// for the resolved user type, consuming the verification record.
    pub async fn create_account(&self, req: CreateAccountRequest) -> Result<String, AccountError> {
        req.profile.validate()?;
        if req.password.len() < MIN_PASSWORD_LEN {
            return Err(AccountError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let donation_amount_cents = match &req.intent {
            SignupIntent::Subscriber {
                donation_amount: Some(raw),
            } => Some(parse_donation_amount(raw)?),
            SignupIntent::Subscriber {
                donation_amount: None,
            } => None,
            SignupIntent::Applicant { assistance_type } => {
                if assistance_type.trim().is_empty() {
                    return Err(AccountError::Validation(
                        "assistanceType is required".to_string(),
                    ));
                }
                None
            }
        };

        let record = self.verified_record(&req.verification_id).await?;
        if record.user_type != req.intent.user_type() {
            return Err(AccountError::Validation(format!(
                "verification was issued for a {} account",
                record.user_type
            )));
        }

        let registered = self
            .store
            .find(USERS, "email", &json!(record.email))
            .await?;
        if !registered.is_empty() {
            return Err(AccountError::AlreadyExists(record.email));
        }

        let user_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let profile = req.profile.to_fields();

        let user = UserRecord {
            id: user_id.clone(),
            email: Some(record.email.clone()),
            display_name: Some(format!("{} {}", req.profile.first_name, req.profile.last_name)),
            user_type: record.user_type,
            email_verified: true,
            profile_completed: true,
            profile: profile.clone(),
            created_at: now,
        };

        let mut batch = WriteBatch::new()
            .set(
                CREDENTIALS,
                &user_id,
                credential_doc(&user_id, &record.email, &req.password),
            )
            .set(USERS, &user_id, serde_json::to_value(&user)?);

        match &req.intent {
            SignupIntent::Subscriber { .. } => {
                let subscriber = SubscriberRecord {
                    user_id: user_id.clone(),
                    donation_amount_cents,
                    subscription: None,
                    profile: profile.clone(),
                    created_at: now,
                };
                batch = batch.set(SUBSCRIBERS, &user_id, serde_json::to_value(&subscriber)?);
            }
            SignupIntent::Applicant { assistance_type } => {
                let applicant = ApplicantRecord {
                    user_id: user_id.clone(),
                    assistance_type: Some(assistance_type.clone()),
                    profile: profile.clone(),
                    created_at: now,
                };
                batch = batch.set(APPLICANTS, &user_id, serde_json::to_value(&applicant)?);
            }
        }

        let audit = AuditRecord::new("onboarding", "account.created", collections::doc_path(USERS, &user_id))
            .with_detail(json!({"userType": record.user_type, "email": record.email}));

        batch = batch
            .set(
                collections::profile_collection(&user_id),
                collections::PROFILE_DOC,
                serde_json::to_value(&profile)?,
            )
            .delete(PRE_VERIFICATION_CODES, &record.id)
            .set(AUDIT_LOGS, audit.event_id.to_string(), serde_json::to_value(&audit)?);

        self.store.commit(batch).await?;

        tracing::info!(user_id = %user_id, user_type = %record.user_type, "account created");
        Ok(user_id)
    }

    /// Fetch the verification record and check the creation precondition.
    async fn verified_record(&self, id: &str) -> Result<VerificationRecord, AccountError> {
        let doc = self.store.get(PRE_VERIFICATION_CODES, id).await?;
        let Some(doc) = doc else {
            return Err(AccountError::PreconditionFailed(format!(
                "verification {} not found",
                id
            )));
        };
        let record: VerificationRecord = serde_json::from_value(doc)?;
        if record.superseded {
            return Err(AccountError::PreconditionFailed(
                "verification was replaced by a newer request".to_string(),
            ));
        }
        if !record.verified {
            return Err(AccountError::PreconditionFailed(
                "email was not verified".to_string(),
            ));
        }
        Ok(record)
    }
}

/// Salted SHA-256 credential stub. The hosted auth service owns real
/// credentials; this records enough to exercise the creation flow.
fn credential_doc(user_id: &str, email: &str, password: &str) -> serde_json::Value {
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    json!({
        "userId": user_id,
        "email": email,
        "salt": hex::encode(salt),
        "passwordHash": hex::encode(digest),
        "createdAt": Utc::now(),
    })
}

/// A custom donation amount must parse as a positive number (dollars).
fn parse_donation_amount(raw: &str) -> Result<i64, AccountError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AccountError::Validation(format!("invalid donation amount: {}", raw)))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AccountError::Validation(format!(
            "donation amount must be positive: {}",
            raw
        )));
    }
    Ok((amount * 100.0).round() as i64)
}
