//! In-flight verification records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use assist_core::UserType;

/// One pre-auth verification attempt, stored in `preVerificationCodes`.
///
/// Created when a code is requested, marked verified on a correct code,
/// superseded when a newer code is requested for the same email, and
/// deleted once account creation consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    /// Opaque id handed back to the client.
    pub id: String,
    /// Target email, lowercased.
    pub email: String,
    /// Six decimal digits.
    pub code: String,
    pub user_type: UserType,
    pub verified: bool,
    /// Set when a newer request replaced this record.
    pub superseded: bool,
    /// Wrong-code submissions so far.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerificationRecord {
    pub fn new(email: impl Into<String>, code: impl Into<String>, user_type: UserType, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            code: code.into(),
            user_type,
            verified: false,
            superseded: false,
            attempts: 0,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// A record that can still accept a code submission.
    pub fn is_live(&self) -> bool {
        !self.superseded && !self.is_expired()
    }
}
