//! User, profile, and subscription record shapes.
//!
//! Profile fields are duplicated across up to three documents: the base user
//! record, the user-type record, and the profile sub-record. The sub-record
//! is canonical; the other two are denormalized caches kept in sync by
//! writing all three in one batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which population a user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// A donor contributing recurring or one-time payments.
    Subscriber,
    /// A user requesting financial assistance.
    Applicant,
    /// Internal operator.
    Admin,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Subscriber => write!(f, "subscriber"),
            Self::Applicant => write!(f, "applicant"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Base user record stored in `users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Opaque identifier issued at account creation.
    pub id: String,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub user_type: UserType,
    pub email_verified: bool,
    pub profile_completed: bool,
    /// Denormalized profile cache (the sub-record is canonical).
    #[serde(default)]
    pub profile: ProfileFields,
    pub created_at: DateTime<Utc>,
}

/// Editable personal/address fields.
///
/// All fields are optional at the document level; input validation happens
/// at the onboarding boundary, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl ProfileFields {
    /// Whether this copy holds address data.
    ///
    /// The migration routine treats a sub-record with address data as
    /// already-migrated and performs no writes.
    pub fn has_address_data(&self) -> bool {
        self.address.is_some() || self.city.is_some() || self.zip.is_some()
    }

    /// Whether every field is absent.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Per-field overlay: fields present in `self` win, the rest fall back
    /// to `lower`.
    pub fn or_else_from(&self, lower: &ProfileFields) -> ProfileFields {
        ProfileFields {
            first_name: self.first_name.clone().or_else(|| lower.first_name.clone()),
            last_name: self.last_name.clone().or_else(|| lower.last_name.clone()),
            phone: self.phone.clone().or_else(|| lower.phone.clone()),
            address: self.address.clone().or_else(|| lower.address.clone()),
            city: self.city.clone().or_else(|| lower.city.clone()),
            state: self.state.clone().or_else(|| lower.state.clone()),
            zip: self.zip.clone().or_else(|| lower.zip.clone()),
        }
    }
}

/// Stripe-backed subscription state carried on the subscriber record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFields {
    pub customer_id: String,
    pub subscription_id: String,
    pub status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_amount_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<DateTime<Utc>>,
}

/// Subscription lifecycle status as reported by the payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
    Incomplete,
}

impl SubscriptionStatus {
    /// Lenient parse of the processor's status string.
    pub fn parse(s: &str) -> Self {
        match s {
            "active" | "trialing" => Self::Active,
            "past_due" | "unpaid" => Self::PastDue,
            "canceled" => Self::Canceled,
            _ => Self::Incomplete,
        }
    }
}

/// Subscriber record stored in `subscribers`, keyed by user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberRecord {
    pub user_id: String,
    /// Chosen donation amount in cents (custom amounts validated at intake).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donation_amount_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionFields>,
    /// Denormalized profile cache.
    #[serde(default)]
    pub profile: ProfileFields,
    pub created_at: DateTime<Utc>,
}

/// Applicant record stored in `applicants`, keyed by user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRecord {
    pub user_id: String,
    /// What kind of assistance is requested (e.g. "rent", "utilities").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistance_type: Option<String>,
    /// Denormalized profile cache.
    #[serde(default)]
    pub profile: ProfileFields,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_prefers_upper_fields() {
        let upper = ProfileFields {
            address: Some("1 Main St".into()),
            ..Default::default()
        };
        let lower = ProfileFields {
            address: Some("2 Oak Ave".into()),
            city: Some("Springfield".into()),
            ..Default::default()
        };

        let merged = upper.or_else_from(&lower);
        assert_eq!(merged.address.as_deref(), Some("1 Main St"));
        assert_eq!(merged.city.as_deref(), Some("Springfield"));
    }

    #[test]
    fn address_data_detection() {
        assert!(!ProfileFields::default().has_address_data());

        let with_zip = ProfileFields {
            zip: Some("62704".into()),
            ..Default::default()
        };
        assert!(with_zip.has_address_data());

        let name_only = ProfileFields {
            first_name: Some("Jane".into()),
            ..Default::default()
        };
        assert!(!name_only.has_address_data());
    }

    #[test]
    fn subscription_status_parse_is_lenient() {
        assert_eq!(SubscriptionStatus::parse("active"), SubscriptionStatus::Active);
        assert_eq!(SubscriptionStatus::parse("past_due"), SubscriptionStatus::PastDue);
        assert_eq!(SubscriptionStatus::parse("canceled"), SubscriptionStatus::Canceled);
        assert_eq!(
            SubscriptionStatus::parse("incomplete_expired"),
            SubscriptionStatus::Incomplete
        );
    }

    #[test]
    fn user_record_round_trips_camel_case() {
        let record = UserRecord {
            id: "u1".into(),
            email: Some("jane@x.com".into()),
            display_name: None,
            user_type: UserType::Applicant,
            email_verified: true,
            profile_completed: false,
            profile: ProfileFields::default(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("emailVerified").is_some());
        assert!(value.get("userType").is_some());
    }
}
