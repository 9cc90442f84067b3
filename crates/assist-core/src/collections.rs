//! Collection paths mirroring the hosted document layout.
//!
//! Top-level collections are flat names; the profile sub-record lives in a
//! per-user sub-collection addressed as `users/{id}/profile` with the fixed
//! document id `main`.

/// Base user records.
pub const USERS: &str = "users";
/// Subscriber (donor) records, keyed by user id.
pub const SUBSCRIBERS: &str = "subscribers";
/// Applicant (aid recipient) records, keyed by user id.
pub const APPLICANTS: &str = "applicants";
/// Uploaded document metadata, keyed by document id.
pub const USER_DOCUMENTS: &str = "userDocuments";
/// Payment history entries written by the webhook dispatcher.
pub const PAYMENT_HISTORY: &str = "paymentHistory";
/// User-facing notifications.
pub const NOTIFICATIONS: &str = "notifications";
/// Audit trail entries.
pub const AUDIT_LOGS: &str = "auditLogs";
/// In-flight pre-auth verification records.
pub const PRE_VERIFICATION_CODES: &str = "preVerificationCodes";
/// Authentication credential stubs, keyed by user id.
pub const CREDENTIALS: &str = "credentials";
/// Processed Stripe event ids (webhook idempotency ledger).
pub const PROCESSED_WEBHOOK_EVENTS: &str = "processedWebhookEvents";

/// Fixed document id of the profile sub-record.
pub const PROFILE_DOC: &str = "main";

/// Sub-collection holding a user's profile sub-record.
pub fn profile_collection(user_id: &str) -> String {
    format!("{}/{}/profile", USERS, user_id)
}

/// Full path of a document, for audit subjects and log lines.
pub fn doc_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}
