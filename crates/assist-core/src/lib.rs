//! # assist-core
//!
//! Shared domain types and configuration for the Assist platform.
//!
//! This crate holds everything the other crates agree on:
//! - User, profile, subscription, payment, and notification record shapes
//! - Audit record shape for the `auditLogs` collection
//! - Collection path helpers mirroring the hosted document layout
//! - The structured error-kind taxonomy used across service boundaries
//! - Unified configuration loaded from `assist.yaml`

pub mod audit;
pub mod billing;
pub mod collections;
pub mod config;
pub mod error;
pub mod user;

pub use audit::AuditRecord;
pub use billing::{NotificationKind, NotificationRecord, PaymentRecord, PaymentStatus};
pub use config::{
    AssistConfig, ServerConfig, StoreBackend, StoreConfig, StripeConfig, VerificationConfig,
};
pub use error::ErrorKind;
pub use user::{
    ApplicantRecord, ProfileFields, SubscriberRecord, SubscriptionFields, SubscriptionStatus,
    UserRecord, UserType,
};
