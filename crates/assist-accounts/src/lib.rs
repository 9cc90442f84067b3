//! # assist-accounts
//!
//! Account creation and profile handling for the Assist platform.
//!
//! Account creation consumes a verified pre-auth record and writes the
//! credential stub plus every associated document in one atomic batch, so a
//! half-created account cannot exist.
//!
//! Profile fields are duplicated across three documents. The profile
//! sub-record is canonical; [`merged_profile`] resolves the precedence
//! (sub-record > type-specific record > base record) and the migration
//! routine converges stragglers into the sub-record, as a reported no-op
//! when nothing needs copying.

pub mod create;
pub mod error;
pub mod profile;
pub mod projections;

pub use create::{AccountService, CreateAccountRequest, ProfileInput, SignupIntent};
pub use error::AccountError;
pub use profile::{MigrationOutcome, ProfileService, merged_profile};
pub use projections::{ApplicationView, ProfileView, ProjectionService, SubscriptionView};
