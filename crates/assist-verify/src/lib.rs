//! # assist-verify
//!
//! Pre-auth email verification for the Assist platform.
//!
//! Before an account exists, a prospective user proves control of their
//! email address: they request a one-time code, receive it out of band, and
//! submit it back. The in-flight state lives in the `preVerificationCodes`
//! collection as [`VerificationRecord`]s with a validity window.
//!
//! Requesting a new code for the same email supersedes every earlier
//! record, so from the caller's perspective resend is idempotent: exactly
//! one code is live at a time.

pub mod delivery;
pub mod error;
pub mod record;
pub mod service;

pub use delivery::{CapturingDelivery, CodeDelivery, LogDelivery, NullDelivery, create_delivery};
pub use error::VerifyError;
pub use record::VerificationRecord;
pub use service::VerificationService;
