//! # assist-onboarding
//!
//! The canonical onboarding flow for the Assist client, and the dashboard
//! fetch state machine.
//!
//! Earlier iterations of the product accumulated several near-identical
//! onboarding screens with divergent backing services. Here there is exactly
//! one state machine; the verification and account-creation calls are
//! injected as traits, so alternate backings are test doubles rather than
//! parallel production code paths.

pub mod flow;
pub mod loader;
pub mod services;

pub use flow::{OnboardingFlow, OnboardingState, SignupForm};
pub use loader::{FetchTicket, LoadState, Loader};
pub use services::{AccountApi, AccountSubmission, ServiceError, VerificationApi};
