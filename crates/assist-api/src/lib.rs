//! # assist-api
//!
//! Client-facing HTTP API: the pre-auth verification endpoints and account
//! creation. Error responses carry a machine-readable `error.kind` that the
//! client branches on, never message substrings.

pub mod adapters;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use adapters::{AccountServiceApi, VerificationServiceApi};
pub use error::ApiError;
pub use routes::router;
pub use state::ApiState;
