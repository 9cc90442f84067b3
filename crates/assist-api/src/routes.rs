//! API router.

use axum::{Router, routing::post};
use std::sync::Arc;

use crate::handlers;
use crate::state::ApiState;

/// Create the client-facing API router.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(
            "/sendPreAuthVerificationCode",
            post(handlers::send_pre_auth_verification_code),
        )
        .route("/verifyPreAuthCode", post(handlers::verify_pre_auth_code))
        .route("/createAccount", post(handlers::create_account))
        .with_state(state)
}
