//! HTTP surface for the webhook dispatcher.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use std::sync::Arc;

use crate::dispatcher::WebhookDispatcher;
use crate::error::WebhookError;

const SIGNATURE_HEADER: &str = "stripe-signature";

/// Router state.
pub struct WebhookState {
    pub dispatcher: WebhookDispatcher,
}

/// Create the webhook router. Only POST is routed, so other methods get a
/// 405 from axum.
pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/stripeWebhook", post(handle_stripe_webhook))
        .with_state(state)
}

async fn handle_stripe_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "missing stripe-signature header"})),
        )
            .into_response();
    };

    match state.dispatcher.handle(signature, &body).await {
        // Every resolved delivery is acknowledged the same way; the
        // provider only looks at the status code.
        Ok(_) => (StatusCode::OK, Json(json!({"received": true}))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "webhook handling failed");
            webhook_error_response(&e)
        }
    }
}

fn webhook_error_response(e: &WebhookError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"error": e.to_string()}))).into_response()
}
