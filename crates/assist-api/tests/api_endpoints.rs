//! HTTP-level tests of the verification and account endpoints, including
//! the structured error kinds clients branch on.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;

use assist_api::{ApiState, router};
use assist_core::AssistConfig;
use assist_store::MemoryStore;
use assist_verify::CapturingDelivery;

fn app() -> (Router, Arc<CapturingDelivery>) {
    let store = Arc::new(MemoryStore::new());
    let delivery = Arc::new(CapturingDelivery::new());
    let mut config = AssistConfig::default();
    config.verification.resend_cooldown_secs = 0;

    let state = ApiState::with_delivery(store, &config, delivery.clone());
    (router(Arc::new(state)), delivery)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app.clone(),
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn jane_account_body(verification_id: &str) -> Value {
    json!({
        "verificationId": verification_id,
        "password": "secret123",
        "firstName": "Jane",
        "lastName": "Doe",
        "phone": "555-0100",
        "address": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "zip": "62704",
        "userType": "applicant",
        "assistanceType": "rent",
    })
}

#[tokio::test]
async fn full_signup_over_http() {
    let (app, delivery) = app();

    let (status, body) = post_json(
        &app,
        "/sendPreAuthVerificationCode",
        json!({"email": "jane@x.com", "userType": "applicant"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let verification_id = body["data"]["verificationId"].as_str().unwrap().to_string();

    let code = delivery.last_code().unwrap();
    let (status, body) = post_json(
        &app,
        "/verifyPreAuthCode",
        json!({"verificationId": verification_id, "code": code}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, body) =
        post_json(&app, "/createAccount", jane_account_body(&verification_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body["data"]["userId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn error_kinds_map_to_statuses() {
    let (app, delivery) = app();

    // Malformed email: 400 validation.
    let (status, body) = post_json(
        &app,
        "/sendPreAuthVerificationCode",
        json!({"email": "not-an-email", "userType": "applicant"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");

    // Unknown verification id: 404 not_found.
    let (status, body) = post_json(
        &app,
        "/verifyPreAuthCode",
        json!({"verificationId": "ghost", "code": "123456"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");

    // Account creation without verification: 412 precondition_failed.
    let (status, body) = post_json(&app, "/createAccount", jane_account_body("ghost")).await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["error"]["kind"], "precondition_failed");

    // Registered email: 409 conflict.
    let (_, body) = post_json(
        &app,
        "/sendPreAuthVerificationCode",
        json!({"email": "jane@x.com", "userType": "applicant"}),
    )
    .await;
    let verification_id = body["data"]["verificationId"].as_str().unwrap().to_string();
    let code = delivery.last_code().unwrap();
    post_json(
        &app,
        "/verifyPreAuthCode",
        json!({"verificationId": verification_id, "code": code}),
    )
    .await;
    post_json(&app, "/createAccount", jane_account_body(&verification_id)).await;

    let (status, body) = post_json(
        &app,
        "/sendPreAuthVerificationCode",
        json!({"email": "jane@x.com", "userType": "applicant"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "conflict");
}

#[tokio::test]
async fn wrong_code_reports_mismatch() {
    let (app, delivery) = app();

    let (_, body) = post_json(
        &app,
        "/sendPreAuthVerificationCode",
        json!({"email": "jane@x.com", "userType": "subscriber"}),
    )
    .await;
    let verification_id = body["data"]["verificationId"].as_str().unwrap().to_string();

    let code = delivery.last_code().unwrap();
    let wrong = if code == "000000" { "000001" } else { "000000" };
    let (status, body) = post_json(
        &app,
        "/verifyPreAuthCode",
        json!({"verificationId": verification_id, "code": wrong}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "mismatch");
}
