//! Request handlers and wire DTOs.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use assist_accounts::{CreateAccountRequest, ProfileInput, SignupIntent};
use assist_core::{ErrorKind, UserType};

use crate::error::ApiError;
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeBody {
    pub email: String,
    pub user_type: UserType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeBody {
    pub verification_id: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountBody {
    pub verification_id: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub user_type: UserType,
    #[serde(default)]
    pub assistance_type: Option<String>,
    #[serde(default)]
    pub custom_donation_amount: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    fn ok() -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
        })
    }

    fn with(data: Value) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
        })
    }
}

/// `POST /sendPreAuthVerificationCode`
pub async fn send_pre_auth_verification_code(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<SendCodeBody>,
) -> Result<Json<Envelope>, ApiError> {
    let verification_id = state
        .verify
        .request_code(&body.email, body.user_type)
        .await?;
    Ok(Envelope::with(json!({"verificationId": verification_id})))
}

/// `POST /verifyPreAuthCode`
pub async fn verify_pre_auth_code(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<VerifyCodeBody>,
) -> Result<Json<Envelope>, ApiError> {
    state
        .verify
        .verify_code(&body.verification_id, &body.code)
        .await?;
    Ok(Envelope::ok())
}

/// `POST /createAccount`
pub async fn create_account(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<CreateAccountBody>,
) -> Result<Json<Envelope>, ApiError> {
    let intent = match body.user_type {
        UserType::Subscriber => SignupIntent::Subscriber {
            donation_amount: body.custom_donation_amount.clone(),
        },
        UserType::Applicant => {
            let assistance_type = body.assistance_type.clone().ok_or_else(|| {
                ApiError::new(ErrorKind::Validation, "assistanceType is required")
            })?;
            SignupIntent::Applicant { assistance_type }
        }
        UserType::Admin => {
            return Err(ApiError::new(
                ErrorKind::Validation,
                "admins are not onboarded through this endpoint",
            ));
        }
    };

    let user_id = state
        .accounts
        .create_account(CreateAccountRequest {
            verification_id: body.verification_id,
            password: body.password,
            profile: ProfileInput {
                first_name: body.first_name,
                last_name: body.last_name,
                phone: body.phone,
                address: body.address,
                city: body.city,
                state: body.state,
                zip: body.zip,
            },
            intent,
        })
        .await?;
    Ok(Envelope::with(json!({"userId": user_id})))
}
