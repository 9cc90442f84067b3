//! Adapters wiring the real services into the onboarding flow's traits.
//!
//! The flow sees `VerificationApi` / `AccountApi`; production hands it these
//! adapters, tests hand it doubles. Error kinds pass through unchanged so
//! the flow's recover-or-fail decisions work the same against either.

use async_trait::async_trait;
use std::sync::Arc;

use assist_accounts::{AccountService, CreateAccountRequest, ProfileInput, SignupIntent};
use assist_core::{ErrorKind, UserType};
use assist_onboarding::{AccountApi, AccountSubmission, ServiceError, VerificationApi};
use assist_verify::VerificationService;

/// [`VerificationApi`] over the real verification service.
pub struct VerificationServiceApi {
    service: Arc<VerificationService>,
}

impl VerificationServiceApi {
    pub fn new(service: Arc<VerificationService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl VerificationApi for VerificationServiceApi {
    async fn request_code(
        &self,
        email: &str,
        user_type: UserType,
    ) -> Result<String, ServiceError> {
        self.service
            .request_code(email, user_type)
            .await
            .map_err(|e| ServiceError::new(e.kind(), e.to_string()))
    }

    async fn verify_code(&self, verification_id: &str, code: &str) -> Result<(), ServiceError> {
        self.service
            .verify_code(verification_id, code)
            .await
            .map_err(|e| ServiceError::new(e.kind(), e.to_string()))
    }
}

/// [`AccountApi`] over the real account service.
pub struct AccountServiceApi {
    service: Arc<AccountService>,
}

impl AccountServiceApi {
    pub fn new(service: Arc<AccountService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AccountApi for AccountServiceApi {
    async fn create_account(&self, submission: AccountSubmission) -> Result<String, ServiceError> {
        let form = submission.form;
        let intent = match form.user_type {
            UserType::Subscriber => SignupIntent::Subscriber {
                donation_amount: form.custom_donation_amount.clone(),
            },
            UserType::Applicant => SignupIntent::Applicant {
                assistance_type: form.assistance_type.clone().unwrap_or_default(),
            },
            UserType::Admin => {
                return Err(ServiceError::new(
                    ErrorKind::Validation,
                    "admins are not onboarded through this flow",
                ));
            }
        };

        self.service
            .create_account(CreateAccountRequest {
                verification_id: submission.verification_id,
                password: submission.password,
                profile: ProfileInput {
                    first_name: form.first_name,
                    last_name: form.last_name,
                    phone: form.phone,
                    address: form.address,
                    city: form.city,
                    state: form.state,
                    zip: form.zip,
                },
                intent,
            })
            .await
            .map_err(|e| ServiceError::new(e.kind(), e.to_string()))
    }
}
