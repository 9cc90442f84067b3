//! Onboarding flow state machine.
//!
//! Linear sequence: `CollectingProfile → RequestingCode → CodeSent →
//! VerifyingCode → Verified → CreatingAccount → Complete`, with `Failed` as
//! the off-ramp for non-recoverable service errors. Recoverable errors
//! (wrong code, rate limit, validation) keep the flow on its current step so
//! the screen can surface them inline.

use std::sync::Arc;

use assist_core::{ErrorKind, UserType};

use crate::services::{AccountApi, AccountSubmission, ServiceError, VerificationApi};

/// Everything collected on the profile step.
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub email: String,
    pub user_type: UserType,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Applicants: what kind of assistance is requested.
    pub assistance_type: Option<String>,
    /// Subscribers: custom donation amount as entered.
    pub custom_donation_amount: Option<String>,
}

impl SignupForm {
    /// The profile-step input contract: all required fields non-empty, a
    /// custom donation amount (if selected) parses as a positive number.
    fn validate(&self) -> Result<(), ServiceError> {
        let required = [
            ("email", &self.email),
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ServiceError::new(
                    ErrorKind::Validation,
                    format!("{} is required", name),
                ));
            }
        }

        match self.user_type {
            UserType::Applicant => {
                if self
                    .assistance_type
                    .as_deref()
                    .is_none_or(|s| s.trim().is_empty())
                {
                    return Err(ServiceError::new(
                        ErrorKind::Validation,
                        "assistanceType is required",
                    ));
                }
            }
            UserType::Subscriber => {
                if let Some(raw) = &self.custom_donation_amount {
                    let ok = raw
                        .trim()
                        .parse::<f64>()
                        .is_ok_and(|v| v.is_finite() && v > 0.0);
                    if !ok {
                        return Err(ServiceError::new(
                            ErrorKind::Validation,
                            "custom donation amount must be a positive number",
                        ));
                    }
                }
            }
            UserType::Admin => {
                return Err(ServiceError::new(
                    ErrorKind::Validation,
                    "admins are not onboarded through this flow",
                ));
            }
        }
        Ok(())
    }
}

/// Where the flow currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingState {
    CollectingProfile,
    RequestingCode,
    CodeSent { verification_id: String },
    VerifyingCode { verification_id: String },
    Verified { verification_id: String },
    CreatingAccount { verification_id: String },
    Complete { user_id: String },
    Failed { kind: ErrorKind, message: String, retryable: bool },
}

/// The one canonical onboarding flow.
pub struct OnboardingFlow {
    verification: Arc<dyn VerificationApi>,
    accounts: Arc<dyn AccountApi>,
    state: OnboardingState,
    form: Option<SignupForm>,
}

impl OnboardingFlow {
    pub fn new(verification: Arc<dyn VerificationApi>, accounts: Arc<dyn AccountApi>) -> Self {
        Self {
            verification,
            accounts,
            state: OnboardingState::CollectingProfile,
            form: None,
        }
    }

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    /// Submit the collected profile fields and request a code.
    ///
    /// On a recoverable error (validation, conflict, rate limit) the flow
    /// stays on the profile step for inline display.
    pub async fn submit_profile(&mut self, form: SignupForm) -> Result<(), ServiceError> {
        self.expect_step(&self.state, &OnboardingState::CollectingProfile)?;
        form.validate()?;

        self.state = OnboardingState::RequestingCode;
        match self
            .verification
            .request_code(&form.email, form.user_type)
            .await
        {
            Ok(verification_id) => {
                self.form = Some(form);
                self.state = OnboardingState::CodeSent { verification_id };
                Ok(())
            }
            Err(e) => {
                self.absorb_error(&e, OnboardingState::CollectingProfile);
                Err(e)
            }
        }
    }

    /// Submit the six-digit code.
    ///
    /// A wrong, expired, or unknown code keeps the flow on the code step so
    /// the user can retry or resend.
    pub async fn submit_code(&mut self, code: &str) -> Result<(), ServiceError> {
        let OnboardingState::CodeSent { verification_id } = &self.state else {
            return Err(self.step_mismatch("a code submission"));
        };
        let verification_id = verification_id.clone();

        self.state = OnboardingState::VerifyingCode {
            verification_id: verification_id.clone(),
        };
        match self.verification.verify_code(&verification_id, code).await {
            Ok(()) => {
                self.state = OnboardingState::Verified { verification_id };
                Ok(())
            }
            Err(e) => {
                self.absorb_error(&e, OnboardingState::CodeSent { verification_id });
                Err(e)
            }
        }
    }

    /// Request a fresh code; the previous verification id stops working.
    pub async fn resend_code(&mut self) -> Result<(), ServiceError> {
        let OnboardingState::CodeSent { .. } = &self.state else {
            return Err(self.step_mismatch("a resend"));
        };
        let form = self.form.as_ref().expect("form present after CodeSent");

        match self
            .verification
            .request_code(&form.email, form.user_type)
            .await
        {
            Ok(verification_id) => {
                self.state = OnboardingState::CodeSent { verification_id };
                Ok(())
            }
            Err(e) => {
                // Stay on the current code; rate limits surface inline.
                if e.kind == ErrorKind::Internal {
                    self.state = OnboardingState::Failed {
                        kind: e.kind,
                        message: e.message.clone(),
                        retryable: true,
                    };
                }
                Err(e)
            }
        }
    }

    /// Create the account with the chosen password.
    pub async fn create_account(&mut self, password: &str) -> Result<String, ServiceError> {
        let OnboardingState::Verified { verification_id } = &self.state else {
            return Err(self.step_mismatch("account creation"));
        };
        let verification_id = verification_id.clone();
        let form = self.form.clone().expect("form present after Verified");

        self.state = OnboardingState::CreatingAccount {
            verification_id: verification_id.clone(),
        };
        match self
            .accounts
            .create_account(AccountSubmission {
                verification_id: verification_id.clone(),
                password: password.to_string(),
                form,
            })
            .await
        {
            Ok(user_id) => {
                self.state = OnboardingState::Complete {
                    user_id: user_id.clone(),
                };
                Ok(user_id)
            }
            Err(e) => {
                self.state = OnboardingState::Failed {
                    kind: e.kind,
                    message: e.message.clone(),
                    retryable: e.kind.is_retryable(),
                };
                Err(e)
            }
        }
    }

    /// Start over from the profile step.
    pub fn reset(&mut self) {
        self.state = OnboardingState::CollectingProfile;
        self.form = None;
    }

    /// Recoverable kinds return the flow to `recover`; the rest are
    /// terminal for this attempt.
    fn absorb_error(&mut self, e: &ServiceError, recover: OnboardingState) {
        if e.kind == ErrorKind::Internal {
            self.state = OnboardingState::Failed {
                kind: e.kind,
                message: e.message.clone(),
                retryable: true,
            };
        } else {
            self.state = recover;
        }
    }

    fn expect_step(
        &self,
        actual: &OnboardingState,
        expected: &OnboardingState,
    ) -> Result<(), ServiceError> {
        if actual == expected {
            Ok(())
        } else {
            Err(self.step_mismatch("this step"))
        }
    }

    fn step_mismatch(&self, what: &str) -> ServiceError {
        ServiceError::new(
            ErrorKind::PreconditionFailed,
            format!("the flow is not expecting {} right now", what),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn form(user_type: UserType) -> SignupForm {
        SignupForm {
            email: "jane@x.com".into(),
            user_type,
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            phone: "555-0100".into(),
            address: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: "62704".into(),
            assistance_type: Some("rent".into()),
            custom_donation_amount: None,
        }
    }

    /// Scripted double: issues sequential ids, accepts one fixed code.
    struct FakeVerification {
        issued: Mutex<u32>,
        accept_code: String,
    }

    impl FakeVerification {
        fn new(accept_code: &str) -> Self {
            Self {
                issued: Mutex::new(0),
                accept_code: accept_code.into(),
            }
        }
    }

    #[async_trait]
    impl VerificationApi for FakeVerification {
        async fn request_code(
            &self,
            _email: &str,
            _user_type: UserType,
        ) -> Result<String, ServiceError> {
            let mut issued = self.issued.lock().unwrap();
            *issued += 1;
            Ok(format!("v{}", issued))
        }

        async fn verify_code(&self, _id: &str, code: &str) -> Result<(), ServiceError> {
            if code == self.accept_code {
                Ok(())
            } else {
                Err(ServiceError::new(ErrorKind::Mismatch, "wrong code"))
            }
        }
    }

    struct FakeAccounts;

    #[async_trait]
    impl AccountApi for FakeAccounts {
        async fn create_account(
            &self,
            submission: AccountSubmission,
        ) -> Result<String, ServiceError> {
            assert!(!submission.verification_id.is_empty());
            Ok("user-1".into())
        }
    }

    fn flow() -> OnboardingFlow {
        OnboardingFlow::new(Arc::new(FakeVerification::new("123456")), Arc::new(FakeAccounts))
    }

    #[tokio::test]
    async fn happy_path_reaches_complete() {
        let mut flow = flow();

        flow.submit_profile(form(UserType::Applicant)).await.unwrap();
        assert!(matches!(flow.state(), OnboardingState::CodeSent { .. }));

        flow.submit_code("123456").await.unwrap();
        assert!(matches!(flow.state(), OnboardingState::Verified { .. }));

        let user_id = flow.create_account("secret123").await.unwrap();
        assert_eq!(user_id, "user-1");
        assert!(matches!(flow.state(), OnboardingState::Complete { .. }));
    }

    #[tokio::test]
    async fn empty_field_keeps_flow_on_profile_step() {
        let mut flow = flow();
        let mut bad = form(UserType::Applicant);
        bad.city = "".into();

        let err = flow.submit_profile(bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(*flow.state(), OnboardingState::CollectingProfile);
    }

    #[tokio::test]
    async fn non_positive_donation_amount_is_rejected() {
        let mut flow = flow();
        let mut bad = form(UserType::Subscriber);
        bad.custom_donation_amount = Some("-5".into());

        let err = flow.submit_profile(bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn wrong_code_stays_on_code_step() {
        let mut flow = flow();
        flow.submit_profile(form(UserType::Applicant)).await.unwrap();

        let err = flow.submit_code("000000").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Mismatch);
        assert!(matches!(flow.state(), OnboardingState::CodeSent { .. }));

        // A correct retry still succeeds.
        flow.submit_code("123456").await.unwrap();
        assert!(matches!(flow.state(), OnboardingState::Verified { .. }));
    }

    #[tokio::test]
    async fn resend_replaces_verification_id() {
        let mut flow = flow();
        flow.submit_profile(form(UserType::Applicant)).await.unwrap();
        let OnboardingState::CodeSent { verification_id: first } = flow.state().clone() else {
            panic!("expected CodeSent");
        };

        flow.resend_code().await.unwrap();
        let OnboardingState::CodeSent { verification_id: second } = flow.state().clone() else {
            panic!("expected CodeSent");
        };
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn out_of_order_calls_are_rejected() {
        let mut flow = flow();
        let err = flow.submit_code("123456").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::PreconditionFailed);
        assert_eq!(*flow.state(), OnboardingState::CollectingProfile);
    }

    #[tokio::test]
    async fn backend_failure_is_terminal_but_resettable() {
        struct FailingAccounts;

        #[async_trait]
        impl AccountApi for FailingAccounts {
            async fn create_account(
                &self,
                _submission: AccountSubmission,
            ) -> Result<String, ServiceError> {
                Err(ServiceError::new(ErrorKind::Internal, "store unavailable"))
            }
        }

        let mut flow = OnboardingFlow::new(
            Arc::new(FakeVerification::new("123456")),
            Arc::new(FailingAccounts),
        );
        flow.submit_profile(form(UserType::Applicant)).await.unwrap();
        flow.submit_code("123456").await.unwrap();

        let err = flow.create_account("secret123").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(matches!(
            flow.state(),
            OnboardingState::Failed { retryable: true, .. }
        ));

        flow.reset();
        assert_eq!(*flow.state(), OnboardingState::CollectingProfile);
    }
}
