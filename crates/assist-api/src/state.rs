//! Shared API state.

use std::sync::Arc;

use assist_accounts::{AccountService, ProfileService, ProjectionService};
use assist_core::AssistConfig;
use assist_store::DocumentStore;
use assist_verify::{CodeDelivery, VerificationService, create_delivery};

/// Everything the API handlers need.
pub struct ApiState {
    pub verify: VerificationService,
    pub accounts: AccountService,
    pub profiles: ProfileService,
    pub projections: ProjectionService,
}

impl ApiState {
    /// Wire the services over one store, with the configured code delivery.
    pub fn new(store: Arc<dyn DocumentStore>, config: &AssistConfig) -> Self {
        let delivery = create_delivery(config.verification.delivery);
        Self::with_delivery(store, config, delivery)
    }

    /// Same, but with an injected delivery sink (tests capture the code).
    pub fn with_delivery(
        store: Arc<dyn DocumentStore>,
        config: &AssistConfig,
        delivery: Arc<dyn CodeDelivery>,
    ) -> Self {
        Self {
            verify: VerificationService::new(
                store.clone(),
                delivery,
                config.verification.clone(),
            ),
            accounts: AccountService::new(store.clone()),
            profiles: ProfileService::new(store.clone()),
            projections: ProjectionService::new(store),
        }
    }
}
