//! Navigation selection.
//!
//! A pure function from session state to a named screen. Loading always
//! wins, whatever else the state claims.

use assist_core::UserType;

use crate::session::SessionState;

/// Named top-level screens the client can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Splash/loading indicator while the backend initializes.
    Loading,
    /// Welcome / sign-in screen for signed-out users.
    Welcome,
    /// The user-type's verification step of onboarding.
    Verification(UserType),
    /// The main tabbed area.
    MainTabs,
    /// Full-screen error view; no retry offered.
    FatalError,
}

impl Route {
    /// Select the screen for a session state.
    pub fn select(state: &SessionState) -> Route {
        match state {
            SessionState::Uninitialized | SessionState::Loading => Route::Loading,
            SessionState::Authenticated(_) => Route::MainTabs,
            SessionState::UnverifiedPending(user) => Route::Verification(user.user_type),
            SessionState::SignedOut => Route::Welcome,
            SessionState::Failed(_) => Route::FatalError,
        }
    }
}
