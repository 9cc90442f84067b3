//! Session state machine.
//!
//! States: `Uninitialized → Loading → {Authenticated, UnverifiedPending,
//! SignedOut, Failed}`. `Failed` is terminal: backend initialization
//! failure leaves no recovery path, and later auth notifications are
//! ignored.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use assist_core::UserType;

/// Client-side projection of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub user_type: UserType,
    pub email_verified: bool,
}

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Before initialization started.
    Uninitialized,
    /// Backend handles are being initialized.
    Loading,
    /// A user with a verified email is signed in.
    Authenticated(AuthUser),
    /// A user is signed in but the email is not verified yet.
    UnverifiedPending(AuthUser),
    /// Nobody is signed in.
    SignedOut,
    /// Initialization failed; terminal for this session.
    Failed(String),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::Authenticated(user) | Self::UnverifiedPending(user) => Some(user),
            _ => None,
        }
    }
}

/// The single writer half of the session.
pub struct Session {
    tx: watch::Sender<SessionState>,
}

/// Cheap read-only handle screens hold on to.
#[derive(Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
}

impl Session {
    /// Create a session in `Uninitialized` together with its read handle.
    pub fn new() -> (Self, SessionHandle) {
        let (tx, rx) = watch::channel(SessionState::Uninitialized);
        (Self { tx }, SessionHandle { rx })
    }

    /// Run the one-time backend initialization, holding the session in
    /// `Loading` until the future resolves. On failure the session moves to
    /// `Failed` and stays there.
    pub async fn initialize<F, E>(&self, init: F) -> Result<(), E>
    where
        F: std::future::Future<Output = Result<(), E>>,
        E: std::fmt::Display,
    {
        self.tx.send_replace(SessionState::Loading);
        match init.await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(error = %e, "backend initialization failed");
                self.tx.send_replace(SessionState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Translate a backend user-change notification into a state transition.
    ///
    /// `is_authenticated` is recomputed on every call: user present AND
    /// email verified. Ignored after a terminal failure.
    pub fn apply_auth_change(&self, user: Option<AuthUser>) {
        if matches!(*self.tx.borrow(), SessionState::Failed(_)) {
            tracing::debug!("ignoring auth change after terminal failure");
            return;
        }

        let next = match user {
            Some(user) if user.email_verified => SessionState::Authenticated(user),
            Some(user) => SessionState::UnverifiedPending(user),
            None => SessionState::SignedOut,
        };
        self.tx.send_replace(next);
    }
}

impl SessionHandle {
    /// Current state, cloned out of the channel.
    pub fn state(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// The signed-in user, if any (verified or pending).
    pub fn current_user(&self) -> Option<AuthUser> {
        self.rx.borrow().user().cloned()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.rx.clone()
    }
}
