//! # assist-auth
//!
//! Session lifecycle for the Assist client.
//!
//! The session is an explicit object, not an ambient singleton: screens hold
//! a [`SessionHandle`] and either read the current state or subscribe to
//! changes. Exactly one writer exists, the auth observer, which translates
//! backend user-change notifications into [`SessionState`] transitions.
//!
//! The navigation decision is a pure function over the session state
//! ([`Route::select`]), so it can be tested without any backend.

pub mod observer;
pub mod route;
pub mod session;

pub use observer::spawn_observer;
pub use route::Route;
pub use session::{AuthUser, Session, SessionHandle, SessionState};
