//! Auth-change observer.
//!
//! One task owns the `Session` writer and drains the backend's user-change
//! notifications. Everything else sees the session through read handles.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::session::{AuthUser, Session};

/// Attach the session to a stream of backend user-change notifications.
///
/// The task ends when the sender side is dropped. Dropping the returned
/// handle detaches nothing; abort it to stop observing early.
pub fn spawn_observer(
    session: Session,
    mut changes: mpsc::Receiver<Option<AuthUser>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(user) = changes.recv().await {
            tracing::debug!(signed_in = user.is_some(), "auth state changed");
            session.apply_auth_change(user);
        }
        tracing::debug!("auth change stream closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use assist_core::UserType;

    #[tokio::test]
    async fn observer_applies_changes_in_order() {
        let (session, handle) = Session::new();
        let (tx, rx) = mpsc::channel(4);
        let task = spawn_observer(session, rx);

        let user = AuthUser {
            id: "u1".into(),
            email: None,
            user_type: UserType::Subscriber,
            email_verified: true,
        };

        let mut sub = handle.subscribe();
        tx.send(Some(user)).await.unwrap();
        sub.changed().await.unwrap();
        assert!(sub.borrow().is_authenticated());

        tx.send(None).await.unwrap();
        sub.changed().await.unwrap();
        assert_eq!(*sub.borrow(), SessionState::SignedOut);

        drop(tx);
        task.await.unwrap();
    }
}
