use tokio::sync::watch;

use bloodconnect_models::{Session, SessionState};

/// Owned session store: exactly one writer, any number of [`SessionHandle`]s.
///
/// Every write replaces the whole [`SessionState`], so readers observe
/// either the previous or the next state, never a mix of the two.
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl SessionStore {
    /// A store in the initial `Resolving { identity: None }` state.
    pub fn new() -> (Self, SessionHandle) {
        let (tx, rx) = watch::channel(SessionState::default());
        (Self { tx }, SessionHandle { rx })
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }

    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Replace the state and wake every handle.
    pub fn publish(&self, state: SessionState) {
        self.tx.send_replace(state);
    }
}

/// Read-only view of the session, cheap to clone and hand to each route
/// guard or data-fetching consumer.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Current `{identity, role, loading}` snapshot.
    pub fn get_session(&self) -> Session {
        self.rx.borrow().snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Waits until the session is no longer loading. If the writer is gone
    /// the last published state is returned as is.
    pub async fn settled(&mut self) -> Session {
        self.wait_until(|session| !session.loading).await
    }

    /// Waits until `predicate` holds for the current snapshot.
    pub async fn wait_until<F>(&mut self, mut predicate: F) -> Session
    where
        F: FnMut(&Session) -> bool,
    {
        if let Ok(state) = self.rx.wait_for(|state| predicate(&state.snapshot())).await {
            return state.snapshot();
        }
        self.get_session()
    }

    /// Waits for the next change and returns the new snapshot, or `None`
    /// once the writer has been dropped.
    pub async fn changed(&mut self) -> Option<Session> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodconnect_models::{Credential, Email, Identity, Role};

    fn identity() -> Identity {
        Identity {
            uid: "u".into(),
            email: Email::new("s@example.com").unwrap(),
            display_name: None,
            photo_url: None,
            credential: Credential::new("t"),
        }
    }

    #[tokio::test]
    async fn test_handles_start_loading() {
        let (store, handle) = SessionStore::new();
        assert!(handle.get_session().loading);
        assert!(store.handle().get_session().loading);
    }

    #[tokio::test]
    async fn test_changed_sees_each_publish() {
        let (store, mut handle) = SessionStore::new();

        store.publish(SessionState::Anonymous);
        let session = handle.changed().await.unwrap();
        assert!(!session.loading);
        assert!(session.identity.is_none());

        store.publish(SessionState::Resolved {
            identity: identity(),
            role: Role::Volunteer,
        });
        let session = handle.changed().await.unwrap();
        assert_eq!(session.role, Some(Role::Volunteer));
    }

    #[tokio::test]
    async fn test_settled_waits_for_resolution() {
        let (store, mut handle) = SessionStore::new();
        let waiter = tokio::spawn(async move { handle.settled().await });

        store.publish(SessionState::Resolving {
            identity: Some(identity()),
        });
        store.publish(SessionState::Resolved {
            identity: identity(),
            role: Role::Admin,
        });

        let session = waiter.await.unwrap();
        assert!(!session.loading);
        assert_eq!(session.role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_changed_ends_when_store_dropped() {
        let (store, mut handle) = SessionStore::new();
        drop(store);
        assert!(handle.changed().await.is_none());
        assert!(handle.get_session().loading);
    }
}
