//! The identity-provider seam and its auth-state subscriptions.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use bloodconnect_models::{Identity, ProfileUpdate};

use crate::error::AuthError;

/// One auth-state change: `Some` for a signed-in identity (sign-in, sign-up,
/// profile change, token refresh), `None` for sign-out.
pub type AuthNotification = Option<Identity>;

/// Identity provider contract.
///
/// User-initiated calls return their errors to the caller for display.
/// State changes are published to every [`AuthSubscription`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Creates the account and applies `name`/`photo_url` before publishing,
    /// so subscribers never see the profile-less intermediate identity.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
        photo_url: Option<&str>,
    ) -> Result<Identity, AuthError>;

    /// Exchanges a federated (Google) id token for an identity.
    async fn sign_in_with_federated(&self, id_token: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn update_profile(&self, update: ProfileUpdate) -> Result<Identity, AuthError>;

    /// Deletes the signed-in account and signs out.
    async fn delete_account(&self) -> Result<(), AuthError>;

    /// Obtains a fresh bearer credential for the signed-in identity.
    async fn refresh_credential(&self) -> Result<Identity, AuthError>;

    fn current_identity(&self) -> Option<Identity>;

    /// Subscribes to auth-state changes. The current state is delivered
    /// first if the provider already knows it.
    fn subscribe(&self) -> AuthSubscription;

    /// Name of this provider for logging.
    fn name(&self) -> &'static str;
}

/// Receiving end of an auth-state subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct AuthSubscription {
    rx: mpsc::UnboundedReceiver<AuthNotification>,
}

impl AuthSubscription {
    /// Next notification, in emission order. `None` once the provider has
    /// gone away.
    pub async fn recv(&mut self) -> Option<AuthNotification> {
        self.rx.recv().await
    }
}

#[derive(Debug, Default)]
struct NotifierInner {
    /// `None` until the provider has determined its initial state.
    current: Option<AuthNotification>,
    listeners: Vec<mpsc::UnboundedSender<AuthNotification>>,
}

/// Fan-out of auth-state changes to any number of subscribers.
///
/// Publishing and subscribing share one lock, so every subscriber sees the
/// same order and a new subscriber never misses or duplicates the state
/// current at the moment it subscribed.
#[derive(Debug, Clone, Default)]
pub struct AuthStateNotifier {
    inner: Arc<Mutex<NotifierInner>>,
}

impl AuthStateNotifier {
    /// A notifier whose initial state is not known yet; subscribers get
    /// nothing until the first [`publish`](Self::publish).
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that already knows nobody is signed in.
    pub fn signed_out() -> Self {
        let notifier = Self::new();
        notifier.publish(None);
        notifier
    }

    pub fn subscribe(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = &inner.current {
            let _ = tx.send(current.clone());
        }
        inner.listeners.push(tx);
        AuthSubscription { rx }
    }

    pub fn publish(&self, notification: AuthNotification) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .listeners
            .retain(|tx| tx.send(notification.clone()).is_ok());
        tracing::debug!(
            signed_in = notification.is_some(),
            subscribers = inner.listeners.len(),
            "Published auth state"
        );
        inner.current = Some(notification);
    }

    /// The signed-in identity, if any.
    pub fn current(&self) -> Option<Identity> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.current.clone().flatten()
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.listeners.iter().filter(|tx| !tx.is_closed()).count()
    }
}
