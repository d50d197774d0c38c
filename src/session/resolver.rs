//! The single writer of the session store.
//!
//! One loop task consumes identity-provider notifications, refresh requests
//! and resolution results. Every notification and refresh bumps a
//! generation counter; resolutions run as spawned tasks tagged with the
//! generation they were started for, and a result is committed only if its
//! tag still matches. Superseded resolutions are never cancelled, their
//! results are dropped on arrival.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use bloodconnect_auth::{AuthNotification, AuthSubscription, IdentityProvider};
use bloodconnect_models::{AddUserRequest, Identity, Role, Session, SessionState};
use bloodconnect_observability::{
    track_backend_upsert_failure, track_role_lookup_failure, track_session_resolution,
    track_stale_resolution_discarded,
};

use super::store::{SessionHandle, SessionStore};
use crate::backend::{BackendError, UserBackend};

/// Why a role lookup produced no role. Collapsed to [`Role::Donor`] when the
/// resolution is committed.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("identity carries no credential")]
    MissingCredential,

    #[error("role lookup failed: {0}")]
    Lookup(#[from] BackendError),
}

impl ResolveError {
    fn kind(&self) -> &'static str {
        match self {
            ResolveError::MissingCredential => "missing_credential",
            ResolveError::Lookup(e) => e.kind(),
        }
    }
}

/// Counters describing the resolver's work so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Generation of the most recent notification or refresh.
    pub generation: u64,
    /// States written to the store after settling (anonymous or resolved).
    pub committed: u64,
    /// Resolution results dropped because a newer generation superseded them.
    pub discarded: u64,
    pub upsert_failures: u64,
}

#[derive(Debug)]
enum Command {
    Refresh,
}

#[derive(Debug)]
struct Resolution {
    generation: u64,
    identity: Identity,
    role: Result<Role, ResolveError>,
}

/// Owns the resolver loop. Dropping it stops the loop; handles already
/// given out keep the last state.
pub struct SessionResolver {
    handle: SessionHandle,
    commands: mpsc::UnboundedSender<Command>,
    stats: watch::Receiver<ResolverStats>,
    task: JoinHandle<()>,
}

impl SessionResolver {
    /// Starts resolving sessions from `subscription` against `backend`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(subscription: AuthSubscription, backend: Arc<dyn UserBackend>) -> Self {
        let (store, handle) = SessionStore::new();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (stats_tx, stats_rx) = watch::channel(ResolverStats::default());
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let worker = ResolverLoop {
            store,
            backend,
            stats: stats_tx,
            results_tx,
            generation: 0,
            identity: None,
            pending: false,
        };
        let task = tokio::spawn(worker.run(subscription, commands_rx, results_rx));

        Self {
            handle,
            commands: commands_tx,
            stats: stats_rx,
            task,
        }
    }

    /// Subscribes to `provider` and starts resolving.
    pub fn attach(provider: &dyn IdentityProvider, backend: Arc<dyn UserBackend>) -> Self {
        tracing::debug!(provider = provider.name(), "Attaching session resolver");
        Self::spawn(provider.subscribe(), backend)
    }

    /// A new read-only handle on the session.
    pub fn session(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn get_session(&self) -> Session {
        self.handle.get_session()
    }

    /// Re-resolves the role of the current identity, e.g. after an admin
    /// changed it. No-op while anonymous.
    pub fn refresh(&self) {
        if self.commands.send(Command::Refresh).is_err() {
            tracing::warn!("Session resolver has stopped, refresh ignored");
        }
    }

    pub fn stats(&self) -> ResolverStats {
        *self.stats.borrow()
    }

    /// Waits until `predicate` holds for the stats, returning them. Returns
    /// the last stats if the loop has ended.
    pub async fn wait_for_stats<F>(&self, mut predicate: F) -> ResolverStats
    where
        F: FnMut(&ResolverStats) -> bool,
    {
        let mut rx = self.stats.clone();
        if let Ok(stats) = rx.wait_for(|s| predicate(s)).await {
            return *stats;
        }
        self.stats()
    }

    /// Whether the loop is still consuming notifications.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SessionResolver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct ResolverLoop {
    store: SessionStore,
    backend: Arc<dyn UserBackend>,
    stats: watch::Sender<ResolverStats>,
    results_tx: mpsc::UnboundedSender<Resolution>,
    generation: u64,
    /// Identity of the latest notification.
    identity: Option<Identity>,
    /// Whether the current generation still awaits its resolution.
    pending: bool,
}

impl ResolverLoop {
    async fn run(
        mut self,
        mut subscription: AuthSubscription,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut results: mpsc::UnboundedReceiver<Resolution>,
    ) {
        let mut subscribed = true;

        loop {
            tokio::select! {
                biased;

                notification = subscription.recv(), if subscribed => match notification {
                    Some(notification) => self.on_notification(notification),
                    None => {
                        tracing::info!("Identity provider closed the subscription");
                        subscribed = false;
                    }
                },
                Some(Command::Refresh) = commands.recv(), if subscribed => self.on_refresh(),
                Some(resolution) = results.recv() => self.on_resolution(resolution),
            }

            if !subscribed && !self.pending {
                break;
            }
        }

        tracing::debug!(generation = self.generation, "Session resolver stopped");
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        self.stats.send_modify(|s| s.generation = generation);
        generation
    }

    fn on_notification(&mut self, notification: AuthNotification) {
        let generation = self.next_generation();

        match notification {
            None => {
                tracing::info!(session.generation = generation, "Signed out");
                self.identity = None;
                self.pending = false;
                self.store.publish(SessionState::Anonymous);
                self.stats.send_modify(|s| s.committed += 1);
                track_session_resolution("anonymous");
            }
            Some(identity) => {
                tracing::info!(
                    session.generation = generation,
                    user.email = %identity.email,
                    "Identity changed, resolving role"
                );
                self.identity = Some(identity.clone());
                self.start(generation, identity);
            }
        }
    }

    fn on_refresh(&mut self) {
        let Some(identity) = self.identity.clone() else {
            tracing::debug!("Refresh requested while signed out");
            return;
        };
        let generation = self.next_generation();
        tracing::info!(session.generation = generation, user.email = %identity.email, "Refreshing role");
        self.start(generation, identity);
    }

    fn start(&mut self, generation: u64, identity: Identity) {
        self.pending = true;
        self.store.publish(SessionState::Resolving {
            identity: Some(identity.clone()),
        });

        let backend = Arc::clone(&self.backend);
        let stats = self.stats.clone();
        let results = self.results_tx.clone();
        let span = tracing::info_span!(
            "resolve_session",
            session.generation = generation,
            user.email = %identity.email
        );

        tokio::spawn(
            async move {
                let role = resolve_role(backend.as_ref(), &identity, &stats).await;
                let _ = results.send(Resolution {
                    generation,
                    identity,
                    role,
                });
            }
            .instrument(span),
        );
    }

    fn on_resolution(&mut self, resolution: Resolution) {
        if resolution.generation != self.generation {
            tracing::debug!(
                session.generation = resolution.generation,
                current = self.generation,
                user.email = %resolution.identity.email,
                "Discarding stale resolution"
            );
            self.stats.send_modify(|s| s.discarded += 1);
            track_stale_resolution_discarded();
            return;
        }

        let role = match resolution.role {
            Ok(role) => {
                track_session_resolution("resolved");
                role
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user.email = %resolution.identity.email,
                    "Role lookup failed, treating as donor"
                );
                track_role_lookup_failure(e.kind());
                track_session_resolution("fallback");
                Role::Donor
            }
        };

        tracing::info!(
            session.generation = resolution.generation,
            user.email = %resolution.identity.email,
            role = %role,
            "Session resolved"
        );
        self.pending = false;
        self.store.publish(SessionState::Resolved {
            identity: resolution.identity,
            role,
        });
        self.stats.send_modify(|s| s.committed += 1);
    }
}

/// Upserts the backend record, then looks up the role. An upsert failure is
/// logged and does not stop the lookup.
async fn resolve_role(
    backend: &dyn UserBackend,
    identity: &Identity,
    stats: &watch::Sender<ResolverStats>,
) -> Result<Role, ResolveError> {
    match backend.upsert_user(&AddUserRequest::donor_for(identity)).await {
        Ok(outcome) => {
            tracing::debug!(inserted = outcome.is_inserted(), "User synced with backend")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to sync user with backend");
            stats.send_modify(|s| s.upsert_failures += 1);
            track_backend_upsert_failure();
        }
    }

    if identity.credential.is_empty() {
        return Err(ResolveError::MissingCredential);
    }
    Ok(backend.fetch_role(&identity.credential).await?)
}
