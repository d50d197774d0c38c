use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Serialize;

use bloodconnect_auth::{
    AuthError, FirebaseIdentityProvider, IdentityProvider, LocalIdentityProvider,
};
use bloodconnect_config::{BackendConfig, FirebaseConfig, LocalAuthConfig};
use bloodconnect_models::Session;

use crate::backend::{HttpUserBackend, UserBackend};
use crate::guard::{DashboardView, NavItem, navigation_items};
use crate::session::SessionResolver;

#[derive(Debug, Serialize)]
pub struct WhoamiReport {
    pub provider: &'static str,
    pub session: Session,
    pub dashboard: Option<DashboardView>,
    pub navigation: Vec<NavItem>,
}

/// Signs in against the configured provider and waits for the resolver to
/// settle the session against the backend.
pub async fn run(email: &str, password: &str, local: bool) -> anyhow::Result<WhoamiReport> {
    let backend_config = BackendConfig::from_env();
    let wait = backend_config.request_timeout * 2 + Duration::from_secs(5);
    let backend: Arc<dyn UserBackend> = Arc::new(HttpUserBackend::new(backend_config)?);

    let provider: Box<dyn IdentityProvider> = if local {
        Box::new(LocalIdentityProvider::new(LocalAuthConfig::from_env()))
    } else {
        let firebase = FirebaseConfig::from_env();
        if !firebase.is_configured() {
            bail!("Set FIREBASE_API_KEY or FIREBASE_AUTH_EMULATOR_HOST, or pass --local");
        }
        Box::new(FirebaseIdentityProvider::new(firebase))
    };

    let resolver = SessionResolver::attach(provider.as_ref(), backend);
    let mut handle = resolver.session();

    let identity = match provider.sign_in(email, password).await {
        Ok(identity) => identity,
        Err(AuthError::InvalidCredentials) if local => {
            tracing::info!(user.email = %email, "No local account, signing up");
            provider.sign_up(email, password, "", None).await?
        }
        Err(e) => return Err(e).context("Sign-in failed"),
    };

    let session = tokio::time::timeout(
        wait,
        handle.wait_until(|s| {
            !s.loading && s.identity.as_ref().is_some_and(|i| i.uid == identity.uid)
        }),
    )
    .await
    .context("Timed out waiting for the session to resolve")?;

    Ok(WhoamiReport {
        provider: provider.name(),
        dashboard: DashboardView::for_session(&session),
        navigation: navigation_items(&session),
        session,
    })
}
