mod common;

use std::sync::Arc;
use std::time::Duration;

use bloodconnect::backend::{HttpUserBackend, MemoryUserBackend};
use bloodconnect::guard::{Access, DashboardView, RouteGuard};
use bloodconnect::session::{SessionHandle, SessionResolver};
use bloodconnect_auth::{IdentityProvider, LocalIdentityProvider};
use bloodconnect_config::BackendConfig;
use bloodconnect_models::{Email, ProfileUpdate, Role, Session};
use common::{local_config, spawn_server, test_state};

const WAIT: Duration = Duration::from_secs(5);

async fn wait_until<F>(handle: &mut SessionHandle, predicate: F) -> Session
where
    F: FnMut(&Session) -> bool,
{
    tokio::time::timeout(WAIT, handle.wait_until(predicate))
        .await
        .expect("session never reached the expected state")
}

async fn signed_in_as(handle: &mut SessionHandle, email: &str) -> Session {
    let email = email.to_string();
    wait_until(handle, move |s| {
        !s.loading && s.identity.as_ref().is_some_and(|i| i.email == email.as_str())
    })
    .await
}

#[tokio::test]
async fn test_sign_up_sign_out_and_back_in() {
    let provider = LocalIdentityProvider::new(local_config());
    let users = Arc::new(MemoryUserBackend::new(local_config()));
    let resolver = SessionResolver::attach(&provider, users.clone());
    let mut handle = resolver.session();

    let session = wait_until(&mut handle, |s| !s.loading).await;
    assert!(session.identity.is_none());

    provider
        .sign_up("rana@example.com", "hunter22", "Rana", None)
        .await
        .unwrap();
    let session = signed_in_as(&mut handle, "rana@example.com").await;
    assert_eq!(session.role, Some(Role::Donor));
    assert_eq!(
        RouteGuard::Admin.check(&session, "/dashboard/all-users"),
        Access::Redirect {
            to: "/dashboard",
            from: "/dashboard/all-users".to_string()
        }
    );

    let record = users
        .find_by_email(&Email::new("rana@example.com").unwrap())
        .await
        .unwrap();
    assert_eq!(record.name, "Rana");

    provider.sign_out().await.unwrap();
    let session = wait_until(&mut handle, |s| !s.loading && s.identity.is_none()).await;
    assert!(session.role.is_none());
    assert_eq!(
        RouteGuard::Private.check(&session, "/dashboard/profile"),
        Access::Redirect {
            to: "/login",
            from: "/dashboard/profile".to_string()
        }
    );

    provider.sign_in("rana@example.com", "hunter22").await.unwrap();
    signed_in_as(&mut handle, "rana@example.com").await;
    assert_eq!(users.len().await, 1);
}

#[tokio::test]
async fn test_promotion_is_seen_after_credential_refresh() {
    let provider = LocalIdentityProvider::new(local_config());
    let users = Arc::new(MemoryUserBackend::new(local_config()));
    let resolver = SessionResolver::attach(&provider, users.clone());
    let mut handle = resolver.session();

    let identity = provider
        .sign_up("lead@example.com", "hunter22", "Lead", None)
        .await
        .unwrap();
    let session = signed_in_as(&mut handle, "lead@example.com").await;
    assert_eq!(DashboardView::for_session(&session), Some(DashboardView::Donor));

    users.set_role_by_email(&identity.email, Role::Admin).await;
    provider.refresh_credential().await.unwrap();

    let session = wait_until(&mut handle, |s| !s.loading && s.role == Some(Role::Admin)).await;
    assert_eq!(DashboardView::for_session(&session), Some(DashboardView::Admin));
    assert_eq!(
        RouteGuard::Admin.check(&session, "/dashboard/all-users"),
        Access::Granted
    );
}

#[tokio::test]
async fn test_profile_update_is_synced_to_backend() {
    let provider = LocalIdentityProvider::new(local_config());
    let users = Arc::new(MemoryUserBackend::new(local_config()));
    let resolver = SessionResolver::attach(&provider, users.clone());
    let mut handle = resolver.session();

    provider
        .sign_up("nila@example.com", "hunter22", "Nila", None)
        .await
        .unwrap();
    signed_in_as(&mut handle, "nila@example.com").await;

    provider
        .update_profile(ProfileUpdate {
            display_name: Some("Nila Akter".into()),
            photo_url: Some("https://example.com/nila.png".into()),
        })
        .await
        .unwrap();
    let session = wait_until(&mut handle, |s| {
        !s.loading
            && s.identity
                .as_ref()
                .is_some_and(|i| i.display_name.as_deref() == Some("Nila Akter"))
    })
    .await;
    assert_eq!(session.role, Some(Role::Donor));

    resolver.wait_for_stats(|s| s.committed >= 3).await;
    let record = users
        .find_by_email(&Email::new("nila@example.com").unwrap())
        .await
        .unwrap();
    assert_eq!(record.name, "Nila Akter");
    assert_eq!(record.photo_url.as_deref(), Some("https://example.com/nila.png"));
}

#[tokio::test]
async fn test_federated_sign_in_and_account_deletion() {
    let provider = LocalIdentityProvider::new(local_config());
    let users = Arc::new(MemoryUserBackend::new(local_config()));
    let resolver = SessionResolver::attach(&provider, users.clone());
    let mut handle = resolver.session();

    let token = provider.issue_federated_token("google.user@example.com").unwrap();
    provider.sign_in_with_federated(&token).await.unwrap();
    let session = signed_in_as(&mut handle, "google.user@example.com").await;
    assert_eq!(session.role, Some(Role::Donor));

    provider.delete_account().await.unwrap();
    let session = wait_until(&mut handle, |s| !s.loading && s.identity.is_none()).await;
    assert!(session.role.is_none());
    assert_eq!(provider.account_count(), 0);
}

#[tokio::test]
async fn test_end_to_end_over_http() {
    let state = test_state();
    let base_url = spawn_server(state.clone()).await;

    let provider = LocalIdentityProvider::new(local_config());
    let backend = Arc::new(HttpUserBackend::new(BackendConfig::single_host(base_url)).unwrap());
    let resolver = SessionResolver::attach(&provider, backend);
    let mut handle = resolver.session();

    provider
        .sign_up("remote@example.com", "hunter22", "Remote", None)
        .await
        .unwrap();
    let session = signed_in_as(&mut handle, "remote@example.com").await;
    assert_eq!(session.role, Some(Role::Donor));

    state
        .users
        .set_role_by_email(&Email::new("remote@example.com").unwrap(), Role::Volunteer)
        .await
        .unwrap();
    resolver.refresh();
    let session = wait_until(&mut handle, |s| !s.loading && s.role == Some(Role::Volunteer)).await;
    assert_eq!(
        RouteGuard::AdminOrVolunteer.check(&session, "/dashboard/content-management"),
        Access::Granted
    );
    assert_eq!(resolver.stats().upsert_failures, 0);
}
