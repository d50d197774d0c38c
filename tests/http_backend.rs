mod common;

use bloodconnect::backend::{BackendError, HttpUserBackend, UserBackend};
use bloodconnect_auth::create_local_token;
use bloodconnect_config::BackendConfig;
use bloodconnect_models::{
    AddUserRequest, Credential, Email, Role, UpdateUserProfile, UserFilterParams, UserStatus,
};
use common::{identity, spawn_server, test_state};

fn credential_for(email: &str, state: &bloodconnect::state::AppState) -> Credential {
    Credential::new(create_local_token(&format!("uid-{email}"), email, &state.local_auth).unwrap())
}

#[tokio::test]
async fn test_upsert_then_fetch_role_over_http() {
    let state = test_state();
    let base_url = spawn_server(state.clone()).await;
    let backend = HttpUserBackend::new(BackendConfig::single_host(base_url)).unwrap();

    let donor = identity("wire@example.com", "unused");
    let outcome = backend
        .upsert_user(&AddUserRequest::donor_for(&donor))
        .await
        .unwrap();
    assert!(outcome.is_inserted());

    let outcome = backend
        .upsert_user(&AddUserRequest::donor_for(&donor))
        .await
        .unwrap();
    assert!(!outcome.is_inserted());

    let role = backend
        .fetch_role(&credential_for("wire@example.com", &state))
        .await
        .unwrap();
    assert_eq!(role, Role::Donor);
}

#[tokio::test]
async fn test_error_statuses_map_to_typed_errors() {
    let state = test_state();
    let base_url = spawn_server(state.clone()).await;
    let backend = HttpUserBackend::new(BackendConfig::single_host(base_url)).unwrap();
    backend
        .upsert_user(&AddUserRequest::donor_for(&identity("plain@example.com", "x")))
        .await
        .unwrap();
    let plain = credential_for("plain@example.com", &state);

    let err = backend.fetch_role(&Credential::default()).await.unwrap_err();
    assert!(matches!(err, BackendError::Unauthorized));

    let err = backend
        .list_users(&plain, &UserFilterParams::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, BackendError::Forbidden(ref m) if m.contains("Minimum required role: admin"))
    );

    let err = backend
        .get_user(&plain, &Email::new("other@example.com").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Forbidden(_)));

    let bad_photo = UpdateUserProfile {
        photo_url: Some("nope".into()),
        ..Default::default()
    };
    let err = backend
        .update_profile(&plain, &Email::new("plain@example.com").unwrap(), &bad_photo)
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Validation(_)));
    assert_eq!(err.kind(), "validation");
}

#[tokio::test]
async fn test_admin_operations_over_http() {
    let state = test_state();
    let base_url = spawn_server(state.clone()).await;
    let backend = HttpUserBackend::new(BackendConfig::single_host(base_url)).unwrap();

    backend
        .upsert_user(&AddUserRequest {
            role: Role::Admin,
            ..AddUserRequest::donor_for(&identity("chief@example.com", "x"))
        })
        .await
        .unwrap();
    backend
        .upsert_user(&AddUserRequest::donor_for(&identity("member@example.com", "x")))
        .await
        .unwrap();
    let chief = credential_for("chief@example.com", &state);
    let member = credential_for("member@example.com", &state);

    let users = backend
        .list_users(&chief, &UserFilterParams::default())
        .await
        .unwrap();
    assert_eq!(users.len(), 2);
    let member_id = users
        .iter()
        .find(|u| u.email.as_str() == "member@example.com")
        .map(|u| u.id.clone())
        .unwrap();

    let updated = backend
        .update_role(&chief, &member_id, Role::Volunteer)
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Volunteer);
    assert_eq!(backend.fetch_role(&member).await.unwrap(), Role::Volunteer);

    backend
        .update_status(&chief, &member_id, UserStatus::Blocked)
        .await
        .unwrap();
    let blocked = backend
        .list_users(
            &chief,
            &UserFilterParams {
                status: Some(UserStatus::Blocked),
            },
        )
        .await
        .unwrap();
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].id, member_id);

    let record = backend
        .get_user(&member, &Email::new("member@example.com").unwrap())
        .await
        .unwrap();
    assert_eq!(record.status, UserStatus::Blocked);
}

#[tokio::test]
async fn test_reserved_url_characters_in_email_path() {
    let state = test_state();
    let base_url = spawn_server(state.clone()).await;
    let backend =
        HttpUserBackend::new(BackendConfig::single_host(format!("{base_url}/"))).unwrap();

    for address in ["a?b@example.com", "a#b@example.com", "a/b@example.com"] {
        let email = Email::new(address).unwrap();
        backend
            .upsert_user(&AddUserRequest::donor_for(&identity(address, "x")))
            .await
            .unwrap();
        let caller = credential_for(address, &state);

        let record = backend.get_user(&caller, &email).await.unwrap();
        assert_eq!(record.email, email);

        let update = UpdateUserProfile {
            district: Some("Sylhet".into()),
            ..Default::default()
        };
        let updated = backend.update_profile(&caller, &email, &update).await.unwrap();
        assert_eq!(updated.email, email);
        assert_eq!(updated.district.as_deref(), Some("Sylhet"));
    }
}

#[tokio::test]
async fn test_unparseable_base_url_is_invalid_url() {
    let backend = HttpUserBackend::new(BackendConfig::single_host("not a url")).unwrap();
    let email = Email::new("x@example.com").unwrap();

    let err = backend
        .get_user(&Credential::default(), &email)
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::InvalidUrl(_)));
    assert_eq!(err.kind(), "invalid_url");
}

#[tokio::test]
async fn test_unreachable_host_is_http_error() {
    let backend = HttpUserBackend::new(BackendConfig::single_host("http://127.0.0.1:1")).unwrap();

    let err = backend
        .upsert_user(&AddUserRequest::donor_for(&identity("x@example.com", "x")))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Http(_)));
    assert_eq!(err.kind(), "unreachable");
}
