#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use bloodconnect::backend::{BackendError, UserBackend};
use bloodconnect::server::init_router;
use bloodconnect::state::AppState;
use bloodconnect_auth::create_local_token;
use bloodconnect_config::{CorsConfig, LocalAuthConfig};
use bloodconnect_models::{
    AddUserRequest, BackendUserRecord, Credential, Email, Identity, Role, UpdateUserProfile,
    UpsertOutcome, UserFilterParams, UserStatus,
};

/// Local auth settings with a cheap bcrypt cost.
pub fn local_config() -> LocalAuthConfig {
    LocalAuthConfig {
        secret: "integration-test-secret".to_string(),
        token_expiry: 3600,
        bcrypt_cost: 4,
    }
}

/// An identity whose credential is the string `token`.
pub fn identity(email: &str, token: &str) -> Identity {
    Identity {
        uid: format!("uid-{email}"),
        email: Email::new(email).unwrap(),
        display_name: None,
        photo_url: None,
        credential: Credential::new(token),
    }
}

pub fn bearer_for(email: &str, config: &LocalAuthConfig) -> String {
    let token = create_local_token(&format!("uid-{email}"), email, config).unwrap();
    format!("Bearer {token}")
}

pub fn test_state() -> AppState {
    AppState::new(local_config(), CorsConfig::default())
}

/// Serves the reference backend on an ephemeral port and returns its base URL.
pub async fn spawn_server(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, init_router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

/// Backend whose role answers are keyed by credential and can be held back
/// until the test releases them.
#[derive(Default)]
pub struct ScriptedBackend {
    roles: Mutex<HashMap<String, Role>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    upserts: Mutex<Vec<AddUserRequest>>,
    fail_upserts: AtomicBool,
    fail_lookups: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_role(&self, token: &str, role: Role) {
        self.roles.lock().unwrap().insert(token.to_string(), role);
    }

    /// Holds the next role lookup for `token` until the returned sender
    /// fires or is dropped.
    pub fn gate(&self, token: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(token.to_string(), rx);
        tx
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn upserts(&self) -> Vec<AddUserRequest> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserBackend for ScriptedBackend {
    async fn upsert_user(&self, request: &AddUserRequest) -> Result<UpsertOutcome, BackendError> {
        self.upserts.lock().unwrap().push(request.clone());
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "upsert unavailable".to_string(),
            });
        }
        Ok(UpsertOutcome::Updated { updated: true })
    }

    async fn fetch_role(&self, credential: &Credential) -> Result<Role, BackendError> {
        let gate = self.gates.lock().unwrap().remove(credential.as_str());
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "role lookup unavailable".to_string(),
            });
        }
        self.roles
            .lock()
            .unwrap()
            .get(credential.as_str())
            .copied()
            .ok_or(BackendError::NotFound("no role".to_string()))
    }

    async fn get_user(
        &self,
        _credential: &Credential,
        email: &Email,
    ) -> Result<BackendUserRecord, BackendError> {
        Err(BackendError::NotFound(email.to_string()))
    }

    async fn update_profile(
        &self,
        _credential: &Credential,
        email: &Email,
        _update: &UpdateUserProfile,
    ) -> Result<BackendUserRecord, BackendError> {
        Err(BackendError::NotFound(email.to_string()))
    }

    async fn list_users(
        &self,
        _credential: &Credential,
        _filter: &UserFilterParams,
    ) -> Result<Vec<BackendUserRecord>, BackendError> {
        Ok(Vec::new())
    }

    async fn update_role(
        &self,
        _credential: &Credential,
        id: &str,
        _role: Role,
    ) -> Result<BackendUserRecord, BackendError> {
        Err(BackendError::NotFound(id.to_string()))
    }

    async fn update_status(
        &self,
        _credential: &Credential,
        id: &str,
        _status: UserStatus,
    ) -> Result<BackendUserRecord, BackendError> {
        Err(BackendError::NotFound(id.to_string()))
    }
}
