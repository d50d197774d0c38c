//! Backend user store seam.
//!
//! [`UserBackend`] is the REST API the session core talks to: the upsert
//! issued whenever an identity appears, the role lookup, and the profile and
//! admin endpoints that consume the resolved session.
//!
//! - [`HttpUserBackend`]: the real API over `reqwest`
//! - [`MemoryUserBackend`]: in-process store with the same semantics, also
//!   served over HTTP by [`crate::server`]

pub mod http;
pub mod memory;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use bloodconnect_models::{
    AddUserRequest, BackendUserRecord, Credential, Email, Role, UpdateUserProfile, UpsertOutcome,
    UserFilterParams, UserStatus,
};

pub use http::HttpUserBackend;
pub use memory::MemoryUserBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Missing or invalid credential")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Http(e) if e.is_timeout() => "timeout",
            BackendError::Http(_) => "unreachable",
            BackendError::Status { .. } => "status",
            BackendError::Unauthorized => "unauthorized",
            BackendError::Forbidden(_) => "forbidden",
            BackendError::NotFound(_) => "not_found",
            BackendError::Validation(_) => "validation",
            BackendError::InvalidUrl(_) => "invalid_url",
        }
    }

    /// Map an error response from the REST API.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
            StatusCode::FORBIDDEN => BackendError::Forbidden(message),
            StatusCode::NOT_FOUND => BackendError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                BackendError::Validation(message)
            }
            _ => BackendError::Status { status, message },
        }
    }
}

#[async_trait]
pub trait UserBackend: Send + Sync {
    /// `POST /add-user`: insert if absent, else refresh the profile fields.
    /// Never changes the role or status of an existing record.
    async fn upsert_user(&self, request: &AddUserRequest) -> Result<UpsertOutcome, BackendError>;

    /// `GET /get-user-role` for the caller identified by `credential`.
    async fn fetch_role(&self, credential: &Credential) -> Result<Role, BackendError>;

    /// `GET /users/{email}`
    async fn get_user(
        &self,
        credential: &Credential,
        email: &Email,
    ) -> Result<BackendUserRecord, BackendError>;

    /// `PATCH /users/{email}`
    async fn update_profile(
        &self,
        credential: &Credential,
        email: &Email,
        update: &UpdateUserProfile,
    ) -> Result<BackendUserRecord, BackendError>;

    /// `GET /get-users?status=` (admin)
    async fn list_users(
        &self,
        credential: &Credential,
        filter: &UserFilterParams,
    ) -> Result<Vec<BackendUserRecord>, BackendError>;

    /// `PATCH /update-users/role/{id}` (admin)
    async fn update_role(
        &self,
        credential: &Credential,
        id: &str,
        role: Role,
    ) -> Result<BackendUserRecord, BackendError>;

    /// `PATCH /update-users/status/{id}` (admin)
    async fn update_status(
        &self,
        credential: &Credential,
        id: &str,
        status: UserStatus,
    ) -> Result<BackendUserRecord, BackendError>;
}
