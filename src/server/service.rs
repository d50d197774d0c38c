use anyhow::anyhow;

use bloodconnect_core::AppError;
use bloodconnect_models::{
    AddUserRequest, BackendUserRecord, Email, Role, RoleResponse, UpdateUserProfile,
    UpsertOutcome, UserFilterParams, UserStatus,
};

use crate::backend::{BackendError, MemoryUserBackend};

/// Maps a store error onto the HTTP status the API answers with.
pub fn backend_error(err: BackendError) -> AppError {
    match err {
        BackendError::Unauthorized => AppError::unauthorized("Missing or invalid credential"),
        BackendError::Forbidden(message) => AppError::forbidden(message),
        BackendError::NotFound(message) => AppError::not_found(anyhow!(message)),
        BackendError::Validation(message) => AppError::unprocessable(anyhow!(message)),
        err @ (BackendError::Http(_)
        | BackendError::Status { .. }
        | BackendError::InvalidUrl(_)) => AppError::internal(err),
    }
}

pub struct UserService;

impl UserService {
    pub async fn add_user(
        users: &MemoryUserBackend,
        request: AddUserRequest,
    ) -> Result<UpsertOutcome, AppError> {
        if request.name.trim().is_empty() {
            return Err(AppError::bad_request(anyhow!("Name is required")));
        }
        Ok(users.upsert(&request).await)
    }

    pub async fn get_role(
        users: &MemoryUserBackend,
        caller: &Email,
    ) -> Result<RoleResponse, AppError> {
        let role = users.role_as(caller).await.map_err(backend_error)?;
        Ok(RoleResponse {
            role: role.as_str().to_string(),
        })
    }

    pub async fn get_user(
        users: &MemoryUserBackend,
        caller: &Email,
        email: &Email,
    ) -> Result<BackendUserRecord, AppError> {
        users.get_user_as(caller, email).await.map_err(backend_error)
    }

    pub async fn update_profile(
        users: &MemoryUserBackend,
        caller: &Email,
        email: &Email,
        update: &UpdateUserProfile,
    ) -> Result<BackendUserRecord, AppError> {
        users
            .update_profile_as(caller, email, update)
            .await
            .map_err(backend_error)
    }

    pub async fn list_users(
        users: &MemoryUserBackend,
        caller: &Email,
        filter: &UserFilterParams,
    ) -> Result<Vec<BackendUserRecord>, AppError> {
        users.list_users_as(caller, filter).await.map_err(backend_error)
    }

    pub async fn update_role(
        users: &MemoryUserBackend,
        caller: &Email,
        id: &str,
        role: Role,
    ) -> Result<BackendUserRecord, AppError> {
        users.update_role_as(caller, id, role).await.map_err(backend_error)
    }

    pub async fn update_status(
        users: &MemoryUserBackend,
        caller: &Email,
        id: &str,
        status: UserStatus,
    ) -> Result<BackendUserRecord, AppError> {
        users
            .update_status_as(caller, id, status)
            .await
            .map_err(backend_error)
    }
}
