use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use bloodconnect_core::AppError;
use bloodconnect_models::{
    AddUserRequest, BackendUserRecord, Email, RoleResponse, UpdateRoleRequest,
    UpdateStatusRequest, UpdateUserProfile, UpsertOutcome, UserFilterParams,
};

use super::auth::AuthUser;
use super::service::UserService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub users: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        users: state.users.len().await,
    })
}

/// Create the user record if missing, otherwise refresh name and photo.
#[instrument(skip(state, request), fields(user.email = %request.email))]
pub async fn add_user(
    State(state): State<AppState>,
    Json(request): Json<AddUserRequest>,
) -> Result<Json<UpsertOutcome>, AppError> {
    let outcome = UserService::add_user(&state.users, request).await?;
    Ok(Json(outcome))
}

#[instrument(skip(state, auth_user), fields(user.email = %auth_user.email))]
pub async fn get_user_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<RoleResponse>, AppError> {
    let role = UserService::get_role(&state.users, &auth_user.email).await?;
    Ok(Json(role))
}

#[instrument(skip(state, auth_user), fields(caller = %auth_user.email))]
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<BackendUserRecord>, AppError> {
    let email = parse_email(email)?;
    let user = UserService::get_user(&state.users, &auth_user.email, &email).await?;
    Ok(Json(user))
}

#[instrument(skip(state, auth_user, update), fields(caller = %auth_user.email))]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(email): Path<String>,
    Json(update): Json<UpdateUserProfile>,
) -> Result<Json<BackendUserRecord>, AppError> {
    let email = parse_email(email)?;
    let user = UserService::update_profile(&state.users, &auth_user.email, &email, &update).await?;
    Ok(Json(user))
}

#[instrument(skip(state, auth_user), fields(caller = %auth_user.email))]
pub async fn get_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filter): Query<UserFilterParams>,
) -> Result<Json<Vec<BackendUserRecord>>, AppError> {
    let users = UserService::list_users(&state.users, &auth_user.email, &filter).await?;
    Ok(Json(users))
}

#[instrument(skip(state, auth_user), fields(caller = %auth_user.email))]
pub async fn update_user_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<BackendUserRecord>, AppError> {
    let user = UserService::update_role(&state.users, &auth_user.email, &id, body.role).await?;
    Ok(Json(user))
}

#[instrument(skip(state, auth_user), fields(caller = %auth_user.email))]
pub async fn update_user_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<BackendUserRecord>, AppError> {
    let user =
        UserService::update_status(&state.users, &auth_user.email, &id, body.status).await?;
    Ok(Json(user))
}

fn parse_email(raw: String) -> Result<Email, AppError> {
    Email::new(raw).map_err(|e| AppError::bad_request(anyhow!(e.to_string())))
}
