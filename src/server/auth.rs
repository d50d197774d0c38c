use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use bloodconnect_auth::{LocalClaims, verify_local_token};
use bloodconnect_core::AppError;
use bloodconnect_models::Email;

use crate::state::AppState;

/// Extractor that validates the bearer credential and yields the caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: LocalClaims,
    pub email: Email,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_local_token(token, &state.local_auth)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;
        let email = Email::new(&claims.email)
            .map_err(|_| AppError::unauthorized("Token carries an invalid email"))?;

        Ok(AuthUser { claims, email })
    }
}
