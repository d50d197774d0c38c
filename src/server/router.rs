use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;

use bloodconnect_observability::{logging_middleware, metrics_middleware};

use super::controller::{
    add_user, get_user, get_user_role, get_users, health, update_user, update_user_role,
    update_user_status,
};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/add-user", post(add_user))
        .route("/get-user-role", get(get_user_role))
        .route("/users/{email}", get(get_user).patch(update_user))
        .route("/get-users", get(get_users))
        .route("/update-users/role/{id}", patch(update_user_role))
        .route("/update-users/status/{id}", patch(update_user_status))
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(init_users_router())
        .route("/health", get(health))
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
