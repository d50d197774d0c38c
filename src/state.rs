use std::sync::Arc;

use bloodconnect_config::{CorsConfig, LocalAuthConfig};

use crate::backend::MemoryUserBackend;

#[derive(Clone, Debug)]
pub struct AppState {
    pub users: Arc<MemoryUserBackend>,
    pub local_auth: LocalAuthConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(local_auth: LocalAuthConfig, cors_config: CorsConfig) -> Self {
        Self {
            users: Arc::new(MemoryUserBackend::new(local_auth.clone())),
            local_auth,
            cors_config,
        }
    }
}

pub fn init_app_state() -> AppState {
    AppState::new(LocalAuthConfig::from_env(), CorsConfig::from_env())
}
