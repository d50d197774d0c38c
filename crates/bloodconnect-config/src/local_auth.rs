use std::env;

/// Settings for the in-process identity provider and for bearer verification
/// in the reference backend. Both sides must share `secret`.
#[derive(Clone, Debug)]
pub struct LocalAuthConfig {
    pub secret: String,
    pub token_expiry: i64,
    pub bcrypt_cost: u32,
}

impl LocalAuthConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("LOCAL_AUTH_SECRET")
                .unwrap_or_else(|_| "local-dev-secret-change-me".to_string()),
            token_expiry: env::var("LOCAL_AUTH_TOKEN_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600), // 1 hour
            bcrypt_cost: env::var("LOCAL_AUTH_BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(12),
        }
    }
}

impl Default for LocalAuthConfig {
    fn default() -> Self {
        Self {
            secret: "local-dev-secret-change-me".to_string(),
            token_expiry: 3600,
            bcrypt_cost: 12,
        }
    }
}
