//! Backend REST API configuration.

use std::env;
use std::time::Duration;

pub const DEFAULT_PUBLIC_URL: &str = "https://blood-connect-server.vercel.app";
pub const DEFAULT_SECURE_URL: &str = "http://localhost:3000";

/// Where the backend user store lives and how long to wait for it.
///
/// Unauthenticated calls (the add-user upsert) go to the public URL, calls
/// carrying a bearer credential go to the secure URL. The two are usually the
/// same host in production.
///
/// # Environment Variables
///
/// - `BACKEND_PUBLIC_URL` (default: `https://blood-connect-server.vercel.app`)
/// - `BACKEND_SECURE_URL` (default: `http://localhost:3000`)
/// - `BACKEND_TIMEOUT_SECS` (default: `10`)
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub public_base_url: String,
    pub secure_base_url: String,
    pub request_timeout: Duration,
}

impl BackendConfig {
    pub fn from_env() -> Self {
        Self {
            public_base_url: env::var("BACKEND_PUBLIC_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string()),
            secure_base_url: env::var("BACKEND_SECURE_URL")
                .unwrap_or_else(|_| DEFAULT_SECURE_URL.to_string()),
            request_timeout: Duration::from_secs(
                env::var("BACKEND_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }

    /// Point both clients at a single base URL.
    pub fn single_host(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            public_base_url: base_url.clone(),
            secure_base_url: base_url,
            ..Self::default()
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            public_base_url: DEFAULT_PUBLIC_URL.to_string(),
            secure_base_url: DEFAULT_SECURE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}
