use std::env;

const IDENTITY_TOOLKIT_HOST: &str = "https://identitytoolkit.googleapis.com";
const SECURE_TOKEN_HOST: &str = "https://securetoken.googleapis.com";

/// Firebase Auth REST settings.
///
/// # Environment Variables
///
/// - `FIREBASE_API_KEY`: Web API key of the Firebase project
/// - `FIREBASE_AUTH_EMULATOR_HOST`: `host:port` of the Auth emulator; when set,
///   every request is routed through the emulator instead of Google
#[derive(Clone, Debug, Default)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub emulator_host: Option<String>,
}

impl FirebaseConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("FIREBASE_API_KEY").unwrap_or_default(),
            emulator_host: env::var("FIREBASE_AUTH_EMULATOR_HOST")
                .ok()
                .filter(|h| !h.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() || self.emulator_host.is_some()
    }

    /// Base URL for `accounts:*` endpoints, e.g. `.../v1/accounts:signUp`.
    pub fn identity_toolkit_url(&self) -> String {
        match &self.emulator_host {
            Some(host) => format!(
                "{}/identitytoolkit.googleapis.com/v1",
                with_scheme(host)
            ),
            None => format!("{IDENTITY_TOOLKIT_HOST}/v1"),
        }
    }

    /// URL of the token refresh endpoint.
    pub fn secure_token_url(&self) -> String {
        match &self.emulator_host {
            Some(host) => format!("{}/securetoken.googleapis.com/v1/token", with_scheme(host)),
            None => format!("{SECURE_TOKEN_HOST}/v1/token"),
        }
    }
}

fn with_scheme(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", host.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_urls() {
        let config = FirebaseConfig {
            api_key: "key".into(),
            emulator_host: None,
        };
        assert_eq!(
            config.identity_toolkit_url(),
            "https://identitytoolkit.googleapis.com/v1"
        );
        assert_eq!(
            config.secure_token_url(),
            "https://securetoken.googleapis.com/v1/token"
        );
    }

    #[test]
    fn test_emulator_urls() {
        let config = FirebaseConfig {
            api_key: String::new(),
            emulator_host: Some("127.0.0.1:9099".into()),
        };
        assert!(config.is_configured());
        assert_eq!(
            config.identity_toolkit_url(),
            "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1"
        );
        assert_eq!(
            config.secure_token_url(),
            "http://127.0.0.1:9099/securetoken.googleapis.com/v1/token"
        );
    }

    #[test]
    fn test_unconfigured_by_default() {
        assert!(!FirebaseConfig::default().is_configured());
    }
}
