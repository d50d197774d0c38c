//! Bearer tokens issued by [`LocalIdentityProvider`](crate::local::LocalIdentityProvider).
//!
//! The reference backend verifies them with the same [`LocalAuthConfig`]
//! secret to identify the caller of `GET /get-user-role` and the other
//! authenticated endpoints. Firebase id tokens are never verified here.
//!
//! # Example
//!
//! ```ignore
//! use bloodconnect_auth::jwt::{create_local_token, verify_local_token};
//! use bloodconnect_config::LocalAuthConfig;
//!
//! let config = LocalAuthConfig::from_env();
//! let token = create_local_token("uid-1", "donor@example.com", &config)?;
//! let claims = verify_local_token(&token, &config)?;
//! assert_eq!(claims.email, "donor@example.com");
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use bloodconnect_config::LocalAuthConfig;

/// Claims of a local bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalClaims {
    /// Provider-side user id
    pub sub: String,
    pub email: String,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
    /// Unique token id, so two tokens minted in the same second still differ
    pub jti: String,
}

pub fn create_local_token(
    uid: &str,
    email: &str,
    config: &LocalAuthConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp() as usize;
    let claims = LocalClaims {
        sub: uid.to_string(),
        email: email.to_string(),
        exp: now + config.token_expiry.max(0) as usize,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verifies signature and expiry and returns the claims.
pub fn verify_local_token(
    token: &str,
    config: &LocalAuthConfig,
) -> Result<LocalClaims, jsonwebtoken::errors::Error> {
    decode::<LocalClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> LocalAuthConfig {
        LocalAuthConfig {
            secret: "test-secret-key".to_string(),
            token_expiry: 3600,
            bcrypt_cost: 4,
        }
    }

    #[test]
    fn test_create_and_verify() {
        let config = get_test_config();
        let token = create_local_token("uid-7", "sumi@example.com", &config).unwrap();
        let claims = verify_local_token(&token, &config).unwrap();

        assert_eq!(claims.sub, "uid-7");
        assert_eq!(claims.email, "sumi@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tokens_are_unique() {
        let config = get_test_config();
        let a = create_local_token("uid-7", "sumi@example.com", &config).unwrap();
        let b = create_local_token("uid-7", "sumi@example.com", &config).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = get_test_config();
        let token = create_local_token("uid-7", "sumi@example.com", &config).unwrap();

        let other = LocalAuthConfig {
            secret: "another-secret".to_string(),
            ..config
        };
        assert!(verify_local_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = get_test_config();
        let now = Utc::now().timestamp() as usize;
        let claims = LocalClaims {
            sub: "uid".into(),
            email: "old@example.com".into(),
            exp: now - 3600,
            iat: now - 7200,
            jti: "x".into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();
        assert!(verify_local_token(&token, &config).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_local_token("not.a.token", &get_test_config()).is_err());
    }
}
