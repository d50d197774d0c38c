use thiserror::Error;

/// Errors surfaced to the user action that triggered an identity-provider
/// call (login form, registration, profile page). Messages are meant for
/// display.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailAlreadyInUse,

    #[error("Password is too weak: {0}")]
    WeakPassword(String),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("This account has been disabled")]
    UserDisabled,

    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Identity provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl AuthError {
    /// Map a Firebase Auth REST error message (`"EMAIL_EXISTS"`,
    /// `"WEAK_PASSWORD : Password should be at least 6 characters"`, ...).
    pub fn from_firebase_message(message: &str) -> Self {
        let (code, detail) = match message.split_once(" : ") {
            Some((code, detail)) => (code.trim(), Some(detail.trim())),
            None => (message.trim(), None),
        };

        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                AuthError::InvalidCredentials
            }
            "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
            "WEAK_PASSWORD" => AuthError::WeakPassword(
                detail
                    .unwrap_or("Password should be at least 6 characters")
                    .to_string(),
            ),
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
            "USER_DISABLED" => AuthError::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
            "INVALID_ID_TOKEN"
            | "TOKEN_EXPIRED"
            | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN"
            | "INVALID_REFRESH_TOKEN"
            | "USER_NOT_FOUND" => AuthError::SessionExpired,
            _ => AuthError::Provider(message.to_string()),
        }
    }
}
