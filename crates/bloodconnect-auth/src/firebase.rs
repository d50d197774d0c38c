//! Firebase Auth over its REST API.
//!
//! Requests go to the Identity Toolkit `accounts:*` endpoints (or the Auth
//! emulator when `FIREBASE_AUTH_EMULATOR_HOST` is set). Firebase reports
//! failures as `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`; the
//! message is mapped with [`AuthError::from_firebase_message`].

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bloodconnect_config::FirebaseConfig;
use bloodconnect_models::{Credential, Email, Identity, ProfileUpdate};

use crate::error::AuthError;
use crate::provider::{AuthStateNotifier, AuthSubscription, IdentityProvider};

/// Redirect URI sent with federated sign-in. Firebase requires one but does
/// not use it for id-token exchanges.
const IDP_REQUEST_URI: &str = "http://localhost";
const GOOGLE_PROVIDER_ID: &str = "google.com";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: &'static str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdTokenRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, alias = "profilePicture")]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountResponse>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
}

pub struct FirebaseIdentityProvider {
    config: FirebaseConfig,
    client: Client,
    refresh_token: Mutex<Option<String>>,
    notifier: AuthStateNotifier,
}

impl FirebaseIdentityProvider {
    /// Starts signed out. Use [`restore_session`](Self::restore_session) to
    /// resume a persisted session.
    pub fn new(config: FirebaseConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: FirebaseConfig, client: Client) -> Self {
        Self {
            config,
            client,
            refresh_token: Mutex::new(None),
            notifier: AuthStateNotifier::signed_out(),
        }
    }

    /// Refresh token of the signed-in user, for persisting across restarts.
    pub fn refresh_token(&self) -> Option<String> {
        self.refresh_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resumes a session from a stored refresh token and notifies
    /// subscribers with the restored identity.
    #[instrument(skip_all)]
    pub async fn restore_session(&self, refresh_token: &str) -> Result<Identity, AuthError> {
        let tokens = self.exchange_refresh_token(refresh_token).await?;
        let lookup: LookupResponse = self
            .post(
                "lookup",
                &IdTokenRequest {
                    id_token: &tokens.id_token,
                },
            )
            .await?;
        let account = lookup
            .users
            .into_iter()
            .next()
            .ok_or(AuthError::SessionExpired)?;

        let identity = account_identity(account, tokens.id_token)?;
        self.set_refresh_token(Some(tokens.refresh_token));
        self.notifier.publish(Some(identity.clone()));
        tracing::info!(user.email = %identity.email, "Session restored");
        Ok(identity)
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, AuthError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/accounts:{}", self.config.identity_toolkit_url(), endpoint);
        let response = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshResponse, AuthError> {
        let response = self
            .client
            .post(self.config.secure_token_url())
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;
        parse_response(response).await
    }

    fn set_refresh_token(&self, token: Option<String>) {
        *self
            .refresh_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn signed_in(&self) -> Result<Identity, AuthError> {
        self.notifier.current().ok_or(AuthError::NotSignedIn)
    }

    /// Completes a sign-in style response: keeps the refresh token and
    /// notifies subscribers.
    fn accept(&self, account: AccountResponse) -> Result<Identity, AuthError> {
        let id_token = account
            .id_token
            .clone()
            .ok_or_else(|| AuthError::Provider("response carried no id token".into()))?;
        let refresh_token = account.refresh_token.clone();
        let identity = account_identity(account, id_token)?;

        self.set_refresh_token(refresh_token);
        self.notifier.publish(Some(identity.clone()));
        Ok(identity)
    }
}

async fn parse_response<R: DeserializeOwned>(response: Response) -> Result<R, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => {
            tracing::debug!(%status, message = %envelope.error.message, "Firebase rejected request");
            Err(AuthError::from_firebase_message(&envelope.error.message))
        }
        Err(_) => Err(AuthError::Provider(format!("HTTP {status}: {text}"))),
    }
}

fn account_identity(account: AccountResponse, id_token: String) -> Result<Identity, AuthError> {
    let email = account
        .email
        .as_deref()
        .ok_or(AuthError::InvalidEmail)
        .and_then(|e| Email::new(e).map_err(|_| AuthError::InvalidEmail))?;

    Ok(Identity {
        uid: account.local_id,
        email,
        display_name: account.display_name.filter(|n| !n.is_empty()),
        photo_url: account.photo_url.filter(|p| !p.is_empty()),
        credential: Credential::new(id_token),
    })
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    #[instrument(skip(self, password), fields(user.email = %email))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let account: AccountResponse = self
            .post(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let identity = self.accept(account)?;
        tracing::info!(user.uid = %identity.uid, "User signed in");
        Ok(identity)
    }

    #[instrument(skip(self, password, photo_url), fields(user.email = %email))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
        photo_url: Option<&str>,
    ) -> Result<Identity, AuthError> {
        let created: AccountResponse = self
            .post(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let id_token = created
            .id_token
            .clone()
            .ok_or_else(|| AuthError::Provider("signUp returned no id token".into()))?;

        let mut updated: AccountResponse = self
            .post(
                "update",
                &UpdateRequest {
                    id_token: &id_token,
                    display_name: Some(name).filter(|n| !n.is_empty()),
                    photo_url,
                    return_secure_token: true,
                },
            )
            .await?;
        updated.email = updated.email.or(created.email);
        updated.id_token = updated.id_token.or(Some(id_token));
        updated.refresh_token = updated.refresh_token.or(created.refresh_token);

        let identity = self.accept(updated)?;
        tracing::info!(user.uid = %identity.uid, "User signed up");
        Ok(identity)
    }

    #[instrument(skip_all)]
    async fn sign_in_with_federated(&self, id_token: &str) -> Result<Identity, AuthError> {
        let account: AccountResponse = self
            .post(
                "signInWithIdp",
                &IdpRequest {
                    post_body: format!("id_token={id_token}&providerId={GOOGLE_PROVIDER_ID}"),
                    request_uri: IDP_REQUEST_URI,
                    return_secure_token: true,
                    return_idp_credential: true,
                },
            )
            .await?;
        let identity = self.accept(account)?;
        tracing::info!(user.email = %identity.email, "User signed in with Google");
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_refresh_token(None);
        self.notifier.publish(None);
        tracing::info!("User signed out");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_profile(&self, update: ProfileUpdate) -> Result<Identity, AuthError> {
        let current = self.signed_in()?;
        let mut account: AccountResponse = self
            .post(
                "update",
                &UpdateRequest {
                    id_token: current.credential.as_str(),
                    display_name: update.display_name.as_deref(),
                    photo_url: update.photo_url.as_deref(),
                    return_secure_token: true,
                },
            )
            .await?;
        account.email = account.email.or(Some(current.email.into_inner()));
        account.id_token = account
            .id_token
            .or(Some(current.credential.as_str().to_string()));
        account.refresh_token = account.refresh_token.or_else(|| self.refresh_token());

        self.accept(account)
    }

    async fn delete_account(&self) -> Result<(), AuthError> {
        let current = self.signed_in()?;
        let _: serde_json::Value = self
            .post(
                "delete",
                &IdTokenRequest {
                    id_token: current.credential.as_str(),
                },
            )
            .await?;

        self.set_refresh_token(None);
        self.notifier.publish(None);
        tracing::info!(user.email = %current.email, "Account deleted");
        Ok(())
    }

    async fn refresh_credential(&self) -> Result<Identity, AuthError> {
        let mut identity = self.signed_in()?;
        let refresh_token = self.refresh_token().ok_or(AuthError::SessionExpired)?;
        let tokens = self.exchange_refresh_token(&refresh_token).await?;

        identity.credential = Credential::new(tokens.id_token);
        self.set_refresh_token(Some(tokens.refresh_token));
        self.notifier.publish(Some(identity.clone()));
        Ok(identity)
    }

    fn current_identity(&self) -> Option<Identity> {
        self.notifier.current()
    }

    fn subscribe(&self) -> AuthSubscription {
        self.notifier.subscribe()
    }

    fn name(&self) -> &'static str {
        "firebase"
    }
}
