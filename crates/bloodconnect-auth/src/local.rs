//! In-process identity provider for development and tests.
//!
//! Accounts live in memory. Passwords are bcrypt-hashed and credentials are
//! HS256 tokens from [`crate::jwt`], so the reference backend can verify
//! callers with the shared [`LocalAuthConfig`] secret.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::instrument;

use bloodconnect_config::LocalAuthConfig;
use bloodconnect_models::{Credential, Email, Identity, ProfileUpdate};

use crate::error::AuthError;
use crate::jwt::{create_local_token, verify_local_token};
use crate::password::{check_password_strength, hash_password, verify_password};
use crate::provider::{AuthStateNotifier, AuthSubscription, IdentityProvider};

#[derive(Debug, Clone)]
struct LocalAccount {
    uid: String,
    /// `None` for accounts created through federated sign-in.
    password_hash: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

pub struct LocalIdentityProvider {
    config: LocalAuthConfig,
    accounts: Mutex<HashMap<Email, LocalAccount>>,
    notifier: AuthStateNotifier,
}

impl LocalIdentityProvider {
    /// Starts signed out; subscribers immediately receive `None`.
    pub fn new(config: LocalAuthConfig) -> Self {
        Self {
            config,
            accounts: Mutex::new(HashMap::new()),
            notifier: AuthStateNotifier::signed_out(),
        }
    }

    pub fn account_count(&self) -> usize {
        self.lock_accounts().len()
    }

    /// Mints a federated id token for `email`, standing in for the token a
    /// Google sign-in popup would hand back.
    pub fn issue_federated_token(&self, email: &str) -> Result<String, AuthError> {
        let email = Email::new(email).map_err(|_| AuthError::InvalidEmail)?;
        Ok(create_local_token(
            &format!("federated:{email}"),
            email.as_str(),
            &self.config,
        )?)
    }

    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, HashMap<Email, LocalAccount>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn identity_for(&self, email: &Email, account: &LocalAccount) -> Result<Identity, AuthError> {
        let token = create_local_token(&account.uid, email.as_str(), &self.config)?;
        Ok(Identity {
            uid: account.uid.clone(),
            email: email.clone(),
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
            credential: Credential::new(token),
        })
    }

    fn signed_in(&self) -> Result<Identity, AuthError> {
        self.notifier.current().ok_or(AuthError::NotSignedIn)
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Provider(format!("password task failed: {e}")))?
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    #[instrument(skip(self, password), fields(user.email = %email))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Email::new(email).map_err(|_| AuthError::InvalidEmail)?;
        let account = self
            .lock_accounts()
            .get(&email)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;
        let hash = account
            .password_hash
            .clone()
            .ok_or(AuthError::InvalidCredentials)?;

        let password = password.to_string();
        let valid = run_blocking(move || verify_password(&password, &hash)).await?;
        if !valid {
            tracing::debug!("Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let identity = self.identity_for(&email, &account)?;
        self.notifier.publish(Some(identity.clone()));
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
        let email = Email::new(email).map_err(|_| AuthError::InvalidEmail)?;
        check_password_strength(password)?;
        if self.lock_accounts().contains_key(&email) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let password = password.to_string();
        let cost = self.config.bcrypt_cost;
        let hash = run_blocking(move || hash_password(&password, cost)).await?;

        let account = LocalAccount {
            uid: uuid::Uuid::new_v4().to_string(),
            password_hash: Some(hash),
            display_name: Some(name.to_string()).filter(|n| !n.is_empty()),
            photo_url: photo_url.map(str::to_string),
        };

        {
            let mut accounts = self.lock_accounts();
            if accounts.contains_key(&email) {
                return Err(AuthError::EmailAlreadyInUse);
            }
            accounts.insert(email.clone(), account.clone());
        }

        let identity = self.identity_for(&email, &account)?;
        self.notifier.publish(Some(identity.clone()));
        tracing::info!(user.uid = %identity.uid, "User signed up");
        Ok(identity)
    }

    #[instrument(skip_all)]
    async fn sign_in_with_federated(&self, id_token: &str) -> Result<Identity, AuthError> {
        let claims = verify_local_token(id_token, &self.config)?;
        let email = Email::new(claims.email).map_err(|_| AuthError::InvalidEmail)?;

        let account = {
            let mut accounts = self.lock_accounts();
            accounts
                .entry(email.clone())
                .or_insert_with(|| LocalAccount {
                    uid: uuid::Uuid::new_v4().to_string(),
                    password_hash: None,
                    display_name: None,
                    photo_url: None,
                })
                .clone()
        };

        let identity = self.identity_for(&email, &account)?;
        self.notifier.publish(Some(identity.clone()));
        tracing::info!(user.email = %email, "User signed in with federated token");
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.notifier.publish(None);
        tracing::info!("User signed out");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_profile(&self, update: ProfileUpdate) -> Result<Identity, AuthError> {
        let mut identity = self.signed_in()?;
        {
            let mut accounts = self.lock_accounts();
            let account = accounts
                .get_mut(&identity.email)
                .ok_or(AuthError::SessionExpired)?;
            if let Some(name) = &update.display_name {
                account.display_name = Some(name.clone());
            }
            if let Some(photo) = &update.photo_url {
                account.photo_url = Some(photo.clone());
            }
        }

        identity.apply_profile(&update);
        self.notifier.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn delete_account(&self) -> Result<(), AuthError> {
        let identity = self.signed_in()?;
        self.lock_accounts().remove(&identity.email);
        self.notifier.publish(None);
        tracing::info!(user.email = %identity.email, "Account deleted");
        Ok(())
    }

    async fn refresh_credential(&self) -> Result<Identity, AuthError> {
        let mut identity = self.signed_in()?;
        let token = create_local_token(&identity.uid, identity.email.as_str(), &self.config)?;
        identity.credential = Credential::new(token);
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
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new(LocalAuthConfig {
            secret: "unit-secret".into(),
            token_expiry: 600,
            bcrypt_cost: 4,
        })
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = provider();
        let created = provider
            .sign_up("Mim@Example.com", "hunter22", "Mim", None)
            .await
            .unwrap();
        assert_eq!(created.email, "mim@example.com");
        assert_eq!(created.display_name.as_deref(), Some("Mim"));

        provider.sign_out().await.unwrap();
        assert!(provider.current_identity().is_none());

        let again = provider.sign_in("mim@example.com", "hunter22").await.unwrap();
        assert_eq!(again.uid, created.uid);
        assert_ne!(again.credential, created.credential);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let provider = provider();
        provider.sign_up("a@example.com", "hunter22", "A", None).await.unwrap();
        provider.sign_out().await.unwrap();

        let err = provider.sign_in("a@example.com", "nope-nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(provider.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sign_up() {
        let provider = provider();
        provider.sign_up("a@example.com", "hunter22", "A", None).await.unwrap();
        let err = provider
            .sign_up("A@example.com", "hunter22", "A", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyInUse));
        assert_eq!(provider.account_count(), 1);
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let provider = provider();
        assert!(matches!(
            provider.sign_up("not-an-email", "hunter22", "X", None).await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            provider.sign_up("x@example.com", "123", "X", None).await,
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_credential_verifies_with_shared_secret() {
        let provider = provider();
        let identity = provider
            .sign_up("v@example.com", "hunter22", "V", None)
            .await
            .unwrap();
        let claims = verify_local_token(identity.credential.as_str(), &provider.config).unwrap();
        assert_eq!(claims.email, "v@example.com");
        assert_eq!(claims.sub, identity.uid);
    }

    #[tokio::test]
    async fn test_federated_sign_in_creates_account_once() {
        let provider = provider();
        let token = provider.issue_federated_token("g@example.com").unwrap();

        let first = provider.sign_in_with_federated(&token).await.unwrap();
        let second = provider.sign_in_with_federated(&token).await.unwrap();
        assert_eq!(first.uid, second.uid);
        assert_eq!(provider.account_count(), 1);

        // No password was ever set.
        provider.sign_out().await.unwrap();
        assert!(provider.sign_in("g@example.com", "anything").await.is_err());
    }

    #[tokio::test]
    async fn test_profile_update_requires_sign_in() {
        let provider = provider();
        let err = provider.update_profile(ProfileUpdate::default()).await.unwrap_err();
        assert!(matches!(err, AuthError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_profile_update_renotifies() {
        let provider = provider();
        provider.sign_up("p@example.com", "hunter22", "P", None).await.unwrap();
        let mut sub = provider.subscribe();
        let _current = sub.recv().await.unwrap();

        provider
            .update_profile(ProfileUpdate {
                display_name: Some("Priya".into()),
                photo_url: Some("https://img.example.com/p.png".into()),
            })
            .await
            .unwrap();

        let updated = sub.recv().await.unwrap().unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Priya"));
        assert_eq!(updated.photo_url.as_deref(), Some("https://img.example.com/p.png"));
    }

    #[tokio::test]
    async fn test_delete_account_signs_out() {
        let provider = provider();
        provider.sign_up("d@example.com", "hunter22", "D", None).await.unwrap();
        provider.delete_account().await.unwrap();

        assert!(provider.current_identity().is_none());
        assert_eq!(provider.account_count(), 0);
        assert!(matches!(
            provider.delete_account().await,
            Err(AuthError::NotSignedIn)
        ));
    }
}
