//! # BloodConnect Auth
//!
//! Identity provider clients and auth-state subscriptions.
//!
//! This crate provides:
//!
//! - [`provider`]: The [`IdentityProvider`] trait and the [`AuthStateNotifier`]
//!   fan-out that backs every provider's [`AuthSubscription`]
//! - [`firebase`]: Firebase Auth over its REST API
//! - [`local`]: In-process provider with bcrypt passwords and HS256 tokens
//! - [`jwt`]: Creation and verification of local bearer tokens
//! - [`password`]: Password hashing and strength checks
//! - [`error`]: [`AuthError`], surfaced to the user action that failed
//!
//! # Example
//!
//! ```ignore
//! use bloodconnect_auth::{IdentityProvider, LocalIdentityProvider};
//! use bloodconnect_config::LocalAuthConfig;
//!
//! let provider = LocalIdentityProvider::new(LocalAuthConfig::from_env());
//! let mut changes = provider.subscribe();
//!
//! provider.sign_up("donor@example.com", "secret1", "Donor", None).await?;
//! while let Some(identity) = changes.recv().await {
//!     println!("auth state: {:?}", identity.map(|i| i.email));
//! }
//! ```

pub mod error;
pub mod firebase;
pub mod jwt;
pub mod local;
pub mod password;
pub mod provider;

// Re-export commonly used types at crate root
pub use error::AuthError;
pub use firebase::FirebaseIdentityProvider;
pub use jwt::{LocalClaims, create_local_token, verify_local_token};
pub use local::LocalIdentityProvider;
pub use provider::{AuthNotification, AuthStateNotifier, AuthSubscription, IdentityProvider};
