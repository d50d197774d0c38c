//! # BloodConnect Session
//!
//! Session bootstrap and role resolution for the BloodConnect blood donation
//! platform.
//!
//! ## Overview
//!
//! When an identity provider reports a signed-in user, the session core
//! upserts the user into the backend user store, asks the backend for the
//! user's role and publishes a single `{identity, role, loading}` session that
//! route guards and dashboard views read.
//!
//! ```text
//! IdentityProvider ──notifications──▶ SessionResolver ──▶ SessionStore
//!  (Firebase/local)                     │   ▲                  │
//!                                       ▼   │                  ▼
//!                                    UserBackend          SessionHandle
//!                                 (add-user, get-user-role)  (guards, views)
//! ```
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── backend/     # UserBackend trait, HTTP client and in-memory store
//! ├── session/     # Session store and the resolver loop
//! ├── guard.rs     # Route guards, dashboard variant, navigation items
//! ├── server/      # Reference backend REST API over the in-memory store
//! ├── cli/         # `serve` and `whoami` commands
//! └── state.rs     # Shared state of the reference backend
//! crates/
//! ├── bloodconnect-core/           # AppError
//! ├── bloodconnect-config/         # Environment configuration
//! ├── bloodconnect-models/         # Identity, Role, Session, backend DTOs
//! ├── bloodconnect-auth/           # Identity providers
//! └── bloodconnect-observability/  # Tracing and Prometheus metrics
//! ```
//!
//! ## Roles
//!
//! | Role        | Dashboard                                         |
//! |-------------|---------------------------------------------------|
//! | `admin`     | users, all requests, content, funding             |
//! | `volunteer` | all requests, content                             |
//! | `donor`     | own donation requests (default for new users)     |
//!
//! Any failure to determine a role resolves to `donor`.
//!
//! ## Guarantees
//!
//! - A session is `loading` from start-up until the first notification has
//!   been handled, so guards never redirect a returning user too early.
//! - A sign-out is published immediately, without waiting on the backend.
//! - A role lookup started for an older notification never overwrites the
//!   session of a newer one.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bloodconnect::{backend::HttpUserBackend, session::SessionResolver};
//! use bloodconnect_auth::{FirebaseIdentityProvider, IdentityProvider};
//!
//! let provider = FirebaseIdentityProvider::new(FirebaseConfig::from_env());
//! let backend = Arc::new(HttpUserBackend::new(BackendConfig::from_env())?);
//! let resolver = SessionResolver::attach(&provider, backend);
//!
//! provider.sign_in("donor@example.com", "secret1").await?;
//! let session = resolver.session().settled().await;
//! ```

pub mod backend;
pub mod cli;
pub mod guard;
pub mod server;
pub mod session;
pub mod state;

pub use bloodconnect_auth as auth;
pub use bloodconnect_config as config;
pub use bloodconnect_models as models;
