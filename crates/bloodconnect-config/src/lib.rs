//! # BloodConnect Config
//!
//! Configuration types for BloodConnect, loaded from environment variables.
//!
//! - [`backend`]: Base URLs and timeouts for the backend REST API
//! - [`firebase`]: Firebase Auth REST settings
//! - [`local_auth`]: Signing and hashing settings for the in-process identity provider
//! - [`cors`]: CORS configuration for the reference backend server
//! - [`server`]: Bind address for the reference backend server
//!
//! # Example
//!
//! ```ignore
//! use bloodconnect_config::{BackendConfig, FirebaseConfig};
//!
//! dotenvy::dotenv().ok();
//! let backend = BackendConfig::from_env();
//! let firebase = FirebaseConfig::from_env();
//! ```

pub mod backend;
pub mod cors;
pub mod firebase;
pub mod local_auth;
pub mod server;

// Re-export commonly used types at crate root
pub use backend::BackendConfig;
pub use cors::CorsConfig;
pub use firebase::FirebaseConfig;
pub use local_auth::LocalAuthConfig;
pub use server::ServerConfig;
