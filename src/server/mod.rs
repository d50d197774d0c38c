//! Reference implementation of the backend REST API.
//!
//! Serves [`MemoryUserBackend`](crate::backend::MemoryUserBackend) over the
//! same routes [`HttpUserBackend`](crate::backend::HttpUserBackend) calls, so
//! the session core can run end to end against a local process.
//!
//! ```text
//! POST  /add-user                    public upsert
//! GET   /get-user-role               caller's role
//! GET   /users/{email}               self or admin
//! PATCH /users/{email}               self or admin
//! GET   /get-users?status=           admin
//! PATCH /update-users/role/{id}      admin
//! PATCH /update-users/status/{id}    admin
//! ```

pub mod auth;
pub mod controller;
pub mod router;
pub mod service;

pub use auth::AuthUser;
pub use router::init_router;
