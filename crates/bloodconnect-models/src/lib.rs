//! # BloodConnect Models
//!
//! Domain types shared by the session core, the identity providers and the
//! backend clients.
//!
//! # Modules
//!
//! - [`identity`]: The authenticated principal and its bearer credential
//! - [`roles`]: The closed set of authorization roles
//! - [`session`]: The `{identity, role, loading}` session tri-state
//! - [`users`]: Backend user record and user endpoint bodies
//! - [`value_types`]: Validated email and phone number newtypes
//!
//! # Example
//!
//! ```ignore
//! use bloodconnect_models::{Role, SessionState};
//!
//! let session = SessionState::default().snapshot();
//! assert!(session.loading);
//! assert_eq!(session.effective_role(), Role::Donor);
//! ```

pub mod identity;
pub mod roles;
pub mod session;
pub mod users;
pub mod value_types;

// Re-export commonly used types at crate root for convenience
pub use identity::{Credential, Identity, ProfileUpdate};
pub use roles::{Role, RoleParseError, role_hierarchy_level};
pub use session::{Session, SessionState};
pub use users::{
    AddUserRequest, BackendUserRecord, BloodGroup, RoleResponse, UpdateRoleRequest,
    UpdateStatusRequest, UpdateUserProfile, UpsertOutcome, UserFilterParams, UserStatus,
};
pub use value_types::{Email, PhoneNumber, ValueTypeError};
