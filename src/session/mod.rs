//! Session bootstrap and role resolution.
//!
//! [`SessionResolver`] turns identity-provider notifications into the
//! `{identity, role, loading}` session that route guards read through
//! [`SessionHandle`]s.

pub mod resolver;
pub mod store;

pub use resolver::{ResolveError, ResolverStats, SessionResolver};
pub use store::{SessionHandle, SessionStore};
