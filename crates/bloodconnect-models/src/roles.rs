//! Authorization roles.
//!
//! Roles live on the backend user record, never in the identity provider.
//! The set is closed: anything the backend returns outside of it is either
//! rejected ([`Role::from_str`]) or collapsed to [`Role::Donor`]
//! ([`Role::from_backend`]) depending on which side of the boundary the caller
//! sits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Volunteer,
    /// Least-privilege role, given to new records and to any caller whose
    /// role could not be resolved.
    #[default]
    Donor,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct RoleParseError(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Volunteer, Role::Donor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Volunteer => "volunteer",
            Role::Donor => "donor",
        }
    }

    /// Lenient parse for values read off the wire: unknown or empty strings
    /// become [`Role::Donor`].
    pub fn from_backend(raw: &str) -> Role {
        raw.parse().unwrap_or_else(|err: RoleParseError| {
            tracing::warn!(error = %err, "Unrecognized role from backend, treating as donor");
            Role::Donor
        })
    }

    pub fn is_any_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "volunteer" => Ok(Role::Volunteer),
            "donor" => Ok(Role::Donor),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Get the hierarchy level of a role (higher number = more privileges)
pub fn role_hierarchy_level(role: &Role) -> u8 {
    match role {
        Role::Admin => 2,
        Role::Volunteer => 1,
        Role::Donor => 0,
    }
}
