//! Session tri-state consumed by route guards and data-fetching code.

use serde::Serialize;

use crate::identity::Identity;
use crate::roles::Role;

/// Internal session state. Each variant carries exactly what is known, so a
/// settled session without a role for a signed-in identity cannot exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting on the identity provider (`identity: None`, initial state) or
    /// on role resolution for `identity`.
    Resolving { identity: Option<Identity> },
    Anonymous,
    Resolved { identity: Identity, role: Role },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Resolving { identity: None }
    }
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Resolving { .. })
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Resolving { identity } => identity.as_ref(),
            SessionState::Anonymous => None,
            SessionState::Resolved { identity, .. } => Some(identity),
        }
    }

    pub fn snapshot(&self) -> Session {
        Session::from(self)
    }
}

/// Flattened `{identity, role, loading}` view.
///
/// `role` is `None` while loading and for anonymous callers. While `loading`
/// is true neither `identity` nor `role` is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub identity: Option<Identity>,
    pub role: Option<Role>,
    pub loading: bool,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        !self.loading && self.identity.is_some()
    }

    /// Role for permission decisions; anonymous and unresolved callers get
    /// the least-privilege role.
    pub fn effective_role(&self) -> Role {
        match (self.loading, self.role) {
            (false, Some(role)) => role,
            _ => Role::Donor,
        }
    }
}

impl From<&SessionState> for Session {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::Resolving { identity } => Session {
                identity: identity.clone(),
                role: None,
                loading: true,
            },
            SessionState::Anonymous => Session {
                identity: None,
                role: None,
                loading: false,
            },
            SessionState::Resolved { identity, role } => Session {
                identity: Some(identity.clone()),
                role: Some(*role),
                loading: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Credential;
    use crate::value_types::Email;

    fn identity() -> Identity {
        Identity {
            uid: "u1".into(),
            email: Email::new("nadia@example.com").unwrap(),
            display_name: Some("Nadia".into()),
            photo_url: None,
            credential: Credential::new("t"),
        }
    }

    #[test]
    fn test_initial_state_is_loading() {
        let session = SessionState::default().snapshot();
        assert!(session.loading);
        assert!(session.identity.is_none());
        assert!(session.role.is_none());
    }

    #[test]
    fn test_anonymous_snapshot() {
        let session = SessionState::Anonymous.snapshot();
        assert_eq!(
            session,
            Session {
                identity: None,
                role: None,
                loading: false
            }
        );
        assert_eq!(session.effective_role(), Role::Donor);
    }

    #[test]
    fn test_resolving_hides_role() {
        let session = SessionState::Resolving {
            identity: Some(identity()),
        }
        .snapshot();
        assert!(session.loading);
        assert!(session.role.is_none());
        assert!(!session.is_signed_in());
        assert_eq!(session.effective_role(), Role::Donor);
    }

    #[test]
    fn test_resolved_snapshot() {
        let session = SessionState::Resolved {
            identity: identity(),
            role: Role::Admin,
        }
        .snapshot();
        assert!(!session.loading);
        assert!(session.is_signed_in());
        assert_eq!(session.effective_role(), Role::Admin);
    }
}
