//! Role-based route guards for the view layer.
//!
//! Guards read a [`Session`] snapshot and decide whether a route renders,
//! waits, or redirects. While the session is loading a guard always answers
//! [`Access::Pending`], so a caller is never bounced to the login page while
//! their role is still being resolved.
//!
//! ```rust,ignore
//! use bloodconnect::guard::{Access, RouteGuard};
//!
//! match RouteGuard::Admin.check(&handle.get_session(), "/dashboard/all-users") {
//!     Access::Pending => show_spinner(),
//!     Access::Granted => render_all_users(),
//!     Access::Redirect { to, from } => navigate(to, from),
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

use bloodconnect_models::{Role, Session, role_hierarchy_level};

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Session is still resolving")]
    Pending,

    #[error("Sign in required")]
    NotSignedIn,

    #[error("Access denied. Required roles: {required:?}, but user has role: {actual}")]
    Role { required: Vec<Role>, actual: Role },

    #[error("Access denied. Minimum required role: {minimum}, but user has role: {actual}")]
    BelowMinimum { minimum: Role, actual: Role },
}

/// Checks that a settled, signed-in session holds one of `allowed_roles`,
/// returning that role.
pub fn check_any_role(session: &Session, allowed_roles: &[Role]) -> Result<Role, AccessDenied> {
    if session.loading {
        return Err(AccessDenied::Pending);
    }
    if session.identity.is_none() {
        return Err(AccessDenied::NotSignedIn);
    }

    let role = session.effective_role();
    if !role.is_any_of(allowed_roles) {
        return Err(AccessDenied::Role {
            required: allowed_roles.to_vec(),
            actual: role,
        });
    }
    Ok(role)
}

/// Check if a role has at least the specified level of access
pub fn check_role_hierarchy(
    user_role: &Role,
    minimum_required_role: &Role,
) -> Result<(), AccessDenied> {
    if role_hierarchy_level(user_role) < role_hierarchy_level(minimum_required_role) {
        return Err(AccessDenied::BelowMinimum {
            minimum: *minimum_required_role,
            actual: *user_role,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum Access {
    /// Session still resolving; render a loading state.
    Pending,
    Granted,
    /// Navigate to `to`, remembering `from` so login can return there.
    Redirect { to: &'static str, from: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteGuard {
    /// Any signed-in caller.
    Private,
    Admin,
    AdminOrVolunteer,
}

impl RouteGuard {
    /// Roles admitted by this guard; `None` admits every role.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            RouteGuard::Private => None,
            RouteGuard::Admin => Some(&[Role::Admin]),
            RouteGuard::AdminOrVolunteer => Some(&[Role::Admin, Role::Volunteer]),
        }
    }

    pub fn check(&self, session: &Session, location: &str) -> Access {
        let allowed = self.allowed_roles().unwrap_or(&Role::ALL);

        match check_any_role(session, allowed) {
            Ok(_) => Access::Granted,
            Err(AccessDenied::Pending) => Access::Pending,
            Err(denied) => {
                let to = if session.identity.is_some() {
                    DASHBOARD_PATH
                } else {
                    LOGIN_PATH
                };
                tracing::debug!(guard = ?self, location, reason = %denied, to, "Redirecting");
                Access::Redirect {
                    to,
                    from: location.to_string(),
                }
            }
        }
    }

    /// Guard protecting `path`, or `None` for public pages.
    pub fn for_path(path: &str) -> Option<RouteGuard> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let path = path.trim_end_matches('/');

        if !under(path, DASHBOARD_PATH) {
            return None;
        }

        const ADMIN: [&str; 2] = ["/dashboard/all-users", "/dashboard/funding"];
        const STAFF: [&str; 2] = [
            "/dashboard/all-blood-donation-request",
            "/dashboard/content-management",
        ];

        if ADMIN.iter().any(|prefix| under(path, prefix)) {
            Some(RouteGuard::Admin)
        } else if STAFF.iter().any(|prefix| under(path, prefix)) {
            Some(RouteGuard::AdminOrVolunteer)
        } else {
            Some(RouteGuard::Private)
        }
    }
}

/// `path` equals `prefix` or lies below it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Dashboard home variant for the caller's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardView {
    Admin,
    Volunteer,
    Donor,
}

impl DashboardView {
    /// `None` while loading or when nobody is signed in.
    pub fn for_session(session: &Session) -> Option<DashboardView> {
        if session.loading || session.identity.is_none() {
            return None;
        }
        Some(match session.effective_role() {
            Role::Admin => DashboardView::Admin,
            Role::Volunteer => DashboardView::Volunteer,
            Role::Donor => DashboardView::Donor,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub name: &'static str,
    pub href: &'static str,
}

const fn nav(name: &'static str, href: &'static str) -> NavItem {
    NavItem { name, href }
}

const BASE_ITEMS: [NavItem; 2] = [
    nav("Dashboard", DASHBOARD_PATH),
    nav("Profile", "/dashboard/profile"),
];

/// Sidebar entries for the session. Signed-out callers get none; a caller
/// whose role is still resolving gets only the entries every role shares.
pub fn navigation_items(session: &Session) -> Vec<NavItem> {
    if session.identity.is_none() {
        return Vec::new();
    }

    let mut items = BASE_ITEMS.to_vec();
    let Some(role) = session.role.filter(|_| !session.loading) else {
        return items;
    };

    match role {
        Role::Donor => items.extend([
            nav("My Requests", "/dashboard/my-donation-requests"),
            nav("Create Request", "/dashboard/create-donation-request"),
        ]),
        Role::Admin => items.extend([
            nav("All Users", "/dashboard/all-users"),
            nav("All Blood Donation Request", "/dashboard/all-blood-donation-request"),
            nav("Content Management", "/dashboard/content-management"),
            nav("Funding", "/dashboard/funding"),
        ]),
        Role::Volunteer => items.extend([
            nav("All Blood Donation Request", "/dashboard/all-blood-donation-request"),
            nav("Content Management", "/dashboard/content-management"),
        ]),
    }
    items
}
