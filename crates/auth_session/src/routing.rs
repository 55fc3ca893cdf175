//! Role resolution and the role-to-route mapping. Guards, routers, and
//! post-login navigation all go through these functions; no call site may
//! re-derive a role or a landing route on its own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::{AuthenticatedUser, UserProfile};
use crate::state::SessionState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Principal,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Principal];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Principal => "principal",
        }
    }

    /// Human-readable label for selects and tables.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Teacher => "Teacher",
            Role::Principal => "Principal",
        }
    }

    /// Whether two roles land on the same route. Roles that share a
    /// landing satisfy each other's guard requirement; an exact-match
    /// check would bounce a principal off the admin landing forever.
    pub fn shares_landing_with(self, other: Role) -> bool {
        target_route_for(Some(self)) == target_route_for(Some(other))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "principal" => Ok(Role::Principal),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Navigation targets the core can direct a user to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    AdminHome,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::AdminHome => "/admin",
        }
    }
}

/// The profile role is authoritative; identity metadata only covers the
/// window before the profile row has loaded. `None` means "unknown, wait".
pub fn resolve_role(
    user: Option<&AuthenticatedUser>,
    profile: Option<&UserProfile>,
) -> Option<Role> {
    profile
        .map(|profile| profile.role)
        .or_else(|| user.and_then(AuthenticatedUser::metadata_role))
}

/// Landing route for a resolved role. Total: an authenticated user with an
/// unknown role still gets the standard dashboard.
pub fn target_route_for(role: Option<Role>) -> Route {
    match role {
        Some(Role::Admin | Role::Principal) => Route::AdminHome,
        Some(Role::Teacher) | None => Route::Dashboard,
    }
}

/// Where a snapshot should land: public entry when unauthenticated,
/// otherwise the role's target route.
pub fn landing_route(state: &SessionState) -> Route {
    if state.user.is_none() {
        return Route::Login;
    }
    target_route_for(state.resolved_role())
}
