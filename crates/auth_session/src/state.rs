use crate::contract::{AuthenticatedUser, UserProfile};
use crate::routing::{self, Role};

/// Snapshot of the in-memory session. `profile` is only meaningful while
/// `user` is set; "authenticated but profile still loading" is a valid,
/// distinct state consumers must handle.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub user: Option<AuthenticatedUser>,
    pub profile: Option<UserProfile>,
    pub is_loading: bool,
}

impl SessionState {
    /// State at application start: nothing known, bootstrap pending.
    pub fn booting() -> Self {
        Self {
            user: None,
            profile: None,
            is_loading: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Role for the snapshot via the single resolution rule.
    pub fn resolved_role(&self) -> Option<Role> {
        routing::resolve_role(self.user.as_ref(), self.profile.as_ref())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::booting()
    }
}
