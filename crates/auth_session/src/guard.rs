use crate::routing::{self, Role, Route};
use crate::state::SessionState;

/// What a protected view should do for the current snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving: show a neutral placeholder, never redirect.
    Loading,
    /// Render the protected children.
    Render,
    /// Send the visitor to a route that is valid for them.
    Redirect(Route),
}

/// Pure decision function re-evaluated from the snapshot on every render.
/// A role mismatch redirects to the visitor's own landing route, never to
/// a blank or error page.
pub fn evaluate(state: &SessionState, required_role: Option<Role>) -> GuardDecision {
    if state.is_loading {
        return GuardDecision::Loading;
    }
    if state.user.is_none() {
        return GuardDecision::Redirect(Route::Login);
    }
    let required = match required_role {
        Some(required) => required,
        None => return GuardDecision::Render,
    };
    let resolved = state.resolved_role();
    match resolved {
        Some(role) if role.shares_landing_with(required) => GuardDecision::Render,
        _ => GuardDecision::Redirect(routing::target_route_for(resolved)),
    }
}
