//! Route guards driven by the pure guard decision over the current
//! snapshot. While the session is still resolving they hold on a spinner
//! and never redirect; a settled snapshot either renders the children or
//! forwards the visitor to a route that is valid for their role.

use auth_session::guard::{self, GuardDecision};
use auth_session::Role;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::Spinner;
use crate::features::auth::state::use_session;

fn guarded(required_role: Option<Role>, children: ChildrenFn) -> impl IntoView {
    let state = use_session().state;
    let navigate = use_navigate();
    let decision = Signal::derive(move || guard::evaluate(&state.get(), required_role));

    Effect::new(move |_| {
        if let GuardDecision::Redirect(route) = decision.get() {
            navigate(route.path(), Default::default());
        }
    });

    view! {
        {move || match decision.get() {
            GuardDecision::Render => children().into_any(),
            // Loading and the brief window before the redirect lands both
            // show the same neutral placeholder.
            GuardDecision::Loading | GuardDecision::Redirect(_) => view! {
                <div class="flex justify-center py-16">
                    <Spinner />
                </div>
            }
            .into_any(),
        }}
    }
}

/// Renders children only for an authenticated session.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    guarded(None, children)
}

/// Renders children only for the administrative tier. Admins and
/// principals share that tier.
#[component]
pub fn RequireAdmin(children: ChildrenFn) -> impl IntoView {
    guarded(Some(Role::Admin), children)
}
