//! Session state and context for the frontend. The provider builds the
//! backend handle once, wires it into the shared session machine, and
//! forwards every published snapshot into a Leptos signal so guards and
//! routes stay reactive. Only non-sensitive session metadata lives in
//! memory; tokens stay inside the backend handle.

use auth_session::{Role, SessionMachine, SessionState, landing_route};
use backend_client::{Backend, BackendConfig};
use leptos::{prelude::*, task::spawn_local};

use crate::app_lib::config::AppConfig;

/// The machine concretized over the backend handle, which implements both
/// the identity and the profile contract.
pub(crate) type Machine = SessionMachine<Backend, Backend>;

#[derive(Clone)]
/// Session context shared through Leptos.
pub struct SessionContext {
    pub machine: Machine,
    pub backend: Backend,
    pub state: RwSignal<SessionState>,
    pub is_authenticated: Signal<bool>,
    pub role: Signal<Option<Role>>,
}

impl SessionContext {
    fn new(machine: Machine, backend: Backend, state: RwSignal<SessionState>) -> Self {
        let is_authenticated = Signal::derive(move || state.get().is_authenticated());
        let role = Signal::derive(move || state.get().resolved_role());
        Self {
            machine,
            backend,
            state,
            is_authenticated,
            role,
        }
    }

    /// Landing path for the freshest snapshot, read from the machine rather
    /// than the render signal: callers navigate right after an awaited
    /// operation, before the forwarder task has caught up.
    pub fn landing_path(&self) -> &'static str {
        landing_route(&self.machine.snapshot()).path()
    }
}

/// Provides the session context, starts the event listener, and bootstraps
/// the session once on mount.
#[component]
pub fn SessionProvider(children: Children) -> impl IntoView {
    let config = AppConfig::load();
    let backend = match Backend::new(BackendConfig {
        base_url: config.backend_url,
        publishable_key: config.publishable_key,
        site_url: config.site_url,
    }) {
        Ok(backend) => backend,
        Err(err) => {
            tracing::error!(error = %err, "backend client unavailable");
            let message = err.to_string();
            return view! {
                <div class="m-8 rounded-lg border border-red-200 bg-red-50 px-4 py-3 text-sm text-red-700">
                    {message}
                </div>
            }
            .into_any();
        }
    };

    let machine = SessionMachine::new(backend.clone(), backend.clone());
    let state = RwSignal::new(machine.snapshot());
    provide_context(SessionContext::new(machine.clone(), backend, state));

    let mut updates = machine.subscribe();
    spawn_local(async move {
        loop {
            let snapshot = updates.borrow_and_update().clone();
            state.set(snapshot);
            if updates.changed().await.is_err() {
                break;
            }
        }
    });

    let listener = machine.clone();
    spawn_local(async move {
        listener.listen().await;
    });

    spawn_local(async move {
        machine.bootstrap().await;
    });

    view! { {children()} }.into_any()
}

/// Returns the session context. Routes only mount as children of a
/// [`SessionProvider`] that built its backend handle, so the context is
/// always present here.
pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}
