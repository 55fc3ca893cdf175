use auth_session::landing_route;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use secrecy::SecretString;

use crate::components::{Alert, AlertKind, AppShell, Button, Spinner};
use crate::features::auth::state::use_session;

const INPUT: &str = "w-full rounded-lg border border-gray-300 bg-white px-3 py-2.5 text-sm text-gray-900 focus:border-indigo-400 focus:ring-2 focus:ring-indigo-200";

#[derive(Clone)]
struct LoginInput {
    email: String,
    password: String,
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let state = session.state;
    let machine = session.machine.clone();
    let session_for_nav = session.clone();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(None);

    let login_action = Action::new_local(move |input: &LoginInput| {
        let machine = machine.clone();
        let input = input.clone();
        async move {
            machine
                .sign_in(&input.email, SecretString::from(input.password))
                .await
        }
    });

    let navigate = use_navigate();
    Effect::new(move |_| {
        if let Some(result) = login_action.value().get() {
            match result {
                Ok(_) => navigate(session_for_nav.landing_path(), Default::default()),
                Err(err) => set_error.set(Some(err.to_string())),
            }
        }
    });

    // An already-signed-in visitor has nothing to do here.
    let forward = use_navigate();
    Effect::new(move |_| {
        let snapshot = state.get();
        if !snapshot.is_loading && snapshot.user.is_some() {
            forward(landing_route(&snapshot).path(), Default::default());
        }
    });

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);

        let email_value = email.get_untracked().trim().to_string();
        let password_value = password.get_untracked();
        if email_value.is_empty() || password_value.trim().is_empty() {
            set_error.set(Some("Email and password are required.".to_string()));
            return;
        }

        login_action.dispatch(LoginInput {
            email: email_value,
            password: password_value,
        });
    };

    view! {
        <AppShell>
            <form class="max-w-sm mx-auto" on:submit=on_submit>
                <h1 class="mb-6 text-2xl font-semibold text-gray-900">"Sign in"</h1>
                <div class="mb-5">
                    <label class="block mb-2 text-sm font-medium text-gray-900" for="email">
                        "Your email"
                    </label>
                    <input
                        id="email"
                        type="email"
                        class=INPUT
                        autocomplete="email"
                        placeholder="name@school.org"
                        required
                        on:input=move |event| set_email.set(event_target_value(&event))
                    />
                </div>
                <div class="mb-5">
                    <label class="block mb-2 text-sm font-medium text-gray-900" for="password">
                        "Your password"
                    </label>
                    <input
                        id="password"
                        type="password"
                        class=INPUT
                        autocomplete="current-password"
                        required
                        on:input=move |event| set_password.set(event_target_value(&event))
                    />
                </div>
                <Button button_type="submit" disabled=login_action.pending()>
                    "Sign in"
                </Button>
                {move || {
                    login_action
                        .pending()
                        .get()
                        .then_some(view! { <div class="mt-4"><Spinner /></div> })
                }}
                {move || {
                    error
                        .get()
                        .map(|message| {
                            view! {
                                <div class="mt-4">
                                    <Alert kind=AlertKind::Error message=message />
                                </div>
                            }
                        })
                }}
            </form>
        </AppShell>
    }
}
