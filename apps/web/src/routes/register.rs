//! Staff registration. The form validates locally, then drives the
//! two-phase sign-up: identity record first, profile row second. When the
//! backend requires email confirmation the form is swapped for a
//! check-your-email panel instead of navigating anywhere.

use auth_session::{NewAccount, Role, SessionError};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::{components::A, hooks::use_navigate};
use secrecy::SecretString;

use crate::components::{Alert, AlertKind, AppShell, Button, Spinner};
use crate::features::auth::state::use_session;

const INPUT: &str = "w-full rounded-lg border border-gray-300 bg-white px-3 py-2.5 text-sm text-gray-900 focus:border-indigo-400 focus:ring-2 focus:ring-indigo-200";

/// Minimum password length enforced by the client for early UX feedback.
const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone)]
/// Captures form input for the async action without borrowing signals.
struct RegisterInput {
    first_name: String,
    last_name: String,
    email: String,
    role: Role,
    password: String,
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let session = use_session();
    let machine = session.machine.clone();
    let session_for_nav = session.clone();

    let (first_name, set_first_name) = signal(String::new());
    let (last_name, set_last_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (role, set_role) = signal(Role::Teacher);
    let (password, set_password) = signal(String::new());
    let (confirm_password, set_confirm_password) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(None);
    let (awaiting_confirmation, set_awaiting_confirmation) = signal(false);

    let register_action = Action::new_local(move |input: &RegisterInput| {
        let machine = machine.clone();
        let input = input.clone();
        async move {
            machine
                .sign_up(NewAccount {
                    email: input.email,
                    password: SecretString::from(input.password),
                    role: input.role,
                    first_name: Some(input.first_name),
                    last_name: Some(input.last_name),
                })
                .await
        }
    });

    let navigate = use_navigate();
    Effect::new(move |_| {
        if let Some(result) = register_action.value().get() {
            match result {
                Ok(registration) if registration.requires_email_confirmation => {
                    set_awaiting_confirmation.set(true);
                }
                Ok(_) => navigate(session_for_nav.landing_path(), Default::default()),
                Err(err) => set_error.set(Some(format_error(&err))),
            }
        }
    });

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);

        let first_name_value = first_name.get_untracked().trim().to_string();
        let last_name_value = last_name.get_untracked().trim().to_string();
        let email_value = email.get_untracked().trim().to_string();
        let password_value = password.get_untracked();
        let confirm_value = confirm_password.get_untracked();

        if first_name_value.is_empty()
            || last_name_value.is_empty()
            || email_value.is_empty()
            || password_value.trim().is_empty()
            || confirm_value.trim().is_empty()
        {
            set_error.set(Some("All fields are required.".to_string()));
            return;
        }

        if !email_value.contains('@') {
            set_error.set(Some("Email address looks invalid.".to_string()));
            return;
        }

        if password_value != confirm_value {
            set_error.set(Some("Passwords do not match.".to_string()));
            return;
        }

        if password_value.trim().len() < MIN_PASSWORD_LENGTH {
            set_error.set(Some(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters."
            )));
            return;
        }

        register_action.dispatch(RegisterInput {
            first_name: first_name_value,
            last_name: last_name_value,
            email: email_value,
            role: role.get_untracked(),
            password: password_value,
        });
    };

    view! {
        <AppShell>
            <Show
                when=move || awaiting_confirmation.get()
                fallback=move || {
                    view! {
                        <form class="max-w-md mx-auto" on:submit=on_submit>
                            <h1 class="mb-6 text-2xl font-semibold text-gray-900">
                                "Create account"
                            </h1>
                            <div class="grid grid-cols-1 sm:grid-cols-2 gap-4 mb-5">
                                <div>
                                    <label
                                        class="block mb-2 text-sm font-medium text-gray-900"
                                        for="first_name"
                                    >
                                        "First name"
                                    </label>
                                    <input
                                        id="first_name"
                                        type="text"
                                        class=INPUT
                                        autocomplete="given-name"
                                        required
                                        on:input=move |event| {
                                            set_first_name.set(event_target_value(&event));
                                        }
                                    />
                                </div>
                                <div>
                                    <label
                                        class="block mb-2 text-sm font-medium text-gray-900"
                                        for="last_name"
                                    >
                                        "Last name"
                                    </label>
                                    <input
                                        id="last_name"
                                        type="text"
                                        class=INPUT
                                        autocomplete="family-name"
                                        required
                                        on:input=move |event| {
                                            set_last_name.set(event_target_value(&event));
                                        }
                                    />
                                </div>
                            </div>
                            <div class="mb-5">
                                <label
                                    class="block mb-2 text-sm font-medium text-gray-900"
                                    for="email"
                                >
                                    "Email"
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
                                <label
                                    class="block mb-2 text-sm font-medium text-gray-900"
                                    for="role"
                                >
                                    "Role"
                                </label>
                                <select
                                    id="role"
                                    class=INPUT
                                    on:change=move |event| {
                                        set_role
                                            .set(
                                                event_target_value(&event)
                                                    .parse()
                                                    .unwrap_or(Role::Teacher),
                                            );
                                    }
                                >
                                    {Role::ALL
                                        .iter()
                                        .map(|option| {
                                            view! {
                                                <option
                                                    value=option.as_str()
                                                    selected=*option == Role::Teacher
                                                >
                                                    {option.label()}
                                                </option>
                                            }
                                        })
                                        .collect_view()}
                                </select>
                            </div>
                            <div class="mb-5">
                                <label
                                    class="block mb-2 text-sm font-medium text-gray-900"
                                    for="password"
                                >
                                    "Password"
                                </label>
                                <input
                                    id="password"
                                    type="password"
                                    class=INPUT
                                    autocomplete="new-password"
                                    required
                                    on:input=move |event| {
                                        set_password.set(event_target_value(&event));
                                    }
                                />
                            </div>
                            <div class="mb-5">
                                <label
                                    class="block mb-2 text-sm font-medium text-gray-900"
                                    for="confirm_password"
                                >
                                    "Confirm password"
                                </label>
                                <input
                                    id="confirm_password"
                                    type="password"
                                    class=INPUT
                                    autocomplete="new-password"
                                    required
                                    on:input=move |event| {
                                        set_confirm_password.set(event_target_value(&event));
                                    }
                                />
                            </div>
                            <Button button_type="submit" disabled=register_action.pending()>
                                "Create account"
                            </Button>
                            {move || {
                                register_action
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
                    }
                }
            >
                <div class="max-w-md mx-auto text-center space-y-4 py-8">
                    <h1 class="text-2xl font-semibold text-gray-900">
                        "Check your email"
                    </h1>
                    <p class="text-gray-500">
                        "We sent a confirmation link to "
                        <span class="font-medium text-gray-900">
                            {move || email.get()}
                        </span>
                        ". Confirm your address, then sign in."
                    </p>
                    <A
                        href="/login"
                        {..}
                        class="inline-flex items-center px-5 py-2.5 text-sm font-medium text-white bg-indigo-600 rounded-lg hover:bg-indigo-700"
                    >
                        "Back to sign in"
                    </A>
                </div>
            </Show>
        </AppShell>
    }
}

/// Maps sign-up failures to user-facing strings. A provisioned account
/// with a failed profile write gets its own wording so the user knows the
/// account exists.
fn format_error(err: &SessionError) -> String {
    match err {
        SessionError::ProfileCreation { .. } => {
            "Your account was created, but its profile could not be saved. Sign in and finish setup from Settings.".to_string()
        }
        other => other.to_string(),
    }
}
