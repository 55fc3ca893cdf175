//! Account settings: name editing against the profile row and an explicit
//! sign-out. A saved edit refreshes the shared session snapshot so the
//! shell picks up the new display name without a reload.

use auth_session::ProfileChanges;
use backend_client::BackendError;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

use crate::components::{Alert, AlertKind, AppShell, Button, Spinner};
use crate::features::auth::state::use_session;
use crate::features::auth::RequireAuth;

const INPUT: &str = "w-full rounded-lg border border-gray-300 bg-white px-3 py-2.5 text-sm text-gray-900 focus:border-indigo-400 focus:ring-2 focus:ring-indigo-200";

#[derive(Clone)]
struct SaveInput {
    first_name: String,
    last_name: String,
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let session = use_session();
    let state = session.state;

    let (first_name, set_first_name) = signal(String::new());
    let (last_name, set_last_name) = signal(String::new());
    let (seeded, set_seeded) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);
    let (saved, set_saved) = signal(false);

    // Seed the inputs once the profile is available; later edits belong to
    // the user and must not be clobbered by snapshot updates.
    Effect::new(move |_| {
        if seeded.get() {
            return;
        }
        if let Some(profile) = state.get().profile {
            set_first_name.set(profile.first_name.unwrap_or_default());
            set_last_name.set(profile.last_name.unwrap_or_default());
            set_seeded.set(true);
        }
    });

    let machine_for_save = session.machine.clone();
    let backend_for_save = session.backend.clone();
    let save_action = Action::new_local(move |input: &SaveInput| {
        let machine = machine_for_save.clone();
        let backend = backend_for_save.clone();
        let input = input.clone();
        async move {
            let Some(user) = machine.snapshot().user else {
                return Err(BackendError::Validation(
                    "Your session has expired. Sign in again.".to_string(),
                ));
            };
            backend
                .update_profile_row(
                    &user.id,
                    &ProfileChanges {
                        role: None,
                        first_name: Some(input.first_name),
                        last_name: Some(input.last_name),
                    },
                )
                .await?;
            if !machine.refresh_profile(&user.id).await {
                tracing::warn!(user_id = %user.id, "profile refresh after save failed");
            }
            Ok(())
        }
    });

    Effect::new(move |_| {
        if let Some(result) = save_action.value().get() {
            match result {
                Ok(()) => set_saved.set(true),
                Err(err) => set_error.set(Some(err.to_string())),
            }
        }
    });

    let on_save = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);
        set_saved.set(false);

        save_action.dispatch(SaveInput {
            first_name: first_name.get_untracked().trim().to_string(),
            last_name: last_name.get_untracked().trim().to_string(),
        });
    };

    let machine_for_sign_out = session.machine.clone();
    let navigate = use_navigate();
    let on_sign_out = move |_| {
        let machine = machine_for_sign_out.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            if let Err(err) = machine.sign_out().await {
                tracing::warn!(error = %err, "sign-out failed");
            }
            navigate("/login", Default::default());
        });
    };

    view! {
        <AppShell>
            <RequireAuth children=move || view! {
                <div class="max-w-xl mx-auto space-y-6">
                    <h1 class="text-2xl font-semibold text-gray-900">"Settings"</h1>

                    <form
                        class="bg-white shadow-sm border border-gray-200 rounded-lg p-6 space-y-4"
                        on:submit=on_save
                    >
                        <h2 class="text-lg font-medium text-gray-900">"Profile"</h2>
                        <p class="text-sm text-gray-500">
                            {move || {
                                state
                                    .get()
                                    .user
                                    .map(|user| user.email)
                                    .unwrap_or_default()
                            }}
                        </p>
                        <div class="grid grid-cols-1 sm:grid-cols-2 gap-4">
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
                                    prop:value=move || first_name.get()
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
                                    prop:value=move || last_name.get()
                                    on:input=move |event| {
                                        set_last_name.set(event_target_value(&event));
                                    }
                                />
                            </div>
                        </div>
                        <Button button_type="submit" disabled=save_action.pending()>
                            "Save changes"
                        </Button>
                        {move || {
                            save_action
                                .pending()
                                .get()
                                .then_some(view! { <Spinner /> })
                        }}
                        {move || {
                            saved
                                .get()
                                .then_some(view! {
                                    <Alert
                                        kind=AlertKind::Success
                                        message="Profile updated.".to_string()
                                    />
                                })
                        }}
                        {move || {
                            error
                                .get()
                                .map(|message| {
                                    view! { <Alert kind=AlertKind::Error message=message /> }
                                })
                        }}
                    </form>

                    <div class="bg-white shadow-sm border border-gray-200 rounded-lg p-6 space-y-4">
                        <h2 class="text-lg font-medium text-gray-900">"Session"</h2>
                        <p class="text-sm text-gray-500">
                            "Sign out of this browser. Your reports stay where they are."
                        </p>
                        <button
                            type="button"
                            class="px-4 py-2.5 text-sm font-medium text-red-700 bg-red-50 border border-red-200 rounded-lg hover:bg-red-100"
                            on:click=on_sign_out.clone()
                        >
                            "Sign out"
                        </button>
                    </div>
                </div>
            } />
        </AppShell>
    }
}
