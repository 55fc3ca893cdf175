//! Public landing page. Nothing is fetched here.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::AppShell;
use crate::features::auth::state::use_session;

#[component]
pub fn IndexPage() -> impl IntoView {
    let session = use_session();
    let is_authenticated = session.is_authenticated;

    view! {
        <AppShell>
            <div class="max-w-2xl mx-auto text-center py-16 space-y-6">
                <h1 class="text-4xl font-bold text-gray-900">
                    "School Incident Reporting"
                </h1>
                <p class="text-lg text-gray-500">
                    "File, review, and follow up on student incident reports in one place."
                </p>
                <div class="flex justify-center gap-4">
                    <Show
                        when=move || is_authenticated.get()
                        fallback=move || {
                            view! {
                                <A
                                    href="/login"
                                    {..}
                                    class="inline-flex items-center px-5 py-2.5 text-sm font-medium text-white bg-indigo-600 rounded-lg hover:bg-indigo-700"
                                >
                                    "Sign In"
                                </A>
                                <A
                                    href="/register"
                                    {..}
                                    class="inline-flex items-center px-5 py-2.5 text-sm font-medium text-indigo-700 bg-white border border-indigo-200 rounded-lg hover:bg-indigo-50"
                                >
                                    "Create Account"
                                </A>
                            }
                        }
                    >
                        <A
                            href="/dashboard"
                            {..}
                            class="inline-flex items-center px-5 py-2.5 text-sm font-medium text-white bg-indigo-600 rounded-lg hover:bg-indigo-700"
                        >
                            "Go to Dashboard"
                        </A>
                    </Show>
                </div>
            </div>
        </AppShell>
    }
}
