//! Shared layout wrapper with the role-aware navigation bar. It centralizes
//! header markup and the mobile menu toggle so routes can focus on content.
//! Navigation visibility is a convenience only; the guards and the backend
//! enforce access.

use auth_session::{Route, target_route_for};
use leptos::{prelude::*, task::spawn_local};
use leptos_router::{components::A, hooks::use_navigate};

use crate::app_lib::build_info;
use crate::features::auth::state::use_session;

const NAV_LINK: &str = "block py-2 px-3 text-gray-700 rounded hover:bg-gray-100 md:hover:bg-transparent md:border-0 md:hover:text-indigo-700 md:p-0";

/// Wraps routes with a header, main content container, and footer.
#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    let (menu_open, set_menu_open) = signal(false);
    let toggle_menu = move |_| {
        set_menu_open.update(|open| *open = !*open);
    };

    let session = use_session();
    let state = session.state;
    let is_authenticated = session.is_authenticated;
    let role = session.role;
    let machine = session.machine.clone();

    let is_admin_tier = Signal::derive(move || target_route_for(role.get()) == Route::AdminHome);
    let display_name = Signal::derive(move || {
        let snapshot = state.get();
        snapshot
            .profile
            .as_ref()
            .map(|profile| profile.display_name())
            .or_else(|| snapshot.user.as_ref().map(|user| user.email.clone()))
            .unwrap_or_default()
    });

    let navigate = use_navigate();
    let on_sign_out = move |_| {
        let machine = machine.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            if let Err(err) = machine.sign_out().await {
                tracing::warn!(error = %err, "sign-out reported an error");
            }
            navigate(Route::Login.path(), Default::default());
        });
        set_menu_open.set(false);
    };

    view! {
        <div class="min-h-screen flex flex-col bg-gray-50">
            <header class="border-b border-gray-200 bg-white">
                <div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4">
                    <A
                        href="/"
                        {..}
                        class="flex items-center space-x-3"
                        on:click=move |_| set_menu_open.set(false)
                    >
                        <span class="text-xl font-semibold whitespace-nowrap text-indigo-700">
                            "Registro"
                        </span>
                    </A>
                    <button
                        type="button"
                        class="inline-flex items-center p-2 w-10 h-10 justify-center text-sm text-gray-500 rounded-lg md:hidden hover:bg-gray-100 focus:outline-none focus:ring-2 focus:ring-gray-200"
                        aria-controls="navbar-default"
                        aria-expanded=move || menu_open.get().to_string()
                        on:click=toggle_menu
                    >
                        <span class="sr-only">"Open main menu"</span>
                        <svg
                            class="w-5 h-5"
                            aria-hidden="true"
                            xmlns="http://www.w3.org/2000/svg"
                            fill="none"
                            viewBox="0 0 17 14"
                        >
                            <path
                                stroke="currentColor"
                                stroke-linecap="round"
                                stroke-linejoin="round"
                                stroke-width="2"
                                d="M1 1h15M1 7h15M1 13h15"
                            ></path>
                        </svg>
                    </button>
                    <div
                        id="navbar-default"
                        class="w-full md:block md:w-auto"
                        class:hidden=move || !menu_open.get()
                    >
                        <ul class="font-medium flex flex-col items-start md:items-center p-4 md:p-0 mt-4 border border-gray-100 rounded-lg bg-gray-50 md:flex-row md:space-x-6 md:mt-0 md:border-0 md:bg-white">
                            <Show
                                when=move || is_authenticated.get()
                                fallback=move || {
                                    view! {
                                        <li>
                                            <A
                                                href=Route::Login.path()
                                                {..}
                                                class=NAV_LINK
                                                on:click=move |_| set_menu_open.set(false)
                                            >
                                                "Sign In"
                                            </A>
                                        </li>
                                        <li>
                                            <A
                                                href="/register"
                                                {..}
                                                class=NAV_LINK
                                                on:click=move |_| set_menu_open.set(false)
                                            >
                                                "Sign Up"
                                            </A>
                                        </li>
                                    }
                                }
                            >
                                <li>
                                    <A
                                        href=Route::Dashboard.path()
                                        {..}
                                        class=NAV_LINK
                                        on:click=move |_| set_menu_open.set(false)
                                    >
                                        "Dashboard"
                                    </A>
                                </li>
                                <li>
                                    <A
                                        href="/new-report"
                                        {..}
                                        class=NAV_LINK
                                        on:click=move |_| set_menu_open.set(false)
                                    >
                                        "New Report"
                                    </A>
                                </li>
                                <Show when=move || is_admin_tier.get()>
                                    <li>
                                        <A
                                            href=Route::AdminHome.path()
                                            {..}
                                            class=NAV_LINK
                                            on:click=move |_| set_menu_open.set(false)
                                        >
                                            "Admin"
                                        </A>
                                    </li>
                                    <li>
                                        <A
                                            href="/students"
                                            {..}
                                            class=NAV_LINK
                                            on:click=move |_| set_menu_open.set(false)
                                        >
                                            "Students"
                                        </A>
                                    </li>
                                </Show>
                                <li>
                                    <A
                                        href="/settings"
                                        {..}
                                        class=NAV_LINK
                                        on:click=move |_| set_menu_open.set(false)
                                    >
                                        "Settings"
                                    </A>
                                </li>
                                <li class="md:ml-2 text-sm text-gray-400">
                                    {move || display_name.get()}
                                </li>
                                <li>
                                    <button
                                        type="button"
                                        class="block py-2 px-3 text-gray-700 rounded hover:bg-gray-100 md:hover:bg-transparent md:border-0 md:hover:text-red-600 md:p-0"
                                        on:click=on_sign_out.clone()
                                    >
                                        "Sign Out"
                                    </button>
                                </li>
                            </Show>
                        </ul>
                    </div>
                </div>
            </header>
            <main class="flex-1">
                <div class="container mx-auto p-4 mt-6">
                    {children()}
                </div>
            </main>
            <footer class="border-t border-gray-200 py-4 text-center text-xs text-gray-400">
                {format!(
                    "Registro v{} ({})",
                    env!("CARGO_PKG_VERSION"),
                    build_info::short_commit()
                )}
            </footer>
        </div>
    }
}
