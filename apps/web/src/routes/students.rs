//! Student roster for the administrative tier: the list with incident
//! counts plus an inline enrollment form. Each enrollment refetches the
//! roster so the counts stay honest.

use backend_client::NewStudent;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::{Alert, AlertKind, AppShell, Button, Spinner};
use crate::features::auth::state::use_session;
use crate::features::auth::RequireAdmin;
use crate::routes::paths;

const INPUT: &str = "w-full rounded-lg border border-gray-300 bg-white px-3 py-2.5 text-sm text-gray-900 focus:border-indigo-400 focus:ring-2 focus:ring-indigo-200";

#[component]
pub fn StudentsPage() -> impl IntoView {
    let session = use_session();

    let backend = session.backend.clone();
    let students = LocalResource::new(move || {
        let backend = backend.clone();
        async move { backend.list_students().await }
    });

    let (name, set_name) = signal(String::new());
    let (grade, set_grade) = signal(String::new());
    let (adding, set_adding) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);

    let backend_for_enroll = session.backend.clone();
    let enroll_action = Action::new_local(move |student: &NewStudent| {
        let backend = backend_for_enroll.clone();
        let student = student.clone();
        async move { backend.enroll_student(&student).await }
    });

    Effect::new(move |_| {
        if let Some(result) = enroll_action.value().get() {
            match result {
                Ok(()) => {
                    set_name.set(String::new());
                    set_grade.set(String::new());
                    set_adding.set(false);
                    students.refetch();
                }
                Err(err) => set_error.set(Some(err.to_string())),
            }
        }
    });

    let on_enroll = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);

        let name_value = name.get_untracked().trim().to_string();
        let grade_value = grade.get_untracked().trim().to_string();
        if name_value.is_empty() || grade_value.is_empty() {
            set_error.set(Some("Name and grade are required.".to_string()));
            return;
        }

        enroll_action.dispatch(NewStudent {
            name: name_value,
            grade: grade_value,
        });
    };

    view! {
        <AppShell>
            <RequireAdmin children=move || view! {
                <div class="space-y-6">
                    <div class="flex items-center justify-between">
                        <div class="space-y-1">
                            <h1 class="text-2xl font-semibold text-gray-900">
                                "Student Management"
                            </h1>
                            <p class="text-sm text-gray-500">
                                "Enrolled students and their incident history."
                            </p>
                        </div>
                        <button
                            type="button"
                            class="inline-flex items-center px-4 py-2.5 text-sm font-medium text-white bg-indigo-600 rounded-lg hover:bg-indigo-700"
                            on:click=move |_| set_adding.update(|open| *open = !*open)
                        >
                            "Add Student"
                        </button>
                    </div>

                    <Show when=move || adding.get()>
                        <form
                            class="bg-white shadow-sm border border-gray-200 rounded-lg p-6 space-y-4"
                            on:submit=on_enroll
                        >
                            <h2 class="text-lg font-medium text-gray-900">"Add New Student"</h2>
                            <div class="grid grid-cols-1 sm:grid-cols-2 gap-4">
                                <div>
                                    <label
                                        class="block mb-2 text-sm font-medium text-gray-900"
                                        for="name"
                                    >
                                        "Name"
                                    </label>
                                    <input
                                        id="name"
                                        type="text"
                                        class=INPUT
                                        prop:value=move || name.get()
                                        on:input=move |event| {
                                            set_name.set(event_target_value(&event));
                                        }
                                    />
                                </div>
                                <div>
                                    <label
                                        class="block mb-2 text-sm font-medium text-gray-900"
                                        for="grade"
                                    >
                                        "Grade"
                                    </label>
                                    <input
                                        id="grade"
                                        type="text"
                                        class=INPUT
                                        placeholder="5B"
                                        prop:value=move || grade.get()
                                        on:input=move |event| {
                                            set_grade.set(event_target_value(&event));
                                        }
                                    />
                                </div>
                            </div>
                            <Button button_type="submit" disabled=enroll_action.pending()>
                                "Add Student"
                            </Button>
                            {move || {
                                error
                                    .get()
                                    .map(|message| {
                                        view! { <Alert kind=AlertKind::Error message=message /> }
                                    })
                            }}
                        </form>
                    </Show>

                    <div class="overflow-hidden bg-white shadow-sm border border-gray-200 rounded-lg">
                        <table class="min-w-full divide-y divide-gray-200">
                            <thead class="bg-gray-50">
                                <tr>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Name"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Grade"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Incident Reports"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-right text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Actions"
                                    </th>
                                </tr>
                            </thead>
                            <tbody class="divide-y divide-gray-200">
                                <Suspense fallback=move || view! {
                                    <tr>
                                        <td colspan="4" class="px-6 py-12 text-center">
                                            <Spinner />
                                        </td>
                                    </tr>
                                }>
                                    {move || match students.get() {
                                        Some(Ok(list)) if list.is_empty() => {
                                            view! {
                                                <tr>
                                                    <td colspan="4" class="px-6 py-12 text-center text-sm text-gray-500">
                                                        "No students found. Add your first student!"
                                                    </td>
                                                </tr>
                                            }.into_any()
                                        }
                                        Some(Ok(list)) => {
                                            view! {
                                                <For
                                                    each=move || list.clone()
                                                    key=|student| student.id
                                                    children=|student| {
                                                        view! {
                                                            <tr class="hover:bg-gray-50 transition-colors">
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm font-medium text-gray-900">
                                                                    <A
                                                                        href=paths::student_reports(student.id)
                                                                        {..}
                                                                        class="text-indigo-600 hover:text-indigo-800"
                                                                    >
                                                                        {student.name.clone()}
                                                                    </A>
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500">
                                                                    {student.grade.clone()}
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500">
                                                                    {student.incident_count}
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap text-right text-sm font-medium">
                                                                    <A
                                                                        href=paths::student_reports(student.id)
                                                                        {..}
                                                                        class="text-indigo-600 hover:text-indigo-800"
                                                                    >
                                                                        "View Reports"
                                                                    </A>
                                                                </td>
                                                            </tr>
                                                        }
                                                    }
                                                />
                                            }.into_any()
                                        }
                                        Some(Err(err)) => {
                                            view! {
                                                <tr>
                                                    <td colspan="4" class="px-6 py-4">
                                                        <Alert kind=AlertKind::Error message=err.to_string() />
                                                    </td>
                                                </tr>
                                            }.into_any()
                                        }
                                        None => view! {
                                            <tr>
                                                <td colspan="4" class="px-6 py-12 text-center">
                                                    <Spinner />
                                                </td>
                                            </tr>
                                        }.into_any(),
                                    }}
                                </Suspense>
                            </tbody>
                        </table>
                    </div>
                </div>
            } />
        </AppShell>
    }
}
