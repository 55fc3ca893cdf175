//! Incident history for a single student, filterable by date range and
//! incident type. The filters are pushed down to the backend query rather
//! than applied in the view, and the page prints through the browser
//! dialog.

use backend_client::{BackendError, ReportFilters, INCIDENT_TYPES};
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params;
use leptos_router::params::Params;

use crate::components::{Alert, AlertKind, AppShell, Spinner, StatusBadge};
use crate::features::auth::state::use_session;
use crate::features::auth::RequireAdmin;

const FIELD: &str = "rounded-lg border border-gray-300 bg-white px-3 py-2 text-sm text-gray-900 focus:border-indigo-400 focus:ring-2 focus:ring-indigo-200";

#[derive(Params, PartialEq, Clone)]
struct StudentParams {
    id: Option<String>,
}

#[component]
pub fn StudentReportsPage() -> impl IntoView {
    let session = use_session();

    let params = use_params::<StudentParams>();
    let student_id = Signal::derive(move || {
        params
            .get()
            .ok()
            .and_then(|params| params.id)
            .and_then(|raw| raw.parse::<i64>().ok())
    });

    let (from_date, set_from_date) = signal(String::new());
    let (to_date, set_to_date) = signal(String::new());
    let (type_filter, set_type_filter) = signal::<Option<String>>(None);

    let backend_for_student = session.backend.clone();
    let student = LocalResource::new(move || {
        let backend = backend_for_student.clone();
        let id = student_id.get();
        async move {
            match id {
                Some(id) => backend.fetch_student(id).await,
                None => Err(BackendError::Validation("Invalid student id.".to_string())),
            }
        }
    });

    let backend_for_reports = session.backend.clone();
    let reports = LocalResource::new(move || {
        let backend = backend_for_reports.clone();
        let id = student_id.get();
        let filters = ReportFilters {
            from_date: non_empty(from_date.get()),
            to_date: non_empty(to_date.get()),
            incident_type: type_filter.get(),
        };
        async move {
            match id {
                Some(id) => backend.reports_for_student(id, &filters).await,
                None => Err(BackendError::Validation("Invalid student id.".to_string())),
            }
        }
    });

    let params_for_effect = params;
    Effect::new(move |_| {
        let _ = params_for_effect.get();
        student.refetch();
        reports.refetch();
    });

    let on_print = move |_| {
        if let Some(window) = web_sys::window() {
            let _ = window.print();
        }
    };

    view! {
        <AppShell>
            <RequireAdmin children=move || view! {
                <div class="space-y-6">
                    <div class="flex items-center justify-between print:hidden">
                        <div class="flex items-center gap-4">
                            <A
                                href="/students"
                                {..}
                                class="inline-flex items-center px-3 py-2 text-sm font-medium text-gray-700 bg-white border border-gray-300 rounded-lg hover:bg-gray-50"
                            >
                                "Back to Students"
                            </A>
                            <h1 class="text-2xl font-semibold text-gray-900">
                                {move || match student.get() {
                                    Some(Ok(Some(student))) => format!(
                                        "Reports for {} - Grade {}",
                                        student.name, student.grade
                                    ),
                                    Some(Ok(None)) => "Student not found".to_string(),
                                    _ => "Student Reports".to_string(),
                                }}
                            </h1>
                        </div>
                        <button
                            type="button"
                            class="inline-flex items-center px-4 py-2.5 text-sm font-medium text-gray-700 bg-white border border-gray-300 rounded-lg hover:bg-gray-50"
                            on:click=on_print
                        >
                            "Print"
                        </button>
                    </div>

                    {move || {
                        student
                            .get()
                            .and_then(Result::err)
                            .map(|err| {
                                view! { <Alert kind=AlertKind::Error message=err.to_string() /> }
                            })
                    }}

                    <div class="overflow-hidden bg-white shadow-sm border border-gray-200 rounded-lg">
                        <div class="flex flex-col sm:flex-row gap-3 px-6 py-4 border-b border-gray-200 print:hidden">
                            <div>
                                <label class="block mb-1 text-xs font-medium text-gray-500" for="from_date">
                                    "From"
                                </label>
                                <input
                                    id="from_date"
                                    type="date"
                                    class=FIELD
                                    on:input=move |event| {
                                        set_from_date.set(event_target_value(&event));
                                    }
                                />
                            </div>
                            <div>
                                <label class="block mb-1 text-xs font-medium text-gray-500" for="to_date">
                                    "To"
                                </label>
                                <input
                                    id="to_date"
                                    type="date"
                                    class=FIELD
                                    on:input=move |event| {
                                        set_to_date.set(event_target_value(&event));
                                    }
                                />
                            </div>
                            <div>
                                <label class="block mb-1 text-xs font-medium text-gray-500" for="type_filter">
                                    "Type"
                                </label>
                                <select
                                    id="type_filter"
                                    class=FIELD
                                    on:change=move |event| {
                                        let value = event_target_value(&event);
                                        set_type_filter.set((value != "all").then_some(value));
                                    }
                                >
                                    <option value="all" selected=true>"All Types"</option>
                                    {INCIDENT_TYPES
                                        .iter()
                                        .map(|kind| view! { <option value=*kind>{*kind}</option> })
                                        .collect_view()}
                                </select>
                            </div>
                        </div>
                        <table class="min-w-full divide-y divide-gray-200">
                            <thead class="bg-gray-50">
                                <tr>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Date"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Type"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Class"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Description"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Evidence"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Status"
                                    </th>
                                </tr>
                            </thead>
                            <tbody class="divide-y divide-gray-200">
                                <Suspense fallback=move || view! {
                                    <tr>
                                        <td colspan="6" class="px-6 py-12 text-center">
                                            <Spinner />
                                        </td>
                                    </tr>
                                }>
                                    {move || match reports.get() {
                                        Some(Ok(list)) if list.is_empty() => {
                                            view! {
                                                <tr>
                                                    <td colspan="6" class="px-6 py-12 text-center text-sm text-gray-500">
                                                        "No reports found for this student."
                                                    </td>
                                                </tr>
                                            }.into_any()
                                        }
                                        Some(Ok(list)) => {
                                            view! {
                                                <For
                                                    each=move || list.clone()
                                                    key=|report| report.id
                                                    children=|report| {
                                                        let evidence = report.evidence_url.clone();
                                                        view! {
                                                            <tr class="hover:bg-gray-50 transition-colors">
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500">
                                                                    {report.incident_date.clone()}
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500">
                                                                    {report.incident_type.clone()}
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500">
                                                                    {report.class_name.clone()}
                                                                </td>
                                                                <td class="px-6 py-4 text-sm text-gray-900">
                                                                    {report.description.clone()}
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm">
                                                                    {match evidence {
                                                                        Some(url) => view! {
                                                                            <a
                                                                                href=url
                                                                                target="_blank"
                                                                                rel="noopener"
                                                                                class="text-indigo-600 hover:text-indigo-800"
                                                                            >
                                                                                "View"
                                                                            </a>
                                                                        }.into_any(),
                                                                        None => view! {
                                                                            <span class="text-gray-400">"-"</span>
                                                                        }.into_any(),
                                                                    }}
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap">
                                                                    <StatusBadge status=report.status />
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
                                                    <td colspan="6" class="px-6 py-4">
                                                        <Alert kind=AlertKind::Error message=err.to_string() />
                                                    </td>
                                                </tr>
                                            }.into_any()
                                        }
                                        None => view! {
                                            <tr>
                                                <td colspan="6" class="px-6 py-12 text-center">
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

fn non_empty(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}
