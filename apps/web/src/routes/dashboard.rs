//! Authenticated dashboard: stats row plus the recent-reports table.
//! Teachers see only their own filings; the administrative tier sees
//! every report. The dropdowns narrow the table without touching the
//! stats, which always describe the viewer's full set.

use auth_session::{target_route_for, Route};
use backend_client::{ReportStatus, INCIDENT_TYPES};
use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::{Alert, AlertKind, AppShell, Spinner, StatCard, StatusBadge};
use crate::features::auth::state::use_session;
use crate::features::auth::RequireAuth;
use crate::features::reports::{filters, stats};

const SELECT: &str = "rounded-lg border border-gray-300 bg-white px-3 py-2 text-sm text-gray-900 focus:border-indigo-400 focus:ring-2 focus:ring-indigo-200";

#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = use_session();
    let state = session.state;
    let role = session.role;

    let backend = session.backend.clone();
    let reports = LocalResource::new(move || {
        let backend = backend.clone();
        async move { backend.list_reports().await }
    });

    let viewer_id = Signal::derive(move || {
        state
            .get()
            .user
            .map(|user| user.id)
            .unwrap_or_default()
    });
    let admin_tier = Signal::derive(move || target_route_for(role.get()) == Route::AdminHome);

    let (status_filter, set_status_filter) = signal::<Option<ReportStatus>>(None);
    let (type_filter, set_type_filter) = signal::<Option<String>>(None);

    // The viewer's full set drives the stats; the dropdowns only narrow
    // the table below them.
    let mine = Signal::derive(move || match reports.get() {
        Some(Ok(list)) => filters::for_viewer(&list, &viewer_id.get(), admin_tier.get()),
        _ => Vec::new(),
    });
    let visible = Signal::derive(move || {
        filters::narrow(&mine.get(), status_filter.get(), type_filter.get().as_deref())
    });

    let cutoff = stats::seven_day_cutoff();
    let totals = Signal::derive(move || stats::summarize(&mine.get(), &cutoff));
    let total_count = Signal::derive(move || totals.get().total);
    let recent_count = Signal::derive(move || totals.get().recent);
    let pending_count = Signal::derive(move || totals.get().pending);

    view! {
        <AppShell>
            <RequireAuth children=move || view! {
                <div class="space-y-6">
                    <div class="flex items-center justify-between">
                        <div class="space-y-1">
                            <h1 class="text-2xl font-semibold text-gray-900">"Dashboard"</h1>
                            <p class="text-sm text-gray-500">
                                "Incident reports across your school."
                            </p>
                        </div>
                        <A
                            href="/new-report"
                            {..}
                            class="inline-flex items-center px-4 py-2.5 text-sm font-medium text-white bg-indigo-600 rounded-lg hover:bg-indigo-700"
                        >
                            "New Report"
                        </A>
                    </div>

                    <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                        <StatCard
                            title="Total Reports"
                            value=total_count
                            caption="Incident reports filed"
                        />
                        <StatCard
                            title="Recent Reports"
                            value=recent_count
                            caption="In the last 7 days"
                        />
                        <StatCard
                            title="Pending Review"
                            value=pending_count
                            caption="Reports awaiting review"
                        />
                    </div>

                    <div class="overflow-hidden bg-white shadow-sm border border-gray-200 rounded-lg">
                        <div class="flex flex-col sm:flex-row justify-between items-start sm:items-center gap-4 px-6 py-4 border-b border-gray-200">
                            <h2 class="text-lg font-medium text-gray-900">"Recent Reports"</h2>
                            <div class="flex gap-3">
                                <select
                                    class=SELECT
                                    on:change=move |event| {
                                        let value = event_target_value(&event);
                                        set_status_filter
                                            .set(
                                                ReportStatus::ALL
                                                    .iter()
                                                    .find(|status| status.as_str() == value)
                                                    .copied(),
                                            );
                                    }
                                >
                                    <option value="all" selected=true>"All Reports"</option>
                                    {ReportStatus::ALL
                                        .iter()
                                        .map(|status| {
                                            view! {
                                                <option value=status.as_str()>{status.label()}</option>
                                            }
                                        })
                                        .collect_view()}
                                </select>
                                <select
                                    class=SELECT
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
                                        "Student(s)"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Class"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Type"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Status"
                                    </th>
                                </tr>
                            </thead>
                            <tbody class="divide-y divide-gray-200">
                                <Suspense fallback=move || view! {
                                    <tr>
                                        <td colspan="5" class="px-6 py-12 text-center">
                                            <Spinner />
                                        </td>
                                    </tr>
                                }>
                                    {move || match reports.get() {
                                        Some(Ok(_)) if visible.get().is_empty() => {
                                            view! {
                                                <tr>
                                                    <td colspan="5" class="px-6 py-12 text-center text-sm text-gray-500">
                                                        "No reports yet. Click \"New Report\" to create one."
                                                    </td>
                                                </tr>
                                            }.into_any()
                                        }
                                        Some(Ok(_)) => {
                                            view! {
                                                <For
                                                    each=move || visible.get()
                                                    key=|report| report.id
                                                    children=|report| {
                                                        view! {
                                                            <tr class="hover:bg-gray-50 transition-colors">
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500">
                                                                    {report.incident_date.clone()}
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm font-medium text-gray-900">
                                                                    {report.student_names.clone()}
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500">
                                                                    {report.class_name.clone()}
                                                                </td>
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500">
                                                                    {report.incident_type.clone()}
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
                                                    <td colspan="5" class="px-6 py-4">
                                                        <Alert kind=AlertKind::Error message=err.to_string() />
                                                    </td>
                                                </tr>
                                            }.into_any()
                                        }
                                        None => view! {
                                            <tr>
                                                <td colspan="5" class="px-6 py-12 text-center">
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
