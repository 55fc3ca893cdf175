//! Review dashboard for the administrative tier. Lists every report and
//! lets admins and principals approve or reject the pending ones; a
//! decision patches the row and refetches the list.

use backend_client::ReportStatus;
use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::{Alert, AlertKind, AppShell, Spinner, StatCard, StatusBadge};
use crate::features::auth::state::use_session;
use crate::features::auth::RequireAdmin;
use crate::features::reports::stats;

#[derive(Clone)]
/// One review decision dispatched from a pending row.
struct ReviewInput {
    report_id: i64,
    status: ReportStatus,
}

#[component]
pub fn AdminPage() -> impl IntoView {
    let session = use_session();

    let backend = session.backend.clone();
    let reports = LocalResource::new(move || {
        let backend = backend.clone();
        async move { backend.list_reports().await }
    });

    let (error, set_error) = signal::<Option<String>>(None);
    // Row currently being decided; its buttons stay disabled until the
    // patch settles.
    let (acting, set_acting) = signal::<Option<i64>>(None);

    let backend_for_review = session.backend.clone();
    let review_action = Action::new_local(move |input: &ReviewInput| {
        let backend = backend_for_review.clone();
        let input = input.clone();
        async move {
            backend
                .set_report_status(input.report_id, input.status)
                .await
        }
    });

    Effect::new(move |_| {
        if let Some(result) = review_action.value().get() {
            set_acting.set(None);
            match result {
                Ok(()) => reports.refetch(),
                Err(err) => set_error.set(Some(err.to_string())),
            }
        }
    });

    let all = Signal::derive(move || match reports.get() {
        Some(Ok(list)) => list,
        _ => Vec::new(),
    });
    let cutoff = stats::seven_day_cutoff();
    let totals = Signal::derive(move || stats::summarize(&all.get(), &cutoff));
    let total_count = Signal::derive(move || totals.get().total);
    let recent_count = Signal::derive(move || totals.get().recent);
    let pending_count = Signal::derive(move || totals.get().pending);

    view! {
        <AppShell>
            <RequireAdmin children=move || view! {
                <div class="space-y-6">
                    <div class="flex items-center justify-between">
                        <div class="space-y-1">
                            <h1 class="text-2xl font-semibold text-gray-900">
                                "Admin Dashboard"
                            </h1>
                            <p class="text-sm text-gray-500">
                                "Review incident reports across the school."
                            </p>
                        </div>
                        <div class="flex gap-3">
                            <A
                                href="/students"
                                {..}
                                class="inline-flex items-center px-4 py-2.5 text-sm font-medium text-gray-700 bg-white border border-gray-300 rounded-lg hover:bg-gray-50"
                            >
                                "Manage Students"
                            </A>
                            <A
                                href="/new-report"
                                {..}
                                class="inline-flex items-center px-4 py-2.5 text-sm font-medium text-white bg-indigo-600 rounded-lg hover:bg-indigo-700"
                            >
                                "New Report"
                            </A>
                        </div>
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

                    {move || {
                        error
                            .get()
                            .map(|message| {
                                view! { <Alert kind=AlertKind::Error message=message /> }
                            })
                    }}

                    <div class="overflow-hidden bg-white shadow-sm border border-gray-200 rounded-lg">
                        <div class="px-6 py-4 border-b border-gray-200">
                            <h2 class="text-lg font-medium text-gray-900">
                                "Incident Reports"
                            </h2>
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
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">
                                        "Actions"
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
                                                        "No reports found."
                                                    </td>
                                                </tr>
                                            }.into_any()
                                        }
                                        Some(Ok(list)) => {
                                            view! {
                                                <For
                                                    each=move || list.clone()
                                                    key=|report| (report.id, report.status)
                                                    children=move |report| {
                                                        let report_id = report.id;
                                                        let row_busy = Signal::derive(move || {
                                                            acting.get() == Some(report_id)
                                                        });
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
                                                                <td class="px-6 py-4 whitespace-nowrap text-sm">
                                                                    {(report.status == ReportStatus::Pending)
                                                                        .then(|| {
                                                                            view! {
                                                                                <div class="flex gap-2">
                                                                                    <button
                                                                                        type="button"
                                                                                        class="px-3 py-1.5 text-xs font-medium text-green-700 bg-green-50 border border-green-200 rounded-lg hover:bg-green-100 disabled:opacity-50"
                                                                                        disabled=row_busy
                                                                                        on:click=move |_| {
                                                                                            set_acting.set(Some(report_id));
                                                                                            review_action.dispatch(ReviewInput {
                                                                                                report_id,
                                                                                                status: ReportStatus::Approved,
                                                                                            });
                                                                                        }
                                                                                    >
                                                                                        "Approve"
                                                                                    </button>
                                                                                    <button
                                                                                        type="button"
                                                                                        class="px-3 py-1.5 text-xs font-medium text-red-700 bg-red-50 border border-red-200 rounded-lg hover:bg-red-100 disabled:opacity-50"
                                                                                        disabled=row_busy
                                                                                        on:click=move |_| {
                                                                                            set_acting.set(Some(report_id));
                                                                                            review_action.dispatch(ReviewInput {
                                                                                                report_id,
                                                                                                status: ReportStatus::Rejected,
                                                                                            });
                                                                                        }
                                                                                    >
                                                                                        "Reject"
                                                                                    </button>
                                                                                </div>
                                                                            }
                                                                        })}
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
