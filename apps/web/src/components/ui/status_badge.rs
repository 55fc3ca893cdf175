use backend_client::ReportStatus;
use leptos::prelude::*;

/// Colored pill for a report review status.
#[component]
pub fn StatusBadge(status: ReportStatus) -> impl IntoView {
    let colors = match status {
        ReportStatus::Pending => "bg-yellow-100 text-yellow-800",
        ReportStatus::Approved => "bg-green-100 text-green-800",
        ReportStatus::Rejected => "bg-red-100 text-red-800",
    };

    view! {
        <span class=format!("inline-flex px-2 py-1 rounded-full text-xs font-medium {colors}")>
            {status.label()}
        </span>
    }
}
