use backend_client::{IncidentReport, ReportStatus};

/// Narrows a report list to what a viewer may see: the administrative tier
/// sees everything, teachers only their own filings. The backend enforces
/// the same rule; this keeps the UI honest when a response carries more.
pub fn for_viewer(
    reports: &[IncidentReport],
    viewer_id: &str,
    admin_tier: bool,
) -> Vec<IncidentReport> {
    reports
        .iter()
        .filter(|report| admin_tier || report.created_by == viewer_id)
        .cloned()
        .collect()
}

/// Applies the dashboard dropdowns. `None` means "all".
pub fn narrow(
    reports: &[IncidentReport],
    status: Option<ReportStatus>,
    incident_type: Option<&str>,
) -> Vec<IncidentReport> {
    reports
        .iter()
        .filter(|report| status.map_or(true, |wanted| report.status == wanted))
        .filter(|report| incident_type.map_or(true, |wanted| report.incident_type == wanted))
        .cloned()
        .collect()
}
