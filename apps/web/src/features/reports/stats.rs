use backend_client::{IncidentReport, ReportStatus};

#[cfg(target_arch = "wasm32")]
const SEVEN_DAYS_MS: f64 = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Summary counts rendered as the stats row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub total: usize,
    pub recent: usize,
    pub pending: usize,
}

/// Counts a report list against a seven-day cutoff. `cutoff` is an
/// ISO-8601 UTC timestamp; ISO timestamps order chronologically as plain
/// strings, so no date-time parsing is needed.
pub fn summarize(reports: &[IncidentReport], cutoff: &str) -> ReportStats {
    ReportStats {
        total: reports.len(),
        recent: reports
            .iter()
            .filter(|report| report.created_at.as_str() >= cutoff)
            .count(),
        pending: reports
            .iter()
            .filter(|report| report.status == ReportStatus::Pending)
            .count(),
    }
}

/// ISO timestamp seven days before now.
#[cfg(target_arch = "wasm32")]
pub fn seven_day_cutoff() -> String {
    let cutoff = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(
        js_sys::Date::now() - SEVEN_DAYS_MS,
    ));
    String::from(cutoff.to_iso_string())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn seven_day_cutoff() -> String {
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(created_at: &str, status: ReportStatus) -> IncidentReport {
        IncidentReport {
            id: 1,
            student_id: None,
            student_names: "Dana Mills".to_string(),
            class_name: "5B".to_string(),
            incident_date: "2025-03-10".to_string(),
            description: "test".to_string(),
            incident_type: "Other".to_string(),
            status,
            created_by: "u-1".to_string(),
            created_at: created_at.to_string(),
            evidence_url: None,
            evidence_type: None,
        }
    }

    #[test]
    fn counts_split_by_cutoff_and_status() {
        let reports = vec![
            report("2025-03-10T14:05:00Z", ReportStatus::Pending),
            report("2025-03-01T09:00:00Z", ReportStatus::Approved),
            report("2025-03-09T23:59:59Z", ReportStatus::Rejected),
        ];

        let stats = summarize(&reports, "2025-03-03T14:05:00Z");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.recent, 2);
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn an_empty_list_summarizes_to_zero() {
        assert_eq!(summarize(&[], "2025-03-03T00:00:00Z"), ReportStats::default());
    }

    #[test]
    fn the_cutoff_boundary_is_inclusive() {
        let reports = vec![report("2025-03-03T00:00:00Z", ReportStatus::Pending)];
        assert_eq!(summarize(&reports, "2025-03-03T00:00:00Z").recent, 1);
    }
}
