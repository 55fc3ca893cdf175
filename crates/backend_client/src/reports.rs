//! Incident report endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info_span;

use crate::transport;
use crate::{Backend, BackendError};

/// The fixed set of incident categories offered by the report form.
pub const INCIDENT_TYPES: [&str; 7] = [
    "Bullying",
    "Vandalism",
    "Disruptive Behavior",
    "Fighting",
    "Academic Dishonesty",
    "Attendance",
    "Other",
];

/// Review state of a report. Teacher submissions start `Pending`;
/// administrative-tier submissions are `Approved` on creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] = [
        ReportStatus::Pending,
        ReportStatus::Approved,
        ReportStatus::Rejected,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Approved => "Approved",
            ReportStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filed incident report row.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct IncidentReport {
    pub id: i64,
    pub student_id: Option<i64>,
    pub student_names: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub incident_date: String,
    pub description: String,
    pub incident_type: String,
    pub status: ReportStatus,
    pub created_by: String,
    pub created_at: String,
    #[serde(default)]
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub evidence_type: Option<String>,
}

/// Payload for filing a report.
#[derive(Clone, Debug, Serialize)]
pub struct NewIncidentReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    pub student_names: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub incident_date: String,
    pub description: String,
    pub incident_type: String,
    pub status: ReportStatus,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_type: Option<String>,
}

/// Optional narrowing for a report history query. Dates are ISO `YYYY-MM-DD`
/// strings and compare inclusively.
#[derive(Clone, Debug, Default)]
pub struct ReportFilters {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub incident_type: Option<String>,
}

impl ReportFilters {
    fn query_suffix(&self) -> String {
        let mut suffix = String::new();
        if let Some(from) = &self.from_date {
            suffix.push_str(&format!("&incident_date=gte.{from}"));
        }
        if let Some(to) = &self.to_date {
            suffix.push_str(&format!("&incident_date=lte.{to}"));
        }
        if let Some(kind) = &self.incident_type {
            suffix.push_str(&format!("&incident_type=eq.{kind}"));
        }
        suffix
    }
}

impl Backend {
    /// Lists all reports, newest filing first.
    ///
    /// # Errors
    /// Returns an error when the request fails or the response does not
    /// decode.
    pub async fn list_reports(&self) -> Result<Vec<IncidentReport>, BackendError> {
        let url = self.endpoint("/rest/v1/incident_reports?select=*&order=created_at.desc")?;
        let span = info_span!("backend.list_reports", http.method = "GET", url = %url);
        let response = transport::send(self.with_auth(self.http().get(&url)), span).await?;
        transport::decode(response).await
    }

    /// Lists one student's reports, most recent incident first, narrowed by
    /// the given filters.
    ///
    /// # Errors
    /// Returns an error when the request fails or the response does not
    /// decode.
    pub async fn reports_for_student(
        &self,
        student_id: i64,
        filters: &ReportFilters,
    ) -> Result<Vec<IncidentReport>, BackendError> {
        let url = self.endpoint(&format!(
            "/rest/v1/incident_reports?student_id=eq.{student_id}&select=*&order=incident_date.desc{}",
            filters.query_suffix()
        ))?;
        let span = info_span!("backend.reports_for_student", http.method = "GET", url = %url);
        let response = transport::send(self.with_auth(self.http().get(&url)), span).await?;
        transport::decode(response).await
    }

    /// Files a report and returns the created row.
    ///
    /// # Errors
    /// Returns an error when the insert is rejected or the backend answers
    /// without the created row.
    pub async fn create_report(
        &self,
        report: &NewIncidentReport,
    ) -> Result<IncidentReport, BackendError> {
        let url = self.endpoint("/rest/v1/incident_reports")?;
        let span = info_span!("backend.create_report", http.method = "POST", url = %url);
        let response = transport::send(
            self.with_auth(self.http().post(&url))
                .header("Prefer", "return=representation")
                .json(report),
            span,
        )
        .await?;
        let rows: Vec<IncidentReport> = transport::decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode("empty insert response".to_string()))
    }

    /// Moves a report to a new review status.
    ///
    /// # Errors
    /// Returns an error when the update is rejected.
    pub async fn set_report_status(
        &self,
        report_id: i64,
        status: ReportStatus,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("/rest/v1/incident_reports?id=eq.{report_id}"))?;
        let span = info_span!("backend.set_report_status", http.method = "PATCH", url = %url);
        transport::send(
            self.with_auth(self.http().patch(&url))
                .header("Prefer", "return=minimal")
                .json(&json!({ "status": status })),
            span,
        )
        .await?;
        Ok(())
    }
}
