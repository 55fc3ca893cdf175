//! Incident notification function.

use serde::Serialize;
use tracing::info_span;

use crate::transport;
use crate::{Backend, BackendError};

/// Payload for the notification function that mails the administrative
/// tier about a new filing.
#[derive(Clone, Debug, Serialize)]
pub struct IncidentNotification {
    pub report_id: i64,
    pub student_names: String,
    pub incident_type: String,
    pub description: String,
    pub created_by: String,
}

impl Backend {
    /// Invokes the notification function for a freshly filed report.
    /// Callers treat failures as non-fatal; the report already exists.
    ///
    /// # Errors
    /// Returns an error when the invocation fails.
    pub async fn notify_incident(
        &self,
        notification: &IncidentNotification,
    ) -> Result<(), BackendError> {
        let url = self.endpoint("/functions/v1/notify-incident")?;
        let span = info_span!("backend.notify_incident", http.method = "POST", url = %url);
        transport::send(
            self.with_auth(self.http().post(&url)).json(notification),
            span,
        )
        .await?;
        Ok(())
    }
}
