//! Student roster endpoints.

use serde::{Deserialize, Serialize};
use tracing::info_span;

use crate::transport;
use crate::{Backend, BackendError};

/// A roster entry with its incident tally.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub grade: String,
    #[serde(default)]
    pub incident_count: u32,
}

/// Raw roster row. The incident tally arrives as an embedded aggregate,
/// one `{ "count": n }` object per row, and is flattened before the row
/// reaches callers.
#[derive(Debug, Deserialize)]
struct StudentRow {
    id: i64,
    name: String,
    grade: String,
    #[serde(default)]
    incident_reports: Vec<CountRow>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u32,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            grade: row.grade,
            incident_count: row.incident_reports.first().map_or(0, |c| c.count),
        }
    }
}

/// Payload for enrolling a student.
#[derive(Clone, Debug, Serialize)]
pub struct NewStudent {
    pub name: String,
    pub grade: String,
}

impl Backend {
    /// Lists the roster sorted by name, each entry carrying its incident
    /// count.
    ///
    /// # Errors
    /// Returns an error when the request fails or the response does not
    /// decode.
    pub async fn list_students(&self) -> Result<Vec<Student>, BackendError> {
        let url =
            self.endpoint("/rest/v1/students?select=*,incident_reports(count)&order=name.asc")?;
        let span = info_span!("backend.list_students", http.method = "GET", url = %url);
        let response = transport::send(self.with_auth(self.http().get(&url)), span).await?;
        let rows: Vec<StudentRow> = transport::decode(response).await?;
        Ok(rows.into_iter().map(Student::from).collect())
    }

    /// Fetches a single roster entry.
    ///
    /// # Errors
    /// Returns an error when the request fails or the response does not
    /// decode.
    pub async fn fetch_student(&self, student_id: i64) -> Result<Option<Student>, BackendError> {
        let url = self.endpoint(&format!(
            "/rest/v1/students?id=eq.{student_id}&select=*,incident_reports(count)"
        ))?;
        let span = info_span!("backend.fetch_student", http.method = "GET", url = %url);
        let response = transport::send(self.with_auth(self.http().get(&url)), span).await?;
        let rows: Vec<StudentRow> = transport::decode(response).await?;
        Ok(rows.into_iter().next().map(Student::from))
    }

    /// Adds a student to the roster.
    ///
    /// # Errors
    /// Returns an error when the insert is rejected.
    pub async fn enroll_student(&self, student: &NewStudent) -> Result<(), BackendError> {
        let url = self.endpoint("/rest/v1/students")?;
        let span = info_span!("backend.enroll_student", http.method = "POST", url = %url);
        transport::send(
            self.with_auth(self.http().post(&url))
                .header("Prefer", "return=minimal")
                .json(student),
            span,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackendConfig;
    use anyhow::Result;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn backend(base_url: &str) -> Backend {
        Backend::new(BackendConfig {
            base_url: base_url.to_string(),
            publishable_key: "pk-test".to_string(),
            site_url: None,
        })
        .expect("backend handle")
    }

    #[tokio::test]
    async fn the_roster_flattens_embedded_incident_counts() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/students"))
            .and(query_param("select", "*,incident_reports(count)"))
            .and(query_param("order", "name.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1,
                    "name": "Dana Mills",
                    "grade": "5th",
                    "incident_reports": [{ "count": 3 }]
                },
                {
                    "id": 2,
                    "name": "Evan Soto",
                    "grade": "6th",
                    "incident_reports": []
                }
            ])))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let roster = backend.list_students().await?;

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].incident_count, 3);
        assert_eq!(roster[1].incident_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn a_single_student_is_fetched_by_id() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/students"))
            .and(query_param("id", "eq.1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1,
                "name": "Dana Mills",
                "grade": "5th",
                "incident_reports": [{ "count": 2 }]
            }])))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let student = backend.fetch_student(1).await?.expect("row");
        assert_eq!(student.name, "Dana Mills");
        assert_eq!(student.incident_count, 2);
        Ok(())
    }

    #[tokio::test]
    async fn enrolling_posts_the_new_row() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/students"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        backend
            .enroll_student(&NewStudent {
                name: "Dana Mills".to_string(),
                grade: "5th".to_string(),
            })
            .await?;
        Ok(())
    }
}
