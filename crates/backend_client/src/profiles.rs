//! Profile rows and the [`ProfileStore`] implementation.

use tracing::info_span;

use auth_session::{NewProfile, ProfileChanges, ProfileStore, StoreError, UserProfile};

use crate::transport;
use crate::{Backend, BackendError};

fn into_store_error(err: BackendError) -> StoreError {
    match err {
        BackendError::Api {
            status: 409,
            message,
        } => StoreError::Conflict(message),
        BackendError::Api {
            status: 404,
            message,
        } => StoreError::NotFound(message),
        other => StoreError::Backend(other.to_string()),
    }
}

impl Backend {
    /// Fetches the profile row for a user id, if one exists.
    ///
    /// # Errors
    /// Returns an error when the request fails or the response does not
    /// decode.
    pub async fn fetch_profile_row(
        &self,
        user_id: &str,
    ) -> Result<Option<UserProfile>, BackendError> {
        let url = self.endpoint(&format!("/rest/v1/user_profiles?id=eq.{user_id}&select=*"))?;
        let span = info_span!("backend.fetch_profile", http.method = "GET", url = %url);
        let response = transport::send(self.with_auth(self.http().get(&url)), span).await?;
        let rows: Vec<UserProfile> = transport::decode(response).await?;
        Ok(rows.into_iter().next())
    }

    /// Inserts a fresh profile row. The backend answers 409 when the row
    /// already exists, which callers treat as a recoverable conflict.
    ///
    /// # Errors
    /// Returns an error when the insert is rejected.
    pub async fn insert_profile_row(&self, profile: &NewProfile) -> Result<(), BackendError> {
        let url = self.endpoint("/rest/v1/user_profiles")?;
        let span = info_span!("backend.insert_profile", http.method = "POST", url = %url);
        transport::send(
            self.with_auth(self.http().post(&url))
                .header("Prefer", "return=minimal")
                .json(profile),
            span,
        )
        .await?;
        Ok(())
    }

    /// Applies partial changes to an existing profile row.
    ///
    /// # Errors
    /// Returns an error when the update is rejected.
    pub async fn update_profile_row(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("/rest/v1/user_profiles?id=eq.{user_id}"))?;
        let span = info_span!("backend.update_profile", http.method = "PATCH", url = %url);
        transport::send(
            self.with_auth(self.http().patch(&url))
                .header("Prefer", "return=minimal")
                .json(changes),
            span,
        )
        .await?;
        Ok(())
    }
}

impl ProfileStore for Backend {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.fetch_profile_row(user_id).await.map_err(into_store_error)
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<(), StoreError> {
        self.insert_profile_row(profile).await.map_err(into_store_error)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<(), StoreError> {
        self.update_profile_row(user_id, changes)
            .await
            .map_err(into_store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackendConfig;
    use anyhow::Result;
    use auth_session::Role;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path, query_param};
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
    async fn fetch_profile_unwraps_the_single_row() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/user_profiles"))
            .and(query_param("id", "eq.u-1"))
            .and(query_param("select", "*"))
            .and(header("apikey", "pk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "u-1",
                "email": "alice@school.org",
                "role": "principal",
                "first_name": "Alice",
                "last_name": "Quinn"
            }])))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let profile = backend.fetch_profile_row("u-1").await?;
        let profile = profile.expect("row");
        assert_eq!(profile.role, Role::Principal);
        assert_eq!(profile.display_name(), "Alice Quinn");
        Ok(())
    }

    #[tokio::test]
    async fn a_missing_profile_is_an_empty_array_not_an_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/user_profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        assert!(backend.fetch_profile_row("u-404").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn a_duplicate_insert_maps_to_conflict() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/user_profiles"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "duplicate key value violates unique constraint \"profiles_pkey\""
            })))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let profile = NewProfile {
            id: "u-1".to_string(),
            email: "alice@school.org".to_string(),
            role: Role::Teacher,
            first_name: Some("Alice".to_string()),
            last_name: None,
        };
        let result = ProfileStore::insert_profile(&backend, &profile).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn update_patches_only_the_requested_row() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/user_profiles"))
            .and(query_param("id", "eq.u-1"))
            .and(body_json(json!({
                "first_name": "Alicia"
            })))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let changes = ProfileChanges {
            role: None,
            first_name: Some("Alicia".to_string()),
            last_name: None,
        };
        backend.update_profile_row("u-1", &changes).await?;
        Ok(())
    }
}
