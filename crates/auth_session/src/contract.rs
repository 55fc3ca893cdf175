//! Trait contracts for the identity provider and the profile store, plus
//! the records exchanged across them. Implementations live elsewhere; the
//! session machine is generic over these traits so tests can drive it with
//! in-memory doubles.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::{SessionError, StoreError};
use crate::routing::Role;

/// Identity record issued by the external provider. Held transiently for
/// the lifetime of the session; the provider owns the durable copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    /// Provider-side metadata attached at registration. May carry a
    /// denormalized `role` used as a fallback while the profile loads.
    #[serde(default)]
    pub metadata: Value,
}

impl AuthenticatedUser {
    /// Role embedded in the provider metadata, if any.
    pub fn metadata_role(&self) -> Option<Role> {
        self.metadata
            .get("role")
            .and_then(Value::as_str)
            .and_then(|role| role.parse().ok())
    }
}

/// Proof from the provider that a user is currently authenticated.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user: AuthenticatedUser,
}

/// Session lifecycle notification from the provider. Emitted on local
/// sign-in/sign-out as well as changes originating elsewhere.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    SignedIn(Session),
    Refreshed(Session),
    SignedOut,
}

/// Application-level profile row, one per user, keyed by the provider's
/// user id. Source of truth for authorization decisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserProfile {
    /// Display name assembled from the name fields, falling back to email.
    pub fn display_name(&self) -> String {
        let full = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        };
        if full.trim().is_empty() {
            self.email.clone()
        } else {
            full
        }
    }
}

/// Profile row to insert for a freshly registered user.
#[derive(Clone, Debug, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Registration request handed to the identity provider.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub email: String,
    pub password: SecretString,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// What the provider hands back for a new registration. `session` is
/// `None` when the account needs email confirmation before it activates.
#[derive(Clone, Debug)]
pub struct ProvisionedAccount {
    pub user: AuthenticatedUser,
    pub session: Option<Session>,
}

/// External identity provider: credentials, sessions, and change events.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Returns the currently active session, if any.
    async fn current_session(&self) -> Result<Option<Session>, SessionError>;

    /// Exchanges credentials for a session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<Session, SessionError>;

    /// Creates a new identity record.
    async fn sign_up(&self, account: NewAccount) -> Result<ProvisionedAccount, SessionError>;

    /// Ends the active session.
    async fn sign_out(&self) -> Result<(), SessionError>;

    /// Subscribes to session lifecycle events. Dropping the receiver ends
    /// the subscription.
    fn session_events(&self) -> broadcast::Receiver<SessionEvent>;
}

/// Relational store holding the application profile rows.
#[allow(async_fn_in_trait)]
pub trait ProfileStore {
    /// Fetches the profile for a user id; `Ok(None)` when no row exists.
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Inserts a new profile row. Fails with [`StoreError::Conflict`] when
    /// a row for the id already exists.
    async fn insert_profile(&self, profile: &NewProfile) -> Result<(), StoreError>;

    /// Applies a partial update to an existing row.
    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_role_reads_known_roles() {
        let user = AuthenticatedUser {
            id: "u-1".to_string(),
            email: "t@school.org".to_string(),
            metadata: json!({ "role": "principal" }),
        };
        assert_eq!(user.metadata_role(), Some(Role::Principal));
    }

    #[test]
    fn metadata_role_ignores_unknown_or_missing() {
        let mut user = AuthenticatedUser {
            id: "u-1".to_string(),
            email: "t@school.org".to_string(),
            metadata: json!({ "role": "superuser" }),
        };
        assert_eq!(user.metadata_role(), None);

        user.metadata = json!({});
        assert_eq!(user.metadata_role(), None);
    }

    #[test]
    fn profile_deserializes_from_store_row() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "5f6c",
            "email": "t@school.org",
            "role": "teacher",
            "first_name": "Dana",
            "last_name": null
        }))
        .expect("profile row");
        assert_eq!(profile.role, Role::Teacher);
        assert_eq!(profile.first_name.as_deref(), Some("Dana"));
        assert_eq!(profile.last_name, None);
    }

    #[test]
    fn profile_changes_serialize_only_present_fields() {
        let changes = ProfileChanges {
            first_name: Some("Dana".to_string()),
            ..ProfileChanges::default()
        };
        let body = serde_json::to_value(&changes).expect("changes");
        assert_eq!(body, json!({ "first_name": "Dana" }));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let profile = UserProfile {
            id: "5f6c".to_string(),
            email: "t@school.org".to_string(),
            role: Role::Teacher,
            first_name: None,
            last_name: None,
        };
        assert_eq!(profile.display_name(), "t@school.org");

        let named = UserProfile {
            first_name: Some("Dana".to_string()),
            last_name: Some("Reyes".to_string()),
            ..profile
        };
        assert_eq!(named.display_name(), "Dana Reyes");
    }
}
