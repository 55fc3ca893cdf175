use thiserror::Error;

/// Failures surfaced by the session machine and the identity gateway.
///
/// Sign-in and sign-up errors are meant for user-facing display; profile
/// fetch failures are absorbed by the machine and only logged.
#[derive(Clone, Debug, Error)]
pub enum SessionError {
    /// Credentials rejected or the provider refused the sign-in.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Identity record creation failed during sign-up.
    #[error("registration failed: {0}")]
    Registration(String),

    /// The identity record exists but its profile row could not be
    /// provisioned. There is no compensating delete; the caller decides
    /// whether to retry or treat the account as incomplete.
    #[error("account {user_id} is missing its profile: {reason}")]
    ProfileCreation { user_id: String, reason: String },

    /// Profile lookup failed for an otherwise valid user.
    #[error("profile lookup failed: {0}")]
    ProfileFetch(String),

    /// Transport or availability failure talking to the identity provider.
    #[error("identity provider unavailable: {0}")]
    Provider(String),
}

/// Failures from the relational profile store.
#[derive(Clone, Debug, Error)]
pub enum StoreError {
    /// An insert hit an existing row for the same key.
    #[error("a row already exists for {0}")]
    Conflict(String),

    /// An update targeted a row that does not exist.
    #[error("no row found for {0}")]
    NotFound(String),

    /// Any other backend failure, with the message the backend returned.
    #[error("{0}")]
    Backend(String),
}
