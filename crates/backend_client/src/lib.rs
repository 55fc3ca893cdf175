//! Client for the hosted backend the application sits on: identity
//! endpoints under `/auth/v1`, the relational data API under `/rest/v1`,
//! object storage under `/storage/v1`, and serverless functions under
//! `/functions/v1`.
//!
//! One [`Backend`] handle is built at startup and cloned freely. It keeps
//! the session tokens in memory only; durable session persistence belongs
//! to the identity provider, not this client.

use std::sync::{Arc, RwLock};

use reqwest::{Client, RequestBuilder};
use thiserror::Error;
use tokio::sync::broadcast;

use auth_session::SessionEvent;

pub mod auth;
pub mod notify;
pub mod profiles;
pub mod reports;
pub mod storage;
pub mod students;
mod transport;

pub use notify::IncidentNotification;
pub use reports::{
    IncidentReport, NewIncidentReport, ReportFilters, ReportStatus, INCIDENT_TYPES,
};
pub use storage::{EvidenceKind, UploadedEvidence, MAX_EVIDENCE_BYTES};
pub use students::{NewStudent, Student};

const USER_AGENT: &str = concat!("registro/", env!("CARGO_PKG_VERSION"));

/// Failures talking to the backend.
#[derive(Clone, Debug, Error)]
pub enum BackendError {
    /// The configured base URL is unusable.
    #[error("invalid backend URL: {0}")]
    Config(String),

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// A file was rejected before upload.
    #[error("{0}")]
    Validation(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Transport(err.to_string())
    }
}

/// Connection settings for the hosted backend.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
    /// Public API key sent as the `apikey` header on every request.
    pub publishable_key: String,
    /// Where confirmation emails send the user back to.
    pub site_url: Option<String>,
}

#[derive(Clone, Debug)]
pub(crate) struct SessionTokens {
    pub(crate) access_token: String,
    #[allow(dead_code)]
    pub(crate) refresh_token: Option<String>,
}

struct BackendInner {
    http: Client,
    config: BackendConfig,
    tokens: RwLock<Option<SessionTokens>>,
    events: broadcast::Sender<SessionEvent>,
}

/// Cheaply cloneable handle over one backend connection.
#[derive(Clone)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

impl Backend {
    /// Builds a handle for the given settings.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        let (events, _) = broadcast::channel(16);
        Ok(Self {
            inner: Arc::new(BackendInner {
                http,
                config,
                tokens: RwLock::new(None),
                events,
            }),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    /// Subscribes to session lifecycle events emitted by this handle.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<String, BackendError> {
        transport::endpoint_url(&self.inner.config.base_url, path)
    }

    /// Attaches the public API key.
    pub(crate) fn with_key(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.inner.config.publishable_key)
    }

    /// Attaches the API key plus the bearer token when a session is held.
    pub(crate) fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = self.with_key(builder);
        match self.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) fn access_token(&self) -> Option<String> {
        self.inner
            .tokens
            .read()
            .ok()?
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
    }

    pub(crate) fn store_tokens(&self, tokens: SessionTokens) {
        if let Ok(mut guard) = self.inner.tokens.write() {
            *guard = Some(tokens);
        }
    }

    pub(crate) fn clear_tokens(&self) {
        if let Ok(mut guard) = self.inner.tokens.write() {
            *guard = None;
        }
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; events are best-effort sync signals.
        let _ = self.inner.events.send(event);
    }
}
