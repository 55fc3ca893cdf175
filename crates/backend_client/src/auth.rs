//! Identity endpoints and the [`IdentityProvider`] implementation.
//!
//! Successful sign-in and sign-up responses are adopted into the handle:
//! tokens are stored for later bearer auth and a session event is emitted
//! so the session machine stays in sync. Sign-out drops local tokens even
//! when the server call fails; a client must never keep acting
//! authenticated past a requested sign-out.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info_span;

use auth_session::{
    AuthenticatedUser, IdentityProvider, NewAccount, ProvisionedAccount, Session, SessionError,
    SessionEvent,
};

use crate::transport;
use crate::{Backend, BackendError, SessionTokens};

#[derive(Clone, Debug, Deserialize)]
struct WireUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl From<WireUser> for AuthenticatedUser {
    fn from(user: WireUser) -> Self {
        Self {
            id: user.id,
            email: user.email.unwrap_or_default(),
            metadata: user.user_metadata,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
struct WireSession {
    access_token: String,
    refresh_token: Option<String>,
    user: WireUser,
}

/// The signup endpoint answers with a session when the account activates
/// immediately, and with a bare user when email confirmation is pending.
fn parse_signup(body: Value) -> Result<(WireUser, Option<WireSession>), BackendError> {
    if body.get("access_token").is_some() {
        let session: WireSession = serde_json::from_value(body)
            .map_err(|err| BackendError::Decode(err.to_string()))?;
        return Ok((session.user.clone(), Some(session)));
    }
    let user: WireUser =
        serde_json::from_value(body).map_err(|err| BackendError::Decode(err.to_string()))?;
    Ok((user, None))
}

impl Backend {
    /// Registers a new identity record. Role and names travel as provider
    /// metadata so they survive until the profile row exists.
    ///
    /// # Errors
    /// Returns an error when the request fails or the backend rejects the
    /// registration.
    pub async fn sign_up_account(
        &self,
        account: &NewAccount,
    ) -> Result<ProvisionedAccount, BackendError> {
        let mut path = "/auth/v1/signup".to_string();
        if let Some(site_url) = &self.config().site_url {
            path = format!("{path}?redirect_to={site_url}");
        }
        let url = self.endpoint(&path)?;

        let payload = json!({
            "email": account.email,
            "password": account.password.expose_secret(),
            "data": {
                "role": account.role,
                "first_name": account.first_name,
                "last_name": account.last_name,
            },
        });

        let span = info_span!("backend.sign_up", http.method = "POST", url = %url);
        let response =
            transport::send(self.with_key(self.http().post(&url)).json(&payload), span).await?;
        let body: Value = transport::decode(response).await?;
        let (user, session) = parse_signup(body)?;

        Ok(ProvisionedAccount {
            user: user.into(),
            session: session.map(|wire| self.adopt_session(wire)),
        })
    }

    /// Exchanges credentials for a session.
    ///
    /// # Errors
    /// Returns [`BackendError::Api`] with the backend's message when the
    /// credentials are rejected.
    pub async fn sign_in_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, BackendError> {
        let url = self.endpoint("/auth/v1/token?grant_type=password")?;
        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let span = info_span!("backend.sign_in", http.method = "POST", url = %url);
        let response =
            transport::send(self.with_key(self.http().post(&url)).json(&payload), span).await?;
        let wire: WireSession = transport::decode(response).await?;

        Ok(self.adopt_session(wire))
    }

    /// Ends the session server-side. Local tokens are dropped and the
    /// signed-out event emitted before the request goes out.
    ///
    /// # Errors
    /// Propagates the server failure; local sign-out has already happened.
    pub async fn sign_out_session(&self) -> Result<(), BackendError> {
        let token = self.access_token();
        self.clear_tokens();
        self.emit(SessionEvent::SignedOut);

        let token = match token {
            Some(token) => token,
            None => return Ok(()),
        };

        let url = self.endpoint("/auth/v1/logout")?;
        let span = info_span!("backend.sign_out", http.method = "POST", url = %url);
        transport::send(
            self.with_key(self.http().post(&url)).bearer_auth(token),
            span,
        )
        .await?;
        Ok(())
    }

    /// Asks the backend who the held token belongs to. Without a token
    /// there is no session and no request; a 401 means the token died
    /// server-side and is dropped.
    ///
    /// # Errors
    /// Returns an error on transport failure or unexpected statuses.
    pub async fn current_session_remote(&self) -> Result<Option<Session>, BackendError> {
        let token = match self.access_token() {
            Some(token) => token,
            None => return Ok(None),
        };

        let url = self.endpoint("/auth/v1/user")?;
        let span = info_span!("backend.current_session", http.method = "GET", url = %url);
        let result = transport::send(
            self.with_key(self.http().get(&url)).bearer_auth(token),
            span,
        )
        .await;

        match result {
            Ok(response) => {
                let user: WireUser = transport::decode(response).await?;
                Ok(Some(Session { user: user.into() }))
            }
            Err(BackendError::Api { status: 401, .. }) => {
                self.clear_tokens();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn adopt_session(&self, wire: WireSession) -> Session {
        self.store_tokens(SessionTokens {
            access_token: wire.access_token,
            refresh_token: wire.refresh_token,
        });
        let session = Session {
            user: wire.user.into(),
        };
        self.emit(SessionEvent::SignedIn(session.clone()));
        session
    }
}

impl IdentityProvider for Backend {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        self.current_session_remote()
            .await
            .map_err(|err| SessionError::Provider(err.to_string()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<Session, SessionError> {
        self.sign_in_password(email, &password)
            .await
            .map_err(|err| match err {
                BackendError::Api { message, .. } => SessionError::Authentication(message),
                other => SessionError::Provider(other.to_string()),
            })
    }

    async fn sign_up(&self, account: NewAccount) -> Result<ProvisionedAccount, SessionError> {
        self.sign_up_account(&account)
            .await
            .map_err(|err| match err {
                BackendError::Api { message, .. } => SessionError::Registration(message),
                other => SessionError::Provider(other.to_string()),
            })
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        self.sign_out_session()
            .await
            .map_err(|err| SessionError::Provider(err.to_string()))
    }

    fn session_events(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.subscribe_events()
    }
}
