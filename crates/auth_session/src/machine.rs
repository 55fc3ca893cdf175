//! The session state machine. One instance is built at the composition
//! root and cloned wherever session access is needed; it is the only
//! writer of [`SessionState`], publishing snapshots through a watch
//! channel so views re-render reactively.
//!
//! Concurrency model: every backend call is an awaited suspension point,
//! and a profile fetch may still be in flight when a newer session event
//! lands. Writes are idempotent and keyed by user id with a
//! discard-if-stale guard, so the slow response loses instead of
//! clobbering newer state.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, warn};

use crate::contract::{
    AuthenticatedUser, IdentityProvider, NewAccount, NewProfile, ProfileChanges, ProfileStore,
    SessionEvent, UserProfile,
};
use crate::error::{SessionError, StoreError};
use crate::state::SessionState;

/// Outcome of a successful sign-up.
#[derive(Clone, Debug)]
pub struct Registration {
    pub user: AuthenticatedUser,
    /// True when the provider returned no session: the account must be
    /// confirmed by email before it can sign in.
    pub requires_email_confirmation: bool,
}

struct Inner<G, S> {
    gateway: G,
    profiles: S,
    state: watch::Sender<SessionState>,
}

/// Cheaply cloneable handle over the shared session state.
pub struct SessionMachine<G, S> {
    inner: Arc<Inner<G, S>>,
}

impl<G, S> Clone for SessionMachine<G, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G, S> SessionMachine<G, S>
where
    G: IdentityProvider,
    S: ProfileStore,
{
    /// Builds the machine in the booting state. Callers follow up with
    /// [`Self::bootstrap`] once and keep [`Self::listen`] running for the
    /// application lifetime; dropping the listen future detaches the
    /// machine from provider events.
    pub fn new(gateway: G, profiles: S) -> Self {
        let (state, _) = watch::channel(SessionState::booting());
        Self {
            inner: Arc::new(Inner {
                gateway,
                profiles,
                state,
            }),
        }
    }

    /// Subscribes to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Current snapshot, cloned out of the channel.
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Resolves the session present at startup, if any. `is_loading`
    /// clears as soon as the session check itself completes; the profile
    /// fetch continues past that point. Never fails: a provider outage
    /// degrades to an unauthenticated view.
    pub async fn bootstrap(&self) {
        match self.inner.gateway.current_session().await {
            Ok(Some(session)) => {
                let user = session.user;
                self.apply_user(user.clone());
                self.set_loading(false);
                self.fetch_profile_for(&user).await;
            }
            Ok(None) => {
                self.clear_session_state();
                self.set_loading(false);
            }
            Err(err) => {
                error!("session bootstrap failed: {err}");
                self.clear_session_state();
                self.set_loading(false);
            }
        }
    }

    /// Consumes provider session events until the channel closes. Pure
    /// state sync: no navigation happens here. Duplicate events are
    /// harmless because every write is idempotent.
    pub async fn listen(&self) {
        let mut events = self.inner.gateway.session_events();
        loop {
            match events.recv().await {
                Ok(SessionEvent::SignedIn(session) | SessionEvent::Refreshed(session)) => {
                    let user = session.user;
                    self.apply_user(user.clone());
                    self.fetch_profile_for(&user).await;
                }
                Ok(SessionEvent::SignedOut) => self.clear_session_state(),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("session listener lagged, skipped {missed} events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Exchanges credentials for a session. On success the user is
    /// published before the profile resolves, and the profile fetch
    /// failing does not fail the sign-in. The caller navigates afterwards
    /// using the landing route of the returned snapshot.
    ///
    /// # Errors
    /// [`SessionError::Authentication`] when the provider rejects the
    /// credentials, [`SessionError::Provider`] on transport failure.
    pub async fn sign_in(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<AuthenticatedUser, SessionError> {
        self.set_loading(true);
        let session = match self.inner.gateway.sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(err) => {
                self.set_loading(false);
                return Err(err);
            }
        };
        let user = session.user;
        self.apply_user(user.clone());
        self.fetch_profile_for(&user).await;
        self.set_loading(false);
        Ok(user)
    }

    /// Two-phase registration: the identity record first, then the
    /// profile row. A conflicting insert is retried once as an update,
    /// since a previous partial attempt may have left the row behind.
    /// Identity creation is never rolled back.
    ///
    /// # Errors
    /// [`SessionError::Registration`] when identity creation fails;
    /// [`SessionError::ProfileCreation`] when the identity exists but the
    /// profile could not be provisioned.
    pub async fn sign_up(&self, account: NewAccount) -> Result<Registration, SessionError> {
        self.set_loading(true);
        let result = self.register(account).await;
        self.set_loading(false);
        result
    }

    async fn register(&self, account: NewAccount) -> Result<Registration, SessionError> {
        let profile_seed = NewProfile {
            id: String::new(),
            email: account.email.clone(),
            role: account.role,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
        };

        let provisioned = self.inner.gateway.sign_up(account).await?;
        let requires_email_confirmation = provisioned.session.is_none();
        let user = provisioned.user;
        let profile = NewProfile {
            id: user.id.clone(),
            ..profile_seed
        };
        self.provision_profile(&profile).await?;

        if let Some(session) = provisioned.session {
            // Active right away: publish the session so the caller can
            // navigate from a settled snapshot. The listener applying the
            // same event later converges on the same state.
            self.apply_user(session.user.clone());
            self.fetch_profile_for(&session.user).await;
        }

        Ok(Registration {
            user,
            requires_email_confirmation,
        })
    }

    async fn provision_profile(&self, profile: &NewProfile) -> Result<(), SessionError> {
        match self.inner.profiles.insert_profile(profile).await {
            Ok(()) => Ok(()),
            Err(StoreError::Conflict(_)) => {
                debug!("profile row for {} already exists, updating", profile.id);
                let changes = ProfileChanges {
                    role: Some(profile.role),
                    first_name: profile.first_name.clone(),
                    last_name: profile.last_name.clone(),
                };
                self.inner
                    .profiles
                    .update_profile(&profile.id, &changes)
                    .await
                    .map_err(|err| SessionError::ProfileCreation {
                        user_id: profile.id.clone(),
                        reason: err.to_string(),
                    })
            }
            Err(err) => Err(SessionError::ProfileCreation {
                user_id: profile.id.clone(),
                reason: err.to_string(),
            }),
        }
    }

    /// Ends the session. Local state clears before this returns even when
    /// the remote call failed; a stale authenticated view must never
    /// survive a requested sign-out.
    ///
    /// # Errors
    /// Propagates the gateway failure after state is cleared.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.set_loading(true);
        let result = self.inner.gateway.sign_out().await;
        self.inner.state.send_modify(|state| {
            state.user = None;
            state.profile = None;
            state.is_loading = false;
        });
        if let Err(err) = &result {
            warn!("remote sign-out failed: {err}");
        }
        result
    }

    /// Re-fetches the profile and replaces the cached copy. Returns
    /// whether a profile was found; failures are logged, never raised.
    pub async fn refresh_profile(&self, user_id: &str) -> bool {
        match self.inner.profiles.fetch_profile(user_id).await {
            Ok(Some(profile)) => {
                self.apply_profile(profile);
                true
            }
            Ok(None) => {
                debug!("no profile row for {user_id}");
                false
            }
            Err(err) => {
                warn!("profile refresh for {user_id} failed: {err}");
                false
            }
        }
    }

    fn set_loading(&self, is_loading: bool) {
        self.inner
            .state
            .send_modify(|state| state.is_loading = is_loading);
    }

    // Idempotent: the listener and an in-flight sign-in may both apply
    // the same session. Switching users drops the previous profile.
    fn apply_user(&self, user: AuthenticatedUser) {
        self.inner.state.send_modify(|state| {
            let switched = state
                .user
                .as_ref()
                .is_some_and(|current| current.id != user.id);
            if switched {
                state.profile = None;
            }
            state.user = Some(user);
        });
    }

    // Last-writer-wins keyed by user id: a result fetched for a
    // superseded session is discarded.
    fn apply_profile(&self, profile: UserProfile) {
        self.inner.state.send_modify(|state| {
            if state
                .user
                .as_ref()
                .is_some_and(|user| user.id == profile.id)
            {
                state.profile = Some(profile);
            }
        });
    }

    fn clear_session_state(&self) {
        self.inner.state.send_modify(|state| {
            state.user = None;
            state.profile = None;
        });
    }

    async fn fetch_profile_for(&self, user: &AuthenticatedUser) {
        match self.inner.profiles.fetch_profile(&user.id).await {
            Ok(Some(profile)) => self.apply_profile(profile),
            Ok(None) => debug!("no profile row for {}", user.id),
            Err(err) => warn!("profile fetch for {} failed: {err}", user.id),
        }
    }
}
