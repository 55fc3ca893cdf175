//! Drives the session machine end to end against in-memory gateway and
//! store doubles. Gated profile fetches make the race interleavings
//! deterministic instead of sleep-based.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use auth_session::contract::{
    AuthenticatedUser, IdentityProvider, NewAccount, NewProfile, ProfileChanges, ProfileStore,
    ProvisionedAccount, Session, SessionEvent, UserProfile,
};
use auth_session::error::{SessionError, StoreError};
use auth_session::guard::{self, GuardDecision};
use auth_session::machine::SessionMachine;
use auth_session::routing::{landing_route, target_route_for, Role, Route};
use auth_session::state::SessionState;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio::sync::{broadcast, watch, Notify};
use tokio::time::timeout;

const PASSWORD: &str = "correct-horse-battery";
const ALICE: &str = "11111111-aaaa-4bbb-8ccc-000000000001";
const BOB: &str = "22222222-aaaa-4bbb-8ccc-000000000002";

struct GatewayKnobs {
    current: Mutex<Result<Option<Session>, SessionError>>,
    grants: Mutex<HashMap<String, Session>>,
    sign_up_response: Mutex<Option<Result<ProvisionedAccount, SessionError>>>,
    fail_sign_out: AtomicBool,
    events: broadcast::Sender<SessionEvent>,
}

#[derive(Clone)]
struct StubGateway {
    knobs: Arc<GatewayKnobs>,
}

impl StubGateway {
    fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            knobs: Arc::new(GatewayKnobs {
                current: Mutex::new(Ok(None)),
                grants: Mutex::new(HashMap::new()),
                sign_up_response: Mutex::new(None),
                fail_sign_out: AtomicBool::new(false),
                events,
            }),
        }
    }

    fn set_current(&self, session: Option<Session>) {
        *self.knobs.current.lock().unwrap() = Ok(session);
    }

    fn fail_bootstrap(&self) {
        *self.knobs.current.lock().unwrap() =
            Err(SessionError::Provider("connection refused".to_string()));
    }

    fn grant(&self, email: &str, session: Session) {
        self.knobs
            .grants
            .lock()
            .unwrap()
            .insert(email.to_string(), session);
    }

    fn on_sign_up(&self, response: Result<ProvisionedAccount, SessionError>) {
        *self.knobs.sign_up_response.lock().unwrap() = Some(response);
    }

    fn fail_sign_out(&self) {
        self.knobs.fail_sign_out.store(true, Ordering::SeqCst);
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.knobs.events.send(event);
    }
}

impl IdentityProvider for StubGateway {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        self.knobs.current.lock().unwrap().clone()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<Session, SessionError> {
        let granted = self.knobs.grants.lock().unwrap().get(email).cloned();
        match granted {
            Some(session) if password.expose_secret() == PASSWORD => {
                let _ = self
                    .knobs
                    .events
                    .send(SessionEvent::SignedIn(session.clone()));
                Ok(session)
            }
            _ => Err(SessionError::Authentication(
                "invalid login credentials".to_string(),
            )),
        }
    }

    async fn sign_up(&self, _account: NewAccount) -> Result<ProvisionedAccount, SessionError> {
        let response = self
            .knobs
            .sign_up_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(SessionError::Registration("no response staged".to_string())));
        if let Ok(provisioned) = &response {
            if let Some(session) = &provisioned.session {
                let _ = self
                    .knobs
                    .events
                    .send(SessionEvent::SignedIn(session.clone()));
            }
        }
        response
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        if self.knobs.fail_sign_out.load(Ordering::SeqCst) {
            return Err(SessionError::Provider(
                "connection reset by peer".to_string(),
            ));
        }
        *self.knobs.current.lock().unwrap() = Ok(None);
        let _ = self.knobs.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.knobs.events.subscribe()
    }
}

struct ProfileKnobs {
    rows: Mutex<HashMap<String, UserProfile>>,
    fetch_failures: Mutex<u32>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    fail_insert: Mutex<Option<StoreError>>,
    fail_update: Mutex<Option<StoreError>>,
    updates: Mutex<Vec<(String, ProfileChanges)>>,
}

#[derive(Clone)]
struct StubProfiles {
    knobs: Arc<ProfileKnobs>,
}

impl StubProfiles {
    fn new() -> Self {
        Self {
            knobs: Arc::new(ProfileKnobs {
                rows: Mutex::new(HashMap::new()),
                fetch_failures: Mutex::new(0),
                gates: Mutex::new(HashMap::new()),
                fail_insert: Mutex::new(None),
                fail_update: Mutex::new(None),
                updates: Mutex::new(Vec::new()),
            }),
        }
    }

    fn seed(&self, profile: UserProfile) {
        self.knobs
            .rows
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }

    fn fail_next_fetches(&self, count: u32) {
        *self.knobs.fetch_failures.lock().unwrap() = count;
    }

    /// Blocks fetches for `user_id` until the returned gate is notified.
    fn gate(&self, user_id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.knobs
            .gates
            .lock()
            .unwrap()
            .insert(user_id.to_string(), gate.clone());
        gate
    }

    fn fail_insert_with(&self, error: StoreError) {
        *self.knobs.fail_insert.lock().unwrap() = Some(error);
    }

    fn recorded_updates(&self) -> Vec<(String, ProfileChanges)> {
        self.knobs.updates.lock().unwrap().clone()
    }

    fn row(&self, user_id: &str) -> Option<UserProfile> {
        self.knobs.rows.lock().unwrap().get(user_id).cloned()
    }
}

impl ProfileStore for StubProfiles {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let gate = self.knobs.gates.lock().unwrap().get(user_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        {
            let mut failures = self.knobs.fetch_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(StoreError::Backend("connection reset".to_string()));
            }
        }
        Ok(self.knobs.rows.lock().unwrap().get(user_id).cloned())
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<(), StoreError> {
        if let Some(err) = self.knobs.fail_insert.lock().unwrap().take() {
            return Err(err);
        }
        let row = UserProfile {
            id: profile.id.clone(),
            email: profile.email.clone(),
            role: profile.role,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        };
        self.knobs.rows.lock().unwrap().insert(profile.id.clone(), row);
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<(), StoreError> {
        if let Some(err) = self.knobs.fail_update.lock().unwrap().take() {
            return Err(err);
        }
        self.knobs
            .updates
            .lock()
            .unwrap()
            .push((user_id.to_string(), changes.clone()));
        let mut rows = self.knobs.rows.lock().unwrap();
        match rows.get_mut(user_id) {
            Some(row) => {
                if let Some(role) = changes.role {
                    row.role = role;
                }
                if let Some(first) = &changes.first_name {
                    row.first_name = Some(first.clone());
                }
                if let Some(last) = &changes.last_name {
                    row.last_name = Some(last.clone());
                }
                Ok(())
            }
            None => Err(StoreError::NotFound(user_id.to_string())),
        }
    }
}

fn user(id: &str, email: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        id: id.to_string(),
        email: email.to_string(),
        metadata: json!({}),
    }
}

fn session_for(id: &str, email: &str) -> Session {
    Session {
        user: user(id, email),
    }
}

fn profile(id: &str, email: &str, role: Role) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        email: email.to_string(),
        role,
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
    }
}

fn account(email: &str, role: Role) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        password: SecretString::from(PASSWORD.to_string()),
        role,
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
    }
}

async fn wait_for(
    rx: &mut watch::Receiver<SessionState>,
    predicate: impl Fn(&SessionState) -> bool,
) -> Result<SessionState> {
    timeout(Duration::from_secs(2), async {
        loop {
            let state = rx.borrow_and_update().clone();
            if predicate(&state) {
                return Ok(state);
            }
            rx.changed()
                .await
                .map_err(|_| anyhow!("state channel closed"))?;
        }
    })
    .await
    .map_err(|_| anyhow!("timed out waiting for state"))?
}

#[tokio::test]
async fn bootstrap_clears_loading_before_the_profile_arrives() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.set_current(Some(session_for(ALICE, "alice@school.org")));
    profiles.seed(profile(ALICE, "alice@school.org", Role::Teacher));
    let gate = profiles.gate(ALICE);

    let machine = SessionMachine::new(gateway, profiles);
    let mut rx = machine.subscribe();

    let boot = machine.clone();
    let task = tokio::spawn(async move { boot.bootstrap().await });

    // The session check resolves the loading flag; the profile is still
    // held behind the gate at this point.
    let state = wait_for(&mut rx, |state| {
        state.user.is_some() && !state.is_loading
    })
    .await?;
    assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some(ALICE));
    assert!(state.profile.is_none());

    gate.notify_one();
    task.await?;

    let state = wait_for(&mut rx, |state| state.profile.is_some()).await?;
    assert_eq!(state.profile.as_ref().map(|p| p.role), Some(Role::Teacher));
    Ok(())
}

#[tokio::test]
async fn bootstrap_without_session_resolves_unauthenticated() -> Result<()> {
    let machine = SessionMachine::new(StubGateway::new(), StubProfiles::new());
    machine.bootstrap().await;

    let state = machine.snapshot();
    assert!(state.user.is_none());
    assert!(state.profile.is_none());
    assert!(!state.is_loading);
    Ok(())
}

#[tokio::test]
async fn bootstrap_survives_a_provider_outage() -> Result<()> {
    let gateway = StubGateway::new();
    gateway.fail_bootstrap();

    let machine = SessionMachine::new(gateway, StubProfiles::new());
    machine.bootstrap().await;

    // Degraded, not broken: the shell renders an unauthenticated view.
    let state = machine.snapshot();
    assert!(state.user.is_none());
    assert!(!state.is_loading);
    assert_eq!(landing_route(&state), Route::Login);
    Ok(())
}

#[tokio::test]
async fn sign_in_publishes_the_user_before_the_profile() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.grant("alice@school.org", session_for(ALICE, "alice@school.org"));
    profiles.seed(profile(ALICE, "alice@school.org", Role::Teacher));
    let gate = profiles.gate(ALICE);

    let machine = SessionMachine::new(gateway, profiles);
    let mut rx = machine.subscribe();

    let signer = machine.clone();
    let task = tokio::spawn(async move {
        signer
            .sign_in("alice@school.org", SecretString::from(PASSWORD.to_string()))
            .await
    });

    let state = wait_for(&mut rx, |state| state.user.is_some()).await?;
    assert!(state.profile.is_none(), "profile must never precede its user");

    gate.notify_one();
    let signed_in = task.await??;
    assert_eq!(signed_in.id, ALICE);

    let state = wait_for(&mut rx, |state| state.profile.is_some() && !state.is_loading).await?;
    assert_eq!(state.profile.as_ref().map(|p| p.role), Some(Role::Teacher));
    assert_eq!(landing_route(&state), Route::Dashboard);
    Ok(())
}

#[tokio::test]
async fn sign_in_rejects_bad_credentials_and_clears_loading() -> Result<()> {
    let gateway = StubGateway::new();
    gateway.grant("alice@school.org", session_for(ALICE, "alice@school.org"));

    let machine = SessionMachine::new(gateway, StubProfiles::new());
    let result = machine
        .sign_in("alice@school.org", SecretString::from("wrong".to_string()))
        .await;

    assert!(matches!(result, Err(SessionError::Authentication(_))));
    let state = machine.snapshot();
    assert!(state.user.is_none());
    assert!(!state.is_loading);
    Ok(())
}

#[tokio::test]
async fn sign_in_keeps_the_user_when_the_profile_fetch_fails() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.grant("alice@school.org", session_for(ALICE, "alice@school.org"));
    profiles.fail_next_fetches(1);

    let machine = SessionMachine::new(gateway, profiles);
    let signed_in = machine
        .sign_in("alice@school.org", SecretString::from(PASSWORD.to_string()))
        .await?;
    assert_eq!(signed_in.id, ALICE);

    let state = machine.snapshot();
    assert!(state.user.is_some());
    assert!(state.profile.is_none());
    assert!(!state.is_loading);
    // An unscoped guard still renders for a profile-less session.
    assert_eq!(guard::evaluate(&state, None), GuardDecision::Render);
    Ok(())
}

#[tokio::test]
async fn a_stale_profile_fetch_is_discarded() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.set_current(Some(session_for(ALICE, "alice@school.org")));
    gateway.grant("bob@school.org", session_for(BOB, "bob@school.org"));
    profiles.seed(profile(ALICE, "alice@school.org", Role::Admin));
    profiles.seed(profile(BOB, "bob@school.org", Role::Teacher));
    let alice_gate = profiles.gate(ALICE);

    let machine = SessionMachine::new(gateway, profiles);
    let mut rx = machine.subscribe();

    // Alice's bootstrap parks inside her profile fetch.
    let boot = machine.clone();
    let task = tokio::spawn(async move { boot.bootstrap().await });
    wait_for(&mut rx, |state| {
        state.user.as_ref().is_some_and(|u| u.id == ALICE) && !state.is_loading
    })
    .await?;

    // Bob signs in while Alice's fetch is still parked.
    machine
        .sign_in("bob@school.org", SecretString::from(PASSWORD.to_string()))
        .await?;

    // Alice's fetch now completes, after the session moved on. Its result
    // must be discarded.
    alice_gate.notify_one();
    task.await?;

    let state = machine.snapshot();
    assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some(BOB));
    assert_eq!(state.profile.as_ref().map(|p| p.id.as_str()), Some(BOB));
    assert_eq!(state.profile.as_ref().map(|p| p.role), Some(Role::Teacher));
    Ok(())
}

#[tokio::test]
async fn switching_users_never_exposes_the_previous_profile() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.set_current(Some(session_for(ALICE, "alice@school.org")));
    profiles.seed(profile(ALICE, "alice@school.org", Role::Admin));
    profiles.seed(profile(BOB, "bob@school.org", Role::Teacher));
    let bob_gate = profiles.gate(BOB);

    let machine = SessionMachine::new(gateway.clone(), profiles);
    machine.bootstrap().await;
    assert_eq!(
        machine.snapshot().profile.as_ref().map(|p| p.role),
        Some(Role::Admin)
    );

    let listener = machine.clone();
    let listen_task = tokio::spawn(async move { listener.listen().await });
    let mut rx = machine.subscribe();

    gateway.emit(SessionEvent::SignedIn(session_for(BOB, "bob@school.org")));

    // Bob's user lands first; Alice's profile must already be gone even
    // though Bob's is still behind the gate.
    let state = wait_for(&mut rx, |state| {
        state.user.as_ref().is_some_and(|u| u.id == BOB)
    })
    .await?;
    assert!(state.profile.is_none());

    bob_gate.notify_one();
    let state = wait_for(&mut rx, |state| state.profile.is_some()).await?;
    assert_eq!(state.profile.as_ref().map(|p| p.id.as_str()), Some(BOB));

    listen_task.abort();
    Ok(())
}

#[tokio::test]
async fn sign_out_clears_state_even_when_the_remote_call_fails() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.set_current(Some(session_for(ALICE, "alice@school.org")));
    profiles.seed(profile(ALICE, "alice@school.org", Role::Teacher));

    let machine = SessionMachine::new(gateway.clone(), profiles);
    machine.bootstrap().await;
    assert!(machine.snapshot().user.is_some());

    gateway.fail_sign_out();
    let result = machine.sign_out().await;
    assert!(result.is_err());

    let state = machine.snapshot();
    assert!(state.user.is_none());
    assert!(state.profile.is_none());
    assert!(!state.is_loading);
    Ok(())
}

#[tokio::test]
async fn sign_up_without_a_session_requires_confirmation() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.on_sign_up(Ok(ProvisionedAccount {
        user: user(BOB, "bob@school.org"),
        session: None,
    }));

    let machine = SessionMachine::new(gateway, profiles.clone());
    let registration = machine.sign_up(account("bob@school.org", Role::Admin)).await?;

    assert!(registration.requires_email_confirmation);
    assert_eq!(registration.user.id, BOB);
    // The profile row exists, but bob is not signed in and cannot reach
    // the admin tier until a later successful sign-in.
    assert_eq!(profiles.row(BOB).map(|p| p.role), Some(Role::Admin));
    let state = machine.snapshot();
    assert!(state.user.is_none());
    assert_eq!(
        guard::evaluate(&state, Some(Role::Admin)),
        GuardDecision::Redirect(Route::Login)
    );
    Ok(())
}

#[tokio::test]
async fn sign_up_with_a_session_is_active_immediately() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.on_sign_up(Ok(ProvisionedAccount {
        user: user(ALICE, "alice@school.org"),
        session: Some(session_for(ALICE, "alice@school.org")),
    }));

    let machine = SessionMachine::new(gateway.clone(), profiles);
    let registration = machine
        .sign_up(account("alice@school.org", Role::Teacher))
        .await?;

    assert!(!registration.requires_email_confirmation);
    let state = machine.snapshot();
    assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some(ALICE));
    assert_eq!(state.profile.as_ref().map(|p| p.role), Some(Role::Teacher));
    assert_eq!(landing_route(&state), Route::Dashboard);

    // A later fresh sign-in resolves the same role and landing.
    machine.sign_out().await?;
    gateway.grant("alice@school.org", session_for(ALICE, "alice@school.org"));
    machine
        .sign_in("alice@school.org", SecretString::from(PASSWORD.to_string()))
        .await?;
    let state = machine.snapshot();
    assert_eq!(state.profile.as_ref().map(|p| p.role), Some(Role::Teacher));
    assert_eq!(target_route_for(state.resolved_role()), Route::Dashboard);
    Ok(())
}

#[tokio::test]
async fn sign_up_retries_a_conflicting_insert_as_an_update() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    // A previous partial attempt left a stale row behind.
    profiles.seed(profile(BOB, "bob@school.org", Role::Teacher));
    profiles.fail_insert_with(StoreError::Conflict("user_profiles".to_string()));
    gateway.on_sign_up(Ok(ProvisionedAccount {
        user: user(BOB, "bob@school.org"),
        session: None,
    }));

    let machine = SessionMachine::new(gateway, profiles.clone());
    let registration = machine.sign_up(account("bob@school.org", Role::Admin)).await?;

    assert!(registration.requires_email_confirmation);
    let updates = profiles.recorded_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, BOB);
    assert_eq!(updates[0].1.role, Some(Role::Admin));
    assert_eq!(profiles.row(BOB).map(|p| p.role), Some(Role::Admin));
    Ok(())
}

#[tokio::test]
async fn sign_up_surfaces_profile_creation_failures() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    profiles.fail_insert_with(StoreError::Backend("permission denied".to_string()));
    gateway.on_sign_up(Ok(ProvisionedAccount {
        user: user(BOB, "bob@school.org"),
        session: None,
    }));

    let machine = SessionMachine::new(gateway, profiles);
    let result = machine.sign_up(account("bob@school.org", Role::Teacher)).await;

    match result {
        Err(SessionError::ProfileCreation { user_id, .. }) => assert_eq!(user_id, BOB),
        other => panic!("expected ProfileCreation, got {other:?}"),
    }
    assert!(!machine.snapshot().is_loading);
    Ok(())
}

#[tokio::test]
async fn refresh_profile_reports_found_and_is_idempotent() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.set_current(Some(session_for(ALICE, "alice@school.org")));
    profiles.seed(profile(ALICE, "alice@school.org", Role::Teacher));

    let machine = SessionMachine::new(gateway, profiles.clone());
    machine.bootstrap().await;

    assert!(machine.refresh_profile(ALICE).await);
    let first = machine.snapshot().profile;
    assert!(machine.refresh_profile(ALICE).await);
    assert_eq!(machine.snapshot().profile, first);

    // Unknown ids and backend failures both report false, never raise.
    assert!(!machine.refresh_profile("no-such-user").await);
    profiles.fail_next_fetches(1);
    assert!(!machine.refresh_profile(ALICE).await);
    assert_eq!(machine.snapshot().profile, first);
    Ok(())
}

#[tokio::test]
async fn the_listener_applies_remote_sign_in_and_sign_out() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    profiles.seed(profile(ALICE, "alice@school.org", Role::Principal));

    let machine = SessionMachine::new(gateway.clone(), profiles);
    machine.bootstrap().await;
    let listener = machine.clone();
    let listen_task = tokio::spawn(async move { listener.listen().await });
    let mut rx = machine.subscribe();

    // Another tab signs in.
    gateway.emit(SessionEvent::SignedIn(session_for(
        ALICE,
        "alice@school.org",
    )));
    let state = wait_for(&mut rx, |state| state.profile.is_some()).await?;
    assert_eq!(state.profile.as_ref().map(|p| p.role), Some(Role::Principal));
    assert_eq!(landing_route(&state), Route::AdminHome);

    // And signs out again.
    gateway.emit(SessionEvent::SignedOut);
    let state = wait_for(&mut rx, |state| state.user.is_none()).await?;
    assert!(state.profile.is_none());

    listen_task.abort();
    Ok(())
}

#[tokio::test]
async fn duplicate_session_events_converge_on_one_state() -> Result<()> {
    let gateway = StubGateway::new();
    let profiles = StubProfiles::new();
    gateway.grant("alice@school.org", session_for(ALICE, "alice@school.org"));
    profiles.seed(profile(ALICE, "alice@school.org", Role::Teacher));

    let machine = SessionMachine::new(gateway.clone(), profiles);
    let listener = machine.clone();
    let listen_task = tokio::spawn(async move { listener.listen().await });
    let mut rx = machine.subscribe();

    // The imperative sign-in and the listener race to apply the same
    // session; both writes are idempotent.
    machine
        .sign_in("alice@school.org", SecretString::from(PASSWORD.to_string()))
        .await?;
    let settled = wait_for(&mut rx, |state| {
        state.profile.is_some() && !state.is_loading
    })
    .await?;

    // A replayed refresh event changes nothing.
    gateway.emit(SessionEvent::Refreshed(session_for(
        ALICE,
        "alice@school.org",
    )));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(machine.snapshot(), settled);

    listen_task.abort();
    Ok(())
}
