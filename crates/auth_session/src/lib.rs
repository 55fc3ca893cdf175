//! Session, role, and guard logic for the Registro frontend.
//!
//! The [`machine::SessionMachine`] owns the only shared mutable session
//! state and publishes snapshots through a watch channel; everything else
//! here is pure functions over those snapshots. Identity and profile
//! backends plug in through the [`contract`] traits.

pub mod contract;
pub mod error;
pub mod guard;
pub mod machine;
pub mod routing;
pub mod state;

pub use contract::{
    AuthenticatedUser, IdentityProvider, NewAccount, NewProfile, ProfileChanges, ProfileStore,
    ProvisionedAccount, Session, SessionEvent, UserProfile,
};
pub use error::{SessionError, StoreError};
pub use guard::GuardDecision;
pub use machine::{Registration, SessionMachine};
pub use routing::{landing_route, resolve_role, target_route_for, Role, Route};
pub use state::SessionState;
