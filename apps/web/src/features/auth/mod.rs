//! Session feature wiring the shared state machine into Leptos. The
//! provider owns the machine and the backend handle; guards and routes read
//! the published snapshots through context. Access rules here shape the UI
//! only; the backend enforces real authorization on every request.

mod guards;
pub(crate) mod state;

pub(crate) use guards::{RequireAdmin, RequireAuth};
