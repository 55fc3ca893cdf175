//! Domain-level frontend features and their shared logic. Routes import
//! these modules to keep view code focused; session handling and report
//! bookkeeping live here rather than in the pages that render them.

#[cfg(target_arch = "wasm32")]
pub(crate) mod auth;
pub(crate) mod reports;
