//! Shared frontend utilities: configuration and build metadata.
//!
//! Configuration is resolved at build time from `REGISTRO_*` environment
//! variables with an optional `window.REGISTRO_CONFIG` runtime override, so
//! a static deployment can point at another backend without rebuilding.
//! Session handling itself lives in `features::auth`; this module stays free
//! of any authentication logic.

pub(crate) mod build_info;
pub(crate) mod config;
