//! Report bookkeeping shared by the dashboard views: pure filtering and
//! summary counts, kept testable off the DOM.

pub(crate) mod filters;
pub(crate) mod stats;
