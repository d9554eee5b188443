//! hyper-search library - debounced, cached search input core
//!
//! Turns a stream of input values into at most one lookup per settled value,
//! caches payloads by normalized query, and reports results, selections and
//! loading state to a host-supplied handler.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod scheduler;
pub mod sink;
pub mod widget;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use cache::{CacheKey, ResultCache, normalize};
pub use config::SearchConfig;
pub use error::{FetchError, HostError, SearchError};
pub use fetch::{FnBackend, HttpBackend, SearchBackend};
pub use scheduler::{Clock, ManualClock, SystemClock};
pub use sink::{Callbacks, NoopHandler, ResultSet, SearchHandler, display_label};
pub use widget::{Dispatch, IdlePhase, SearchWidget};
