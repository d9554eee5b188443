//! Fetch Module
//!
//! Cache-first lookups with the network step delegated to a pluggable
//! backend running on a background worker.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use hyper_search::fetch::{FetchCoordinator, FetchOutcome, HttpBackend};
//! use hyper_search::sink::NoopHandler;
//!
//! let config = SearchConfig::with_endpoint("https://example.com/search");
//! let mut coordinator = FetchCoordinator::new(&config, Arc::new(HttpBackend::new()));
//! let mut handler = NoopHandler;
//!
//! match coordinator.fetch("abc", &mut handler)? {
//!     FetchOutcome::Ready { payload, .. } => println!("{}", payload),
//!     FetchOutcome::Pending { request_id } => {
//!         // Later, from the event loop:
//!         for settled in coordinator.poll_responses(&mut handler) { /* ... */ }
//!     }
//! }
//! ```

pub mod backend;
pub mod coordinator;
pub mod types;
pub mod worker;

// Re-exports for convenience
pub use backend::{FnBackend, HttpBackend, SearchBackend};
pub use coordinator::FetchCoordinator;
pub use types::{FetchOutcome, FetchRequest, FetchResponse, Settled};
