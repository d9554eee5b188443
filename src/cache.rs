//! Per-widget result cache
//!
//! Payloads are stored under a normalized form of the query string so that
//! keys stay safe for path-style addressing.

pub mod key;
pub mod result_cache;

pub use key::{CacheKey, normalize};
pub use result_cache::ResultCache;
