//! Cache key normalization

use std::fmt;

/// Character that would be read as a path separator by key-path lookups
const UNSAFE_CHAR: char = '.';

/// Replacement written in place of [`UNSAFE_CHAR`]
const SAFE_CHAR: &str = "-";

/// Normalized, path-safe form of a query string.
///
/// Normalization substitutes rather than escapes, so `"a.b"` and `"a-b"`
/// share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(query: &str) -> Self {
        normalize(query)
    }
}

/// Derive the cache key for a query.
///
/// Length-preserving, so a non-blank query never yields a blank key.
pub fn normalize(query: &str) -> CacheKey {
    CacheKey(query.replace(UNSAFE_CHAR, SAFE_CHAR))
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod key_tests;
