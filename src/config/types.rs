// Configuration type definitions

use serde::Deserialize;

/// Default minimum query length before a lookup is attempted
fn default_min_query_length() -> usize {
    3
}

/// Default idle-mode delay in milliseconds
fn default_idle_time() -> u64 {
    300
}

/// Search widget configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters) are rejected without a lookup
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
    /// Trailing debounce rate in milliseconds (0 disables coalescing)
    #[serde(default)]
    pub debounce_rate: u64,
    /// Use idle mode instead of the trailing debounce
    #[serde(default)]
    pub idle_enabled: bool,
    /// Idle-mode delay in milliseconds
    #[serde(default = "default_idle_time")]
    pub idle_time: u64,
    /// Endpoint queried by the default HTTP backend
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Record field the host displays; never interpreted by the core
    #[serde(default)]
    pub result_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            min_query_length: default_min_query_length(),
            debounce_rate: 0,
            idle_enabled: false,
            idle_time: default_idle_time(),
            endpoint: None,
            result_key: None,
        }
    }
}

impl SearchConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        SearchConfig {
            endpoint: Some(endpoint.into()),
            ..SearchConfig::default()
        }
    }
}
