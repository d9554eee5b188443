use std::io;

use thiserror::Error;

/// Errors surfaced to the host by the search core
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Query {query:?} is too short (minimum {min_length} characters)")]
    QueryTooShort { query: String, min_length: usize },

    #[error("Search for {query:?} failed: {source}")]
    FetchFailed {
        query: String,
        #[source]
        source: FetchError,
    },

    #[error("No search endpoint configured.\n\nPass --endpoint or set `endpoint` in ~/.config/hyper-search/config.toml")]
    MissingEndpoint,

    #[error("Search worker disconnected")]
    WorkerDisconnected,
}

/// Errors produced by a search backend while performing a lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status
    #[error("Endpoint returned {code}: {message}")]
    Status { code: u16, message: String },

    /// The response body was not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// The backend's future panicked
    #[error("Backend panicked: {0}")]
    Panicked(String),

    /// The request was aborted because the widget was torn down
    #[error("Request cancelled")]
    Cancelled,
}

impl SearchError {
    /// Query that produced this error, if any
    pub fn query(&self) -> Option<&str> {
        match self {
            SearchError::QueryTooShort { query, .. } | SearchError::FetchFailed { query, .. } => {
                Some(query)
            }
            SearchError::MissingEndpoint | SearchError::WorkerDisconnected => None,
        }
    }
}

/// Failures of the command-line host
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Unknown command {0:?}. Try :select N, :clear, :evict QUERY or :flush")]
    InvalidCommand(String),

    #[error("No result at index {0}")]
    NoSuchResult(usize),

    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),
}
