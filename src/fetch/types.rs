//! Fetch Worker Types
//!
//! Messages exchanged between the coordinator and the background worker,
//! plus the outcomes the coordinator hands back to its caller.

use serde_json::Value;

use crate::error::{FetchError, SearchError};

/// Request id reserved for worker-level failures
pub const WORKER_REQUEST_ID: u64 = 0;

/// Request to look up a query through the backend
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Raw query as typed
    pub query: String,
    /// Unique ID for tracking this request
    pub request_id: u64,
}

/// Response from the worker
#[derive(Debug)]
pub enum FetchResponse {
    /// Backend returned a payload
    Success {
        payload: Value,
        query: String,
        request_id: u64,
    },
    /// Backend failed
    Error {
        error: FetchError,
        query: String,
        /// Note: request_id = 0 indicates a worker-level error
        request_id: u64,
    },
    /// Request was aborted by teardown
    Cancelled { request_id: u64 },
}

/// Immediate result of [`FetchCoordinator::fetch`](super::FetchCoordinator::fetch)
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Served from cache; nothing was sent to the backend
    Ready { request_id: u64, payload: Value },
    /// Sent to the backend; the result arrives as a [`Settled`]
    Pending { request_id: u64 },
}

impl FetchOutcome {
    pub fn request_id(&self) -> u64 {
        match self {
            FetchOutcome::Ready { request_id, .. } | FetchOutcome::Pending { request_id } => {
                *request_id
            }
        }
    }
}

/// A backend request that has finished
#[derive(Debug)]
pub enum Settled {
    Success {
        request_id: u64,
        query: String,
        payload: Value,
    },
    Failure {
        request_id: u64,
        error: SearchError,
    },
}

impl Settled {
    pub fn request_id(&self) -> u64 {
        match self {
            Settled::Success { request_id, .. } | Settled::Failure { request_id, .. } => {
                *request_id
            }
        }
    }
}
