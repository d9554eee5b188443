//! Fetch coordination
//!
//! Turns a query into either a cache hit or a backend request, and folds
//! backend completions back into the cache. Every accepted fetch gets a
//! request id so callers can tell which completion is the most recent.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError, channel};
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;

use super::backend::SearchBackend;
use super::types::{FetchOutcome, FetchRequest, FetchResponse, Settled, WORKER_REQUEST_ID};
use super::worker::spawn_worker;
use crate::cache::{ResultCache, normalize};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::sink::SearchHandler;

/// Cache-first lookup driver for one widget
pub struct FetchCoordinator {
    cache: ResultCache,
    min_query_length: usize,

    /// Channel to send requests to the worker
    request_tx: Option<UnboundedSender<FetchRequest>>,
    /// Channel to receive responses from the worker
    response_rx: Option<Receiver<FetchResponse>>,
    /// Stops the worker and aborts its lookups
    cancel_token: CancellationToken,

    /// Next request ID (starts at 1, 0 reserved for worker errors)
    next_request_id: u64,
    /// Most recently issued request ID
    latest_request_id: Option<u64>,
    /// Requests sent to the worker that have not settled
    in_flight: HashSet<u64>,
}

impl FetchCoordinator {
    /// Create a coordinator and spawn its worker.
    ///
    /// A missing endpoint is passed to the backend as an empty string.
    pub fn new(config: &SearchConfig, backend: Arc<dyn SearchBackend>) -> Self {
        let (request_tx, request_rx) = unbounded_channel();
        let (response_tx, response_rx) = channel();
        let cancel_token = CancellationToken::new();

        spawn_worker(
            backend,
            config.endpoint.clone().unwrap_or_default(),
            request_rx,
            response_tx,
            cancel_token.clone(),
        );

        Self {
            cache: ResultCache::new(),
            min_query_length: config.min_query_length,
            request_tx: Some(request_tx),
            response_rx: Some(response_rx),
            cancel_token,
            next_request_id: 1,
            latest_request_id: None,
            in_flight: HashSet::new(),
        }
    }

    /// Look up `query`, serving from cache when possible.
    ///
    /// Blank or short queries are rejected before anything else happens.
    /// Otherwise loading starts; a hit ends it again immediately, a miss
    /// leaves it running until the worker's response is polled.
    pub fn fetch(
        &mut self,
        query: &str,
        handler: &mut dyn SearchHandler,
    ) -> Result<FetchOutcome, SearchError> {
        if query.trim().is_empty() || query.chars().count() < self.min_query_length {
            return Err(SearchError::QueryTooShort {
                query: query.to_string(),
                min_length: self.min_query_length,
            });
        }

        let request_id = self.allocate_request_id();
        handler.loading_changed(true);

        let key = normalize(query);
        if let Some(payload) = self.cache.get_present(&key) {
            #[cfg(debug_assertions)]
            log::debug!("Cache hit for {:?} (request {})", key.as_str(), request_id);
            let payload = payload.clone();
            handler.loading_changed(self.is_pending());
            return Ok(FetchOutcome::Ready {
                request_id,
                payload,
            });
        }

        #[cfg(debug_assertions)]
        log::debug!("Cache miss for {:?}, sending request {}", key.as_str(), request_id);

        let Some(tx) = self.request_tx.as_ref() else {
            handler.loading_changed(self.is_pending());
            return Err(SearchError::WorkerDisconnected);
        };

        let request = FetchRequest {
            query: query.to_string(),
            request_id,
        };
        if tx.send(request).is_err() {
            log::error!("Fetch worker disconnected - send failed");
            self.disconnect();
            handler.loading_changed(self.is_pending());
            return Err(SearchError::WorkerDisconnected);
        }

        self.in_flight.insert(request_id);
        Ok(FetchOutcome::Pending { request_id })
    }

    /// Drain every response the worker has produced so far (non-blocking)
    pub fn poll_responses(&mut self, handler: &mut dyn SearchHandler) -> Vec<Settled> {
        let mut settled = Vec::new();

        // Take the receiver temporarily to avoid borrow checker issues
        let Some(rx) = self.response_rx.take() else {
            return settled;
        };

        loop {
            match rx.try_recv() {
                Ok(response) => settled.extend(self.process_response(response, handler)),
                Err(TryRecvError::Empty) => {
                    self.response_rx = Some(rx);
                    break;
                }
                Err(TryRecvError::Disconnected) => {
                    settled.extend(self.handle_disconnect(handler));
                    break;
                }
            }
        }

        settled
    }

    /// Block until one request settles or `timeout` passes
    pub fn wait_response(
        &mut self,
        timeout: Duration,
        handler: &mut dyn SearchHandler,
    ) -> Option<Settled> {
        let deadline = Instant::now() + timeout;
        let rx = self.response_rx.take()?;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(response) => {
                    if let Some(settled) = self.process_response(response, handler) {
                        self.response_rx = Some(rx);
                        break Some(settled);
                    }
                    // Cancelled responses settle nothing; keep waiting
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.response_rx = Some(rx);
                    break None;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    break self.handle_disconnect(handler);
                }
            }
        }
    }

    /// Apply one worker response to the cache and pending state
    fn process_response(
        &mut self,
        response: FetchResponse,
        handler: &mut dyn SearchHandler,
    ) -> Option<Settled> {
        match response {
            FetchResponse::Success {
                payload,
                query,
                request_id,
            } => {
                if !self.in_flight.remove(&request_id) {
                    #[cfg(debug_assertions)]
                    log::debug!("Ignoring success for unknown request {}", request_id);
                    return None;
                }
                self.cache.put(normalize(&query), payload.clone());
                handler.loading_changed(self.is_pending());
                Some(Settled::Success {
                    request_id,
                    query,
                    payload,
                })
            }
            FetchResponse::Error {
                error,
                query,
                request_id,
            } => {
                // Worker-level errors always apply
                if request_id != WORKER_REQUEST_ID && !self.in_flight.remove(&request_id) {
                    #[cfg(debug_assertions)]
                    log::debug!("Ignoring error for unknown request {}", request_id);
                    return None;
                }
                handler.loading_changed(self.is_pending());
                Some(Settled::Failure {
                    request_id,
                    error: SearchError::FetchFailed {
                        query,
                        source: error,
                    },
                })
            }
            FetchResponse::Cancelled { request_id } => {
                if self.in_flight.remove(&request_id) {
                    handler.loading_changed(self.is_pending());
                }
                None
            }
        }
    }

    fn handle_disconnect(&mut self, handler: &mut dyn SearchHandler) -> Option<Settled> {
        log::error!("Fetch worker disconnected");
        let had_in_flight = self.is_pending();
        self.disconnect();

        if !had_in_flight {
            return None;
        }
        handler.loading_changed(false);
        Some(Settled::Failure {
            request_id: WORKER_REQUEST_ID,
            error: SearchError::WorkerDisconnected,
        })
    }

    fn disconnect(&mut self) {
        self.request_tx = None;
        self.response_rx = None;
        self.in_flight.clear();
    }

    fn allocate_request_id(&mut self) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);

        // Skip 0 on wrap (reserved for worker errors)
        if self.next_request_id == WORKER_REQUEST_ID {
            self.next_request_id = 1;
        }

        self.latest_request_id = Some(request_id);
        request_id
    }

    /// Whether `request_id` is the most recently issued fetch
    pub fn is_latest(&self, request_id: u64) -> bool {
        self.latest_request_id == Some(request_id)
    }

    pub fn latest_request_id(&self) -> Option<u64> {
        self.latest_request_id
    }

    /// Check if any request is waiting on the backend
    pub fn is_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Evict the entry for `query` (normalized)
    pub fn remove_from_cache(&mut self, query: &str) {
        self.cache.evict(&normalize(query));
    }

    pub fn remove_all_from_cache(&mut self) {
        self.cache.clear();
    }

    pub fn min_query_length(&self) -> usize {
        self.min_query_length
    }

    /// Stop the worker and forget in-flight requests.
    ///
    /// Their results are never applied.
    pub fn shutdown(&mut self) {
        self.cancel_token.cancel();
        self.disconnect();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl Drop for FetchCoordinator {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod coordinator_tests;
