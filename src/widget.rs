//! Search widget core
//!
//! Owns one cache, one scheduler, one fetch coordinator and one result set,
//! and wires them together:
//!
//! input → scheduler → coordinator (cache / backend) → result set → handler
//!
//! The widget is single-threaded. Hosts feed it input with [`SearchWidget::search`]
//! and call [`SearchWidget::tick`] from their event loop to fire due timers
//! and apply finished lookups.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::cache::ResultCache;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::fetch::{FetchCoordinator, FetchOutcome, HttpBackend, SearchBackend, Settled};
use crate::scheduler::{Clock, Scheduler, SystemClock};
use crate::sink::{ResultSet, SearchHandler};

/// What happened to an input or fetch call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Held back by the scheduler
    Deferred,
    /// Answered from cache and already applied
    Cached { request_id: u64 },
    /// Sent to the backend
    InFlight { request_id: u64 },
}

/// Where the widget is in the schedule → fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePhase {
    /// Nothing scheduled, nothing fetching
    Idle,
    /// A timer is armed
    TimerPending,
    /// A scheduled value is being fetched
    Fetching,
}

/// Debounced, cached search input
pub struct SearchWidget {
    config: SearchConfig,
    coordinator: FetchCoordinator,
    scheduler: Scheduler,
    clock: Box<dyn Clock>,
    handler: Box<dyn SearchHandler>,
    results: ResultSet,
    /// Request started by the most recent scheduled fire, while unsettled
    scheduled_request: Option<u64>,
    /// Failures from deferred work, handed out by the next tick
    errors: Vec<SearchError>,
    torn_down: bool,
}

impl SearchWidget {
    pub fn new(
        config: SearchConfig,
        backend: Arc<dyn SearchBackend>,
        clock: Box<dyn Clock>,
        handler: Box<dyn SearchHandler>,
    ) -> Self {
        let coordinator = FetchCoordinator::new(&config, backend);
        let scheduler = Scheduler::from_config(&config);

        #[cfg(debug_assertions)]
        log::debug!(
            "Search widget created (idle mode: {}, min length: {})",
            scheduler.is_idle_mode(),
            config.min_query_length
        );

        Self {
            config,
            coordinator,
            scheduler,
            clock,
            handler,
            results: ResultSet::new(),
            scheduled_request: None,
            errors: Vec::new(),
            torn_down: false,
        }
    }

    /// Widget using the default HTTP backend and the system clock.
    ///
    /// Fails if the config has no endpoint.
    pub fn with_http_backend(
        config: SearchConfig,
        handler: Box<dyn SearchHandler>,
    ) -> Result<Self, SearchError> {
        match config.endpoint.as_deref() {
            Some(endpoint) if !endpoint.trim().is_empty() => {}
            _ => return Err(SearchError::MissingEndpoint),
        }

        Ok(Self::new(
            config,
            Arc::new(HttpBackend::new()),
            Box::new(SystemClock::new()),
            handler,
        ))
    }

    /// Handle an input event carrying the current value.
    ///
    /// Timers that came due before this input fire first. Errors from those
    /// are returned by the next [`tick`](Self::tick).
    pub fn search(&mut self, value: &str) -> Result<Dispatch, SearchError> {
        let now = self.clock.now_ms();
        self.fire_due_timers(now);

        match self.scheduler.submit_at(value, now) {
            Some(query) => self.fetch_scheduled(&query),
            None => Ok(Dispatch::Deferred),
        }
    }

    /// Fetch `query` right away, bypassing the scheduler
    pub fn fetch(&mut self, query: &str) -> Result<Dispatch, SearchError> {
        match self.coordinator.fetch(query, &mut *self.handler)? {
            FetchOutcome::Ready {
                request_id,
                payload,
            } => {
                self.apply_results(&payload);
                Ok(Dispatch::Cached { request_id })
            }
            FetchOutcome::Pending { request_id } => Ok(Dispatch::InFlight { request_id }),
        }
    }

    /// Fire due timers and apply finished lookups.
    ///
    /// Returns every failure since the previous tick.
    pub fn tick(&mut self) -> Vec<SearchError> {
        let now = self.clock.now_ms();
        self.fire_due_timers(now);

        for settled in self.coordinator.poll_responses(&mut *self.handler) {
            self.settle(settled);
        }

        std::mem::take(&mut self.errors)
    }

    /// Block until no lookup is in flight or `timeout` passes.
    ///
    /// Does not advance or fire timers.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<SearchError> {
        let deadline = Instant::now() + timeout;

        while self.coordinator.is_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.coordinator.wait_response(remaining, &mut *self.handler) {
                Some(settled) => self.settle(settled),
                None => break,
            }
        }

        std::mem::take(&mut self.errors)
    }

    /// Report a user selection to the host
    pub fn select_result(&mut self, record: &Value) {
        self.handler.selection_changed(record);
    }

    /// Select the displayed record at `index`, if there is one
    pub fn select_index(&mut self, index: usize) -> Option<Value> {
        let record = self.results.get(index)?.clone();
        self.select_result(&record);
        Some(record)
    }

    /// Empty the displayed set and tell the host
    pub fn clear_results(&mut self) {
        self.handler.results_changed(&[]);
        self.results.clear();
    }

    pub fn remove_from_cache(&mut self, query: &str) {
        self.coordinator.remove_from_cache(query);
    }

    pub fn remove_all_from_cache(&mut self) {
        self.coordinator.remove_all_from_cache();
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn cache(&self) -> &ResultCache {
        self.coordinator.cache()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn is_loading(&self) -> bool {
        self.coordinator.is_pending()
    }

    pub fn idle_phase(&self) -> IdlePhase {
        if self.scheduler.has_pending() {
            IdlePhase::TimerPending
        } else if self.scheduled_request.is_some() {
            IdlePhase::Fetching
        } else {
            IdlePhase::Idle
        }
    }

    /// Clock time at which the next timer fires
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.deadline()
    }

    /// Whether timers or lookups are still outstanding
    pub fn has_pending_work(&self) -> bool {
        self.scheduler.has_pending() || self.coordinator.is_pending()
    }

    /// Clear the cache and stop the backend worker.
    ///
    /// Lookups still in flight are abandoned. Also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.coordinator.remove_all_from_cache();
        self.coordinator.shutdown();
        self.scheduled_request = None;
        #[cfg(debug_assertions)]
        log::debug!("Search widget torn down");
    }

    fn fire_due_timers(&mut self, now: u64) {
        for query in self.scheduler.poll_at(now) {
            #[cfg(debug_assertions)]
            log::debug!("Timer fired for {:?} at {}", query, now);
            if let Err(e) = self.fetch_scheduled(&query) {
                self.errors.push(e);
            }
        }
    }

    fn fetch_scheduled(&mut self, query: &str) -> Result<Dispatch, SearchError> {
        // A new cycle starts here even if the fetch is rejected
        self.scheduled_request = None;
        let dispatch = self.fetch(query)?;
        self.scheduled_request = match dispatch {
            Dispatch::InFlight { request_id } => Some(request_id),
            Dispatch::Cached { .. } | Dispatch::Deferred => None,
        };
        Ok(dispatch)
    }

    fn settle(&mut self, settled: Settled) {
        if self.scheduled_request == Some(settled.request_id()) || !self.coordinator.is_pending() {
            self.scheduled_request = None;
        }

        match settled {
            Settled::Success {
                request_id,
                query,
                payload,
            } => {
                if self.coordinator.is_latest(request_id) {
                    self.apply_results(&payload);
                } else {
                    #[cfg(debug_assertions)]
                    log::debug!(
                        "Dropping stale results for {:?} (request {}, latest {:?})",
                        query,
                        request_id,
                        self.coordinator.latest_request_id()
                    );
                }
            }
            Settled::Failure { error, .. } => self.errors.push(error),
        }
    }

    /// Tell the host first, then replace the displayed set
    fn apply_results(&mut self, payload: &Value) {
        let records = ResultSet::records_from(payload);
        self.handler.results_changed(&records);
        self.results.replace(records);
    }
}

impl Drop for SearchWidget {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "widget_tests.rs"]
mod widget_tests;
