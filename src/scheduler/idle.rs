//! Idle-mode scheduling
//!
//! Every input arms a timer that captures the value it was armed with. When
//! the timer comes due it only fires if no newer value has been recorded
//! since; otherwise it is dropped.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
struct IdleTimer {
    due: u64,
    value: String,
}

/// Delay-then-verify scheduler keyed on the latest recorded value
#[derive(Debug)]
pub struct IdleScheduler {
    idle_ms: u64,
    latest_value: Option<String>,
    /// Armed timers in due order
    timers: VecDeque<IdleTimer>,
}

impl Default for IdleScheduler {
    fn default() -> Self {
        Self::new(300)
    }
}

impl IdleScheduler {
    pub fn new(idle_ms: u64) -> Self {
        Self {
            idle_ms,
            latest_value: None,
            timers: VecDeque::new(),
        }
    }

    /// Record `value` as the latest input and arm a check `idle_ms` from now
    pub fn record_at(&mut self, value: &str, now: u64) {
        self.latest_value = Some(value.to_string());
        self.timers.push_back(IdleTimer {
            due: now.saturating_add(self.idle_ms),
            value: value.to_string(),
        });
    }

    /// Expire due timers, returning the values that are still current
    pub fn poll_at(&mut self, now: u64) -> Vec<String> {
        let mut fired = Vec::new();
        while self.timers.front().is_some_and(|timer| timer.due <= now) {
            let Some(timer) = self.timers.pop_front() else {
                break;
            };
            if self.latest_value.as_deref() == Some(timer.value.as_str()) {
                fired.push(timer.value);
            } else {
                #[cfg(debug_assertions)]
                log::debug!("Idle timer for {:?} superseded", timer.value);
            }
        }
        fired
    }

    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Due time of the earliest armed timer
    pub fn deadline(&self) -> Option<u64> {
        self.timers.front().map(|timer| timer.due)
    }

    pub fn latest_value(&self) -> Option<&str> {
        self.latest_value.as_deref()
    }

    pub fn idle_ms(&self) -> u64 {
        self.idle_ms
    }
}

#[cfg(test)]
#[path = "idle_tests.rs"]
mod idle_tests;
