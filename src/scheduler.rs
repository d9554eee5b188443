//! Input scheduling
//!
//! Decides when an input value should reach the fetch coordinator. Two
//! policies are available and exactly one is active per widget:
//! - debounce (the leading call of a burst fires, the rest are swallowed)
//! - idle mode (wait the full idle time, then fire only if still current)

pub mod clock;
pub mod debouncer;
pub mod idle;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debouncer::Debouncer;
pub use idle::IdleScheduler;

use crate::config::SearchConfig;

/// The active scheduling policy for a widget
#[derive(Debug)]
pub enum Scheduler {
    Debounce(Debouncer),
    Idle(IdleScheduler),
}

impl Scheduler {
    pub fn from_config(config: &SearchConfig) -> Self {
        if config.idle_enabled {
            Scheduler::Idle(IdleScheduler::new(config.idle_time))
        } else {
            Scheduler::Debounce(Debouncer::new(config.debounce_rate))
        }
    }

    /// Feed an input value, returning it if it should be fetched right away.
    ///
    /// Idle mode trims the value and never fires immediately.
    pub fn submit_at(&mut self, value: &str, now: u64) -> Option<String> {
        match self {
            Scheduler::Debounce(debouncer) => debouncer.call_at(value, now),
            Scheduler::Idle(idle) => {
                idle.record_at(value.trim(), now);
                None
            }
        }
    }

    /// Values whose timers are due at `now`, in firing order.
    ///
    /// The debouncer arms no timers, so only idle mode returns anything.
    pub fn poll_at(&mut self, now: u64) -> Vec<String> {
        match self {
            Scheduler::Debounce(_) => Vec::new(),
            Scheduler::Idle(idle) => idle.poll_at(now),
        }
    }

    pub fn has_pending(&self) -> bool {
        match self {
            Scheduler::Debounce(_) => false,
            Scheduler::Idle(idle) => idle.has_pending(),
        }
    }

    /// Next time `poll_at` can return something
    pub fn deadline(&self) -> Option<u64> {
        match self {
            Scheduler::Debounce(_) => None,
            Scheduler::Idle(idle) => idle.deadline(),
        }
    }

    pub fn is_idle_mode(&self) -> bool {
        matches!(self, Scheduler::Idle(_))
    }
}
