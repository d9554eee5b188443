/// Leading-edge debouncer.
///
/// The first call after a quiet period fires immediately and opens a window
/// of `rate_ms`. Calls inside the window are swallowed and push the window
/// end out to `now + rate_ms`, so a burst of calls fires exactly once.
#[derive(Debug)]
pub struct Debouncer {
    /// Debounce rate in milliseconds
    rate_ms: u64,
    /// End of the current window, if one has been opened
    window_end: Option<u64>,
    /// Calls swallowed by the current window
    suppressed: usize,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Debouncer {
    pub fn new(rate_ms: u64) -> Self {
        Self {
            rate_ms,
            window_end: None,
            suppressed: 0,
        }
    }

    /// Register a call at `now`.
    ///
    /// Returns the value when the call opens a new window, `None` when an
    /// open window swallowed it.
    pub fn call_at(&mut self, value: &str, now: u64) -> Option<String> {
        let window_open = self.is_window_open(now);
        self.window_end = Some(now.saturating_add(self.rate_ms));

        if window_open {
            self.suppressed += 1;
            None
        } else {
            self.suppressed = 0;
            Some(value.to_string())
        }
    }

    /// Whether a call at `now` would be swallowed
    pub fn is_window_open(&self, now: u64) -> bool {
        self.window_end.is_some_and(|end| now < end)
    }

    /// Time at which the current window closes
    pub fn window_end(&self) -> Option<u64> {
        self.window_end
    }

    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    pub fn rate_ms(&self) -> u64 {
        self.rate_ms
    }
}

#[cfg(test)]
#[path = "debouncer_tests.rs"]
mod debouncer_tests;
