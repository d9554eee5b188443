//! Shared test utilities for hyper-search
//!
//! This module provides a scriptable backend and a recording handler used
//! across the coordinator and widget tests.

#[cfg(test)]
pub mod test_helpers {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use serde_json::{Value, json};

    use crate::error::FetchError;
    use crate::fetch::SearchBackend;
    use crate::sink::SearchHandler;

    /// Shared record of the lookups a [`MockBackend`] has received
    #[derive(Debug, Clone, Default)]
    pub struct CallLog(Arc<Mutex<Vec<(String, String)>>>);

    impl CallLog {
        pub fn count(&self) -> usize {
            self.0.lock().map(|calls| calls.len()).unwrap_or(0)
        }

        pub fn queries(&self) -> Vec<String> {
            self.0
                .lock()
                .map(|calls| calls.iter().map(|(_, q)| q.clone()).collect())
                .unwrap_or_default()
        }

        pub fn endpoints(&self) -> Vec<String> {
            self.0
                .lock()
                .map(|calls| calls.iter().map(|(e, _)| e.clone()).collect())
                .unwrap_or_default()
        }

        fn record(&self, endpoint: &str, query: &str) {
            if let Ok(mut calls) = self.0.lock() {
                calls.push((endpoint.to_string(), query.to_string()));
            }
        }
    }

    /// Backend answering from fixtures, optionally after a delay.
    ///
    /// In echo mode unknown queries resolve to the query string itself;
    /// otherwise they fail with a 404.
    #[derive(Debug, Default)]
    pub struct MockBackend {
        responses: HashMap<String, Value>,
        failures: HashMap<String, FetchError>,
        delays: HashMap<String, u64>,
        panics: Vec<String>,
        echo: bool,
        calls: CallLog,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn echo() -> Self {
            Self {
                echo: true,
                ..Self::default()
            }
        }

        pub fn with_response(mut self, query: &str, payload: Value) -> Self {
            self.responses.insert(query.to_string(), payload);
            self
        }

        pub fn with_failure(mut self, query: &str, error: FetchError) -> Self {
            self.failures.insert(query.to_string(), error);
            self
        }

        pub fn with_delay(mut self, query: &str, delay_ms: u64) -> Self {
            self.delays.insert(query.to_string(), delay_ms);
            self
        }

        /// Make the lookup future for `query` panic when polled
        pub fn with_panic(mut self, query: &str) -> Self {
            self.panics.push(query.to_string());
            self
        }

        pub fn call_log(&self) -> CallLog {
            self.calls.clone()
        }
    }

    impl SearchBackend for MockBackend {
        fn request(
            &self,
            endpoint: &str,
            query: &str,
        ) -> BoxFuture<'static, Result<Value, FetchError>> {
            self.calls.record(endpoint, query);

            let delay = self.delays.get(query).copied().unwrap_or(0);
            let panics = self.panics.iter().any(|q| q == query);
            let result = if let Some(error) = self.failures.get(query) {
                Err(error.clone())
            } else if let Some(payload) = self.responses.get(query) {
                Ok(payload.clone())
            } else if self.echo {
                Ok(json!(query))
            } else {
                Err(FetchError::Status {
                    code: 404,
                    message: format!("no fixture for {:?}", query),
                })
            };

            async move {
                if delay > 0 {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                if panics {
                    panic!("mock backend told to panic");
                }
                result
            }
            .boxed()
        }
    }

    /// Everything a [`RecordingHandler`] has been told
    #[derive(Debug, Default)]
    pub struct HandlerLog {
        pub results: Vec<Vec<Value>>,
        pub selections: Vec<Value>,
        pub loading: Vec<bool>,
    }

    /// Handler that appends every event to a shared [`HandlerLog`]
    #[derive(Debug, Clone, Default)]
    pub struct RecordingHandler {
        log: Rc<RefCell<HandlerLog>>,
    }

    impl RecordingHandler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn log(&self) -> std::cell::Ref<'_, HandlerLog> {
            self.log.borrow()
        }

        pub fn last_loading(&self) -> Option<bool> {
            self.log.borrow().loading.last().copied()
        }
    }

    impl SearchHandler for RecordingHandler {
        fn results_changed(&mut self, results: &[Value]) {
            self.log.borrow_mut().results.push(results.to_vec());
        }

        fn selection_changed(&mut self, record: &Value) {
            self.log.borrow_mut().selections.push(record.clone());
        }

        fn loading_changed(&mut self, is_loading: bool) {
            self.log.borrow_mut().loading.push(is_loading);
        }
    }
}
