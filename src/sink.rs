//! Result delivery
//!
//! The widget reports to its host through one typed interface,
//! [`SearchHandler`]. Hosts either implement the trait or build a
//! [`Callbacks`] from closures.

use serde_json::Value;

/// Host-side receiver of widget events. Every method defaults to a no-op.
pub trait SearchHandler {
    /// New results are about to replace the displayed set
    fn results_changed(&mut self, _results: &[Value]) {}

    /// The user picked a record
    fn selection_changed(&mut self, _record: &Value) {}

    /// A lookup started or finished
    fn loading_changed(&mut self, _is_loading: bool) {}
}

/// Handler that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl SearchHandler for NoopHandler {}

type ResultsCallback = Box<dyn FnMut(&[Value])>;
type SelectionCallback = Box<dyn FnMut(&Value)>;
type LoadingCallback = Box<dyn FnMut(bool)>;

/// Closure-backed [`SearchHandler`]
#[derive(Default)]
pub struct Callbacks {
    results: Option<ResultsCallback>,
    selection: Option<SelectionCallback>,
    loading: Option<LoadingCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_results_changed(mut self, f: impl FnMut(&[Value]) + 'static) -> Self {
        self.results = Some(Box::new(f));
        self
    }

    pub fn on_selection_changed(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.selection = Some(Box::new(f));
        self
    }

    pub fn on_loading_changed(mut self, f: impl FnMut(bool) + 'static) -> Self {
        self.loading = Some(Box::new(f));
        self
    }
}

impl SearchHandler for Callbacks {
    fn results_changed(&mut self, results: &[Value]) {
        if let Some(f) = self.results.as_mut() {
            f(results);
        }
    }

    fn selection_changed(&mut self, record: &Value) {
        if let Some(f) = self.selection.as_mut() {
            f(record);
        }
    }

    fn loading_changed(&mut self, is_loading: bool) {
        if let Some(f) = self.loading.as_mut() {
            f(is_loading);
        }
    }
}

/// The records a widget is currently displaying
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultSet {
    records: Vec<Value>,
    /// Bumped on every replace or clear
    revision: u64,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a backend payload into records.
    ///
    /// Arrays yield their elements, `null` yields nothing, anything else is
    /// a single record.
    pub fn records_from(payload: &Value) -> Vec<Value> {
        match payload {
            Value::Array(items) => items.clone(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        }
    }

    pub fn replace(&mut self, records: Vec<Value>) {
        self.records = records;
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Text a host should show for `record`.
///
/// With a `result_key`, objects show that field. Strings show as-is;
/// everything else falls back to compact JSON.
pub fn display_label(record: &Value, result_key: Option<&str>) -> String {
    let shown = match (record, result_key) {
        (Value::Object(fields), Some(key)) => fields.get(key).unwrap_or(record),
        _ => record,
    };

    match shown {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod sink_tests;
