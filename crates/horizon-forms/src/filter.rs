//! Live text filtering over local or delegated data.
//!
//! [`FilterEngine`] owns the visible record sequence of a suggestion widget.
//! A [`FilterRequest`] is evaluated either locally, by matching a
//! [`FilterPredicate`] against every record of an in-memory source, or by
//! handing the filter text to a [`DataLoader`] and replacing the visible
//! sequence with whatever it returns.
//!
//! Delegated loads are tagged with a [`LoadTicket`]. Only the most recently
//! issued ticket may replace the visible sequence; earlier results arriving
//! late are dropped.
//!
//! # Example
//!
//! ```
//! use horizon_forms::filter::{CaseSensitivity, DataSource, Evaluation, FilterEngine, FilterRequest};
//! use serde_json::json;
//!
//! let mut engine = FilterEngine::new(DataSource::local(vec![json!("Apple"), json!("banana")]));
//! let request = FilterRequest::new("AP").with_case_sensitivity(CaseSensitivity::Insensitive);
//!
//! let Evaluation::Filtered(visible) = engine.evaluate(&request) else { unreachable!() };
//! assert_eq!(&visible[..], &[json!("Apple")]);
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;

use horizon_forms_core::{Error, Result};

// ============================================================================
// Request
// ============================================================================

/// Letter-case handling of text matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CaseSensitivity {
    /// Exact case.
    #[default]
    #[serde(alias = "Default", alias = "CaseSensitive")]
    Sensitive,
    /// Both sides lowercased before comparing.
    #[serde(alias = "CaseInsensitive")]
    Insensitive,
}

/// How the filter text is matched against a record's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum StringFilterOperator {
    /// Text occurs anywhere.
    #[default]
    Contains,
    /// Text is a prefix.
    StartsWith,
    /// Text is a suffix.
    EndsWith,
    /// Text matches exactly.
    Equals,
}

/// A filter to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRequest {
    /// Text as typed.
    pub raw_text: String,
    /// Inputs shorter than this (in characters) are not evaluated.
    pub min_length: usize,
    /// Case handling.
    pub case_sensitivity: CaseSensitivity,
    /// Matching operator.
    pub operator: StringFilterOperator,
    /// Dot-separated path of the text to match; `None` matches the record itself.
    pub text_property: Option<String>,
    /// Dot-separated path of the record's value.
    pub value_property: Option<String>,
}

impl FilterRequest {
    /// A request for `raw_text` with default settings (`min_length` 1,
    /// case-sensitive `Contains`, whole-record text).
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            min_length: 1,
            case_sensitivity: CaseSensitivity::default(),
            operator: StringFilterOperator::default(),
            text_property: None,
            value_property: None,
        }
    }

    /// Set the minimum length.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Set case handling.
    pub fn with_case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }

    /// Set the operator.
    pub fn with_operator(mut self, operator: StringFilterOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Set the text property path. An empty path means the record itself.
    pub fn with_text_property(mut self, path: impl Into<String>) -> Self {
        self.text_property = Some(path.into()).filter(|p: &String| !p.is_empty());
        self
    }

    /// Set the value property path.
    pub fn with_value_property(mut self, path: impl Into<String>) -> Self {
        self.value_property = Some(path.into()).filter(|p: &String| !p.is_empty());
        self
    }

    /// Whether the text is long enough to evaluate.
    pub fn meets_min_length(&self) -> bool {
        self.raw_text.chars().count() >= self.min_length
    }
}

// ============================================================================
// Record Access
// ============================================================================

/// Resolve a dot-separated member path inside `record`.
///
/// Array segments may be indices. `None` or an empty path returns the record.
pub fn property_value<'a>(record: &'a Value, path: Option<&str>) -> Option<&'a Value> {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Some(record);
    };
    path.split('.').try_fold(record, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Text of a record value; `None` for `null`.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Text at `path` inside `record`.
pub fn property_text(record: &Value, path: Option<&str>) -> Option<String> {
    property_value(record, path).and_then(value_text)
}

// ============================================================================
// Predicate
// ============================================================================

/// A compiled local match.
#[derive(Debug, Clone)]
pub struct FilterPredicate {
    needle: String,
    operator: StringFilterOperator,
    case_sensitivity: CaseSensitivity,
    text_property: Option<String>,
}

impl FilterPredicate {
    /// Compile `request`.
    pub fn new(request: &FilterRequest) -> Self {
        Self {
            needle: fold(&request.raw_text, request.case_sensitivity),
            operator: request.operator,
            case_sensitivity: request.case_sensitivity,
            text_property: request.text_property.clone(),
        }
    }

    /// Whether `record` matches.
    pub fn matches(&self, record: &Value) -> bool {
        let Some(text) = property_text(record, self.text_property.as_deref()) else {
            return false;
        };
        let haystack = fold(&text, self.case_sensitivity);
        let needle = self.needle.as_str();
        match self.operator {
            StringFilterOperator::Contains => haystack.contains(needle),
            StringFilterOperator::StartsWith => haystack.starts_with(needle),
            StringFilterOperator::EndsWith => haystack.ends_with(needle),
            StringFilterOperator::Equals => haystack == needle,
        }
    }
}

fn fold(text: &str, case_sensitivity: CaseSensitivity) -> String {
    match case_sensitivity {
        CaseSensitivity::Sensitive => text.to_owned(),
        CaseSensitivity::Insensitive => text.to_lowercase(),
    }
}

// ============================================================================
// Data Sources
// ============================================================================

/// Arguments handed to a [`DataLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDataArgs {
    /// The filter text as typed.
    pub filter: String,
}

/// An external asynchronous record provider.
///
/// Implemented for any `Fn(LoadDataArgs) -> impl Future<Output = Result<Vec<Value>>>`.
pub trait DataLoader: Send + Sync {
    /// Produce the records for `args`.
    fn load(&self, args: LoadDataArgs) -> BoxFuture<'static, Result<Vec<Value>>>;
}

impl<F, Fut> DataLoader for F
where
    F: Fn(LoadDataArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Value>>> + Send + 'static,
{
    fn load(&self, args: LoadDataArgs) -> BoxFuture<'static, Result<Vec<Value>>> {
        self(args).boxed()
    }
}

/// Where a widget's records come from.
#[derive(Clone)]
pub enum DataSource {
    /// An in-memory ordered sequence.
    Local(Arc<[Value]>),
    /// A loader invoked with the filter text.
    Delegated(Arc<dyn DataLoader>),
}

impl DataSource {
    /// A local source over `records`.
    pub fn local(records: impl Into<Arc<[Value]>>) -> Self {
        Self::Local(records.into())
    }

    /// A delegated source.
    pub fn delegated(loader: impl DataLoader + 'static) -> Self {
        Self::Delegated(Arc::new(loader))
    }

    /// Whether loads are delegated.
    pub fn is_delegated(&self) -> bool {
        matches!(self, Self::Delegated(_))
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Local(Arc::from(Vec::new()))
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(records) => f.debug_tuple("Local").field(&records.len()).finish(),
            Self::Delegated(_) => f.write_str("Delegated"),
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Identifies one delegated load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// The ticket's sequence number.
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// A delegated load in flight.
///
/// Await [`wait`](Self::wait) and hand the result to
/// [`FilterEngine::complete_load`].
pub struct PendingLoad {
    /// The load's ticket.
    pub ticket: LoadTicket,
    future: BoxFuture<'static, Result<Vec<Value>>>,
}

impl PendingLoad {
    /// Run the load.
    pub async fn wait(self) -> (LoadTicket, Result<Vec<Value>>) {
        (self.ticket, self.future.await)
    }
}

impl fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLoad")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// Result of [`FilterEngine::evaluate`].
#[derive(Debug)]
pub enum Evaluation {
    /// The text is shorter than the minimum length; nothing changed.
    Skipped,
    /// The local source was filtered; the new visible sequence.
    Filtered(Arc<[Value]>),
    /// A delegated load was issued.
    Loading(PendingLoad),
}

/// Result of [`FilterEngine::complete_load`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The result replaced the visible sequence.
    Applied(Arc<[Value]>),
    /// A newer load was issued; the result was dropped.
    Stale,
}

/// Owner of the visible record sequence.
pub struct FilterEngine {
    source: DataSource,
    visible: Arc<[Value]>,
    issued: u64,
}

impl FilterEngine {
    /// Create an engine with nothing visible.
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            visible: Arc::from(Vec::new()),
            issued: 0,
        }
    }

    /// The active source.
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Replace the source.
    ///
    /// Clears the visible sequence and invalidates loads in flight.
    pub fn set_source(&mut self, source: DataSource) {
        self.source = source;
        self.visible = Arc::from(Vec::new());
        self.issued += 1;
    }

    /// The visible sequence.
    pub fn visible(&self) -> Arc<[Value]> {
        self.visible.clone()
    }

    /// Replace the visible sequence with records supplied by the host.
    ///
    /// Used by hosts that push loader results in as data instead of
    /// awaiting the returned load.
    pub fn set_visible(&mut self, records: impl Into<Arc<[Value]>>) {
        self.visible = records.into();
    }

    /// The most recently issued ticket, if any load was issued.
    pub fn latest_ticket(&self) -> Option<LoadTicket> {
        (self.issued > 0).then_some(LoadTicket(self.issued))
    }

    /// Evaluate `request` against the active source.
    ///
    /// An empty text shows nothing from a local source.
    #[tracing::instrument(skip(self), target = "horizon_forms::filter", level = "trace")]
    pub fn evaluate(&mut self, request: &FilterRequest) -> Evaluation {
        if !request.meets_min_length() {
            tracing::trace!(target: "horizon_forms::filter", "below minimum length");
            return Evaluation::Skipped;
        }

        match &self.source {
            DataSource::Local(_) if request.raw_text.is_empty() => {
                self.visible = Arc::from(Vec::new());
                Evaluation::Filtered(self.visible.clone())
            }
            DataSource::Local(records) => {
                let predicate = FilterPredicate::new(request);
                let visible: Arc<[Value]> = records
                    .iter()
                    .filter(|record| predicate.matches(record))
                    .cloned()
                    .collect();
                tracing::trace!(target: "horizon_forms::filter", matched = visible.len(), "local filter applied");
                self.visible = visible.clone();
                Evaluation::Filtered(visible)
            }
            DataSource::Delegated(loader) => {
                self.issued += 1;
                let ticket = LoadTicket(self.issued);
                tracing::debug!(target: "horizon_forms::filter", ticket = ticket.0, "delegated load issued");
                let future = loader.load(LoadDataArgs {
                    filter: request.raw_text.clone(),
                });
                Evaluation::Loading(PendingLoad { ticket, future })
            }
        }
    }

    /// Apply the result of the load tagged `ticket`.
    ///
    /// Results of superseded loads, failed or not, are dropped. A failed
    /// current load keeps the visible sequence and returns the error.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Value>>,
    ) -> Result<LoadOutcome> {
        if Some(ticket) != self.latest_ticket() {
            tracing::debug!(target: "horizon_forms::filter", ticket = ticket.0, latest = self.issued, "stale load dropped");
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(records) => {
                self.visible = Arc::from(records);
                Ok(LoadOutcome::Applied(self.visible.clone()))
            }
            Err(err) => {
                tracing::warn!(target: "horizon_forms::filter", ticket = ticket.0, error = %err, "delegated load failed");
                Err(err)
            }
        }
    }
}

impl fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEngine")
            .field("source", &self.source)
            .field("visible", &self.visible.len())
            .field("issued", &self.issued)
            .finish()
    }
}

static_assertions::assert_impl_all!(FilterEngine: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fruit() -> DataSource {
        DataSource::local(vec![json!("Apple"), json!("banana")])
    }

    fn filtered(engine: &mut FilterEngine, request: &FilterRequest) -> Vec<Value> {
        match engine.evaluate(request) {
            Evaluation::Filtered(v) => v.to_vec(),
            other => panic!("expected local filter, got {other:?}"),
        }
    }

    #[test]
    fn test_case_insensitive_contains() {
        let mut engine = FilterEngine::new(fruit());
        let request = FilterRequest::new("AP").with_case_sensitivity(CaseSensitivity::Insensitive);
        assert_eq!(filtered(&mut engine, &request), vec![json!("Apple")]);
    }

    #[test]
    fn test_case_sensitive_contains() {
        let mut engine = FilterEngine::new(fruit());
        assert!(filtered(&mut engine, &FilterRequest::new("AP")).is_empty());
    }

    #[test]
    fn test_min_length_gate() {
        let mut engine = FilterEngine::new(DataSource::local(vec![json!("abc")]));
        let short = FilterRequest::new("ab").with_min_length(3);
        assert!(matches!(engine.evaluate(&short), Evaluation::Skipped));

        let long = FilterRequest::new("abc").with_min_length(3);
        assert_eq!(filtered(&mut engine, &long), vec![json!("abc")]);
    }

    #[test]
    fn test_operators() {
        let records = vec![json!("alpha"), json!("alphabet"), json!("beta")];
        let mut engine = FilterEngine::new(DataSource::local(records));

        let starts = FilterRequest::new("alpha").with_operator(StringFilterOperator::StartsWith);
        assert_eq!(filtered(&mut engine, &starts).len(), 2);

        let ends = FilterRequest::new("ta").with_operator(StringFilterOperator::EndsWith);
        assert_eq!(filtered(&mut engine, &ends), vec![json!("beta")]);

        let equals = FilterRequest::new("alpha").with_operator(StringFilterOperator::Equals);
        assert_eq!(filtered(&mut engine, &equals), vec![json!("alpha")]);
    }

    #[test]
    fn test_nested_text_property_preserves_order() {
        let records = vec![
            json!({"Name": "Zed", "Address": {"City": "Berlin"}}),
            json!({"Name": "Amy", "Address": {"City": "Bern"}}),
            json!({"Name": "Bob", "Address": null}),
            json!({"Name": "Cy"}),
        ];
        let mut engine = FilterEngine::new(DataSource::local(records));
        let request = FilterRequest::new("ber")
            .with_case_sensitivity(CaseSensitivity::Insensitive)
            .with_text_property("Address.City");

        let names: Vec<_> = filtered(&mut engine, &request)
            .iter()
            .map(|r| r["Name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Zed"), json!("Amy")]);
    }

    #[test]
    fn test_empty_text_property_matches_record_itself() {
        let mut engine = FilterEngine::new(DataSource::local(vec![json!(42), json!(7)]));
        let request = FilterRequest::new("4").with_text_property("");
        assert_eq!(filtered(&mut engine, &request), vec![json!(42)]);
    }

    #[test]
    fn test_property_value_paths() {
        let record = json!({"a": {"b": [10, {"c": "x"}]}});
        assert_eq!(property_value(&record, Some("a.b.1.c")), Some(&json!("x")));
        assert_eq!(property_value(&record, Some("a.missing")), None);
        assert_eq!(property_value(&record, None), Some(&record));
        assert_eq!(property_text(&json!({"n": null}), Some("n")), None);
    }

    #[test]
    fn test_stale_ticket_dropped() {
        let mut engine = FilterEngine::new(DataSource::delegated(|args: LoadDataArgs| async move {
            Ok::<_, Error>(vec![Value::String(args.filter)])
        }));

        let Evaluation::Loading(first) = engine.evaluate(&FilterRequest::new("a")) else {
            panic!("expected load");
        };
        let Evaluation::Loading(second) = engine.evaluate(&FilterRequest::new("ab")) else {
            panic!("expected load");
        };

        assert_eq!(
            engine.complete_load(first.ticket, Ok(vec![json!("a")])),
            Ok(LoadOutcome::Stale)
        );
        assert!(engine.visible().is_empty());

        let outcome = engine.complete_load(second.ticket, Ok(vec![json!("ab")]));
        assert_eq!(outcome, Ok(LoadOutcome::Applied(Arc::from(vec![json!("ab")]))));
    }

    #[test]
    fn test_failed_load_keeps_visible() {
        let mut engine = FilterEngine::new(DataSource::delegated(|_args: LoadDataArgs| async {
            Ok::<Vec<Value>, Error>(Vec::new())
        }));

        let Evaluation::Loading(first) = engine.evaluate(&FilterRequest::new("a")) else {
            panic!("expected load");
        };
        engine.complete_load(first.ticket, Ok(vec![json!("kept")])).unwrap();

        let Evaluation::Loading(second) = engine.evaluate(&FilterRequest::new("ab")) else {
            panic!("expected load");
        };
        let err = engine
            .complete_load(second.ticket, Err(Error::load("timeout")))
            .unwrap_err();
        assert_eq!(err, Error::Load("timeout".into()));
        assert_eq!(&engine.visible()[..], &[json!("kept")]);
    }

    #[tokio::test]
    async fn test_delegated_load_receives_filter_text() {
        let mut engine = FilterEngine::new(DataSource::delegated(|args: LoadDataArgs| async move {
            Ok::<_, Error>(vec![json!({ "echo": args.filter })])
        }));

        let Evaluation::Loading(pending) = engine.evaluate(&FilterRequest::new("xy")) else {
            panic!("expected load");
        };
        let (ticket, result) = pending.wait().await;
        let LoadOutcome::Applied(visible) = engine.complete_load(ticket, result).unwrap() else {
            panic!("expected applied");
        };
        assert_eq!(visible[0]["echo"], json!("xy"));
    }
}
