//! End-to-end autocomplete behaviour against the headless host.

use std::sync::Arc;
use std::time::Duration;

use horizon_forms::filter::{CaseSensitivity, DataSource, LoadDataArgs, LoadOutcome};
use horizon_forms::host::{HeadlessHost, HostCall};
use horizon_forms::widgets::{AutoComplete, AutoCompleteOptions, Key};
use horizon_forms::{CommitOutcome, Error};
use horizon_forms_core::ManualClock;
use parking_lot::Mutex;
use serde_json::{Value, json};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_forms=trace,horizon_forms_core=debug")
        .with_test_writer()
        .try_init();
}

struct Harness {
    host: Arc<HeadlessHost>,
    clock: Arc<ManualClock>,
    input: AutoComplete,
}

impl Harness {
    fn new(source: DataSource, options: AutoCompleteOptions) -> Self {
        init_tracing();
        let host = Arc::new(HeadlessHost::new());
        let clock = Arc::new(ManualClock::new());
        let input = AutoComplete::with_clock(host.clone(), source, options, clock.clone());
        Self { host, clock, input }
    }

    fn fruit(options: AutoCompleteOptions) -> Self {
        Self::new(
            DataSource::local(vec![json!("Apple"), json!("banana"), json!("Apricot")]),
            options,
        )
    }

    /// Type `text` and let the debounce elapse.
    fn type_and_wait(&mut self, text: &str) -> Option<horizon_forms::filter::PendingLoad> {
        self.host.type_text(self.input.search_element(), text);
        self.input.handle_key(Key::Other).unwrap();
        self.clock.advance(self.input.options().filter_delay);
        self.input.tick().unwrap()
    }

    fn visible_texts(&self) -> Vec<String> {
        self.input
            .visible_items()
            .iter()
            .map(|record| self.input.item_text(record))
            .collect()
    }
}

#[test]
fn min_length_gates_evaluation() {
    let mut h = Harness::fruit(
        AutoCompleteOptions::default()
            .with_min_length(3)
            .with_case_sensitivity(CaseSensitivity::Insensitive),
    );

    h.type_and_wait("ap");
    assert!(h.visible_texts().is_empty());
    assert!(!h.input.form().refresh().is_pending());

    h.type_and_wait("apr");
    assert_eq!(h.visible_texts(), vec!["Apricot"]);
    assert!(h.input.form().refresh().is_pending());
}

#[test]
fn case_sensitivity_of_contains() {
    let records = || DataSource::local(vec![json!("Apple"), json!("banana")]);

    let mut insensitive = Harness::new(
        records(),
        AutoCompleteOptions::default().with_case_sensitivity(CaseSensitivity::Insensitive),
    );
    insensitive.type_and_wait("AP");
    assert_eq!(insensitive.visible_texts(), vec!["Apple"]);

    let mut sensitive = Harness::new(records(), AutoCompleteOptions::default());
    sensitive.type_and_wait("AP");
    assert!(sensitive.visible_texts().is_empty());
}

#[test]
fn keystroke_burst_filters_once() {
    let mut h = Harness::fruit(AutoCompleteOptions::default());

    for text in ["A", "Ap", "Apr"] {
        h.host.type_text(h.input.search_element(), text);
        h.input.handle_key(Key::Other).unwrap();
        h.clock.advance(Duration::from_millis(200));
        assert!(h.input.tick().unwrap().is_none());
    }
    h.clock.advance(Duration::from_millis(300));
    h.input.tick().unwrap();

    let reads = h
        .host
        .calls()
        .into_iter()
        .filter(|call| matches!(call, HostCall::GetInputValue(_)))
        .count();
    assert_eq!(reads, 1);
    assert_eq!(h.visible_texts(), vec!["Apricot"]);
}

#[test]
fn dispose_cancels_pending_filter() {
    let mut h = Harness::fruit(
        AutoCompleteOptions::default().with_filter_delay(Duration::from_millis(1000)),
    );
    h.host.type_text(h.input.search_element(), "Ap");
    h.input.handle_key(Key::Other).unwrap();
    h.clock.advance(Duration::from_millis(100));

    h.input.dispose();
    h.clock.advance(Duration::from_secs(2));

    assert!(h.input.tick().unwrap().is_none());
    assert!(
        !h.host
            .calls()
            .iter()
            .any(|call| matches!(call, HostCall::GetInputValue(_)))
    );
    assert!(
        h.host
            .calls()
            .contains(&HostCall::DestroyPopup(h.input.popup_id().to_string()))
    );
}

#[test]
fn keyboard_selection_commits_text() {
    let mut h = Harness::fruit(AutoCompleteOptions::default());
    let changes = Arc::new(Mutex::new(Vec::new()));
    let c = changes.clone();
    h.input
        .form()
        .notifier()
        .change
        .connect(move |v: &String| c.lock().push(v.clone()));

    h.type_and_wait("Ap");
    assert_eq!(h.visible_texts(), vec!["Apple", "Apricot"]);

    h.input.handle_key(Key::ArrowDown).unwrap();
    h.input.handle_key(Key::ArrowDown).unwrap();
    h.input.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(h.input.highlighted_index(), Some(1));

    h.input.handle_key(Key::Enter).unwrap();
    assert_eq!(h.input.value(), "Apricot");
    assert_eq!(*changes.lock(), vec!["Apricot".to_string()]);
    assert_eq!(h.input.highlighted_index(), None);
}

#[test]
fn navigation_survives_unavailable_host() {
    let mut h = Harness::fruit(AutoCompleteOptions::default());
    h.type_and_wait("Ap");

    h.host.set_available(false);
    h.input.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(h.input.highlighted_index(), Some(0));
    assert!(h.input.handle_key(Key::Escape).is_err());
}

#[test]
fn typed_text_commit_without_change_resyncs() {
    let mut h = Harness::fruit(AutoCompleteOptions::default());
    assert_eq!(h.input.on_input("pear"), CommitOutcome::Committed);
    assert_eq!(h.input.on_input("pear"), CommitOutcome::Resynced);
}

fn echo_loader() -> DataSource {
    DataSource::delegated(|args: LoadDataArgs| async move {
        Ok::<_, horizon_forms_core::Error>(vec![json!(format!("{} result", args.filter))])
    })
}

#[tokio::test]
async fn stale_delegated_load_is_dropped() {
    let mut h = Harness::new(echo_loader(), AutoCompleteOptions::default());

    let first = h.type_and_wait("a").expect("load issued");
    let second = h.type_and_wait("ab").expect("load issued");

    let (ticket, result) = second.wait().await;
    let outcome = h.input.complete_load(ticket, result).unwrap();
    assert!(matches!(outcome, LoadOutcome::Applied(_)));

    let (ticket, result) = first.wait().await;
    assert_eq!(h.input.complete_load(ticket, result).unwrap(), LoadOutcome::Stale);
    assert_eq!(h.visible_texts(), vec!["ab result"]);
}

#[tokio::test]
async fn failed_delegated_load_keeps_suggestions() {
    let fail = Arc::new(Mutex::new(false));
    let f = fail.clone();
    let source = DataSource::delegated(move |args: LoadDataArgs| {
        let fail = *f.lock();
        async move {
            if fail {
                Err(horizon_forms_core::Error::load("backend offline"))
            } else {
                Ok(vec![Value::String(args.filter)])
            }
        }
    });
    let mut h = Harness::new(source, AutoCompleteOptions::default());

    let load = h.type_and_wait("kiwi").expect("load issued");
    let (ticket, result) = load.wait().await;
    h.input.complete_load(ticket, result).unwrap();

    *fail.lock() = true;
    let load = h.type_and_wait("kiwis").expect("load issued");
    let (ticket, result) = load.wait().await;
    let err = h.input.complete_load(ticket, result).unwrap_err();

    assert!(matches!(err, Error::Core(_)));
    assert_eq!(h.visible_texts(), vec!["kiwi"]);
}
