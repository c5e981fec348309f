//! Text input with a filtered suggestion popup.
//!
//! [`AutoComplete`] binds a string value and shows records from a
//! [`DataSource`] whose text matches what the user typed. Keystrokes are
//! debounced: the filter runs once, `FilterDelay` after the last key, reading
//! the live input text back from the UI host.
//!
//! The host drives the widget by forwarding key presses to
//! [`handle_key`](AutoComplete::handle_key) and calling
//! [`tick`](AutoComplete::tick) from its event loop. A delegated source
//! returns a [`PendingLoad`] from `tick`; the host awaits it and passes the
//! result to [`complete_load`](AutoComplete::complete_load).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_forms::filter::DataSource;
//! use horizon_forms::host::HeadlessHost;
//! use horizon_forms::widgets::{AutoComplete, AutoCompleteOptions, Key};
//! use horizon_forms_core::ManualClock;
//! use serde_json::json;
//!
//! let host = Arc::new(HeadlessHost::new());
//! let clock = Arc::new(ManualClock::new());
//! let mut input = AutoComplete::with_clock(
//!     host.clone(),
//!     DataSource::local(vec![json!("Apple"), json!("Apricot"), json!("Banana")]),
//!     AutoCompleteOptions::default(),
//!     clock.clone(),
//! );
//!
//! host.type_text(input.search_element(), "Ap");
//! input.handle_key(Key::Other).unwrap();
//! clock.advance(Duration::from_millis(500));
//! input.tick().unwrap();
//!
//! assert_eq!(input.visible_items().len(), 2);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use horizon_forms_core::{
    Clock, CommitOutcome, DebounceScheduler, ObjectId, SystemClock,
};

use crate::error::Result;
use crate::filter::{
    CaseSensitivity, DataSource, Evaluation, FilterEngine, FilterRequest, LoadOutcome,
    LoadTicket, PendingLoad, StringFilterOperator, property_text,
};
use crate::form::FormComponent;
use crate::host::{ElementRef, FocusDirection, UiHost, popup_id};

// ============================================================================
// Options
// ============================================================================

/// Configuration of an [`AutoComplete`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AutoCompleteOptions {
    /// Minimum characters before filtering.
    pub min_length: usize,
    /// Quiet period after the last keystroke, in milliseconds on the wire.
    #[serde(deserialize_with = "duration_from_millis")]
    pub filter_delay: Duration,
    /// Case handling of the local filter.
    #[serde(rename = "FilterCaseSensitivity")]
    pub case_sensitivity: CaseSensitivity,
    /// Matching operator of the local filter.
    pub filter_operator: StringFilterOperator,
    /// Path of the text shown and matched for each record.
    pub text_property: Option<String>,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Whether the input is disabled.
    pub disabled: bool,
}

impl Default for AutoCompleteOptions {
    fn default() -> Self {
        Self {
            min_length: 1,
            filter_delay: Duration::from_millis(500),
            case_sensitivity: CaseSensitivity::default(),
            filter_operator: StringFilterOperator::default(),
            text_property: None,
            placeholder: None,
            disabled: false,
        }
    }
}

impl AutoCompleteOptions {
    /// Set the minimum filter length.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Set the debounce delay.
    pub fn with_filter_delay(mut self, delay: Duration) -> Self {
        self.filter_delay = delay;
        self
    }

    /// Set case handling.
    pub fn with_case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }

    /// Set the matching operator.
    pub fn with_filter_operator(mut self, operator: StringFilterOperator) -> Self {
        self.filter_operator = operator;
        self
    }

    /// Set the text property path.
    pub fn with_text_property(mut self, path: impl Into<String>) -> Self {
        self.text_property = Some(path.into()).filter(|p: &String| !p.is_empty());
        self
    }

    /// Set the placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the disabled flag.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

fn duration_from_millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

// ============================================================================
// Keys
// ============================================================================

/// A key press forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Move the highlight down.
    ArrowDown,
    /// Move the highlight up.
    ArrowUp,
    /// Select the highlighted record.
    Enter,
    /// Close the popup.
    Escape,
    /// Focus traversal; ignored.
    Tab,
    /// Anything else: text editing.
    Other,
}

impl Key {
    /// Map a DOM key code (`"ArrowDown"`, `"KeyA"`, ...) to a key.
    pub fn from_code(code: &str) -> Self {
        match code {
            "ArrowDown" => Self::ArrowDown,
            "ArrowUp" => Self::ArrowUp,
            "Enter" | "NumpadEnter" => Self::Enter,
            "Escape" => Self::Escape,
            "Tab" => Self::Tab,
            _ => Self::Other,
        }
    }
}

/// Debounce key of the filter timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DebouncedFilter;

// ============================================================================
// Widget
// ============================================================================

/// A string input with filtered suggestions.
pub struct AutoComplete {
    form: FormComponent<String>,
    options: AutoCompleteOptions,
    host: Arc<dyn UiHost>,
    engine: FilterEngine,
    timers: DebounceScheduler<DebouncedFilter, ()>,
    search: ElementRef,
    list: ElementRef,
    popup: String,
    highlighted: Option<usize>,
    first_render: bool,
    disposed: bool,
}

impl AutoComplete {
    /// Create an autocomplete on the system clock.
    pub fn new(host: Arc<dyn UiHost>, source: DataSource, options: AutoCompleteOptions) -> Self {
        Self::with_clock(host, source, options, Arc::new(SystemClock))
    }

    /// Create an autocomplete whose debounce reads `clock`.
    pub fn with_clock(
        host: Arc<dyn UiHost>,
        source: DataSource,
        options: AutoCompleteOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut form = FormComponent::new(String::new());
        form.set_disabled(options.disabled);
        let id = form.id();
        Self {
            form,
            options,
            host,
            engine: FilterEngine::new(source),
            timers: DebounceScheduler::new(clock),
            search: ElementRef::for_object("search", id),
            list: ElementRef::for_object("list", id),
            popup: popup_id(id),
            highlighted: None,
            first_render: true,
            disposed: false,
        }
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.form.id()
    }

    /// The bindable value and its signals.
    pub fn form(&self) -> &FormComponent<String> {
        &self.form
    }

    /// Mutable access to the form state (name, disabled).
    pub fn form_mut(&mut self) -> &mut FormComponent<String> {
        &mut self.form
    }

    /// The current text value.
    pub fn value(&self) -> String {
        self.form.value()
    }

    /// The configuration.
    pub fn options(&self) -> &AutoCompleteOptions {
        &self.options
    }

    /// The search input element.
    pub fn search_element(&self) -> &ElementRef {
        &self.search
    }

    /// The suggestion list element.
    pub fn list_element(&self) -> &ElementRef {
        &self.list
    }

    /// The popup id.
    pub fn popup_id(&self) -> &str {
        &self.popup
    }

    /// Replace the data source; clears the suggestions.
    pub fn set_source(&mut self, source: DataSource) {
        self.engine.set_source(source);
        self.highlighted = None;
        self.form.refresh().request();
    }

    /// Records currently offered.
    pub fn visible_items(&self) -> Arc<[Value]> {
        self.engine.visible()
    }

    /// Display text of `record`.
    pub fn item_text(&self, record: &Value) -> String {
        property_text(record, self.options.text_property.as_deref()).unwrap_or_default()
    }

    /// The highlighted suggestion.
    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted
    }

    /// Whether the widget was disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// React to a key press in the search input.
    pub fn handle_key(&mut self, key: Key) -> Result<()> {
        if self.disposed {
            return Ok(());
        }

        match key {
            Key::ArrowDown => self.move_highlight(FocusDirection::Down),
            Key::ArrowUp => self.move_highlight(FocusDirection::Up),
            Key::Enter => {
                let items = self.engine.visible();
                if let Some(record) = self.highlighted.and_then(|i| items.get(i)) {
                    self.select_item(record)?;
                }
            }
            Key::Escape => self.host.close_popup(&self.popup)?,
            Key::Tab => {}
            Key::Other if self.form.is_disabled() => {}
            Key::Other => {
                self.highlighted = None;
                self.timers
                    .debounce(DebouncedFilter, self.options.filter_delay, ());
            }
        }
        Ok(())
    }

    fn move_highlight(&mut self, direction: FocusDirection) {
        let len = self.engine.visible().len();
        let Some(last) = len.checked_sub(1) else {
            self.highlighted = None;
            return;
        };

        let current = self.highlighted.map_or(-1, to_index);
        let local = match direction {
            FocusDirection::Down => current + 1,
            FocusDirection::Up => current - 1,
        };
        let next = match self.host.focus_list_item(&self.list, direction, current) {
            Ok(index) => index,
            Err(err) => {
                tracing::debug!(target: "horizon_forms::widget", error = %err, "focus move not forwarded");
                local
            }
        };
        let clamped = usize::try_from(next.max(0)).unwrap_or(0).min(last);
        self.highlighted = Some(clamped);
    }

    /// Run due debounced work.
    ///
    /// Returns the load to await when the filter was delegated.
    pub fn tick(&mut self) -> Result<Option<PendingLoad>> {
        let mut load = None;
        for (DebouncedFilter, ()) in self.timers.process_expired() {
            load = self.run_filter()?;
        }
        Ok(load)
    }

    /// Time until [`tick`](Self::tick) has work.
    pub fn time_until_next_tick(&mut self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    fn run_filter(&mut self) -> Result<Option<PendingLoad>> {
        let text = self.host.get_input_value(&self.search)?;
        let mut request = FilterRequest::new(text)
            .with_min_length(self.options.min_length)
            .with_case_sensitivity(self.options.case_sensitivity)
            .with_operator(self.options.filter_operator);
        request.text_property = self.options.text_property.clone();

        match self.engine.evaluate(&request) {
            Evaluation::Skipped => Ok(None),
            Evaluation::Filtered(_) => {
                self.form.refresh().request();
                Ok(None)
            }
            Evaluation::Loading(pending) => Ok(Some(pending)),
        }
    }

    /// Apply the result of a delegated load.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: horizon_forms_core::Result<Vec<Value>>,
    ) -> Result<LoadOutcome> {
        let outcome = self.engine.complete_load(ticket, result)?;
        if matches!(outcome, LoadOutcome::Applied(_)) {
            self.form.refresh().request();
        }
        Ok(outcome)
    }

    /// The input text changed (the input's change event).
    pub fn on_input(&mut self, text: impl Into<String>) -> CommitOutcome {
        self.form.commit(text.into())
    }

    /// Commit `record` as the value and close the popup.
    pub fn select_item(&mut self, record: &Value) -> Result<CommitOutcome> {
        self.host.close_popup(&self.popup)?;
        let text = self.item_text(record);
        let outcome = self.form.commit(text);
        self.highlighted = None;
        Ok(outcome)
    }

    /// Open the suggestion popup under the input.
    pub fn open_popup(&self) -> Result<()> {
        if self.form.is_disabled() || self.disposed {
            return Ok(());
        }
        self.host.open_popup(&self.search, &self.popup, true)?;
        Ok(())
    }

    /// Show or hide the widget. Hiding a rendered widget removes its popup.
    pub fn set_visible(&mut self, visible: bool) -> Result<()> {
        let was_visible = self.form.set_visible(visible);
        if was_visible && !visible && !self.first_render {
            self.host.destroy_popup(&self.popup)?;
        }
        Ok(())
    }

    /// Record that the host finished rendering.
    pub fn after_render(&mut self, first_render: bool) {
        self.first_render = first_render;
    }

    /// Cancel the pending filter and remove the popup.
    ///
    /// Idempotent; also run on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.timers.dispose();
        if let Err(err) = self.host.destroy_popup(&self.popup) {
            tracing::debug!(target: "horizon_forms::widget", error = %err, popup = %self.popup, "popup teardown skipped");
        }
    }
}

fn to_index(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

impl Drop for AutoComplete {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for AutoComplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoComplete")
            .field("form", &self.form)
            .field("options", &self.options)
            .field("engine", &self.engine)
            .field("highlighted", &self.highlighted)
            .field("disposed", &self.disposed)
            .finish()
    }
}

static_assertions::assert_impl_all!(AutoComplete: Send, Sync);
