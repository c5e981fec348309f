//! State shared by every bindable input widget.

use std::fmt;
use std::sync::Arc;

use horizon_forms_core::{
    BoundValue, ChangeNotifier, CommitOutcome, EditContext, FieldIdentifier, ObjectId,
    RefreshSignal,
};

/// The bindable core of an input widget: identity, bound value, refresh
/// signal and the common `Disabled`/`Visible` flags.
pub struct FormComponent<T> {
    id: ObjectId,
    name: Option<String>,
    value: BoundValue<T>,
    refresh: Arc<RefreshSignal>,
    disabled: bool,
    visible: bool,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> FormComponent<T> {
    /// Create a component holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            id: ObjectId::next(),
            name: None,
            value: BoundValue::new(initial),
            refresh: Arc::new(RefreshSignal::new()),
            disabled: false,
            visible: true,
        }
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The form field name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the form field name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// The current value.
    pub fn value(&self) -> T {
        self.value.get()
    }

    /// Read the current value without cloning.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.value.with(f)
    }

    /// Push a host-supplied value in without firing change events.
    pub fn set_value(&self, value: T) {
        self.value.set_parameter(value);
        self.refresh.request();
    }

    /// Commit a user edit and request a refresh.
    pub fn commit(&self, value: T) -> CommitOutcome {
        let outcome = self.value.commit(value);
        self.refresh.request();
        outcome
    }

    /// The signals of the bound value.
    pub fn notifier(&self) -> &ChangeNotifier<T> {
        self.value.notifier()
    }

    /// Attach the edit context and bound field.
    pub fn bind_edit_context(
        &self,
        context: Option<Arc<dyn EditContext>>,
        field: Option<FieldIdentifier>,
    ) {
        self.value.notifier().set_edit_context(context, field);
    }

    /// The widget's refresh signal.
    pub fn refresh(&self) -> &Arc<RefreshSignal> {
        &self.refresh
    }

    /// Whether the widget is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Enable or disable the widget.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled != disabled {
            self.disabled = disabled;
            self.refresh.request();
        }
    }

    /// Whether the widget is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the widget; returns the previous visibility.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let previous = std::mem::replace(&mut self.visible, visible);
        if previous != visible {
            self.refresh.request();
        }
        previous
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for FormComponent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormComponent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("disabled", &self.disabled)
            .field("visible", &self.visible)
            .finish()
    }
}

static_assertions::assert_impl_all!(FormComponent<String>: Send, Sync);
