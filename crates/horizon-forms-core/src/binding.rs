//! Value binding and change notification.
//!
//! Every bindable widget routes user edits through [`BoundValue::commit`],
//! which applies the same four steps in a fixed order:
//!
//! 1. store the new value in the widget's [`ValueCell`];
//! 2. emit `value_changed`, which feeds the owner of the two-way binding;
//! 3. tell the [`EditContext`] the bound field is dirty, once, and only when a
//!    [`FieldIdentifier`] is configured;
//! 4. emit `change` for application-level observers.
//!
//! Step 4 runs after the value is stored, so a `change` handler that reads the
//! widget sees the new value.
//!
//! A commit of a value equal to the current one, with nobody connected to
//! `value_changed`, stores nothing and fires nothing. It only emits `resync`,
//! which the UI host uses to put the displayed text back in line with the
//! bound value.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::signal::Signal;
use crate::value::ValueCell;

/// Identifies the model field a widget is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldIdentifier {
    /// Name of the model the field belongs to.
    pub model: String,
    /// Name of the bound field.
    pub field_name: String,
}

impl FieldIdentifier {
    /// Create a field identifier.
    pub fn new(model: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            field_name: field_name.into(),
        }
    }
}

impl fmt::Display for FieldIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.model, self.field_name)
    }
}

/// The validation/edit context a form widget reports to.
///
/// Only the "field changed" notification is consumed here; validation itself
/// lives with the implementor.
pub trait EditContext: Send + Sync {
    /// Mark `field` as modified.
    fn notify_field_changed(&self, field: &FieldIdentifier);
}

/// What a call to [`BoundValue::commit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The value was stored and all change notifications fired.
    Committed,
    /// The value was unchanged and unobserved; only `resync` fired.
    Resynced,
}

impl CommitOutcome {
    /// Whether change notifications fired.
    pub fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Ordered dispatch of binding, validation and application change events.
pub struct ChangeNotifier<T> {
    /// Binding-level notification; connected by whoever owns the two-way binding.
    pub value_changed: Signal<T>,
    /// Application-level "Change" event.
    pub change: Signal<T>,
    /// Asks the UI host to redisplay the current value after a rejected edit.
    pub resync: Signal<T>,
    field: RwLock<Option<FieldIdentifier>>,
    edit_context: RwLock<Option<Arc<dyn EditContext>>>,
}

impl<T: Clone + 'static> ChangeNotifier<T> {
    /// Create a notifier with no subscribers and no edit context.
    pub fn new() -> Self {
        Self {
            value_changed: Signal::new(),
            change: Signal::new(),
            resync: Signal::new(),
            field: RwLock::new(None),
            edit_context: RwLock::new(None),
        }
    }

    /// Attach the edit context and the field it should mark dirty.
    pub fn set_edit_context(
        &self,
        context: Option<Arc<dyn EditContext>>,
        field: Option<FieldIdentifier>,
    ) {
        *self.edit_context.write() = context;
        *self.field.write() = field;
    }

    /// The configured field identifier, if any.
    pub fn field(&self) -> Option<FieldIdentifier> {
        self.field.read().clone()
    }

    /// Whether anyone is bound to `value_changed`.
    pub fn has_binding(&self) -> bool {
        self.value_changed.has_connections()
    }

    /// Run steps 2–4 for an already committed `value`.
    pub fn dispatch(&self, value: &T) {
        self.value_changed.emit(value.clone());

        let context = self.edit_context.read().clone();
        if let (Some(context), Some(field)) = (context, self.field()) {
            tracing::trace!(target: "horizon_forms_core::binding", %field, "marking field dirty");
            context.notify_field_changed(&field);
        }

        self.change.emit(value.clone());
    }
}

impl<T: Clone + 'static> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("value_changed", &self.value_changed)
            .field("change", &self.change)
            .field("field", &*self.field.read())
            .field("has_edit_context", &self.edit_context.read().is_some())
            .finish()
    }
}

/// A [`ValueCell`] wired to a [`ChangeNotifier`]: the committed-change path
/// of a bindable widget.
pub struct BoundValue<T> {
    cell: ValueCell<T>,
    notifier: ChangeNotifier<T>,
}

impl<T: Clone + PartialEq + 'static> BoundValue<T> {
    /// Create a bound value holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            cell: ValueCell::new(initial),
            notifier: ChangeNotifier::new(),
        }
    }

    /// The current value.
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Access the current value without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.cell.with(f)
    }

    /// The notifier carrying this value's signals.
    pub fn notifier(&self) -> &ChangeNotifier<T> {
        &self.notifier
    }

    /// Accept a value pushed in by the host (a parameter update).
    ///
    /// Parameter updates are not edits: nothing fires.
    pub fn set_parameter(&self, value: T) {
        self.cell.set_silent(value);
    }

    /// Commit a user edit through the ordered notification pipeline.
    pub fn commit(&self, value: T) -> CommitOutcome {
        if self.cell.is(&value) && !self.notifier.has_binding() {
            tracing::trace!(target: "horizon_forms_core::binding", "unchanged value, resyncing host");
            self.notifier.resync.emit(value);
            return CommitOutcome::Resynced;
        }

        self.cell.set_silent(value.clone());
        self.notifier.dispatch(&value);
        CommitOutcome::Committed
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for BoundValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for BoundValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundValue")
            .field("value", &self.cell)
            .field("notifier", &self.notifier)
            .finish()
    }
}

static_assertions::assert_impl_all!(BoundValue<String>: Send, Sync);
