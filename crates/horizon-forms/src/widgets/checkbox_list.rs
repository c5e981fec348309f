//! Multi-select checklist.
//!
//! A [`CheckBoxList`] lists its declared [`CheckBoxItem`] children, in
//! registration order, followed by one item per data record projected
//! through `TextProperty`/`ValueProperty`. The bound value is the list of
//! checked item values; toggling an item adds or removes its value without
//! touching any other.

use std::fmt;
use std::sync::{Arc, Weak};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use horizon_forms_core::{
    ChildChange, ChildProps, CommitOutcome, ObjectId, ParentLink, RefreshSignal, Registry,
    SelectionMode,
};

use crate::filter::{property_text, property_value};
use crate::form::FormComponent;

/// Layout direction of the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Orientation {
    /// Items side by side.
    #[default]
    Horizontal,
    /// Items stacked.
    Vertical,
}

/// Configuration of a [`CheckBoxList`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CheckBoxListOptions {
    /// Path of the item text inside data records.
    pub text_property: Option<String>,
    /// Path of the item value inside data records.
    pub value_property: Option<String>,
    /// Layout direction.
    pub orientation: Orientation,
    /// Whether the whole list is disabled.
    pub disabled: bool,
}

impl CheckBoxListOptions {
    /// Set the text property.
    pub fn with_text_property(mut self, path: impl Into<String>) -> Self {
        self.text_property = Some(path.into());
        self
    }

    /// Set the value property.
    pub fn with_value_property(mut self, path: impl Into<String>) -> Self {
        self.value_property = Some(path.into());
        self
    }

    /// Set the disabled flag.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// One rendered checklist entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem<V> {
    /// The declared child this entry comes from; `None` for data records.
    pub id: Option<ObjectId>,
    /// Label.
    pub text: String,
    /// Value added to the selection when checked.
    pub value: V,
    /// Whether the item ignores toggles.
    pub disabled: bool,
}

/// A checklist binding a `Vec<V>` of checked values.
pub struct CheckBoxList<V> {
    form: FormComponent<Vec<V>>,
    options: CheckBoxListOptions,
    items: Arc<Registry<V>>,
    data: Option<Arc<[Value]>>,
    projected: Vec<ListItem<V>>,
}

impl<V: Clone + PartialEq + Send + Sync + 'static> CheckBoxList<V> {
    /// Create an empty checklist.
    pub fn new(options: CheckBoxListOptions) -> Self {
        let mut form = FormComponent::new(Vec::new());
        form.set_disabled(options.disabled);

        let items = Arc::new(Registry::new(SelectionMode::Independent));
        let refresh: Weak<RefreshSignal> = Arc::downgrade(form.refresh());
        items.events.connect(move |_| {
            if let Some(refresh) = refresh.upgrade() {
                refresh.request();
            }
        });

        Self {
            form,
            options,
            items,
            data: None,
            projected: Vec::new(),
        }
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.form.id()
    }

    /// The bindable value and its signals.
    pub fn form(&self) -> &FormComponent<Vec<V>> {
        &self.form
    }

    /// Mutable access to the form state.
    pub fn form_mut(&mut self) -> &mut FormComponent<Vec<V>> {
        &mut self.form
    }

    /// The checked values.
    pub fn value(&self) -> Vec<V> {
        self.form.value()
    }

    /// The configuration.
    pub fn options(&self) -> &CheckBoxListOptions {
        &self.options
    }

    /// Whether any value is checked.
    pub fn has_value(&self) -> bool {
        self.form.with_value(|values| !values.is_empty())
    }

    /// Declared items followed by data items.
    pub fn all_items(&self) -> Vec<ListItem<V>> {
        self.items
            .entries()
            .into_iter()
            .map(|entry| ListItem {
                id: Some(entry.id),
                text: entry.props.text.unwrap_or_default(),
                value: entry.data,
                disabled: entry.props.disabled,
            })
            .chain(self.projected.iter().cloned())
            .collect()
    }

    /// Whether `item` is checked.
    pub fn is_selected(&self, item: &ListItem<V>) -> bool {
        self.form.with_value(|values| values.contains(&item.value))
    }

    /// Check or uncheck `item`.
    ///
    /// `None` when the list or the item is disabled.
    pub fn toggle(&self, item: &ListItem<V>) -> Option<CommitOutcome> {
        if self.form.is_disabled() || item.disabled {
            return None;
        }

        let mut values = self.form.value();
        match values.iter().position(|v| *v == item.value) {
            Some(index) => {
                values.remove(index);
            }
            None => values.push(item.value.clone()),
        }
        Some(self.form.commit(values))
    }

    pub(crate) fn link(&self) -> ParentLink<V> {
        self.items.link()
    }
}

impl<V> CheckBoxList<V>
where
    V: Clone + PartialEq + Send + Sync + DeserializeOwned + 'static,
{
    /// Replace the data records.
    ///
    /// Records whose value cannot be read as `V` are skipped. Passing the
    /// same sequence again is a no-op.
    pub fn set_data(&mut self, data: Option<Arc<[Value]>>) {
        let unchanged = match (&self.data, &data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.projected = data
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|record| self.project(record))
            .collect();
        self.data = data;
        self.form.refresh().request();
    }

    fn project(&self, record: &Value) -> Option<ListItem<V>> {
        let text = property_text(record, self.options.text_property.as_deref()).unwrap_or_default();
        let raw = property_value(record, self.options.value_property.as_deref())?;
        match serde_json::from_value(raw.clone()) {
            Ok(value) => Some(ListItem {
                id: None,
                text,
                value,
                disabled: false,
            }),
            Err(err) => {
                tracing::warn!(target: "horizon_forms::widget", error = %err, "checklist record skipped");
                None
            }
        }
    }
}

impl<V: fmt::Debug + Clone> fmt::Debug for CheckBoxList<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckBoxList")
            .field("form", &self.form)
            .field("options", &self.options)
            .field("items", &self.items)
            .field("projected", &self.projected.len())
            .finish()
    }
}

/// A declared checklist item.
pub struct CheckBoxItem<V: Clone + PartialEq + Send + Sync + 'static> {
    id: ObjectId,
    text: String,
    value: V,
    disabled: bool,
    visible: bool,
    link: ParentLink<V>,
}

impl<V: Clone + PartialEq + Send + Sync + 'static> CheckBoxItem<V> {
    /// Create an item.
    pub fn new(text: impl Into<String>, value: V) -> Self {
        Self {
            id: ObjectId::next(),
            text: text.into(),
            value,
            disabled: false,
            visible: true,
            link: ParentLink::default(),
        }
    }

    /// Builder form of [`set_disabled`](Self::set_disabled).
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The item's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The item's value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Register with `list`. Attaching to the current parent again is a no-op.
    pub fn attach(&mut self, list: &CheckBoxList<V>) {
        let link = list.link();
        if self.link.same_parent(&link) {
            return;
        }
        self.link.unregister(self.id);
        self.link = link;
        self.link.register(self.id, self.props(), self.value.clone());
    }

    /// Change the label.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text != text {
            self.text = text;
            self.notify(ChildChange::TEXT);
        }
    }

    /// Change the value.
    pub fn set_value(&mut self, value: V) {
        if self.value != value {
            self.value = value;
            self.notify(ChildChange::DATA);
        }
    }

    /// Enable or disable the item.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled != disabled {
            self.disabled = disabled;
            self.notify(ChildChange::DISABLED);
        }
    }

    /// Show or hide the item.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.notify(ChildChange::VISIBLE);
        }
    }

    /// Leave the parent list.
    pub fn dispose(&mut self) {
        self.link.unregister(self.id);
    }

    fn props(&self) -> ChildProps {
        ChildProps {
            text: Some(self.text.clone()),
            visible: self.visible,
            disabled: self.disabled,
            ..ChildProps::default()
        }
    }

    fn notify(&self, changed: ChildChange) {
        self.link
            .notify(self.id, self.props(), self.value.clone(), changed);
    }
}

impl<V: Clone + PartialEq + Send + Sync + 'static> Drop for CheckBoxItem<V> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<V: Clone + PartialEq + Send + Sync + fmt::Debug + 'static> fmt::Debug for CheckBoxItem<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckBoxItem")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("value", &self.value)
            .field("disabled", &self.disabled)
            .field("link", &self.link)
            .finish()
    }
}

static_assertions::assert_impl_all!(CheckBoxList<String>: Send, Sync);
