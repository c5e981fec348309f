//! Button with an attached drop-down of secondary actions.

use std::fmt;
use std::sync::Arc;

use horizon_forms_core::{ObjectId, RefreshSignal, Signal};

use crate::error::Result;
use crate::host::{ElementRef, UiHost, popup_id};

/// A secondary action in the drop-down.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitButtonItem {
    /// Label.
    pub text: String,
    /// Application value passed back on click.
    pub value: Option<String>,
    /// Whether the item ignores clicks.
    pub disabled: bool,
}

impl SplitButtonItem {
    /// Create an item.
    pub fn new(text: impl Into<String>, value: Option<String>) -> Self {
        Self {
            text: text.into(),
            value,
            disabled: false,
        }
    }
}

/// A primary button plus a toggle that opens a popup of [`SplitButtonItem`]s.
///
/// `click` carries `None` for the primary button and the item for a
/// secondary action.
pub struct SplitButton {
    id: ObjectId,
    host: Arc<dyn UiHost>,
    text: String,
    icon: Option<String>,
    items: Vec<SplitButtonItem>,
    disabled: bool,
    anchor: ElementRef,
    popup: String,
    refresh: RefreshSignal,
    /// Raised on primary and secondary clicks.
    pub click: Signal<Option<SplitButtonItem>>,
}

impl SplitButton {
    /// Create a button labelled `text`.
    pub fn new(host: Arc<dyn UiHost>, text: impl Into<String>) -> Self {
        let id = ObjectId::next();
        Self {
            id,
            host,
            text: text.into(),
            icon: None,
            items: Vec::new(),
            disabled: false,
            anchor: ElementRef::for_object("splitbutton", id),
            popup: popup_id(id),
            refresh: RefreshSignal::new(),
            click: Signal::new(),
        }
    }

    /// Set the icon name.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Append a secondary action.
    pub fn with_item(mut self, item: SplitButtonItem) -> Self {
        self.items.push(item);
        self
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The label.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The icon name.
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// The secondary actions.
    pub fn items(&self) -> &[SplitButtonItem] {
        &self.items
    }

    /// The popup id.
    pub fn popup_id(&self) -> &str {
        &self.popup
    }

    /// The widget's refresh signal.
    pub fn refresh(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// Whether clicks are ignored.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Enable or disable the button.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled != disabled {
            self.disabled = disabled;
            self.refresh.request();
        }
    }

    /// Primary button pressed.
    pub fn on_click(&self) {
        if !self.disabled {
            self.click.emit(None);
        }
    }

    /// Secondary action `index` pressed: the popup closes and `click` fires.
    pub fn on_item_click(&self, index: usize) -> Result<()> {
        let Some(item) = self.items.get(index) else {
            return Ok(());
        };
        if self.disabled || item.disabled {
            return Ok(());
        }
        self.close()?;
        self.click.emit(Some(item.clone()));
        Ok(())
    }

    /// Open the drop-down. Ignored while disabled.
    pub fn open_popup(&self) -> Result<()> {
        if self.disabled {
            return Ok(());
        }
        self.host.open_popup(&self.anchor, &self.popup, true)?;
        Ok(())
    }

    /// Close the drop-down.
    pub fn close(&self) -> Result<()> {
        self.host.close_popup(&self.popup)?;
        Ok(())
    }
}

impl fmt::Debug for SplitButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitButton")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("items", &self.items)
            .field("disabled", &self.disabled)
            .finish()
    }
}
