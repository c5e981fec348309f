//! UI host interop.
//!
//! Widgets never touch the rendered page directly. Focus moves, popup
//! management and raw input reads go through a [`UiHost`] supplied by the
//! rendering layer. [`HeadlessHost`] is an in-memory implementation used by
//! tests and by server-side prerendering.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use thiserror::Error;

use horizon_forms_core::ObjectId;

// ============================================================================
// Element References
// ============================================================================

/// A reference to an element rendered by the host, by element id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(String);

impl ElementRef {
    /// Reference the element with id `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The element id `{prefix}{object}`, as widgets name their parts.
    pub fn for_object(prefix: &str, object: ObjectId) -> Self {
        Self(format!("{prefix}{object}"))
    }

    /// The element id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the popup id of a widget.
pub fn popup_id(object: ObjectId) -> String {
    format!("popup{object}")
}

/// Direction of a keyboard focus move within a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    /// Towards the first item.
    Up,
    /// Towards the last item.
    Down,
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by UI host calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteropError {
    /// The host cannot service calls (prerendering, torn-down page).
    #[error("UI host is not available")]
    Unavailable,

    /// The referenced element is not attached.
    #[error("element '{0}' is not attached")]
    ElementMissing(String),

    /// The host reported a failure.
    #[error("interop call '{call}' failed: {message}")]
    Failed {
        /// The interop call.
        call: &'static str,
        /// Host-supplied message.
        message: String,
    },
}

// ============================================================================
// Host Trait
// ============================================================================

/// The interop surface widgets call into.
pub trait UiHost: Send + Sync {
    /// Move keyboard focus within `list` one step in `direction` from
    /// `current`, returning the new index.
    fn focus_list_item(
        &self,
        list: &ElementRef,
        direction: FocusDirection,
        current: i32,
    ) -> Result<i32, InteropError>;

    /// Open popup `popup` anchored at `anchor`.
    fn open_popup(
        &self,
        anchor: &ElementRef,
        popup: &str,
        auto_close: bool,
    ) -> Result<(), InteropError>;

    /// Close popup `popup`.
    fn close_popup(&self, popup: &str) -> Result<(), InteropError>;

    /// Remove popup `popup` from the page.
    fn destroy_popup(&self, popup: &str) -> Result<(), InteropError>;

    /// Read the live text of an input element.
    fn get_input_value(&self, element: &ElementRef) -> Result<String, InteropError>;

    /// Overwrite the text of an input element.
    fn set_input_value(&self, element: &ElementRef, value: &str) -> Result<(), InteropError>;
}

// ============================================================================
// Headless Host
// ============================================================================

/// A recorded call made to a [`HeadlessHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// `focus_list_item`
    FocusListItem {
        list: String,
        direction: FocusDirection,
        current: i32,
    },
    /// `open_popup`
    OpenPopup {
        anchor: String,
        popup: String,
        auto_close: bool,
    },
    /// `close_popup`
    ClosePopup(String),
    /// `destroy_popup`
    DestroyPopup(String),
    /// `get_input_value`
    GetInputValue(String),
    /// `set_input_value`
    SetInputValue { element: String, value: String },
}

/// An in-memory [`UiHost`].
///
/// Input values are stored per element id, open popups are tracked by id and
/// every call is appended to a log. Marking the host unavailable makes every
/// call fail with [`InteropError::Unavailable`].
#[derive(Default)]
pub struct HeadlessHost {
    inputs: Mutex<HashMap<String, String>>,
    open_popups: Mutex<HashSet<String>>,
    calls: Mutex<Vec<HostCall>>,
    unavailable: AtomicBool,
}

impl HeadlessHost {
    /// Create an available host with no inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user typing `text` into `element`.
    pub fn type_text(&self, element: &ElementRef, text: &str) {
        self.inputs
            .lock()
            .insert(element.id().to_owned(), text.to_owned());
    }

    /// The stored text of `element`.
    pub fn input_value(&self, element: &ElementRef) -> Option<String> {
        self.inputs.lock().get(element.id()).cloned()
    }

    /// Whether popup `popup` is open.
    pub fn is_popup_open(&self, popup: &str) -> bool {
        self.open_popups.lock().contains(popup)
    }

    /// Make every following call fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Empty the call log.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: HostCall) -> Result<(), InteropError> {
        tracing::trace!(target: "horizon_forms::host", ?call, "host call");
        self.calls.lock().push(call);
        if self.unavailable.load(Ordering::SeqCst) {
            Err(InteropError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl UiHost for HeadlessHost {
    fn focus_list_item(
        &self,
        list: &ElementRef,
        direction: FocusDirection,
        current: i32,
    ) -> Result<i32, InteropError> {
        self.record(HostCall::FocusListItem {
            list: list.id().to_owned(),
            direction,
            current,
        })?;
        // The headless page has no list to clamp against; callers clamp.
        Ok(match direction {
            FocusDirection::Up => current - 1,
            FocusDirection::Down => current + 1,
        })
    }

    fn open_popup(
        &self,
        anchor: &ElementRef,
        popup: &str,
        auto_close: bool,
    ) -> Result<(), InteropError> {
        self.record(HostCall::OpenPopup {
            anchor: anchor.id().to_owned(),
            popup: popup.to_owned(),
            auto_close,
        })?;
        self.open_popups.lock().insert(popup.to_owned());
        Ok(())
    }

    fn close_popup(&self, popup: &str) -> Result<(), InteropError> {
        self.record(HostCall::ClosePopup(popup.to_owned()))?;
        self.open_popups.lock().remove(popup);
        Ok(())
    }

    fn destroy_popup(&self, popup: &str) -> Result<(), InteropError> {
        self.record(HostCall::DestroyPopup(popup.to_owned()))?;
        self.open_popups.lock().remove(popup);
        Ok(())
    }

    fn get_input_value(&self, element: &ElementRef) -> Result<String, InteropError> {
        self.record(HostCall::GetInputValue(element.id().to_owned()))?;
        Ok(self.input_value(element).unwrap_or_default())
    }

    fn set_input_value(&self, element: &ElementRef, value: &str) -> Result<(), InteropError> {
        self.record(HostCall::SetInputValue {
            element: element.id().to_owned(),
            value: value.to_owned(),
        })?;
        self.type_text(element, value);
        Ok(())
    }
}

impl fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("inputs", &self.inputs.lock().len())
            .field("open_popups", &*self.open_popups.lock())
            .field("available", &!self.unavailable.load(Ordering::SeqCst))
            .finish()
    }
}

static_assertions::assert_impl_all!(HeadlessHost: Send, Sync);
