//! Navigation menu.

use std::fmt;

use horizon_forms_core::{ObjectId, RefreshSignal, Signal};

/// Payload of a menu item click.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuItemEventArgs {
    /// Item label.
    pub text: String,
    /// Application value of the item.
    pub value: Option<String>,
    /// Navigation target of the item.
    pub path: Option<String>,
}

/// A horizontal menu that collapses behind a toggle on narrow screens.
pub struct Menu {
    id: ObjectId,
    responsive: bool,
    open: bool,
    refresh: RefreshSignal,
    /// Raised when an item is clicked.
    pub click: Signal<MenuItemEventArgs>,
}

impl Menu {
    /// Create a responsive, closed menu.
    pub fn new() -> Self {
        Self {
            id: ObjectId::next(),
            responsive: true,
            open: false,
            refresh: RefreshSignal::new(),
            click: Signal::new(),
        }
    }

    /// Set whether the menu collapses on narrow screens.
    pub fn with_responsive(mut self, responsive: bool) -> Self {
        self.responsive = responsive;
        self
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Whether the menu collapses on narrow screens.
    pub fn is_responsive(&self) -> bool {
        self.responsive
    }

    /// Whether the collapsed menu is expanded.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The widget's refresh signal.
    pub fn refresh(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// Expand or collapse. Non-responsive menus are always expanded.
    pub fn toggle(&mut self) {
        if self.responsive {
            self.open = !self.open;
            self.refresh.request();
        }
    }

    /// An item was clicked; a responsive menu collapses afterwards.
    pub fn on_item_click(&mut self, args: MenuItemEventArgs) {
        tracing::trace!(target: "horizon_forms::widget", item = %args.text, "menu item clicked");
        self.click.emit(args);
        if self.responsive && self.open {
            self.open = false;
            self.refresh.request();
        }
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.id)
            .field("responsive", &self.responsive)
            .field("open", &self.open)
            .finish()
    }
}
