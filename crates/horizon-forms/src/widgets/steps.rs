//! Step wizard.
//!
//! [`Steps`] owns a single-select registry of [`StepsItem`]s. Exactly one
//! step is active whenever an interactive step exists: the first
//! interactive step is selected when the first step registers, and again
//! whenever the active step is removed or deselected.

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_forms_core::{
    ChildChange, ChildProps, ObjectId, ParentLink, RefreshSignal, Registry, RegistryEntry,
    RegistryEvent, SelectionMode, Signal,
};

/// A container showing one step at a time.
pub struct Steps {
    id: ObjectId,
    registry: Arc<Registry>,
    change: Arc<Signal<usize>>,
}

impl Steps {
    /// Create an empty wizard.
    pub fn new() -> Self {
        let registry: Arc<Registry> = Arc::new(Registry::new(SelectionMode::Single));
        let change = Arc::new(Signal::new());

        let weak: Weak<Registry> = Arc::downgrade(&registry);
        let on_change = Arc::downgrade(&change);
        registry.events.connect(move |event| {
            let Some(registry) = weak.upgrade() else {
                return;
            };
            match *event {
                RegistryEvent::Registered(_) if registry.selected().is_none() => {
                    registry.select_first();
                }
                RegistryEvent::SelectionChanged(None) => {
                    registry.select_first();
                }
                RegistryEvent::SelectionChanged(Some(id)) => {
                    if let (Some(index), Some(change)) = (registry.position(id), on_change.upgrade()) {
                        change.emit(index);
                    }
                }
                _ => {}
            }
        });

        Self {
            id: ObjectId::next(),
            registry,
            change,
        }
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Emitted with the new index when the active step changes.
    pub fn change(&self) -> &Signal<usize> {
        &self.change
    }

    /// The refresh signal of the wizard.
    pub fn refresh(&self) -> &RefreshSignal {
        self.registry.refresh()
    }

    /// Registered steps in order.
    pub fn steps(&self) -> Vec<RegistryEntry<()>> {
        self.registry.entries()
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no step is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Index of the active step.
    pub fn selected_index(&self) -> Option<usize> {
        self.registry.selected_index()
    }

    /// Id of the active step.
    pub fn selected_step(&self) -> Option<ObjectId> {
        self.registry.selected()
    }

    /// Activate step `id`.
    pub fn select_step(&self, id: ObjectId) -> bool {
        self.registry.select(id)
    }

    /// Activate the first visible, enabled step.
    pub fn select_first(&self) -> Option<ObjectId> {
        self.registry.select_first()
    }

    /// Move to the next visible, enabled step.
    pub fn next(&self) -> bool {
        let steps = self.registry.entries();
        let start = self.selected_index().map_or(0, |i| i + 1);
        let target = steps
            .iter()
            .skip(start)
            .find(|s| s.props.is_interactive())
            .map(|s| s.id);
        target.is_some_and(|id| self.registry.select(id))
    }

    /// Move to the previous visible, enabled step.
    pub fn previous(&self) -> bool {
        let Some(current) = self.selected_index() else {
            return false;
        };
        let steps = self.registry.entries();
        let target = steps[..current]
            .iter()
            .rev()
            .find(|s| s.props.is_interactive())
            .map(|s| s.id);
        target.is_some_and(|id| self.registry.select(id))
    }

    fn link(&self) -> ParentLink {
        self.registry.link()
    }
}

impl Default for Steps {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Steps")
            .field("id", &self.id)
            .field("registry", &self.registry)
            .finish()
    }
}

/// One step of a [`Steps`] wizard.
pub struct StepsItem {
    id: ObjectId,
    text: String,
    selected: bool,
    visible: bool,
    disabled: bool,
    link: ParentLink,
}

impl StepsItem {
    /// Create a step.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            text: text.into(),
            selected: false,
            visible: true,
            disabled: false,
            link: ParentLink::default(),
        }
    }

    /// Request selection on attach.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// The step's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The step's title.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this step is the active one.
    pub fn is_selected(&self) -> bool {
        self.link
            .with(|r| r.props(self.id).map(|p| p.selected))
            .flatten()
            .unwrap_or(self.selected)
    }

    /// Register with `steps`. Attaching to the current parent again is a no-op.
    pub fn attach(&mut self, steps: &Steps) {
        let link = steps.link();
        if self.link.same_parent(&link) {
            return;
        }
        self.link.unregister(self.id);
        self.link = link;
        self.link.register(self.id, self.props(), ());
    }

    /// Change the title.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text != text {
            self.text = text;
            self.notify(ChildChange::TEXT);
        }
    }

    /// Show or hide the step.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.notify(ChildChange::VISIBLE);
        }
    }

    /// Enable or disable the step.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled != disabled {
            self.disabled = disabled;
            self.notify(ChildChange::DISABLED);
        }
    }

    /// Select this step, or fall back to the first step when deselected.
    ///
    /// Compared against the wizard's current selection, not the last request.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        if self.is_selected() == selected {
            return;
        }
        let id = self.id;
        self.link.with(|r| {
            if selected {
                r.select(id);
            } else {
                r.select_first();
            }
        });
    }

    /// Leave the wizard.
    pub fn dispose(&mut self) {
        self.link.unregister(self.id);
    }

    fn props(&self) -> ChildProps {
        ChildProps {
            text: Some(self.text.clone()),
            selected: self.is_selected(),
            visible: self.visible,
            disabled: self.disabled,
            value: None,
        }
    }

    fn notify(&self, changed: ChildChange) {
        self.link.notify(self.id, self.props(), (), changed);
    }
}

impl Drop for StepsItem {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for StepsItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepsItem")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("visible", &self.visible)
            .field("disabled", &self.disabled)
            .field("link", &self.link)
            .finish()
    }
}

static_assertions::assert_impl_all!(Steps: Send, Sync);
static_assertions::assert_impl_all!(StepsItem: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn setup(n: usize) -> (Steps, Vec<StepsItem>) {
        let steps = Steps::new();
        let items = (0..n)
            .map(|i| {
                let mut item = StepsItem::new(format!("Step {}", i + 1));
                item.attach(&steps);
                item
            })
            .collect();
        (steps, items)
    }

    #[test]
    fn test_first_step_selected_on_register() {
        let (steps, items) = setup(3);
        assert_eq!(steps.selected_index(), Some(0));
        assert!(items[0].is_selected());
        assert!(!items[1].is_selected());
    }

    #[test]
    fn test_selecting_step_deselects_others() {
        let (steps, mut items) = setup(3);
        items[1].set_selected(true);
        assert_eq!(steps.selected_step(), Some(items[1].id()));

        items[2].set_selected(true);
        let selected: Vec<_> = steps
            .steps()
            .into_iter()
            .filter(|s| s.props.selected)
            .map(|s| s.id)
            .collect();
        assert_eq!(selected, vec![items[2].id()]);
    }

    #[test]
    fn test_reselect_after_navigation_moved_away() {
        let (steps, mut items) = setup(3);
        items[2].set_selected(true);
        assert!(steps.select_step(items[0].id()));
        assert!(!items[2].is_selected());

        items[2].set_selected(true);
        assert_eq!(steps.selected_index(), Some(2));

        steps.previous();
        items[2].set_selected(true);
        assert_eq!(steps.selected_index(), Some(2));
    }

    #[test]
    fn test_deselect_falls_back_to_first() {
        let (steps, mut items) = setup(3);
        items[2].set_selected(true);
        items[2].set_selected(false);
        assert_eq!(steps.selected_index(), Some(0));
    }

    #[test]
    fn test_next_and_previous_skip_disabled() {
        let (steps, mut items) = setup(4);
        items[1].set_disabled(true);
        items[2].set_visible(false);

        assert!(steps.next());
        assert_eq!(steps.selected_index(), Some(3));
        assert!(!steps.next());

        assert!(steps.previous());
        assert_eq!(steps.selected_index(), Some(0));
        assert!(!steps.previous());
    }

    #[test]
    fn test_change_reports_index() {
        let (steps, _items) = setup(3);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        steps.change().connect(move |&i| s.lock().push(i));

        steps.next();
        steps.next();
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_removing_active_step_selects_first() {
        let (steps, mut items) = setup(3);
        items[2].set_selected(true);
        let removed = items.pop();
        drop(removed);

        assert_eq!(steps.len(), 2);
        assert_eq!(steps.selected_index(), Some(0));
    }

    #[test]
    fn test_item_change_refreshes_wizard() {
        let (steps, mut items) = setup(1);
        steps.refresh().take();

        items[0].set_text("Details");
        assert!(steps.refresh().take());
        assert_eq!(steps.steps()[0].props.text.as_deref(), Some("Details"));
    }
}
