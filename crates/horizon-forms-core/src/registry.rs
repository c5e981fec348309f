//! Parent-owned child registries for composite widgets.
//!
//! A composite widget (steps container, checklist, gauge, report viewer) owns
//! a [`Registry`] listing its children in registration order together with
//! the child properties it last observed. Children never own their parent:
//! they hold a [`ParentLink`], a non-owning handle through which they
//! register, report changes and unregister on disposal.
//!
//! Every mutation follows the same sequence:
//!
//! 1. update the entry list (under the registry lock);
//! 2. re-derive aggregate state, e.g. enforce a single selected child;
//! 3. emit [`Registry::events`] so the parent can recompute its own state;
//! 4. broadcast refresh.
//!
//! Steps 1 and 2 happen in one critical section, so no observer ever sees two
//! children selected in a single-select registry.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_forms_core::{ChildProps, ObjectId, Registry, SelectionMode};
//!
//! let registry: Arc<Registry> = Arc::new(Registry::new(SelectionMode::Single));
//! let (a, b) = (ObjectId::next(), ObjectId::next());
//!
//! registry.register(a, ChildProps::default(), ());
//! registry.register(b, ChildProps::default(), ());
//! registry.select(b);
//! assert_eq!(registry.selected(), Some(b));
//!
//! registry.select(a);
//! assert_eq!(registry.selected(), Some(a));
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use bitflags::bitflags;
use parking_lot::RwLock;

use crate::object::ObjectId;
use crate::refresh::RefreshSignal;
use crate::signal::Signal;

bitflags! {
    /// The tracked child properties that changed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChildChange: u8 {
        /// Displayed text.
        const TEXT = 1 << 0;
        /// Selection flag.
        const SELECTED = 1 << 1;
        /// Visibility.
        const VISIBLE = 1 << 2;
        /// Disabled flag.
        const DISABLED = 1 << 3;
        /// Numeric value.
        const VALUE = 1 << 4;
        /// Widget-specific payload.
        const DATA = 1 << 5;
    }
}

/// The child properties a parent tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildProps {
    /// Displayed text.
    pub text: Option<String>,
    /// Whether the child is flagged selected.
    pub selected: bool,
    /// Whether the child is visible.
    pub visible: bool,
    /// Whether the child is disabled.
    pub disabled: bool,
    /// Numeric value, for children that carry one.
    pub value: Option<f64>,
}

impl Default for ChildProps {
    fn default() -> Self {
        Self {
            text: None,
            selected: false,
            visible: true,
            disabled: false,
            value: None,
        }
    }
}

impl ChildProps {
    /// Props with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Visible and not disabled.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.disabled
    }
}

/// How a registry treats the children's `selected` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Flags are independent; the registry only records them.
    #[default]
    Independent,
    /// At most one child is selected; selecting one clears the others.
    Single,
}

/// One registered child.
#[derive(Debug, Clone)]
pub struct RegistryEntry<D> {
    /// Child identity.
    pub id: ObjectId,
    /// Last observed properties.
    pub props: ChildProps,
    /// Last observed widget-specific payload.
    pub data: D,
    refresh: Option<Weak<RefreshSignal>>,
}

/// What happened to a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A child was added.
    Registered(ObjectId),
    /// A child was removed.
    Unregistered(ObjectId),
    /// A registered child reported a property change.
    ChildChanged(ObjectId, ChildChange),
    /// The selected child changed (single-select registries only).
    SelectionChanged(Option<ObjectId>),
}

struct RegistryState<D> {
    entries: Vec<RegistryEntry<D>>,
    mode: SelectionMode,
}

impl<D> RegistryState<D> {
    fn position(&self, id: ObjectId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn selected(&self) -> Option<ObjectId> {
        self.entries.iter().find(|e| e.props.selected).map(|e| e.id)
    }

    /// Clear `selected` on every entry but `keep`.
    fn deselect_others(&mut self, keep: ObjectId) {
        for entry in &mut self.entries {
            if entry.id != keep {
                entry.props.selected = false;
            }
        }
    }
}

/// An ordered, parent-owned list of child registrations.
///
/// `D` is the widget-specific payload the parent tracks per child (a
/// checklist item's value, a report parameter's value, ...).
pub struct Registry<D = ()> {
    state: RwLock<RegistryState<D>>,
    refresh: RefreshSignal,
    /// Raised after each mutation, once aggregate state is consistent.
    pub events: Signal<RegistryEvent>,
}

impl<D: Clone + Send + Sync + 'static> Registry<D> {
    /// Create an empty registry.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                entries: Vec::new(),
                mode,
            }),
            refresh: RefreshSignal::new(),
            events: Signal::new(),
        }
    }

    /// The parent's refresh signal.
    pub fn refresh(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// The selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.state.read().mode
    }

    /// Add a child if it is not registered yet.
    ///
    /// Returns `false`, without refreshing, when the child is already present.
    pub fn register(&self, id: ObjectId, props: ChildProps, data: D) -> bool {
        self.insert(id, props, data, None)
    }

    /// Add a child whose own refresh signal should receive parent broadcasts.
    pub fn register_child(
        &self,
        id: ObjectId,
        props: ChildProps,
        data: D,
        refresh: &Arc<RefreshSignal>,
    ) -> bool {
        self.insert(id, props, data, Some(Arc::downgrade(refresh)))
    }

    #[tracing::instrument(skip(self, props, data, refresh), target = "horizon_forms_core::registry", level = "trace")]
    fn insert(
        &self,
        id: ObjectId,
        props: ChildProps,
        data: D,
        refresh: Option<Weak<RefreshSignal>>,
    ) -> bool {
        let selection = {
            let mut state = self.state.write();
            if state.position(id).is_some() {
                tracing::trace!(target: "horizon_forms_core::registry", ?id, "already registered");
                return false;
            }

            let before = state.selected();
            let selected = props.selected;
            state.entries.push(RegistryEntry {
                id,
                props,
                data,
                refresh,
            });
            if state.mode == SelectionMode::Single && selected {
                state.deselect_others(id);
            }
            let after = state.selected();
            (before != after && state.mode == SelectionMode::Single).then_some(after)
        };

        self.events.emit(RegistryEvent::Registered(id));
        if let Some(selected) = selection {
            self.events.emit(RegistryEvent::SelectionChanged(selected));
        }
        self.refresh.request();
        true
    }

    /// Remove a child if present.
    ///
    /// Safe to call repeatedly; only the first call has an effect.
    #[tracing::instrument(skip(self), target = "horizon_forms_core::registry", level = "trace")]
    pub fn unregister(&self, id: ObjectId) -> bool {
        let was_selected = {
            let mut state = self.state.write();
            let Some(index) = state.position(id) else {
                return false;
            };
            let entry = state.entries.remove(index);
            entry.props.selected && state.mode == SelectionMode::Single
        };

        self.events.emit(RegistryEvent::Unregistered(id));
        if was_selected {
            self.events.emit(RegistryEvent::SelectionChanged(None));
        }
        self.refresh.request();
        true
    }

    /// Record a change reported by a registered child.
    ///
    /// `props` and `data` are the child's committed state. In a single-select
    /// registry a child reporting `selected = true` clears every sibling.
    /// Returns `false` if the child is not registered.
    #[tracing::instrument(skip(self, props, data), target = "horizon_forms_core::registry", level = "trace")]
    pub fn notify_child_changed(
        &self,
        id: ObjectId,
        props: ChildProps,
        data: D,
        changed: ChildChange,
    ) -> bool {
        let selection = {
            let mut state = self.state.write();
            let Some(index) = state.position(id) else {
                tracing::debug!(target: "horizon_forms_core::registry", ?id, "change from unregistered child ignored");
                return false;
            };

            let before = state.selected();
            let entry = &mut state.entries[index];
            entry.props = props;
            entry.data = data;
            if state.mode == SelectionMode::Single && state.entries[index].props.selected {
                state.deselect_others(id);
            }
            let after = state.selected();
            (before != after && state.mode == SelectionMode::Single).then_some(after)
        };

        self.events.emit(RegistryEvent::ChildChanged(id, changed));
        if let Some(selected) = selection {
            self.events.emit(RegistryEvent::SelectionChanged(selected));
        }
        self.refresh.request();
        true
    }

    /// Flag `id` selected; in single-select mode, clear every other child.
    ///
    /// Returns `true` if any flag changed.
    pub fn select(&self, id: ObjectId) -> bool {
        self.apply_selection(Some(id))
    }

    /// Clear every selection flag.
    pub fn clear_selection(&self) -> bool {
        self.apply_selection(None)
    }

    /// Select the first visible, enabled child.
    ///
    /// Clears the selection when there is none.
    pub fn select_first(&self) -> Option<ObjectId> {
        let first = self
            .state
            .read()
            .entries
            .iter()
            .find(|e| e.props.is_interactive())
            .map(|e| e.id);
        self.apply_selection(first);
        first
    }

    fn apply_selection(&self, target: Option<ObjectId>) -> bool {
        let (changed, mode) = {
            let mut state = self.state.write();
            if let Some(id) = target {
                if state.position(id).is_none() {
                    return false;
                }
            }
            let mode = state.mode;
            let mut changed = false;
            for entry in &mut state.entries {
                let want = match (mode, target) {
                    (SelectionMode::Single, t) => Some(entry.id) == t,
                    (SelectionMode::Independent, Some(t)) if entry.id == t => true,
                    (SelectionMode::Independent, Some(_)) => entry.props.selected,
                    (SelectionMode::Independent, None) => false,
                };
                if entry.props.selected != want {
                    entry.props.selected = want;
                    changed = true;
                }
            }
            (changed, mode)
        };

        if changed {
            if mode == SelectionMode::Single {
                self.events.emit(RegistryEvent::SelectionChanged(target));
            }
            self.refresh.request();
        }
        changed
    }

    /// Request a refresh of the parent and of every child that registered
    /// its own refresh signal.
    pub fn broadcast_refresh(&self) {
        let children: Vec<Weak<RefreshSignal>> = self
            .state
            .read()
            .entries
            .iter()
            .filter_map(|e| e.refresh.clone())
            .collect();

        self.refresh.request();
        for child in children.iter().filter_map(Weak::upgrade) {
            child.request();
        }
    }

    /// Remove every child.
    pub fn clear(&self) {
        let removed: Vec<ObjectId> = {
            let mut state = self.state.write();
            state.entries.drain(..).map(|e| e.id).collect()
        };
        if removed.is_empty() {
            return;
        }
        for id in removed {
            self.events.emit(RegistryEvent::Unregistered(id));
        }
        self.refresh.request();
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.state.read().position(id).is_some()
    }

    /// Number of registered children.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether no child is registered.
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Registration index of `id`.
    pub fn position(&self, id: ObjectId) -> Option<usize> {
        self.state.read().position(id)
    }

    /// The first child flagged selected.
    pub fn selected(&self) -> Option<ObjectId> {
        self.state.read().selected()
    }

    /// Registration index of the selected child.
    pub fn selected_index(&self) -> Option<usize> {
        let state = self.state.read();
        state.entries.iter().position(|e| e.props.selected)
    }

    /// Last observed props of `id`.
    pub fn props(&self, id: ObjectId) -> Option<ChildProps> {
        let state = self.state.read();
        state.position(id).map(|i| state.entries[i].props.clone())
    }

    /// Snapshot of all entries in registration order.
    pub fn entries(&self) -> Vec<RegistryEntry<D>> {
        self.state.read().entries.clone()
    }

    /// Child ids in registration order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.state.read().entries.iter().map(|e| e.id).collect()
    }

    /// Child ids in display order.
    ///
    /// Registration order, except that a single-select registry lists the
    /// selected child first.
    pub fn ordered_ids(&self) -> Vec<ObjectId> {
        let state = self.state.read();
        let mut ids: Vec<ObjectId> = state.entries.iter().map(|e| e.id).collect();
        if state.mode == SelectionMode::Single {
            if let Some(index) = state.entries.iter().position(|e| e.props.selected) {
                let selected = ids.remove(index);
                ids.insert(0, selected);
            }
        }
        ids
    }

    /// A non-owning handle for children.
    pub fn link(self: &Arc<Self>) -> ParentLink<D> {
        ParentLink {
            registry: Arc::downgrade(self),
        }
    }
}

impl<D: Clone + Send + Sync + 'static> Default for Registry<D> {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl<D: fmt::Debug> fmt::Debug for Registry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Registry")
            .field("mode", &state.mode)
            .field("entries", &state.entries)
            .field("refresh", &self.refresh)
            .finish()
    }
}

/// A child's non-owning reference to its parent's registry.
///
/// A detached link (the default, or one whose parent is gone) turns every
/// call into a no-op returning `false`/`None`.
pub struct ParentLink<D = ()> {
    registry: Weak<Registry<D>>,
}

impl<D> Clone for ParentLink<D> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<D> Default for ParentLink<D> {
    fn default() -> Self {
        Self {
            registry: Weak::new(),
        }
    }
}

impl<D> fmt::Debug for ParentLink<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentLink")
            .field("attached", &(self.registry.strong_count() > 0))
            .finish()
    }
}

impl<D: Clone + Send + Sync + 'static> ParentLink<D> {
    /// Whether the parent is still alive.
    pub fn is_attached(&self) -> bool {
        self.registry.strong_count() > 0
    }

    /// Whether this link and `other` point at the same registry.
    pub fn same_parent(&self, other: &ParentLink<D>) -> bool {
        Weak::ptr_eq(&self.registry, &other.registry)
    }

    /// Run `f` against the parent registry, if it is alive.
    pub fn with<R>(&self, f: impl FnOnce(&Registry<D>) -> R) -> Option<R> {
        self.registry.upgrade().map(|registry| f(&registry))
    }

    /// Register with the parent.
    pub fn register(&self, id: ObjectId, props: ChildProps, data: D) -> bool {
        self.with(|r| r.register(id, props, data)).unwrap_or(false)
    }

    /// Register with the parent; parent broadcasts reach `refresh`.
    pub fn register_child(
        &self,
        id: ObjectId,
        props: ChildProps,
        data: D,
        refresh: &Arc<RefreshSignal>,
    ) -> bool {
        self.with(|r| r.register_child(id, props, data, refresh))
            .unwrap_or(false)
    }

    /// Report a committed change to the parent.
    pub fn notify(&self, id: ObjectId, props: ChildProps, data: D, changed: ChildChange) -> bool {
        self.with(|r| r.notify_child_changed(id, props, data, changed))
            .unwrap_or(false)
    }

    /// Unregister from the parent.
    pub fn unregister(&self, id: ObjectId) -> bool {
        self.with(|r| r.unregister(id)).unwrap_or(false)
    }
}

static_assertions::assert_impl_all!(Registry<String>: Send, Sync);
static_assertions::assert_impl_all!(ParentLink<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn ids(n: usize) -> Vec<ObjectId> {
        (0..n).map(|_| ObjectId::next()).collect()
    }

    fn selected_set(registry: &Registry) -> Vec<ObjectId> {
        registry
            .entries()
            .into_iter()
            .filter(|e| e.props.selected)
            .map(|e| e.id)
            .collect()
    }

    #[test]
    fn test_duplicate_register_is_noop() {
        let registry: Registry = Registry::new(SelectionMode::Independent);
        let a = ObjectId::next();

        assert!(registry.register(a, ChildProps::default(), ()));
        assert!(registry.refresh().take());

        assert!(!registry.register(a, ChildProps::default(), ()));
        assert_eq!(registry.len(), 1);
        assert!(!registry.refresh().is_pending());
        assert_eq!(registry.refresh().request_count(), 1);
    }

    #[test]
    fn test_single_select_keeps_one_selected() {
        let registry: Registry = Registry::new(SelectionMode::Single);
        let ids = ids(3);
        for &id in &ids {
            registry.register(id, ChildProps::default(), ());
        }

        registry.select(ids[1]);
        assert_eq!(selected_set(&registry), vec![ids[1]]);

        registry.select(ids[2]);
        assert_eq!(selected_set(&registry), vec![ids[2]]);
    }

    #[test]
    fn test_child_reporting_selected_clears_siblings() {
        let registry: Registry = Registry::new(SelectionMode::Single);
        let ids = ids(2);
        registry.register(ids[0], ChildProps { selected: true, ..Default::default() }, ());
        registry.register(ids[1], ChildProps::default(), ());

        let observed = Arc::new(Mutex::new(Vec::new()));
        let o = observed.clone();
        registry.events.connect(move |e| o.lock().push(*e));

        registry.notify_child_changed(
            ids[1],
            ChildProps { selected: true, ..Default::default() },
            (),
            ChildChange::SELECTED,
        );

        assert_eq!(selected_set(&registry), vec![ids[1]]);
        assert_eq!(
            *observed.lock(),
            vec![
                RegistryEvent::ChildChanged(ids[1], ChildChange::SELECTED),
                RegistryEvent::SelectionChanged(Some(ids[1])),
            ]
        );
    }

    #[test]
    fn test_registering_selected_child_wins() {
        let registry: Registry = Registry::new(SelectionMode::Single);
        let ids = ids(2);
        let selected = ChildProps { selected: true, ..Default::default() };
        registry.register(ids[0], selected.clone(), ());
        registry.register(ids[1], selected, ());
        assert_eq!(selected_set(&registry), vec![ids[1]]);
    }

    #[test]
    fn test_independent_mode_leaves_siblings() {
        let registry: Registry = Registry::new(SelectionMode::Independent);
        let ids = ids(2);
        registry.register(ids[0], ChildProps::default(), ());
        registry.register(ids[1], ChildProps::default(), ());

        registry.select(ids[0]);
        registry.select(ids[1]);
        assert_eq!(selected_set(&registry), ids);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry: Registry = Registry::new(SelectionMode::Single);
        let ids = ids(2);
        registry.register(ids[0], ChildProps::default(), ());
        registry.register(ids[1], ChildProps::default(), ());
        registry.select(ids[0]);
        registry.refresh().take();

        assert!(registry.unregister(ids[0]));
        assert!(registry.refresh().take());
        assert!(!registry.unregister(ids[0]));
        assert!(!registry.refresh().is_pending());
        assert_eq!(registry.ids(), vec![ids[1]]);
        assert_eq!(registry.selected(), None);
    }

    #[test]
    fn test_ordered_ids_put_selected_first() {
        let registry: Registry = Registry::new(SelectionMode::Single);
        let ids = ids(3);
        for &id in &ids {
            registry.register(id, ChildProps::default(), ());
        }
        assert_eq!(registry.ordered_ids(), ids);

        registry.select(ids[2]);
        assert_eq!(registry.ordered_ids(), vec![ids[2], ids[0], ids[1]]);
        assert_eq!(registry.ids(), ids);
    }

    #[test]
    fn test_select_first_skips_hidden_and_disabled() {
        let registry: Registry = Registry::new(SelectionMode::Single);
        let ids = ids(3);
        registry.register(ids[0], ChildProps { visible: false, ..Default::default() }, ());
        registry.register(ids[1], ChildProps { disabled: true, ..Default::default() }, ());
        registry.register(ids[2], ChildProps::default(), ());

        assert_eq!(registry.select_first(), Some(ids[2]));
        assert_eq!(registry.selected_index(), Some(2));
    }

    #[test]
    fn test_link_is_non_owning() {
        let registry: Arc<Registry<String>> = Arc::new(Registry::new(SelectionMode::Independent));
        let link = registry.link();
        let id = ObjectId::next();

        assert!(link.register(id, ChildProps::with_text("Name"), "Ada".into()));
        assert!(link.notify(id, ChildProps::with_text("Name"), "Grace".into(), ChildChange::DATA));
        assert_eq!(registry.entries()[0].data, "Grace");

        drop(registry);
        assert!(!link.is_attached());
        assert!(!link.unregister(id));
    }

    #[test]
    fn test_broadcast_reaches_children() {
        let registry: Registry = Registry::new(SelectionMode::Independent);
        let child_refresh = Arc::new(RefreshSignal::new());
        registry.register_child(ObjectId::next(), ChildProps::default(), (), &child_refresh);
        registry.refresh().take();

        registry.broadcast_refresh();
        assert!(registry.refresh().is_pending());
        assert!(child_refresh.is_pending());
    }

    #[test]
    fn test_notify_from_unknown_child_is_ignored() {
        let registry: Registry = Registry::new(SelectionMode::Single);
        assert!(!registry.notify_child_changed(
            ObjectId::next(),
            ChildProps::default(),
            (),
            ChildChange::TEXT
        ));
        assert!(!registry.refresh().is_pending());
    }
}
