//! Debounce timers for Horizon Forms.
//!
//! [`DebounceScheduler`] keeps at most one pending action per key. Scheduling
//! under a key that already has a pending action replaces it, so a burst of
//! triggers collapses into a single firing `delay` after the last one.
//!
//! The scheduler never spawns threads. The UI loop drives it: it asks
//! [`time_until_next`](DebounceScheduler::time_until_next) how long it may
//! sleep, then calls [`process_expired`](DebounceScheduler::process_expired)
//! (or [`fire_expired`](DebounceScheduler::fire_expired) for closure actions).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_forms_core::{DebounceScheduler, ManualClock};
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut scheduler = DebounceScheduler::new(clock.clone());
//!
//! scheduler.debounce("search", Duration::from_millis(500), "first");
//! clock.advance(Duration::from_millis(200));
//! scheduler.debounce("search", Duration::from_millis(500), "second");
//!
//! clock.advance(Duration::from_millis(500));
//! let fired = scheduler.process_expired();
//! assert_eq!(fired, vec![("search", "second")]);
//! ```

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a scheduled action.
    pub struct TimerId;
}

/// A monotonic time source.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The process monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Hosts with their own notion of frame time and tests that need exact
/// timing use this instead of [`SystemClock`].
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// A scheduled action.
struct Pending<K, A> {
    key: K,
    fire_at: Instant,
    action: A,
}

/// An entry in the timer queue (min-heap by fire time, then schedule order).
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    id: TimerId,
    fire_time: Instant,
    sequence: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.sequence == other.sequence
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Single-pending-action-per-key scheduler.
///
/// `K` names the trigger site (for example "filter" on an autocomplete);
/// `A` is whatever the owner wants back when the delay elapses, usually a
/// small enum or a boxed closure.
///
/// Disposal is terminal: [`dispose`](Self::dispose) drops every pending action
/// unfired and later calls to [`debounce`](Self::debounce) are ignored.
/// Dropping the scheduler has the same effect.
pub struct DebounceScheduler<K, A> {
    clock: Arc<dyn Clock>,
    pending: SlotMap<TimerId, Pending<K, A>>,
    by_key: HashMap<K, TimerId>,
    queue: BinaryHeap<QueueEntry>,
    next_sequence: u64,
    disposed: bool,
}

impl<K, A> DebounceScheduler<K, A>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Create a scheduler reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            pending: SlotMap::with_key(),
            by_key: HashMap::new(),
            queue: BinaryHeap::new(),
            next_sequence: 0,
            disposed: false,
        }
    }

    /// Schedule `action` under `key`, `delay` from now.
    ///
    /// Any not-yet-fired action under the same key is cancelled first.
    /// Returns `None` once the scheduler has been disposed.
    pub fn debounce(&mut self, key: K, delay: Duration, action: A) -> Option<TimerId> {
        if self.disposed {
            tracing::debug!(target: "horizon_forms_core::timer", ?key, "scheduler disposed, ignoring debounce");
            return None;
        }

        if self.cancel(&key) {
            tracing::trace!(target: "horizon_forms_core::timer", ?key, "cancelled pending action");
        }

        let fire_at = self.clock.now() + delay;
        let id = self.pending.insert(Pending {
            key: key.clone(),
            fire_at,
            action,
        });
        self.by_key.insert(key, id);
        self.queue.push(QueueEntry {
            id,
            fire_time: fire_at,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;

        Some(id)
    }

    /// Cancel the pending action under `key`.
    ///
    /// Returns `true` if something was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.by_key.remove(key) {
            Some(id) => self.pending.remove(id).is_some(),
            None => false,
        }
    }

    /// Cancel everything and refuse further scheduling.
    pub fn dispose(&mut self) {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.by_key.clear();
        self.queue.clear();
        self.disposed = true;
        tracing::trace!(target: "horizon_forms_core::timer", cancelled, "scheduler disposed");
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether an action is pending under `key`.
    pub fn is_pending(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }

    /// Number of pending actions.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Time until the next pending action is due, if any.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        // Drop queue entries whose action was cancelled or replaced.
        while let Some(entry) = self.queue.peek() {
            if self.pending.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }

        let now = self.clock.now();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Remove and return every action that is due, earliest first.
    #[tracing::instrument(skip(self), target = "horizon_forms_core::timer", level = "trace")]
    pub fn process_expired(&mut self) -> Vec<(K, A)> {
        let now = self.clock.now();
        let mut due = Vec::new();

        while let Some(entry) = self.queue.peek() {
            if entry.fire_time > now {
                break;
            }
            let id = entry.id;
            self.queue.pop();

            let Some(pending) = self.pending.remove(id) else {
                continue;
            };
            debug_assert!(pending.fire_at <= now);
            self.by_key.remove(&pending.key);
            tracing::trace!(target: "horizon_forms_core::timer", key = ?pending.key, "debounced action due");
            due.push((pending.key, pending.action));
        }

        due
    }
}

impl<K> DebounceScheduler<K, Box<dyn FnOnce() + Send>>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Schedule a closure under `key`.
    pub fn debounce_fn<F>(&mut self, key: K, delay: Duration, action: F) -> Option<TimerId>
    where
        F: FnOnce() + Send + 'static,
    {
        self.debounce(key, delay, Box::new(action))
    }

    /// Run every due closure. Returns how many ran.
    pub fn fire_expired(&mut self) -> usize {
        let due = self.process_expired();
        let count = due.len();
        for (_, action) in due {
            action();
        }
        count
    }
}

impl<K: fmt::Debug, A> fmt::Debug for DebounceScheduler<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebounceScheduler")
            .field("pending", &self.by_key.keys().collect::<Vec<_>>())
            .field("disposed", &self.disposed)
            .finish()
    }
}

static_assertions::assert_impl_all!(DebounceScheduler<&'static str, Box<dyn FnOnce() + Send>>: Send);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_fires_once_after_last_trigger() {
        let clock = Arc::new(ManualClock::new());
        let mut scheduler = DebounceScheduler::new(clock.clone());

        for n in 0..5 {
            scheduler.debounce("filter", ms(500), n);
            clock.advance(ms(100));
        }
        // Last trigger happened 100ms ago.
        clock.advance(ms(399));
        assert!(scheduler.process_expired().is_empty());

        clock.advance(ms(1));
        assert_eq!(scheduler.process_expired(), vec![("filter", 4)]);
        assert!(scheduler.process_expired().is_empty());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let clock = Arc::new(ManualClock::new());
        let mut scheduler = DebounceScheduler::new(clock.clone());

        scheduler.debounce("a", ms(100), 1);
        scheduler.debounce("b", ms(50), 2);
        clock.advance(ms(100));

        let fired = scheduler.process_expired();
        assert_eq!(fired, vec![("b", 2), ("a", 1)]);
    }

    #[test]
    fn test_dispose_cancels_pending_action() {
        let clock = Arc::new(ManualClock::new());
        let mut scheduler: DebounceScheduler<&str, Box<dyn FnOnce() + Send>> =
            DebounceScheduler::new(clock.clone());
        let runs = Arc::new(AtomicUsize::new(0));

        let r = runs.clone();
        scheduler.debounce_fn("filter", ms(1000), move || {
            r.fetch_add(1, AtomicOrdering::SeqCst);
        });

        clock.advance(ms(100));
        scheduler.dispose();
        clock.advance(ms(5000));

        assert_eq!(scheduler.fire_expired(), 0);
        assert_eq!(runs.load(AtomicOrdering::SeqCst), 0);
        assert!(scheduler.debounce_fn("filter", ms(1), || {}).is_none());
    }

    #[test]
    fn test_cancel_and_time_until_next() {
        let clock = Arc::new(ManualClock::new());
        let mut scheduler = DebounceScheduler::new(clock.clone());

        assert_eq!(scheduler.time_until_next(), None);
        scheduler.debounce("a", ms(300), ());
        scheduler.debounce("b", ms(800), ());
        assert_eq!(scheduler.time_until_next(), Some(ms(300)));

        assert!(scheduler.cancel(&"a"));
        assert!(!scheduler.cancel(&"a"));
        assert_eq!(scheduler.time_until_next(), Some(ms(800)));
        assert!(scheduler.is_pending(&"b"));

        clock.advance(ms(900));
        assert_eq!(scheduler.time_until_next(), Some(Duration::ZERO));
    }

    #[test]
    fn test_fire_expired_runs_closure_once() {
        let clock = Arc::new(ManualClock::new());
        let mut scheduler = DebounceScheduler::new(clock.clone());
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let r = runs.clone();
            scheduler.debounce_fn(1u8, ms(10), move || {
                r.fetch_add(1, AtomicOrdering::SeqCst);
            });
        }

        clock.advance(ms(10));
        assert_eq!(scheduler.fire_expired(), 1);
        assert_eq!(runs.load(AtomicOrdering::SeqCst), 1);
    }
}
