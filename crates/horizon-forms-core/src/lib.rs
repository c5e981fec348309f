//! Core systems for Horizon Forms.
//!
//! This crate provides the state machinery shared by every bindable widget:
//!
//! - **Value cells**: A single bound value with equality-based change detection
//! - **Binding pipeline**: Ordered `value_changed` → field-dirty → `change` dispatch
//! - **Signals**: Application-facing callbacks with scoped connections
//! - **Debounce**: One pending action per key, driven by the UI loop
//! - **Registries**: Parent-owned child lists with single-select enforcement
//! - **Refresh**: A coalescing "please re-render" broadcast
//!
//! # Binding Example
//!
//! ```
//! use horizon_forms_core::{BoundValue, CommitOutcome};
//!
//! let value = BoundValue::new(String::new());
//! value.notifier().change.connect(|text| println!("changed to {text}"));
//!
//! assert_eq!(value.commit("hello".into()), CommitOutcome::Committed);
//! assert_eq!(value.get(), "hello");
//! ```
//!
//! # Debounce Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_forms_core::{DebounceScheduler, ManualClock};
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut timers = DebounceScheduler::new(clock.clone());
//!
//! for _ in 0..3 {
//!     timers.debounce("filter", Duration::from_millis(500), ());
//! }
//! clock.advance(Duration::from_millis(500));
//! assert_eq!(timers.process_expired().len(), 1);
//! ```

pub mod binding;
mod error;
pub mod logging;
mod object;
mod refresh;
pub mod registry;
pub mod signal;
pub mod timer;
mod value;

pub use binding::{BoundValue, ChangeNotifier, CommitOutcome, EditContext, FieldIdentifier};
pub use error::{Error, Result};
pub use object::ObjectId;
pub use refresh::RefreshSignal;
pub use registry::{
    ChildChange, ChildProps, ParentLink, Registry, RegistryEntry, RegistryEvent, SelectionMode,
};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{Clock, DebounceScheduler, ManualClock, SystemClock, TimerId};
pub use value::ValueCell;
