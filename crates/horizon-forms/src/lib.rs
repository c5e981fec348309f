//! Horizon Forms - bindable form widgets.
//!
//! This is the widget crate. It builds on [`horizon_forms_core`] (value
//! binding, debounce, registries) and adds:
//!
//! - [`host`]: The UI host interop trait and an in-memory host
//! - [`coercion`]: Decimal-pivot numeric stepping and input parsing
//! - [`filter`]: Text-match filtering over local or delegated data
//! - [`form`]: State shared by every bindable input
//! - [`widgets`]: The widgets themselves
//!
//! Widgets do not render. A rendering layer reads their state, forwards
//! user input to them and re-renders when their refresh signal is pending.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_forms::host::HeadlessHost;
//! use horizon_forms::widgets::{Numeric, NumericOptions};
//!
//! let host = Arc::new(HeadlessHost::new());
//! let quantity = Numeric::new(host, 1i32, NumericOptions::default().with_max(3))?;
//!
//! quantity.step_up();
//! quantity.step_up();
//! quantity.step_up();
//! assert_eq!(quantity.value(), 3);
//! # Ok::<(), horizon_forms::Error>(())
//! ```

pub mod coercion;
mod error;
pub mod filter;
pub mod form;
pub mod host;
pub mod widgets;

pub use error::{Error, Result};
pub use horizon_forms_core::{
    BoundValue, ChangeNotifier, CommitOutcome, EditContext, FieldIdentifier, ObjectId,
    RefreshSignal, Signal,
};
