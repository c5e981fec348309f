//! Value cells for bound widget state.
//!
//! A [`ValueCell<T>`] owns exactly one logical value of a widget's bound type
//! and detects changes by equality. It carries no notification of its own:
//! the binding pipeline in [`crate::binding`] decides which signals fire after
//! a successful assignment.
//!
//! # Example
//!
//! ```
//! use horizon_forms_core::ValueCell;
//!
//! let cell = ValueCell::new(42);
//! assert!(!cell.set(42));
//! assert!(cell.set(100));
//! assert_eq!(cell.get(), 100);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A holder for one bound value with equality-based change detection.
///
/// The value may be the type's "empty" state (an empty string, `None`, an
/// empty selection); nothing here treats that specially.
///
/// # Thread Safety
///
/// `ValueCell<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
pub struct ValueCell<T> {
    value: RwLock<T>,
}

impl<T: Clone> ValueCell<T> {
    /// Create a new cell with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Overwrite the value without comparing.
    ///
    /// Used when the host pushes a parameter into the widget; such writes
    /// never count as user edits.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> ValueCell<T> {
    /// Set the value, returning `true` if it differed from the current one.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the previous one if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }

    /// Whether `value` equals the current value.
    pub fn is(&self, value: &T) -> bool {
        *self.value.read() == *value
    }
}

impl<T: Clone + Default> Default for ValueCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCell")
            .field("value", &*self.value.read())
            .finish()
    }
}
