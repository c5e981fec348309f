//! Coalescing "please re-render" signal.
//!
//! Widgets call [`RefreshSignal::request`] whenever their visible state
//! changes. The first request after a render raises `requested`; further
//! requests before the host calls [`RefreshSignal::take`] are folded into the
//! same pending redraw. Extra requests never change widget state.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::signal::Signal;

/// An idempotent, coalescible refresh broadcast.
pub struct RefreshSignal {
    pending: AtomicBool,
    requests: AtomicU64,
    /// Raised when a refresh becomes pending.
    pub requested: Signal<()>,
}

impl RefreshSignal {
    /// Create a signal with no pending refresh.
    pub fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            requests: AtomicU64::new(0),
            requested: Signal::new(),
        }
    }

    /// Ask for a redraw.
    pub fn request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.pending.swap(true, Ordering::SeqCst) {
            tracing::trace!(target: "horizon_forms_core::refresh", "refresh requested");
            self.requested.emit(());
        }
    }

    /// Whether a redraw is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Clear the pending flag; the host calls this when it renders.
    ///
    /// Returns whether a redraw was pending.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    /// Total requests seen, coalesced or not.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RefreshSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshSignal")
            .field("pending", &self.is_pending())
            .field("requests", &self.request_count())
            .finish()
    }
}
