//! Logging facilities for Horizon Forms.
//!
//! Horizon Forms uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; applications decide where logs go:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_forms_core::registry=trace,horizon_forms=debug")
//!     .init();
//! ```
//!
//! Every log record is emitted under one of the [`targets`] below so that a
//! single subsystem can be switched on without drowning in the rest.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_forms_core";
    /// Signal dispatch target.
    pub const SIGNAL: &str = "horizon_forms_core::signal";
    /// Value binding and change notification target.
    pub const BINDING: &str = "horizon_forms_core::binding";
    /// Debounce timer target.
    pub const TIMER: &str = "horizon_forms_core::timer";
    /// Child registry target.
    pub const REGISTRY: &str = "horizon_forms_core::registry";
    /// Refresh broadcast target.
    pub const REFRESH: &str = "horizon_forms_core::refresh";
    /// Filter engine target.
    pub const FILTER: &str = "horizon_forms::filter";
    /// Numeric coercion target.
    pub const NUMERIC: &str = "horizon_forms::numeric";
    /// Widget behaviour target.
    pub const WIDGET: &str = "horizon_forms::widget";
    /// UI host interop target.
    pub const HOST: &str = "horizon_forms::host";
}
