//! Error types for Horizon Forms.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the binding, coercion and loading layers.
///
/// None of these are fatal: widgets recover by keeping their previous state
/// and the error is handed back to whoever drove the operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Raw input could not be parsed or converted to the bound type.
    #[error("Cannot convert '{input}' to {target}")]
    Conversion {
        /// The offending input, after sanitising.
        input: String,
        /// Name of the target type.
        target: &'static str,
    },

    /// A step specification was neither `any` nor a decimal number.
    #[error("Invalid step '{0}': expected \"any\" or a decimal number")]
    UnsupportedStep(String),

    /// The configured minimum lies above the configured maximum.
    #[error("Invalid bounds: min {min} is greater than max {max}")]
    InvalidBounds {
        /// Configured minimum.
        min: String,
        /// Configured maximum.
        max: String,
    },

    /// A display format pattern could not be parsed.
    #[error("Invalid format '{0}'")]
    InvalidFormat(String),

    /// A delegated data load failed.
    #[error("Data load failed: {0}")]
    Load(String),
}

impl Error {
    /// Create a conversion error.
    pub fn conversion(input: impl Into<String>, target: &'static str) -> Self {
        Self::Conversion {
            input: input.into(),
            target,
        }
    }

    /// Create a load error.
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load(message.into())
    }
}
