//! Error types for quantity parsing.

use thiserror::Error;

/// Result type alias for quantity parsing.
pub type QuantityResult<T> = Result<T, QuantityError>;

/// Errors that can occur while parsing a resource quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity is empty")]
    Empty,

    #[error("invalid quantity: {0:?}")]
    Invalid(String),

    #[error("unknown suffix {suffix:?} in quantity {input:?}")]
    UnknownSuffix { input: String, suffix: String },

    #[error("quantity out of range: {0:?}")]
    Overflow(String),
}
