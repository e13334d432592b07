//! Error types for the SwapDesk core.

use crate::{SwapState, Symbol};
use thiserror::Error;

/// User-facing message for missing selections or amount.
pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields.";
/// User-facing message for a non-numeric amount.
pub const MSG_INVALID_NUMBER: &str = "Please enter a valid number.";
/// User-facing message when the executor reports failure.
pub const MSG_TRANSACTION_FAILED: &str = "Transaction failed. Please try again.";
/// User-facing message when the executor faults.
pub const MSG_UNEXPECTED_ERROR: &str = "An error occurred. Please try again.";

/// Input problems detected before a swap is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A currency selection or the sell amount is missing.
    #[error("{}", MSG_FILL_ALL_FIELDS)]
    MissingFields,

    /// The sell amount does not read as a number.
    #[error("{}", MSG_INVALID_NUMBER)]
    InvalidNumber,
}

/// Main error type for swap session operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    /// Precondition failure, never retried automatically.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Executor reported that the swap did not go through.
    #[error("Swap execution failed")]
    ExecutionFailed,

    /// Executor raised an unexpected fault.
    #[error("Swap execution fault: {0}")]
    ExecutionFault(String),

    /// Another operation of the same kind is in flight, or inputs are locked.
    #[error("Busy: {0}")]
    Busy(&'static str),

    /// Session has been torn down.
    #[error("Session closed")]
    Closed,

    /// Invalid state transition.
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: SwapState, to: SwapState },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl SwapError {
    /// Check if the user may retry by submitting again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SwapError::ExecutionFailed | SwapError::ExecutionFault(_) | SwapError::Busy(_)
        )
    }

    /// Message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            SwapError::Validation(v) => v.to_string(),
            SwapError::ExecutionFailed => MSG_TRANSACTION_FAILED.to_string(),
            SwapError::ExecutionFault(_) => MSG_UNEXPECTED_ERROR.to_string(),
            other => other.to_string(),
        }
    }

    /// Stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            SwapError::Validation(ValidationError::MissingFields) => "MISSING_FIELDS",
            SwapError::Validation(ValidationError::InvalidNumber) => "INVALID_NUMBER",
            SwapError::ExecutionFailed => "EXECUTION_FAILED",
            SwapError::ExecutionFault(_) => "EXECUTION_FAULT",
            SwapError::Busy(_) => "BUSY",
            SwapError::Closed => "CLOSED",
            SwapError::InvalidTransition { .. } => "INVALID_TRANSITION",
            SwapError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type alias for swap session operations.
pub type SwapResult<T> = std::result::Result<T, SwapError>;

/// Reasons a feed record cannot become a quote.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Record has no currency symbol")]
    MissingSymbol,

    #[error("Record for {0} has no price")]
    MissingPrice(Symbol),

    #[error("Price {price} for {symbol} is not a positive finite number")]
    NonPositivePrice { symbol: Symbol, price: String },

    #[error("Price {price} for {symbol} is out of the representable range")]
    UnrepresentablePrice { symbol: Symbol, price: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            SwapError::from(ValidationError::MissingFields).user_message(),
            "Please fill in all fields."
        );
        assert_eq!(
            SwapError::from(ValidationError::InvalidNumber).user_message(),
            "Please enter a valid number."
        );
        assert_eq!(
            SwapError::ExecutionFailed.user_message(),
            "Transaction failed. Please try again."
        );
        assert_eq!(
            SwapError::ExecutionFault("socket closed".into()).user_message(),
            "An error occurred. Please try again."
        );
    }

    #[test]
    fn test_retryable() {
        assert!(SwapError::ExecutionFailed.is_retryable());
        assert!(!SwapError::from(ValidationError::MissingFields).is_retryable());
        assert!(!SwapError::Closed.is_retryable());
    }
}
