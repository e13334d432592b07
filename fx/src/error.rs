//! Price catalog error types.

use thiserror::Error;

/// Errors that can occur while loading prices.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FxError {
    /// Price source could not deliver a price list.
    #[error("Price source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// Price list could not be decoded.
    #[error("Malformed price payload: {0}")]
    MalformedPayload(String),

    /// Reading the price list failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Price list contained no usable quote.
    #[error("Price list from {0} contained no valid quotes")]
    EmptyCatalog(String),

    /// The owner of the price book has shut down.
    #[error("Price book is closed")]
    Closed,
}

impl FxError {
    /// Check if a later refresh may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FxError::SourceUnavailable { .. } | FxError::Io(_))
    }

    /// Stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::SourceUnavailable { .. } => "SOURCE_UNAVAILABLE",
            FxError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            FxError::Io(_) => "IO_ERROR",
            FxError::EmptyCatalog(_) => "EMPTY_CATALOG",
            FxError::Closed => "CLOSED",
        }
    }
}

impl From<std::io::Error> for FxError {
    fn from(e: std::io::Error) -> Self {
        FxError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FxError {
    fn from(e: serde_json::Error) -> Self {
        FxError::MalformedPayload(e.to_string())
    }
}

/// Result type for price catalog operations.
pub type FxResult<T> = Result<T, FxError>;
