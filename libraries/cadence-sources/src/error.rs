//! Error types for stream resolution.

use thiserror::Error;

/// Errors that can occur while talking to a remote catalog.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Catalog returned an error response
    #[error("Catalog error ({status}): {message}")]
    CatalogError { status: u16, message: String },

    /// Invalid catalog base URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse a catalog response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Catalog is offline or unreachable
    #[error("Catalog unreachable: {0}")]
    Unreachable(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, SourceError>;

impl From<SourceError> for cadence_core::CoreError {
    fn from(err: SourceError) -> Self {
        cadence_core::CoreError::Resolution(err.to_string())
    }
}
