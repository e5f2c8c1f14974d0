/// Core error types for Cadence
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type shared by collaborator implementations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings read/write failures
    #[error("Settings error: {0}")]
    Settings(String),

    /// Playback history persistence failures
    #[error("History error: {0}")]
    History(String),

    /// Stream resolution failures
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Create a settings error
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Create a history error
    pub fn history(msg: impl Into<String>) -> Self {
        Self::History(msg.into())
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }
}
