//! Error types for playback orchestration

use thiserror::Error;

/// Playback errors
///
/// Raised by [`crate::StreamPlayer`] implementations. Session commands
/// themselves do not fail: invalid commands are silently ignored and
/// per-track failures land the session in a well-defined state instead of
/// propagating.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Invalid seek position
    #[error("Invalid seek position: {0:?}")]
    InvalidSeekPosition(std::time::Duration),

    /// Underlying stream player failure
    #[error("Player error: {0}")]
    Player(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
