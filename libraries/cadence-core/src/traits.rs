/// Collaborator traits for the playback engine
use crate::error::Result;
use crate::types::{PlaybackMode, StreamLocator, TrackDescriptor};
use async_trait::async_trait;

/// Durable user settings consulted by the playback session and resolver
///
/// Implementers persist a handful of flags across process restarts. The
/// engine reads them at session start and on change, and writes back the
/// play mode and the audio-focus cooperation flag.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Persisted queue traversal mode
    async fn play_mode(&self) -> Result<PlaybackMode>;

    /// Persist the queue traversal mode
    async fn set_play_mode(&self, mode: PlaybackMode) -> Result<()>;

    /// Whether remote streams may start on a metered network
    async fn allow_metered_playback(&self) -> Result<bool>;

    /// Whether a decoder error advances to the next track automatically
    async fn skip_on_error(&self) -> Result<bool>;

    /// Whether resolution may substitute another catalog when the primary
    /// catalog reports no playback rights
    async fn cross_source_fallback(&self) -> Result<bool>;

    /// Whether the session cooperates with external audio-focus requests
    async fn audio_focus_enabled(&self) -> Result<bool>;

    /// Persist the audio-focus cooperation flag
    async fn set_audio_focus_enabled(&self, enabled: bool) -> Result<()>;
}

/// Playback history sink
///
/// The session records every successfully started track. Storage mechanics
/// are outside the engine; failures are logged by the caller, never
/// surfaced to the listener.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Record a successful track start
    async fn record(&self, track: &TrackDescriptor) -> Result<()>;

    /// Most recent tracks, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<TrackDescriptor>>;
}

/// Network state probe
///
/// The session asks before starting a remote stream whether the active
/// network is metered (mobile data). Platform wiring is out of scope.
pub trait Connectivity: Send + Sync {
    /// Whether the active network connection is metered
    fn is_metered(&self) -> bool;
}

/// Per-track stream resolution
///
/// Given a descriptor, produce a playable locator. Implementations may
/// suspend on network calls; callers must not let an in-flight resolution
/// block command intake, and must discard results that arrive after the
/// request was superseded.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Resolve a track to a stream locator
    ///
    /// `Ok(StreamLocator::Unavailable)` means no playable stream exists for
    /// this track; `Err` means resolution itself failed (transport, parse).
    /// Callers treat both as a non-fatal per-track failure.
    async fn resolve(&self, track: &TrackDescriptor) -> Result<StreamLocator>;
}
