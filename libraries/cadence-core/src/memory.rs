//! In-memory collaborator implementations
//!
//! Process-local stores for tests, examples, and platforms that wire real
//! persistence in later. Defaults match a fresh installation.

use crate::error::Result;
use crate::traits::{Connectivity, HistoryStore, SettingsStore};
use crate::types::{PlaybackMode, TrackDescriptor};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct SettingsState {
    play_mode: PlaybackMode,
    allow_metered_playback: bool,
    skip_on_error: bool,
    cross_source_fallback: bool,
    audio_focus_enabled: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            play_mode: PlaybackMode::Circular,
            allow_metered_playback: false,
            skip_on_error: true,
            cross_source_fallback: false,
            audio_focus_enabled: true,
        }
    }
}

/// In-memory [`SettingsStore`]
#[derive(Debug, Default)]
pub struct MemorySettings {
    state: RwLock<SettingsState>,
}

impl MemorySettings {
    /// Create a settings store with fresh-install defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metered-network playback flag
    pub async fn set_allow_metered_playback(&self, allow: bool) {
        self.state.write().await.allow_metered_playback = allow;
    }

    /// Set the skip-on-error policy
    pub async fn set_skip_on_error(&self, skip: bool) {
        self.state.write().await.skip_on_error = skip;
    }

    /// Set the cross-source fallback flag
    pub async fn set_cross_source_fallback(&self, enabled: bool) {
        self.state.write().await.cross_source_fallback = enabled;
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn play_mode(&self) -> Result<PlaybackMode> {
        Ok(self.state.read().await.play_mode)
    }

    async fn set_play_mode(&self, mode: PlaybackMode) -> Result<()> {
        self.state.write().await.play_mode = mode;
        Ok(())
    }

    async fn allow_metered_playback(&self) -> Result<bool> {
        Ok(self.state.read().await.allow_metered_playback)
    }

    async fn skip_on_error(&self) -> Result<bool> {
        Ok(self.state.read().await.skip_on_error)
    }

    async fn cross_source_fallback(&self) -> Result<bool> {
        Ok(self.state.read().await.cross_source_fallback)
    }

    async fn audio_focus_enabled(&self) -> Result<bool> {
        Ok(self.state.read().await.audio_focus_enabled)
    }

    async fn set_audio_focus_enabled(&self, enabled: bool) -> Result<()> {
        self.state.write().await.audio_focus_enabled = enabled;
        Ok(())
    }
}

/// In-memory [`HistoryStore`], newest entries first
#[derive(Debug, Default)]
pub struct MemoryHistory {
    tracks: RwLock<Vec<TrackDescriptor>>,
}

impl MemoryHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn record(&self, track: &TrackDescriptor) -> Result<()> {
        self.tracks.write().await.insert(0, track.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TrackDescriptor>> {
        let tracks = self.tracks.read().await;
        Ok(tracks.iter().take(limit).cloned().collect())
    }
}

/// [`Connectivity`] probe that always reports the same network class
#[derive(Debug, Clone, Copy)]
pub struct FixedConnectivity {
    metered: bool,
}

impl FixedConnectivity {
    /// A probe reporting an unmetered connection
    pub fn unmetered() -> Self {
        Self { metered: false }
    }

    /// A probe reporting a metered connection
    pub fn metered() -> Self {
        Self { metered: true }
    }
}

impl Connectivity for FixedConnectivity {
    fn is_metered(&self) -> bool {
        self.metered
    }
}
