//! Core types for playback orchestration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity and display metadata for one playable item
///
/// Descriptors are immutable: a track entering a queue or history keeps the
/// values it was created with, and source substitutions (e.g. a fallback
/// catalog standing in for an unlicensed track) produce a new descriptor.
///
/// Equality is full-value equality. Two structurally identical descriptors
/// are indistinguishable to queue lookups; with duplicates in a queue the
/// first occurrence wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Catalog-scoped track identifier (opaque to the engine)
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist names (may be empty for untagged local files)
    pub artists: Vec<String>,

    /// Cover art reference (optional)
    pub cover_url: Option<String>,

    /// Where the track lives and how it resolves to a stream
    pub source: TrackSource,
}

impl TrackDescriptor {
    /// All artist names joined into a single display/search line
    pub fn artist_line(&self) -> String {
        self.artists.join(" ")
    }
}

/// Origin of a track, one resolution strategy per variant
///
/// A closed set: every catalog the player aggregates has exactly one variant
/// here, and the resolver matches exhaustively over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackSource {
    /// File on local storage; resolves to its path without any network call
    Local {
        /// Absolute path to the audio file
        path: PathBuf,
    },

    /// Primary remote catalog
    Halcyon {
        /// Whether the catalog reports playback rights for this track.
        /// `false` triggers the cross-source fallback chain when enabled.
        playable: bool,
    },

    /// Per-user cloud locker on the primary service; requires an
    /// authenticated session
    HalcyonDrive,

    /// Secondary remote catalog, direct stream lookup by id
    Chime,

    /// Search-oriented remote catalog, direct stream lookup by id
    Wavelet,

    /// Catalog whose descriptors carry the stream URL directly
    Mirror {
        /// Pre-resolved stream URL
        url: String,
    },
}

impl TrackSource {
    /// The fieldless discriminant of this source
    pub fn kind(&self) -> SourceKind {
        match self {
            TrackSource::Local { .. } => SourceKind::Local,
            TrackSource::Halcyon { .. } => SourceKind::Halcyon,
            TrackSource::HalcyonDrive => SourceKind::HalcyonDrive,
            TrackSource::Chime => SourceKind::Chime,
            TrackSource::Wavelet => SourceKind::Wavelet,
            TrackSource::Mirror { .. } => SourceKind::Mirror,
        }
    }
}

/// Source discriminant, for registry lookup and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Local file
    Local,
    /// Primary remote catalog
    Halcyon,
    /// Authenticated cloud locker on the primary service
    HalcyonDrive,
    /// Secondary remote catalog
    Chime,
    /// Search-oriented remote catalog
    Wavelet,
    /// Direct-URL catalog
    Mirror,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceKind::Local => "local",
            SourceKind::Halcyon => "halcyon",
            SourceKind::HalcyonDrive => "halcyon_drive",
            SourceKind::Chime => "chime",
            SourceKind::Wavelet => "wavelet",
            SourceKind::Mirror => "mirror",
        };
        f.write_str(name)
    }
}

/// Resolved playable reference for one play request
///
/// Ephemeral: produced per resolution, handed to the stream player, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamLocator {
    /// Network stream URL
    Url(String),

    /// Local file handle
    LocalFile(PathBuf),

    /// No playable stream could be found
    Unavailable,
}

impl StreamLocator {
    /// Whether this locator points at something playable
    pub fn is_playable(&self) -> bool {
        !matches!(self, StreamLocator::Unavailable)
    }

    /// Whether playing this locator consumes network bandwidth
    pub fn is_remote(&self) -> bool {
        matches!(self, StreamLocator::Url(_))
    }
}

/// Queue traversal mode
///
/// Governs how next/previous map the current index to a new one. Persisted
/// across restarts through [`crate::SettingsStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Insertion order with wraparound at both ends
    #[default]
    Circular,

    /// Same traversal as Circular for explicit skips; automatic advance
    /// replays the finished track instead
    RepeatOne,

    /// Traversal follows a shuffled ordering of the same tracks
    Shuffled,
}

impl PlaybackMode {
    /// The mode the cycle command steps to next
    pub fn cycled(self) -> Self {
        match self {
            PlaybackMode::Circular => PlaybackMode::RepeatOne,
            PlaybackMode::RepeatOne => PlaybackMode::Shuffled,
            PlaybackMode::Shuffled => PlaybackMode::Circular,
        }
    }
}
