//! Ordered play queue with mode-dependent traversal
//!
//! Holds the sequential track list plus a shuffled ordering derived from
//! it. Traversal runs over the sequential list in `Circular` and
//! `RepeatOne` modes and over the shuffled ordering in `Shuffled` mode,
//! with wraparound at both ends. `RepeatOne` only changes automatic
//! advance (handled by the session); explicit next/previous navigate like
//! `Circular`.
//!
//! Lookup is by full descriptor equality: with duplicate tracks in the
//! queue the first occurrence wins.

use cadence_core::{PlaybackMode, TrackDescriptor};
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Ordered, mutable play queue
#[derive(Debug, Clone)]
pub struct PlayQueue {
    /// Insertion-ordered track list (the playback order for sequential modes)
    sequential: Vec<TrackDescriptor>,

    /// Shuffled permutation of `sequential`, regenerated on entering
    /// `Shuffled` mode
    shuffled: Vec<TrackDescriptor>,

    /// Active traversal mode
    mode: PlaybackMode,
}

impl PlayQueue {
    /// Create an empty queue in the given mode
    pub fn new(mode: PlaybackMode) -> Self {
        Self {
            sequential: Vec::new(),
            shuffled: Vec::new(),
            mode,
        }
    }

    /// Replace the track list and traversal mode
    ///
    /// Entering `Shuffled` computes a fresh shuffled ordering.
    pub fn set_queue(&mut self, tracks: Vec<TrackDescriptor>, mode: PlaybackMode) {
        self.sequential = tracks;
        self.mode = mode;
        if mode == PlaybackMode::Shuffled {
            self.reshuffle();
        }
    }

    /// Switch traversal mode
    ///
    /// Switching into `Shuffled` regenerates the shuffled ordering from the
    /// full sequential list; switching out restores sequential traversal
    /// without discarding the underlying list.
    pub fn set_mode(&mut self, mode: PlaybackMode) {
        if mode == PlaybackMode::Shuffled && self.mode != PlaybackMode::Shuffled {
            self.reshuffle();
        }
        self.mode = mode;
    }

    /// Current traversal mode
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Track following `current` in the active ordering, with wraparound
    ///
    /// `None` when the queue is empty or `current` is not in the active
    /// ordering; the caller must not advance in that case.
    pub fn next(&self, current: &TrackDescriptor) -> Option<TrackDescriptor> {
        let active = self.active();
        let position = active.iter().position(|t| t == current)?;
        let next = (position + 1) % active.len();
        Some(active[next].clone())
    }

    /// Track preceding `current` in the active ordering, with wraparound
    pub fn previous(&self, current: &TrackDescriptor) -> Option<TrackDescriptor> {
        let active = self.active();
        let position = active.iter().position(|t| t == current)?;
        let previous = (position + active.len() - 1) % active.len();
        Some(active[previous].clone())
    }

    /// Insert a track immediately after the current track
    ///
    /// The track is removed from its existing position first, so repeated
    /// calls leave exactly one occurrence right after `current`. A no-op
    /// when the track is the current track. Without a current track the
    /// insertion lands at the front.
    pub fn insert_next(&mut self, track: TrackDescriptor, current: Option<&TrackDescriptor>) {
        if current == Some(&track) {
            return;
        }

        if let Some(position) = self.sequential.iter().position(|t| t == &track) {
            self.sequential.remove(position);
        }
        let at = current
            .and_then(|c| self.sequential.iter().position(|t| t == c))
            .map_or(0, |p| p + 1);
        self.sequential.insert(at, track.clone());

        // Keep the shuffled ordering the same multiset while it is live.
        if self.mode == PlaybackMode::Shuffled {
            if let Some(position) = self.shuffled.iter().position(|t| t == &track) {
                self.shuffled.remove(position);
            }
            let at = current
                .and_then(|c| self.shuffled.iter().position(|t| t == c))
                .map_or(0, |p| p + 1);
            self.shuffled.insert(at, track);
        }
    }

    /// Remove a track from the queue
    ///
    /// With duplicates, removes the first occurrence in each ordering.
    pub fn remove(&mut self, track: &TrackDescriptor) {
        if let Some(position) = self.sequential.iter().position(|t| t == track) {
            self.sequential.remove(position);
        }
        if let Some(position) = self.shuffled.iter().position(|t| t == track) {
            self.shuffled.remove(position);
        }
    }

    /// Tracks in the active traversal order
    pub fn tracks(&self) -> &[TrackDescriptor] {
        self.active()
    }

    /// Number of tracks in the queue
    pub fn len(&self) -> usize {
        self.sequential.len()
    }

    /// Whether the queue holds no tracks
    pub fn is_empty(&self) -> bool {
        self.sequential.is_empty()
    }

    fn active(&self) -> &[TrackDescriptor] {
        match self.mode {
            PlaybackMode::Shuffled => &self.shuffled,
            PlaybackMode::Circular | PlaybackMode::RepeatOne => &self.sequential,
        }
    }

    fn reshuffle(&mut self) {
        self.shuffled = self.sequential.clone();
        self.shuffled.shuffle(&mut thread_rng());
    }
}

impl Default for PlayQueue {
    fn default() -> Self {
        Self::new(PlaybackMode::Circular)
    }
}
