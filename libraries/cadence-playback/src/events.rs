//! Session events
//!
//! Event-based communication for presentation-layer synchronization. Events
//! are emitted on every transition that changes the playable/paused status,
//! on track changes, on mode changes, and for transient user-facing notices.

use crate::session::LifecycleState;
use cadence_core::{PlaybackMode, TrackDescriptor};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the playback session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Lifecycle state changed (playing, paused, preparing, idle, failed)
    StateChanged {
        /// Track the state applies to (absent when idle)
        track: Option<TrackDescriptor>,
        /// The new lifecycle state
        state: LifecycleState,
        /// Current playback position in milliseconds (0 when unprepared)
        position_ms: u64,
        /// Stream duration in milliseconds (0 when unprepared)
        duration_ms: u64,
    },

    /// A different track was loaded
    TrackChanged {
        /// The new current track
        track: TrackDescriptor,
        /// The previous track, if any
        previous: Option<TrackDescriptor>,
    },

    /// Queue traversal mode changed
    ModeChanged {
        /// The new mode
        mode: PlaybackMode,
    },

    /// Transient user-facing notice (resolution failures, playback errors)
    Notice {
        /// Display message
        message: String,
    },
}

/// Broadcast bus for [`SessionEvent`]
///
/// Wraps `tokio::broadcast`: non-blocking emission, any number of
/// subscribers, slow subscribers lag rather than block the session.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all current subscribers
    ///
    /// Emission with no subscribers is not an error; the event is dropped.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new(64)
    }
}
