//! Platform-agnostic stream player seam
//!
//! Abstracts the underlying decoder/player so the session state machine can
//! drive any backend. A player instance lives for exactly one track: the
//! session creates a fresh one per load through [`PlayerFactory`] and drops
//! it before the next acquisition, so no two decoders are ever live at
//! once.

use crate::error::Result;
use cadence_core::StreamLocator;
use std::time::Duration;
use tokio::sync::mpsc;

/// Asynchronous notifications from a player back to the session
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerNotice {
    /// Preparation finished; the stream is seekable and playable
    Prepared,

    /// The stream played to its end
    Completed,

    /// The platform decoder reported a failure
    Error(String),
}

/// A player notice tagged with the load generation it belongs to
#[derive(Debug, Clone)]
pub(crate) struct TaggedNotice {
    pub(crate) generation: u64,
    pub(crate) notice: PlayerNotice,
}

/// Handle a player uses to report preparation, completion, and errors
///
/// Carries the generation of the load that created the player; notices from
/// a superseded player are discarded by the session without effect.
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: mpsc::UnboundedSender<TaggedNotice>,
    generation: u64,
}

impl NoticeSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<TaggedNotice>, generation: u64) -> Self {
        Self { tx, generation }
    }

    /// Report that asynchronous preparation completed
    pub fn prepared(&self) {
        self.send(PlayerNotice::Prepared);
    }

    /// Report that the stream reached its end
    pub fn completed(&self) {
        self.send(PlayerNotice::Completed);
    }

    /// Report a decoder failure
    pub fn error(&self, message: impl Into<String>) {
        self.send(PlayerNotice::Error(message.into()));
    }

    fn send(&self, notice: PlayerNotice) {
        let _ = self.tx.send(TaggedNotice {
            generation: self.generation,
            notice,
        });
    }
}

/// One underlying decoder/player instance
///
/// Implementations wrap the platform stream player. `load` begins
/// asynchronous preparation and returns immediately; readiness, completion,
/// and errors are reported through the [`NoticeSender`] the factory
/// received.
pub trait StreamPlayer: Send {
    /// Configure the player with a stream and begin asynchronous preparation
    fn load(&mut self, locator: &StreamLocator) -> Result<()>;

    /// Start or resume playback (valid once prepared)
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Seek to a position from the start of the stream
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Apply playback speed and pitch multipliers
    fn set_params(&mut self, speed: f32, pitch: f32) -> Result<()>;

    /// Current playback position
    fn position(&self) -> Duration;

    /// Total stream duration
    fn duration(&self) -> Duration;
}

/// Creates one fresh [`StreamPlayer`] per track load
pub trait PlayerFactory: Send + Sync {
    /// Create a player that reports through `notices`
    fn create(&self, notices: NoticeSender) -> Box<dyn StreamPlayer>;
}
