//! Cadence Playback
//!
//! Playback orchestration for Cadence: the state machine that drives a
//! single active playback session, the ordered play queue with
//! mode-dependent traversal, playback parameters, and the session event
//! bus.
//!
//! This crate provides:
//! - [`PlaybackSession`]: load → prepare → play/pause → complete/error,
//!   with automatic queue advance and stale-result suppression
//! - [`PlayQueue`]: circular / repeat-one / shuffled traversal
//! - [`PlaybackParams`]: speed and stepped pitch with soft bounds
//! - [`SessionEvents`]: broadcast bus the presentation layer subscribes to
//! - [`StreamPlayer`] / [`PlayerFactory`]: the platform decoder seam
//!
//! # Architecture
//!
//! The session is an explicitly constructed object with injected
//! collaborators (resolver, settings, history, connectivity, player
//! factory); there are no process-wide singletons. Exactly one decoder
//! instance is
//! live at a time; the platform provides it through [`PlayerFactory`] and
//! reports preparation, completion, and errors through the
//! [`NoticeSender`] it receives.
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{
//!     FixedConnectivity, MemoryHistory, MemorySettings, PlaybackMode, StreamResolver,
//! };
//! use cadence_playback::{PlaybackSession, PlayerFactory};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     resolver: Arc<dyn StreamResolver>,
//! #     factory: Arc<dyn PlayerFactory>,
//! #     tracks: Vec<cadence_core::TrackDescriptor>,
//! # ) {
//! let session = PlaybackSession::new(
//!     resolver,
//!     Arc::new(MemorySettings::new()),
//!     Arc::new(MemoryHistory::new()),
//!     Arc::new(FixedConnectivity::unmetered()),
//!     factory,
//! )
//! .await;
//!
//! let _events = session.subscribe();
//! session.set_queue(tracks.clone(), PlaybackMode::Circular).await;
//! session.load_track(tracks[0].clone()).await;
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod params;
pub mod player;
pub mod queue;
pub mod session;

pub use error::{PlaybackError, Result};
pub use events::{SessionEvent, SessionEvents};
pub use params::PlaybackParams;
pub use player::{NoticeSender, PlayerFactory, PlayerNotice, StreamPlayer};
pub use queue::PlayQueue;
pub use session::{LifecycleState, PlaybackSession};
