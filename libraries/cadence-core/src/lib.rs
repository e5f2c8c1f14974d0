//! Cadence Core
//!
//! Platform-agnostic types, collaborator traits, and error handling for the
//! Cadence playback engine.
//!
//! This crate defines:
//! - **Domain Types**: [`TrackDescriptor`], [`TrackSource`], [`StreamLocator`],
//!   [`PlaybackMode`]
//! - **Collaborator Traits**: [`SettingsStore`], [`HistoryStore`],
//!   [`Connectivity`], [`StreamResolver`]
//! - **Error Handling**: [`CoreError`] and [`Result`]
//!
//! Playback orchestration lives in `cadence-playback`; stream resolution in
//! `cadence-sources`. Both depend only on the seams defined here, so the
//! engine can be composed with any storage, settings, or catalog backend.

#![forbid(unsafe_code)]

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{CoreError, Result};
pub use memory::{FixedConnectivity, MemoryHistory, MemorySettings};
pub use traits::{Connectivity, HistoryStore, SettingsStore, StreamResolver};
pub use types::{PlaybackMode, SourceKind, StreamLocator, TrackDescriptor, TrackSource};
