//! Playback session state machine
//!
//! Owns one underlying stream player at a time and drives it through
//! load → prepare → play/pause → complete/error, consuming the play queue
//! and the stream resolver to advance tracks automatically.
//!
//! All session state sits behind a single `tokio::Mutex` (single-writer
//! discipline). Resolution runs in spawned tasks; every `load_track` bumps
//! a generation counter, and a resolution result or player notice is
//! applied only while its generation still matches, so superseded work is
//! discarded without any state transition.

use crate::events::{SessionEvent, SessionEvents};
use crate::params::PlaybackParams;
use crate::player::{NoticeSender, PlayerFactory, PlayerNotice, StreamPlayer, TaggedNotice};
use crate::queue::PlayQueue;
use cadence_core::{
    Connectivity, HistoryStore, PlaybackMode, SettingsStore, StreamLocator, StreamResolver,
    TrackDescriptor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, warn};

/// Lifecycle state of the playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No track loaded
    Idle,

    /// Stream loading, not yet seekable or playable
    Preparing,

    /// Prepared and playing
    Playing,

    /// Prepared and paused
    Paused,

    /// The stream played to its end (transient: auto-advance follows)
    Completed,

    /// The current track failed and automatic advance did not proceed
    Failed,
}

struct SessionInner {
    queue: PlayQueue,
    current: Option<TrackDescriptor>,
    lifecycle: LifecycleState,
    prepared: bool,
    params: PlaybackParams,
    player: Option<Box<dyn StreamPlayer>>,
    generation: u64,
    advance_failures: usize,
    focus_enabled: bool,
}

struct SessionCtx {
    inner: Mutex<SessionInner>,
    events: SessionEvents,
    resolver: Arc<dyn StreamResolver>,
    settings: Arc<dyn SettingsStore>,
    history: Arc<dyn HistoryStore>,
    connectivity: Arc<dyn Connectivity>,
    factory: Arc<dyn PlayerFactory>,
    notice_tx: mpsc::UnboundedSender<TaggedNotice>,
}

/// The playback session
///
/// Explicitly constructed with its collaborators injected; cheap to clone
/// (all clones drive the same session). Commands are async but never block
/// on resolution: loading spawns the network work and returns.
#[derive(Clone)]
pub struct PlaybackSession {
    ctx: Arc<SessionCtx>,
}

impl PlaybackSession {
    /// Create a session and start its notice pump
    ///
    /// Reads the persisted play mode and audio-focus flag; a failing
    /// settings read falls back to defaults rather than failing startup.
    pub async fn new(
        resolver: Arc<dyn StreamResolver>,
        settings: Arc<dyn SettingsStore>,
        history: Arc<dyn HistoryStore>,
        connectivity: Arc<dyn Connectivity>,
        factory: Arc<dyn PlayerFactory>,
    ) -> Self {
        let mode = match settings.play_mode().await {
            Ok(mode) => mode,
            Err(err) => {
                warn!(error = %err, "failed to read persisted play mode");
                PlaybackMode::default()
            }
        };
        let focus_enabled = settings.audio_focus_enabled().await.unwrap_or(true);

        let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(SessionCtx {
            inner: Mutex::new(SessionInner {
                queue: PlayQueue::new(mode),
                current: None,
                lifecycle: LifecycleState::Idle,
                prepared: false,
                params: PlaybackParams::new(),
                player: None,
                generation: 0,
                advance_failures: 0,
                focus_enabled,
            }),
            events: SessionEvents::default(),
            resolver,
            settings,
            history,
            connectivity,
            factory,
            notice_tx,
        });

        let pump = ctx.clone();
        tokio::spawn(async move {
            while let Some(notice) = notice_rx.recv().await {
                Self::handle_notice(&pump, notice).await;
            }
        });

        Self { ctx }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.ctx.events.subscribe()
    }

    // ===== Queue commands =====

    /// Replace the play queue and traversal mode
    pub async fn set_queue(&self, tracks: Vec<TrackDescriptor>, mode: PlaybackMode) {
        let mut inner = self.ctx.inner.lock().await;
        let changed = inner.queue.mode() != mode;
        inner.queue.set_queue(tracks, mode);
        drop(inner);
        if changed {
            self.persist_mode(mode).await;
        }
    }

    /// Switch the traversal mode
    pub async fn set_mode(&self, mode: PlaybackMode) {
        let mut inner = self.ctx.inner.lock().await;
        if inner.queue.mode() == mode {
            return;
        }
        inner.queue.set_mode(mode);
        drop(inner);
        self.persist_mode(mode).await;
    }

    /// Step to the next traversal mode (circular → repeat-one → shuffled)
    pub async fn cycle_mode(&self) -> PlaybackMode {
        let mut inner = self.ctx.inner.lock().await;
        let mode = inner.queue.mode().cycled();
        inner.queue.set_mode(mode);
        drop(inner);
        self.persist_mode(mode).await;
        mode
    }

    /// Queue a track to play right after the current one
    pub async fn insert_next(&self, track: TrackDescriptor) {
        let mut inner = self.ctx.inner.lock().await;
        let current = inner.current.clone();
        inner.queue.insert_next(track, current.as_ref());
    }

    /// Tracks in the active traversal order
    pub async fn queue_tracks(&self) -> Vec<TrackDescriptor> {
        self.ctx.inner.lock().await.queue.tracks().to_vec()
    }

    // ===== Playback commands =====

    /// Load and play a track, superseding whatever was loading or playing
    pub async fn load_track(&self, track: TrackDescriptor) {
        let mut inner = self.ctx.inner.lock().await;
        Self::begin_load(&self.ctx, &mut inner, track);
    }

    /// Resume playback; a no-op until the stream is prepared
    pub async fn play(&self) {
        let mut inner = self.ctx.inner.lock().await;
        Self::play_locked(&self.ctx, &mut inner);
    }

    /// Pause playback; a no-op until the stream is prepared
    pub async fn pause(&self) {
        let mut inner = self.ctx.inner.lock().await;
        Self::pause_locked(&self.ctx, &mut inner);
    }

    /// Toggle between playing and paused
    pub async fn toggle_play_pause(&self) {
        let mut inner = self.ctx.inner.lock().await;
        if inner.lifecycle == LifecycleState::Playing {
            Self::pause_locked(&self.ctx, &mut inner);
        } else {
            Self::play_locked(&self.ctx, &mut inner);
        }
    }

    /// External interruption (audio-focus loss, output disconnected)
    ///
    /// Equivalent to [`pause`](Self::pause); ignored when idle.
    pub async fn interrupt(&self) {
        self.pause().await;
    }

    /// Seek within the prepared stream, clamped to its duration
    pub async fn seek(&self, position: Duration) {
        let mut inner = self.ctx.inner.lock().await;
        if !inner.prepared {
            return;
        }
        let Some(player) = inner.player.as_mut() else {
            return;
        };
        let clamped = position.min(player.duration());
        if let Err(err) = player.seek(clamped) {
            warn!(error = %err, "seek failed");
            return;
        }
        Self::emit_state(&self.ctx, &inner);
    }

    /// Load the queue's next track; a no-op when there is none
    pub async fn skip_next(&self) {
        let mut inner = self.ctx.inner.lock().await;
        let Some(next) = inner.current.as_ref().and_then(|c| inner.queue.next(c)) else {
            return;
        };
        Self::begin_load(&self.ctx, &mut inner, next);
    }

    /// Load the queue's previous track; a no-op when there is none
    pub async fn skip_previous(&self) {
        let mut inner = self.ctx.inner.lock().await;
        let Some(previous) = inner
            .current
            .as_ref()
            .and_then(|c| inner.queue.previous(c))
        else {
            return;
        };
        Self::begin_load(&self.ctx, &mut inner, previous);
    }

    /// Release the player and return to idle
    pub async fn stop(&self) {
        let mut inner = self.ctx.inner.lock().await;
        Self::park_idle(&self.ctx, &mut inner);
    }

    // ===== Parameters =====

    /// Set the playback speed multiplier
    pub async fn set_speed(&self, speed: f32) {
        let mut inner = self.ctx.inner.lock().await;
        inner.params.set_speed(speed);
        Self::apply_params(&mut inner);
    }

    /// Step pitch up one unit (bounces off the upper bound)
    pub async fn increase_pitch(&self) {
        let mut inner = self.ctx.inner.lock().await;
        inner.params.increase_pitch();
        Self::apply_params(&mut inner);
    }

    /// Step pitch down one unit (bounces off the lower bound)
    pub async fn decrease_pitch(&self) {
        let mut inner = self.ctx.inner.lock().await;
        inner.params.decrease_pitch();
        Self::apply_params(&mut inner);
    }

    /// Enable or disable audio-focus cooperation, persisting on change
    pub async fn set_audio_focus(&self, enabled: bool) {
        let mut inner = self.ctx.inner.lock().await;
        if inner.focus_enabled == enabled {
            return;
        }
        inner.focus_enabled = enabled;
        drop(inner);
        if let Err(err) = self.ctx.settings.set_audio_focus_enabled(enabled).await {
            warn!(error = %err, "failed to persist audio focus flag");
        }
    }

    // ===== State accessors =====

    /// The current track, if any
    pub async fn current_track(&self) -> Option<TrackDescriptor> {
        self.ctx.inner.lock().await.current.clone()
    }

    /// The session lifecycle state
    pub async fn lifecycle(&self) -> LifecycleState {
        self.ctx.inner.lock().await.lifecycle
    }

    /// The active traversal mode
    pub async fn mode(&self) -> PlaybackMode {
        self.ctx.inner.lock().await.queue.mode()
    }

    /// Playback position; zero until prepared
    pub async fn position(&self) -> Duration {
        let inner = self.ctx.inner.lock().await;
        match (&inner.player, inner.prepared) {
            (Some(player), true) => player.position(),
            _ => Duration::ZERO,
        }
    }

    /// Stream duration; zero until prepared
    pub async fn duration(&self) -> Duration {
        let inner = self.ctx.inner.lock().await;
        match (&inner.player, inner.prepared) {
            (Some(player), true) => player.duration(),
            _ => Duration::ZERO,
        }
    }

    /// Current playback speed multiplier
    pub async fn speed(&self) -> f32 {
        self.ctx.inner.lock().await.params.speed()
    }

    /// Current pitch step count relative to unity
    pub async fn pitch_level(&self) -> i32 {
        self.ctx.inner.lock().await.params.pitch_level()
    }

    /// Whether audio-focus cooperation is enabled
    pub async fn audio_focus_enabled(&self) -> bool {
        self.ctx.inner.lock().await.focus_enabled
    }

    // ===== Internals =====

    async fn persist_mode(&self, mode: PlaybackMode) {
        if let Err(err) = self.ctx.settings.set_play_mode(mode).await {
            warn!(error = %err, "failed to persist play mode");
        }
        self.ctx.events.emit(SessionEvent::ModeChanged { mode });
    }

    /// Start loading a track: supersede in-flight work, release the old
    /// player, and spawn resolution.
    fn begin_load(ctx: &Arc<SessionCtx>, inner: &mut SessionInner, track: TrackDescriptor) {
        inner.generation += 1;
        let generation = inner.generation;

        // The previous decoder must be fully released before the next one
        // exists; dropping it here guarantees a single live instance.
        inner.player = None;
        inner.prepared = false;
        let previous = inner.current.replace(track.clone());
        inner.lifecycle = LifecycleState::Preparing;
        ctx.events.emit(SessionEvent::TrackChanged {
            track: track.clone(),
            previous,
        });
        Self::emit_state(ctx, inner);

        let ctx = ctx.clone();
        tokio::spawn(async move {
            let resolved = ctx.resolver.resolve(&track).await;
            let mut inner = ctx.inner.lock().await;
            if inner.generation != generation {
                debug!(track = %track.id, "discarding stale resolution result");
                return;
            }
            Self::apply_resolution(&ctx, &mut inner, generation, &track, resolved).await;
        });
    }

    /// Act on a resolution result whose generation is still current.
    async fn apply_resolution(
        ctx: &Arc<SessionCtx>,
        inner: &mut SessionInner,
        generation: u64,
        track: &TrackDescriptor,
        resolved: cadence_core::Result<StreamLocator>,
    ) {
        let locator = match resolved {
            Ok(locator) => locator,
            Err(err) => {
                warn!(track = %track.id, error = %err, "stream resolution failed");
                StreamLocator::Unavailable
            }
        };

        if !locator.is_playable() {
            ctx.events.emit(SessionEvent::Notice {
                message: format!("No playable stream found for \"{}\"", track.title),
            });
            Self::advance_after_failure(ctx, inner);
            return;
        }

        if locator.is_remote() && ctx.connectivity.is_metered() {
            let allowed = ctx.settings.allow_metered_playback().await.unwrap_or(false);
            if !allowed {
                // Every other remote track would fail the same check, so
                // this does not auto-advance.
                ctx.events.emit(SessionEvent::Notice {
                    message: "Playback on metered networks is disabled in settings".to_string(),
                });
                inner.lifecycle = LifecycleState::Failed;
                Self::emit_state(ctx, inner);
                return;
            }
        }

        let mut player = ctx
            .factory
            .create(NoticeSender::new(ctx.notice_tx.clone(), generation));
        match player.load(&locator) {
            Ok(()) => {
                // Preparation is in flight; the player reports back.
                inner.player = Some(player);
            }
            Err(err) => {
                warn!(track = %track.id, error = %err, "player rejected stream");
                ctx.events.emit(SessionEvent::Notice {
                    message: format!("Cannot play \"{}\"", track.title),
                });
                Self::advance_after_failure(ctx, inner);
            }
        }
    }

    /// Dispatch a player notice, dropping it if superseded.
    async fn handle_notice(ctx: &Arc<SessionCtx>, tagged: TaggedNotice) {
        let mut inner = ctx.inner.lock().await;
        if tagged.generation != inner.generation {
            debug!("discarding stale player notice");
            return;
        }
        match tagged.notice {
            PlayerNotice::Prepared => Self::handle_prepared(ctx, &mut inner),
            PlayerNotice::Completed => Self::handle_completed(ctx, &mut inner),
            PlayerNotice::Error(message) => {
                Self::handle_player_error(ctx, &mut inner, &message).await;
            }
        }
    }

    /// Preparation finished: start playback, record history, re-apply
    /// parameters.
    fn handle_prepared(ctx: &Arc<SessionCtx>, inner: &mut SessionInner) {
        inner.prepared = true;
        inner.advance_failures = 0;
        let params = inner.params;
        if let Some(player) = inner.player.as_mut() {
            if let Err(err) = player.play() {
                warn!(error = %err, "failed to start playback");
            }
            // The decoder was just recreated, so parameters must be set
            // again on the new instance.
            if let Err(err) = player.set_params(params.speed(), params.pitch()) {
                warn!(error = %err, "failed to apply playback parameters");
            }
        }
        inner.lifecycle = LifecycleState::Playing;
        Self::emit_state(ctx, inner);

        if let Some(track) = inner.current.clone() {
            let history = ctx.history.clone();
            tokio::spawn(async move {
                if let Err(err) = history.record(&track).await {
                    warn!(track = %track.id, error = %err, "failed to record playback history");
                }
            });
        }
    }

    /// Stream ran to its end: replay in repeat-one, otherwise advance.
    fn handle_completed(ctx: &Arc<SessionCtx>, inner: &mut SessionInner) {
        inner.lifecycle = LifecycleState::Completed;

        if inner.queue.mode() == PlaybackMode::RepeatOne {
            if let Some(player) = inner.player.as_mut() {
                if let Err(err) = player.seek(Duration::ZERO) {
                    warn!(error = %err, "failed to rewind for repeat");
                }
                if let Err(err) = player.play() {
                    warn!(error = %err, "failed to restart for repeat");
                }
            }
            inner.lifecycle = LifecycleState::Playing;
            Self::emit_state(ctx, inner);
            return;
        }

        let next = inner.current.as_ref().and_then(|c| inner.queue.next(c));
        match next {
            Some(next) => Self::begin_load(ctx, inner, next),
            None => Self::park_idle(ctx, inner),
        }
    }

    /// Decoder failure: advance when the skip-on-error policy allows it.
    async fn handle_player_error(ctx: &Arc<SessionCtx>, inner: &mut SessionInner, message: &str) {
        let skip = ctx.settings.skip_on_error().await.unwrap_or(true);
        if skip {
            ctx.events.emit(SessionEvent::Notice {
                message: format!("Playback error ({message}), skipping to next track"),
            });
            Self::advance_after_failure(ctx, inner);
        } else {
            ctx.events.emit(SessionEvent::Notice {
                message: format!("Playback error ({message})"),
            });
            inner.prepared = false;
            inner.lifecycle = LifecycleState::Failed;
            Self::emit_state(ctx, inner);
        }
    }

    /// Mark the current track failed and advance, parking at idle once the
    /// failure streak covers the whole queue.
    fn advance_after_failure(ctx: &Arc<SessionCtx>, inner: &mut SessionInner) {
        inner.prepared = false;
        inner.player = None;
        inner.lifecycle = LifecycleState::Failed;
        Self::emit_state(ctx, inner);

        inner.advance_failures += 1;
        if inner.queue.is_empty() || inner.advance_failures >= inner.queue.len() {
            Self::park_idle(ctx, inner);
            return;
        }

        let next = inner.current.as_ref().and_then(|c| inner.queue.next(c));
        match next {
            Some(next) => Self::begin_load(ctx, inner, next),
            None => Self::park_idle(ctx, inner),
        }
    }

    /// Release everything and go idle.
    fn park_idle(ctx: &Arc<SessionCtx>, inner: &mut SessionInner) {
        // Outstanding resolutions and queued notices become stale.
        inner.generation += 1;
        inner.player = None;
        inner.current = None;
        inner.prepared = false;
        inner.advance_failures = 0;
        inner.lifecycle = LifecycleState::Idle;
        Self::emit_state(ctx, inner);
    }

    fn play_locked(ctx: &Arc<SessionCtx>, inner: &mut SessionInner) {
        if !inner.prepared {
            return;
        }
        let Some(player) = inner.player.as_mut() else {
            return;
        };
        if let Err(err) = player.play() {
            warn!(error = %err, "play command failed");
            return;
        }
        inner.lifecycle = LifecycleState::Playing;
        Self::emit_state(ctx, inner);
    }

    fn pause_locked(ctx: &Arc<SessionCtx>, inner: &mut SessionInner) {
        if !inner.prepared {
            return;
        }
        let Some(player) = inner.player.as_mut() else {
            return;
        };
        if let Err(err) = player.pause() {
            warn!(error = %err, "pause command failed");
            return;
        }
        inner.lifecycle = LifecycleState::Paused;
        Self::emit_state(ctx, inner);
    }

    fn apply_params(inner: &mut SessionInner) {
        if !inner.prepared {
            return;
        }
        let params = inner.params;
        if let Some(player) = inner.player.as_mut() {
            // Parameter failures never disturb playback state.
            if let Err(err) = player.set_params(params.speed(), params.pitch()) {
                warn!(error = %err, "failed to apply playback parameters");
            }
        }
    }

    fn emit_state(ctx: &Arc<SessionCtx>, inner: &SessionInner) {
        let (position_ms, duration_ms) = match (&inner.player, inner.prepared) {
            (Some(player), true) => (
                player.position().as_millis() as u64,
                player.duration().as_millis() as u64,
            ),
            _ => (0, 0),
        };
        ctx.events.emit(SessionEvent::StateChanged {
            track: inner.current.clone(),
            state: inner.lifecycle,
            position_ms,
            duration_ms,
        });
    }
}
