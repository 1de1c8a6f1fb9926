//! Timeline playback controller.
//!
//! Owns the audio backend and everything the timeline view shows about it:
//! the selected track and its remembered position, zoom, volume, routing,
//! the waveform and the last error. Playing/paused is never set directly;
//! it follows the backend's [`MediaEvent`]s, applied in [`PlaybackController::sync`].

use crossbeam_channel::{unbounded, Receiver};
use harmonic_core::limits::MAX_VOLUME;
use harmonic_core::{
    clamp_position, format_clock, HarmonicConfig, HarmonicError, Result, TrackId, TransportConfig,
    VersionId, WaveformConfig,
};
use harmonic_project::{Comment, ProjectTrack};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::{AudioBackend, MediaEvent};
use crate::events::{EventBus, PlaybackEvent};
use crate::markers::{layout_markers, marker_at, CommentMarker, MarkerClick};
use crate::routing::Routing;
use crate::shortcuts::{Shortcut, ShortcutMap, TimelineAction};
use crate::waveform::{
    load_waveform, BarStyle, SampleSource, VisualizationMode, WaveformBar, WaveformState,
};
use crate::zoom::{TimelineView, Zoom};

/// The track currently loaded into the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTrack {
    pub track_id: TrackId,
    pub version_id: VersionId,
    pub version_label: String,
    pub audio_url: String,
}

/// Outcome of clicking on the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineClick {
    /// A comment marker was hit.
    Marker(MarkerClick),
    /// Empty timeline; the playhead moved here.
    Seek(f64),
}

pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    media_events: Receiver<MediaEvent>,
    transport: TransportConfig,
    waveform_config: WaveformConfig,
    shortcuts: ShortcutMap,
    events: EventBus,

    selected: Option<SelectedTrack>,
    remembered: HashMap<TrackId, f64>,
    position: f64,
    duration: Option<f64>,
    playing: bool,

    zoom: Zoom,
    volume: u8,
    routing: Routing,
    waveform: WaveformState,
    error: Option<String>,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(mut backend: B, config: &HarmonicConfig) -> Self {
        let (tx, rx) = unbounded();
        backend.attach(tx);

        let mut controller = Self {
            backend,
            media_events: rx,
            transport: config.transport.clone(),
            waveform_config: config.waveform.clone(),
            shortcuts: ShortcutMap::new(),
            events: EventBus::new(),
            selected: None,
            remembered: HashMap::new(),
            position: 0.0,
            duration: None,
            playing: false,
            zoom: Zoom::DEFAULT,
            volume: config.transport.default_volume.min(MAX_VOLUME),
            routing: Routing::new(),
            waveform: WaveformState::Idle,
            error: None,
        };
        controller.apply_volume();
        controller
    }

    pub fn with_defaults(backend: B) -> Self {
        Self::new(backend, &HarmonicConfig::default())
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn selected(&self) -> Option<&SelectedTrack> {
        self.selected.as_ref()
    }

    pub fn selected_track_id(&self) -> Option<TrackId> {
        self.selected.as_ref().map(|s| s.track_id)
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// Volume percentage, 0-100.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    pub fn waveform(&self) -> &WaveformState {
        &self.waveform
    }

    /// Last user-visible error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn shortcuts(&self) -> &ShortcutMap {
        &self.shortcuts
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutMap {
        &mut self.shortcuts
    }

    /// Remembered position of a track that was selected before.
    pub fn remembered_position(&self, track: TrackId) -> Option<f64> {
        self.remembered.get(&track).copied()
    }

    /// Transport controls are only usable once a waveform is ready.
    pub fn transport_enabled(&self) -> bool {
        self.selected.is_some() && self.waveform.is_ready()
    }

    /// Clock text, `m:ss / m:ss`.
    pub fn clock_text(&self) -> String {
        format!(
            "{} / {}",
            format_clock(self.position),
            format_clock(self.duration.unwrap_or(0.0))
        )
    }

    pub fn timeline_view(&self) -> TimelineView {
        TimelineView::new(
            self.transport.base_width_px,
            self.zoom,
            self.duration.unwrap_or(0.0),
        )
    }

    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    // ── Media events ────────────────────────────────────────────

    /// Apply every media event the backend has reported so far.
    /// Returns how many were applied.
    pub fn sync(&mut self) -> usize {
        let pending: Vec<MediaEvent> = self.media_events.try_iter().collect();
        let count = pending.len();
        for event in pending {
            self.apply_media_event(event);
        }
        count
    }

    fn apply_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Playing => self.set_playing(true),
            MediaEvent::Paused | MediaEvent::Ended => self.set_playing(false),
            MediaEvent::TimeUpdate(seconds) => {
                if self.selected.is_some() {
                    self.position = clamp_position(seconds, self.duration);
                    self.publish_position();
                }
            }
            MediaEvent::DurationChanged(seconds) => {
                if seconds.is_finite() && seconds > 0.0 {
                    self.duration = Some(seconds);
                    self.position = clamp_position(self.position, self.duration);
                }
            }
            MediaEvent::Error(message) => self.fail(message),
        }
    }

    fn set_playing(&mut self, playing: bool) {
        if self.playing != playing {
            self.playing = playing;
            self.events.publish(PlaybackEvent::StateChanged { playing });
        }
    }

    // ── Track selection ─────────────────────────────────────────

    /// Load the current version of `track`.
    ///
    /// The previous track is paused, its position remembered and its source
    /// released. The new track resumes where it was last left.
    pub fn select_track(&mut self, track: &ProjectTrack) -> Result<()> {
        if let (Some(selected), Some(current)) = (&self.selected, track.current_version_id()) {
            if selected.track_id == track.id && selected.version_id == current {
                return Ok(());
            }
        }

        let previous = self.release_current();

        let version = match track.current_version() {
            Some(version) => version,
            None => {
                let err = HarmonicError::Validation(format!(
                    "Track '{}' has no versions to play",
                    track.name
                ));
                warn!(track = %track.id, "Selected track has no versions");
                return Err(err);
            }
        };

        if let Err(e) = self.backend.load(version.audio_url()) {
            self.fail(format!("Failed to load '{}': {}", track.name, e));
            return Err(e);
        }

        self.selected = Some(SelectedTrack {
            track_id: track.id,
            version_id: version.id(),
            version_label: version.label().to_string(),
            audio_url: version.audio_url().to_string(),
        });
        self.error = None;
        self.waveform = WaveformState::Loading;
        self.duration = (track.duration > 0.0).then_some(track.duration);
        self.sync();

        let resume = self.remembered.get(&track.id).copied().unwrap_or(0.0);
        self.position = clamp_position(resume, self.duration);
        if self.position > 0.0 {
            self.backend.seek(self.position);
            self.sync();
        }
        self.apply_volume();

        info!(
            track = %track.id,
            version = %version.label(),
            resume = self.position,
            "Track selected"
        );
        self.events.publish(PlaybackEvent::TrackSelected {
            track_id: track.id,
            previous_track_id: previous,
            version_label: version.label().to_string(),
        });
        self.publish_position();
        Ok(())
    }

    /// Pause, remember and release the loaded track, if any.
    fn release_current(&mut self) -> Option<TrackId> {
        self.selected.as_ref()?;
        self.sync();
        if self.playing {
            self.backend.pause();
            self.sync();
        }
        let selected = self.selected.take()?;
        self.remembered.insert(selected.track_id, self.position);
        self.backend.release();
        // Anything still queued belongs to the released source.
        self.media_events.try_iter().for_each(drop);
        self.set_playing(false);

        debug!(track = %selected.track_id, position = self.position, "Track released");
        self.position = 0.0;
        self.duration = None;
        self.waveform = WaveformState::Idle;
        Some(selected.track_id)
    }

    /// Release the loaded track and select nothing.
    pub fn deselect(&mut self) {
        if self.release_current().is_some() {
            self.publish_position();
        }
    }

    // ── Transport ───────────────────────────────────────────────

    fn require_selection(&self) -> Result<()> {
        if self.selected.is_none() {
            return Err(HarmonicError::Validation("No track selected".into()));
        }
        Ok(())
    }

    /// Move the playhead, clamped to the track. Returns the clamped position.
    pub fn seek(&mut self, position: f64) -> Result<f64> {
        self.require_selection()?;
        let clamped = clamp_position(position, self.duration);
        self.backend.seek(clamped);
        self.position = clamped;
        self.sync();
        self.publish_position();
        Ok(clamped)
    }

    /// Play or pause depending on what the backend last reported.
    pub fn toggle_playback(&mut self) -> Result<()> {
        self.sync();
        if self.playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    pub fn play(&mut self) -> Result<()> {
        if let Err(e) = self.backend.play() {
            self.fail(format!("Playback failed: {}", e));
            return Err(e);
        }
        self.sync();
        Ok(())
    }

    pub fn pause(&mut self) {
        self.backend.pause();
        self.sync();
    }

    pub fn skip_forward(&mut self) -> Result<f64> {
        self.seek(self.position + self.transport.skip_seconds)
    }

    pub fn skip_back(&mut self) -> Result<f64> {
        self.seek(self.position - self.transport.skip_seconds)
    }

    pub fn jump_to_start(&mut self) -> Result<f64> {
        self.seek(0.0)
    }

    /// Jump to the end of the track; stays put while the duration is unknown.
    pub fn jump_to_end(&mut self) -> Result<f64> {
        let end = self.duration.unwrap_or(self.position);
        self.seek(end)
    }

    // ── Zoom ────────────────────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: Zoom) -> Zoom {
        if zoom != self.zoom {
            self.zoom = zoom;
            debug!(zoom = %zoom, "Zoom changed");
            self.events.publish(PlaybackEvent::ZoomChanged { zoom });
        }
        self.zoom
    }

    pub fn zoom_in(&mut self) -> Zoom {
        self.set_zoom(self.zoom.zoomed_in())
    }

    pub fn zoom_out(&mut self) -> Zoom {
        self.set_zoom(self.zoom.zoomed_out())
    }

    pub fn reset_zoom(&mut self) -> Zoom {
        self.set_zoom(Zoom::DEFAULT)
    }

    // ── Volume & routing ────────────────────────────────────────

    /// Set the volume percentage, clamped to 0-100.
    pub fn set_volume(&mut self, level: u8) -> u8 {
        let level = level.min(MAX_VOLUME);
        if level != self.volume {
            self.volume = level;
            self.apply_volume();
        }
        self.volume
    }

    pub fn volume_up(&mut self) -> u8 {
        self.set_volume(self.volume.saturating_add(self.transport.volume_step))
    }

    pub fn volume_down(&mut self) -> u8 {
        self.set_volume(self.volume.saturating_sub(self.transport.volume_step))
    }

    /// Whether the selected track is silenced by mute/solo.
    fn selected_silenced(&self) -> bool {
        self.selected_track_id()
            .is_some_and(|track| !self.routing.is_audible(track))
    }

    fn apply_volume(&mut self) {
        let silenced = self.selected_silenced();
        let linear = if silenced {
            0.0
        } else {
            f32::from(self.volume) / f32::from(MAX_VOLUME)
        };
        self.backend.set_volume(linear);
        self.events.publish(PlaybackEvent::VolumeChanged {
            level: self.volume,
            silenced,
        });
    }

    pub fn is_audible(&self, track: TrackId) -> bool {
        self.routing.is_audible(track)
    }

    pub fn toggle_mute(&mut self, track: TrackId) -> bool {
        let muted = self.routing.toggle_mute(track);
        self.routing_changed(track);
        muted
    }

    pub fn toggle_solo(&mut self, track: TrackId) -> bool {
        let soloed = self.routing.toggle_solo(track);
        self.routing_changed(track);
        soloed
    }

    fn routing_changed(&mut self, track: TrackId) {
        debug!(
            track = %track,
            muted = self.routing.is_muted(track),
            soloed = self.routing.is_soloed(track),
            "Routing changed"
        );
        self.events.publish(PlaybackEvent::RoutingChanged {
            track_id: track,
            muted: self.routing.is_muted(track),
            soloed: self.routing.is_soloed(track),
            audible: self.routing.is_audible(track),
        });
        self.apply_volume();
    }

    // ── Shortcuts ───────────────────────────────────────────────

    /// Handle a key press. Returns the action performed, or `None` when the
    /// key is unbound or the action needs a selected track and there is none.
    /// Failures are recorded as the visible error.
    pub fn handle_shortcut(&mut self, shortcut: &Shortcut) -> Option<TimelineAction> {
        let action = self.shortcuts.action_for(shortcut)?;
        if action.requires_selection() && self.selected.is_none() {
            debug!(action = %action, "Ignored without a selected track");
            return None;
        }
        if let Err(e) = self.perform(action) {
            debug!(action = %action, error = %e, "Shortcut failed");
        }
        Some(action)
    }

    /// Run an action directly.
    pub fn perform(&mut self, action: TimelineAction) -> Result<()> {
        match action {
            TimelineAction::TogglePlayback => self.toggle_playback()?,
            TimelineAction::SkipBack => {
                self.skip_back()?;
            }
            TimelineAction::SkipForward => {
                self.skip_forward()?;
            }
            TimelineAction::JumpToStart => {
                self.jump_to_start()?;
            }
            TimelineAction::JumpToEnd => {
                self.jump_to_end()?;
            }
            TimelineAction::ZoomIn => {
                self.zoom_in();
            }
            TimelineAction::ZoomOut => {
                self.zoom_out();
            }
            TimelineAction::ResetZoom => {
                self.reset_zoom();
            }
            TimelineAction::VolumeUp => {
                self.volume_up();
            }
            TimelineAction::VolumeDown => {
                self.volume_down();
            }
            TimelineAction::ToggleMute => {
                let track = self.selected_or_err()?;
                self.toggle_mute(track);
            }
            TimelineAction::ToggleSolo => {
                let track = self.selected_or_err()?;
                self.toggle_solo(track);
            }
        }
        Ok(())
    }

    fn selected_or_err(&self) -> Result<TrackId> {
        self.selected_track_id()
            .ok_or_else(|| HarmonicError::Validation("No track selected".into()))
    }

    // ── Markers ─────────────────────────────────────────────────

    /// Markers for the selected track's comments.
    pub fn markers<'a>(
        &self,
        comments: impl IntoIterator<Item = &'a Comment>,
    ) -> Vec<CommentMarker> {
        match self.selected_track_id() {
            Some(track) => layout_markers(comments, track, &self.timeline_view()),
            None => Vec::new(),
        }
    }

    /// Seek to a marker's comment.
    pub fn click_marker(&mut self, marker: &CommentMarker) -> Result<MarkerClick> {
        let seek_to = self.seek(marker.time_position)?;
        Ok(MarkerClick {
            comment_id: marker.comment_id,
            seek_to,
            open_editor: self.transport.open_editor_on_marker_click,
        })
    }

    /// Click at `x` on the timeline: a marker within the hit radius wins,
    /// otherwise the playhead moves there.
    pub fn click_timeline(&mut self, x: f32, markers: &[CommentMarker]) -> Result<TimelineClick> {
        if let Some(marker) = marker_at(markers, x, self.transport.marker_hit_radius_px) {
            return Ok(TimelineClick::Marker(self.click_marker(marker)?));
        }
        let time = self.timeline_view().time_for_x(x);
        Ok(TimelineClick::Seek(self.seek(time)?))
    }

    // ── Waveform ────────────────────────────────────────────────

    /// Decode the selected track's waveform. Failure leaves the transport
    /// disabled; there is no retry.
    pub async fn load_waveform<S: SampleSource>(&mut self, source: Arc<S>) -> &WaveformState {
        let Some(url) = self.selected.as_ref().map(|s| s.audio_url.clone()) else {
            self.waveform = WaveformState::Idle;
            return &self.waveform;
        };
        self.waveform = WaveformState::Loading;
        let timeout = Duration::from_millis(self.waveform_config.decode_timeout_ms);
        let samples_per_peak = self.waveform_config.samples_per_peak;
        let state = load_waveform(source, url, samples_per_peak, timeout).await;

        if self.duration.is_none() {
            if let Some(waveform) = state.waveform() {
                let seconds = waveform.duration_seconds();
                self.duration = (seconds > 0.0).then_some(seconds);
            }
        }
        self.waveform = state;
        &self.waveform
    }

    pub fn set_waveform(&mut self, state: WaveformState) {
        self.waveform = state;
    }

    /// Bars for the current waveform at the rendered timeline width.
    pub fn waveform_bars(&self, height: f32, style: &BarStyle) -> Vec<WaveformBar> {
        match self.waveform.waveform() {
            Some(waveform) => {
                let view = self.timeline_view();
                waveform.layout(view.width(), height, view.progress(self.position), style)
            }
            None => Vec::new(),
        }
    }

    pub fn bar_style(&self, mode: VisualizationMode) -> BarStyle {
        BarStyle::from_config(&self.waveform_config, mode)
    }

    // ── Internals ───────────────────────────────────────────────

    fn publish_position(&mut self) {
        self.events.publish(PlaybackEvent::PositionChanged {
            position: self.position,
            duration: self.duration,
        });
    }

    fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "Playback error");
        self.error = Some(message.clone());
        self.events.publish(PlaybackEvent::Error { message });
    }
}

impl<B: AudioBackend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        if let Some(selected) = self.selected.take() {
            if self.playing {
                self.backend.pause();
            }
            self.backend.release();
            debug!(track = %selected.track_id, "Released audio on shutdown");
        }
    }
}
