//! Audio output abstraction.
//!
//! The controller drives exactly one [`AudioBackend`], the single shared
//! audio element. Backends report what actually happened (playback started,
//! time moved, source ended) as [`MediaEvent`]s on a channel handed to them
//! by [`AudioBackend::attach`].

use crossbeam_channel::Sender;
use harmonic_core::{HarmonicError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Facts reported by the audio backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Playing,
    Paused,
    Ended,
    /// Playback position in seconds.
    TimeUpdate(f64),
    /// Source duration in seconds, once known.
    DurationChanged(f64),
    Error(String),
}

/// A single audio output the controller can load sources into.
pub trait AudioBackend {
    /// Hand the backend the channel it reports media events on.
    fn attach(&mut self, events: Sender<MediaEvent>);

    /// Load a source by URL, replacing whatever was loaded.
    fn load(&mut self, url: &str) -> Result<()>;

    /// Start or resume playback of the loaded source.
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64);

    /// Output gain in `0.0..=1.0`.
    fn set_volume(&mut self, linear: f32);

    /// Unload the current source. Safe to call when nothing is loaded.
    fn release(&mut self);
}

// ── Headless backend ────────────────────────────────────────────

/// A call received by a [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
    Release,
}

/// Shared log of backend calls, readable after the backend has been moved.
pub type CallLog = Arc<Mutex<Vec<BackendCall>>>;

/// In-memory backend that simulates an audio element without producing sound.
///
/// Sources must be registered with [`HeadlessBackend::with_media`]; loading an
/// unknown URL fails the way a missing file would.
pub struct HeadlessBackend {
    events: Option<Sender<MediaEvent>>,
    media: HashMap<String, f64>,
    loaded: Option<String>,
    position: f64,
    volume: f32,
    playing: bool,
    calls: CallLog,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            events: None,
            media: HashMap::new(),
            loaded: None,
            position: 0.0,
            volume: 1.0,
            playing: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a loadable source and its duration in seconds.
    pub fn with_media(mut self, url: impl Into<String>, duration: f64) -> Self {
        self.media.insert(url.into(), duration);
        self
    }

    pub fn add_media(&mut self, url: impl Into<String>, duration: f64) {
        self.media.insert(url.into(), duration);
    }

    /// Handle to the call log.
    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    pub fn loaded(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Let `seconds` of playback elapse. Emits a time update, and `Ended`
    /// when the source runs out.
    pub fn advance(&mut self, seconds: f64) {
        if !self.playing {
            return;
        }
        let duration = self.loaded_duration().unwrap_or(f64::MAX);
        self.position = (self.position + seconds.max(0.0)).min(duration);
        self.emit(MediaEvent::TimeUpdate(self.position));
        if self.position >= duration {
            self.playing = false;
            self.emit(MediaEvent::Ended);
        }
    }

    fn loaded_duration(&self) -> Option<f64> {
        self.loaded.as_ref().and_then(|url| self.media.get(url)).copied()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().push(call);
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(tx) = &self.events {
            // The controller may already be gone during teardown.
            let _ = tx.send(event);
        }
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for HeadlessBackend {
    fn attach(&mut self, events: Sender<MediaEvent>) {
        self.events = Some(events);
    }

    fn load(&mut self, url: &str) -> Result<()> {
        self.record(BackendCall::Load(url.to_string()));
        let duration = self
            .media
            .get(url)
            .copied()
            .ok_or_else(|| HarmonicError::Audio(format!("Cannot load audio source '{}'", url)))?;
        self.loaded = Some(url.to_string());
        self.position = 0.0;
        self.playing = false;
        self.emit(MediaEvent::DurationChanged(duration));
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.record(BackendCall::Play);
        if self.loaded.is_none() {
            return Err(HarmonicError::Audio("No audio source loaded".into()));
        }
        if !self.playing {
            self.playing = true;
            self.emit(MediaEvent::Playing);
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.record(BackendCall::Pause);
        if self.playing {
            self.playing = false;
            self.emit(MediaEvent::Paused);
        }
    }

    fn seek(&mut self, seconds: f64) {
        self.record(BackendCall::Seek(seconds));
        if self.loaded.is_some() {
            self.position = seconds;
            self.emit(MediaEvent::TimeUpdate(seconds));
        }
    }

    fn set_volume(&mut self, linear: f32) {
        self.record(BackendCall::SetVolume(linear));
        self.volume = linear.clamp(0.0, 1.0);
    }

    fn release(&mut self) {
        self.record(BackendCall::Release);
        self.loaded = None;
        self.playing = false;
        self.position = 0.0;
    }
}
