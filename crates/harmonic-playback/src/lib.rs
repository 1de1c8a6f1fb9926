//! Harmonic Playback - Timeline playback controller
//!
//! Drives a single audio output for the track timeline.
//!
//! Architecture:
//! - `AudioBackend`: the audio element; reports facts back as `MediaEvent`s
//! - `PlaybackController`: selection, transport, zoom, volume and routing
//! - `Routing`/`Mixer`: mute/solo rule and the multi-track preview mix
//! - `Waveform`: peaks, bar layout and asynchronous loading
//! - `ShortcutMap`: keyboard bindings to timeline actions

pub mod backend;
pub mod controller;
pub mod events;
pub mod markers;
pub mod mixer;
pub mod routing;
pub mod shortcuts;
pub mod waveform;
pub mod zoom;

pub use backend::{AudioBackend, BackendCall, CallLog, HeadlessBackend, MediaEvent};
pub use controller::{PlaybackController, SelectedTrack, TimelineClick};
pub use events::{EventBus, PlaybackEvent};
pub use markers::{layout_markers, marker_at, CommentMarker, MarkerClick};
pub use mixer::{ChannelStrip, Mixer};
pub use routing::{is_audible, Routing};
pub use shortcuts::{Key, Modifiers, Shortcut, ShortcutMap, TimelineAction};
pub use waveform::{
    load_waveform, BarStyle, DecodedAudio, SampleSource, VisualizationMode, Waveform, WaveformBar,
    WaveformSample, WaveformState,
};
pub use zoom::{RulerTick, TimelineView, Zoom};
