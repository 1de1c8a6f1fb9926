//! Playback events
//!
//! Notifications published by the controller so views can stay in sync
//! without polling. Each subscriber gets its own unbounded channel; a
//! subscriber whose receiver has been dropped is forgotten on the next
//! publish.

use crossbeam_channel::{unbounded, Receiver, Sender};
use harmonic_core::TrackId;
use serde::{Deserialize, Serialize};

use crate::zoom::Zoom;

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A track was loaded into the backend
    TrackSelected {
        track_id: TrackId,
        previous_track_id: Option<TrackId>,
        /// Label of the version that was loaded, e.g. `v3`
        version_label: String,
    },

    /// Playing/paused flipped, as reported by the backend
    StateChanged { playing: bool },

    /// Playhead moved
    PositionChanged {
        position: f64,
        duration: Option<f64>,
    },

    /// Volume changed
    VolumeChanged {
        /// Percentage, 0-100
        level: u8,
        /// Whether the selected track is currently silenced by routing
        silenced: bool,
    },

    ZoomChanged { zoom: Zoom },

    /// Mute or solo state of a track changed
    RoutingChanged {
        track_id: TrackId,
        muted: bool,
        soloed: bool,
        audible: bool,
    },

    /// A failure surfaced to the user
    Error { message: String },
}

/// Fan-out of playback events to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<PlaybackEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: PlaybackEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
