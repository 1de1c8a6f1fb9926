//! Harmonic Core - Foundation types for music collaboration
//!
//! This crate provides the types shared by every Harmonic crate:
//! - Typed identifiers (ProjectId, TrackId, VersionId, ...)
//! - The error type and result alias
//! - The emotion taxonomy and its palette
//! - Users, collaborators and roles
//! - Playhead positions, time spans and timestamps
//! - Runtime configuration

pub mod config;
pub mod emotion;
pub mod error;
pub mod ids;
pub mod time;
pub mod user;

pub use config::{CommentConfig, HarmonicConfig, TransportConfig, WaveformConfig};
pub use emotion::{Emotion, EmotionPalette};
pub use error::{EntityKind, HarmonicError, Result};
pub use ids::{CheckpointId, CommentId, ProjectId, TrackId, UserId, VersionId};
pub use time::{clamp_position, format_clock, now, TimeSpan, Timestamp};
pub use user::{Collaborator, Role, User};

/// Limits shared by the playback and comment layers.
pub mod limits {
    /// Smallest zoom multiplier, in tenths.
    pub const MIN_ZOOM_TENTHS: u8 = 5;

    /// Largest zoom multiplier, in tenths.
    pub const MAX_ZOOM_TENTHS: u8 = 20;

    /// Upper bound of a comment's normalized timeline position.
    pub const MAX_NORMALIZED_POSITION: f64 = 100.0;

    /// Upper bound of the volume percentage.
    pub const MAX_VOLUME: u8 = 100;
}
