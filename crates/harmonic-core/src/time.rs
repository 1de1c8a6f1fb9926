//! Playhead positions, time spans and wall-clock timestamps.
//!
//! Timeline positions are plain seconds (`f64`). Anything that lands on a
//! playhead goes through [`clamp_position`] so NaN and out-of-range values
//! never reach an audio backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock timestamp attached to versions, checkpoints and comments.
pub type Timestamp = DateTime<Utc>;

/// Current wall-clock time.
#[inline]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Clamp a playhead position into `[0, duration]`.
///
/// With an unknown duration only the lower bound applies. NaN maps to 0.
pub fn clamp_position(position: f64, duration: Option<f64>) -> f64 {
    if position.is_nan() {
        return 0.0;
    }
    let upper = match duration {
        Some(d) if d.is_finite() && d >= 0.0 => d,
        _ => f64::MAX,
    };
    position.clamp(0.0, upper)
}

/// Format seconds as `m:ss` (or `h:mm:ss` past an hour).
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// A half-open span of timeline seconds, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    /// Create a span. `end` is raised to `start` if it lies before it.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Span starting at `start` lasting `duration` seconds.
    pub fn from_start(start: f64, duration: f64) -> Self {
        Self::new(start, start + duration.max(0.0))
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Check if a position lies inside this span.
    #[inline]
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end
    }

    /// Check if two spans overlap.
    pub fn overlaps(&self, other: TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_clock(self.start), format_clock(self.end))
    }
}
