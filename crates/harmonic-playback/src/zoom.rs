//! Timeline zoom and the pixel/time mapping derived from it.
//!
//! Zoom is kept as integer tenths so repeated steps never drift.

use harmonic_core::limits::{MAX_ZOOM_TENTHS, MIN_ZOOM_TENTHS};
use harmonic_core::format_clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timeline zoom factor between 0.5x and 2.0x in 0.1 steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zoom(u8);

impl Zoom {
    pub const MIN: Self = Self(MIN_ZOOM_TENTHS);
    pub const MAX: Self = Self(MAX_ZOOM_TENTHS);
    pub const DEFAULT: Self = Self(10);

    /// Zoom from tenths, clamped into range.
    pub fn from_tenths(tenths: u8) -> Self {
        Self(tenths.clamp(MIN_ZOOM_TENTHS, MAX_ZOOM_TENTHS))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn factor(self) -> f32 {
        f32::from(self.0) / 10.0
    }

    pub fn zoomed_in(self) -> Self {
        Self::from_tenths(self.0.saturating_add(1))
    }

    pub fn zoomed_out(self) -> Self {
        Self::from_tenths(self.0.saturating_sub(1))
    }

    /// Horizontal scrolling is only needed once the timeline is wider than
    /// its container.
    pub fn is_scrollable(self) -> bool {
        self.0 > Self::DEFAULT.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}x", self.0 / 10, self.0 % 10)
    }
}

// ── Timeline view ───────────────────────────────────────────────

/// Candidate ruler intervals in seconds.
const RULER_INTERVALS: [f64; 9] = [1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0];

/// Upper bound on ruler ticks, whatever the duration.
const MAX_RULER_TICKS: usize = 512;

/// A labelled tick on the time ruler.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerTick {
    pub time: f64,
    pub x: f32,
    pub label: String,
}

/// Maps between track time and horizontal pixels at a given zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineView {
    pub base_width: f32,
    pub zoom: Zoom,
    /// Track duration in seconds; zero when unknown.
    pub duration: f64,
}

impl TimelineView {
    pub fn new(base_width: f32, zoom: Zoom, duration: f64) -> Self {
        Self {
            base_width,
            zoom,
            duration,
        }
    }

    /// Rendered width: base width times zoom.
    pub fn width(&self) -> f32 {
        self.base_width * self.zoom.factor()
    }

    pub fn is_scrollable(&self) -> bool {
        self.zoom.is_scrollable()
    }

    /// Playhead fraction in `0.0..=1.0`.
    pub fn progress(&self, position: f64) -> f32 {
        if self.duration <= 0.0 || !position.is_finite() {
            return 0.0;
        }
        (position / self.duration).clamp(0.0, 1.0) as f32
    }

    pub fn x_for_time(&self, time: f64) -> f32 {
        self.progress(time) * self.width()
    }

    pub fn time_for_x(&self, x: f32) -> f64 {
        let width = self.width();
        if width <= 0.0 || self.duration <= 0.0 || !x.is_finite() {
            return 0.0;
        }
        f64::from((x / width).clamp(0.0, 1.0)) * self.duration
    }

    /// Ruler ticks using the smallest interval that keeps labels at least
    /// `min_spacing_px` apart.
    ///
    /// Past the largest candidate interval it keeps doubling, so the tick
    /// count stays within what fits across the width.
    pub fn ruler_ticks(&self, min_spacing_px: f32) -> Vec<RulerTick> {
        let width = self.width();
        if !(self.duration.is_finite() && self.duration > 0.0) || width <= 0.0 {
            return Vec::new();
        }
        let spacing = f64::from(min_spacing_px.max(1.0));
        let px_per_second = f64::from(width) / self.duration;
        let mut interval = RULER_INTERVALS
            .iter()
            .copied()
            .find(|i| i * px_per_second >= spacing)
            .unwrap_or(RULER_INTERVALS[RULER_INTERVALS.len() - 1]);

        let max_ticks = ((f64::from(width) / spacing) as usize).clamp(1, MAX_RULER_TICKS);
        while self.duration / interval > max_ticks as f64 {
            interval *= 2.0;
        }

        let count = (self.duration / interval).floor() as usize;
        (0..=count)
            .map(|i| {
                let time = i as f64 * interval;
                RulerTick {
                    time,
                    x: self.x_for_time(time),
                    label: format_clock(time),
                }
            })
            .collect()
    }
}
