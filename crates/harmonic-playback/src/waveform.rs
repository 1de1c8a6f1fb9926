//! Waveform computation, layout and asynchronous loading.
//!
//! Generates min/max peaks from mono PCM, lays them out as bars for a given
//! width and playhead, and loads them off the async runtime with a timeout.

use harmonic_core::{HarmonicError, Result, WaveformConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A min/max pair representing the amplitude range of one peak window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveformSample {
    pub min: f32,
    pub max: f32,
}

impl WaveformSample {
    /// Largest absolute excursion.
    pub fn amplitude(&self) -> f32 {
        self.max.abs().max(self.min.abs())
    }
}

/// Pre-computed waveform data for a single audio channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    /// Source samples per peak (the reduction ratio).
    pub samples_per_peak: usize,
    /// Min/max pairs for display.
    pub data: Vec<WaveformSample>,
    /// Source sample rate.
    pub sample_rate: u32,
}

impl Waveform {
    /// Compute a waveform from raw mono samples.
    pub fn compute(samples: &[f32], samples_per_peak: usize, sample_rate: u32) -> Self {
        if samples_per_peak == 0 || samples.is_empty() {
            return Self {
                samples_per_peak: samples_per_peak.max(1),
                data: Vec::new(),
                sample_rate,
            };
        }

        let data = samples
            .chunks(samples_per_peak)
            .map(|chunk| {
                chunk.iter().fold(
                    WaveformSample {
                        min: f32::MAX,
                        max: f32::MIN,
                    },
                    |acc, &s| WaveformSample {
                        min: acc.min.min(s),
                        max: acc.max.max(s),
                    },
                )
            })
            .collect();

        Self {
            samples_per_peak,
            data,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// RMS of peak amplitudes over `[start, end)`.
    pub fn rms_range(&self, start: usize, end: usize) -> f32 {
        let start = start.min(self.data.len());
        let end = end.min(self.data.len());
        if start >= end {
            return 0.0;
        }

        let sum: f64 = self.data[start..end]
            .iter()
            .map(|s| {
                let peak = f64::from(s.amplitude());
                peak * peak
            })
            .sum();
        (sum / (end - start) as f64).sqrt() as f32
    }

    /// Seconds covered by the peaks, rounded up to whole windows.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (self.data.len() * self.samples_per_peak) as f64 / f64::from(self.sample_rate)
    }

    /// Min/max envelope over a fractional peak range.
    fn envelope(&self, from: f32, to: f32) -> WaveformSample {
        let len = self.data.len();
        let start = ((from * len as f32).floor() as usize).min(len.saturating_sub(1));
        let end = ((to * len as f32).ceil() as usize).clamp(start + 1, len);
        self.data[start..end]
            .iter()
            .fold(WaveformSample::default(), |acc, s| WaveformSample {
                min: acc.min.min(s.min),
                max: acc.max.max(s.max),
            })
    }

    /// Lay the waveform out as bars across `width` x `height` pixels.
    ///
    /// `progress` is the playhead fraction; bars left of it are `played`.
    pub fn layout(
        &self,
        width: f32,
        height: f32,
        progress: f32,
        style: &BarStyle,
    ) -> Vec<WaveformBar> {
        if self.data.is_empty() || width <= 0.0 || height <= 0.0 {
            return Vec::new();
        }

        let (bar_width, gap) = match style.mode {
            VisualizationMode::Line => (style.bar_width.max(1.0), 0.0),
            _ => (style.bar_width.max(1.0), style.bar_gap.max(0.0)),
        };
        let pitch = bar_width + gap;
        let count = ((width + gap) / pitch).floor().max(1.0) as usize;
        let progress = progress.clamp(0.0, 1.0);
        let center = height / 2.0;

        (0..count)
            .map(|i| {
                let from = i as f32 / count as f32;
                let to = (i + 1) as f32 / count as f32;
                let env = self.envelope(from, to);
                let amp = env.amplitude().min(1.0);
                let (top, bar_height) = match style.mode {
                    VisualizationMode::Bars => {
                        let h = (amp * height).max(1.0);
                        (height - h, h)
                    }
                    VisualizationMode::Mirrored => {
                        let h = (amp * height).max(1.0);
                        (center - h / 2.0, h)
                    }
                    VisualizationMode::Line => {
                        let top = center - env.max.clamp(-1.0, 1.0) * center;
                        let bottom = center - env.min.clamp(-1.0, 1.0) * center;
                        (top, (bottom - top).max(1.0))
                    }
                };
                WaveformBar {
                    x: i as f32 * pitch,
                    width: bar_width,
                    top,
                    height: bar_height,
                    played: from < progress,
                }
            })
            .collect()
    }
}

// ── Visualization ───────────────────────────────────────────────

/// How the waveform is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
    /// Bars rising from the bottom edge.
    #[default]
    Bars,
    /// Continuous min/max envelope around the center line.
    Line,
    /// Bars mirrored around the center line.
    Mirrored,
}

impl VisualizationMode {
    pub const ALL: [VisualizationMode; 3] = [Self::Bars, Self::Line, Self::Mirrored];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bars => "bars",
            Self::Line => "line",
            Self::Mirrored => "mirrored",
        }
    }
}

impl fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualizationMode {
    type Err = HarmonicError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HarmonicError::Validation(format!("Unknown visualization mode '{}'", s)))
    }
}

/// Bar geometry for [`Waveform::layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStyle {
    pub mode: VisualizationMode,
    pub bar_width: f32,
    pub bar_gap: f32,
}

impl BarStyle {
    pub fn from_config(config: &WaveformConfig, mode: VisualizationMode) -> Self {
        Self {
            mode,
            bar_width: config.bar_width_px,
            bar_gap: config.bar_gap_px,
        }
    }
}

impl Default for BarStyle {
    fn default() -> Self {
        Self::from_config(&WaveformConfig::default(), VisualizationMode::default())
    }
}

/// One drawable bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformBar {
    pub x: f32,
    pub width: f32,
    pub top: f32,
    pub height: f32,
    /// Left of the playhead.
    pub played: bool,
}

// ── Loading ─────────────────────────────────────────────────────

/// Where the selected track's waveform stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WaveformState {
    /// Nothing selected.
    #[default]
    Idle,
    Loading,
    Ready(Waveform),
    Failed(String),
}

impl WaveformState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        match self {
            Self::Ready(w) => Some(w),
            _ => None,
        }
    }
}

/// Decoded mono PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Fetches and decodes audio for waveform display. Called on a blocking
/// thread, so implementations may do synchronous I/O.
pub trait SampleSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> Result<DecodedAudio>;
}

/// Fetch, decode and reduce a waveform without blocking the runtime.
///
/// Every failure, including the timeout, ends in [`WaveformState::Failed`].
/// The blocking task is not cancelled on timeout; its result is discarded.
pub async fn load_waveform<S: SampleSource>(
    source: Arc<S>,
    url: String,
    samples_per_peak: usize,
    timeout: Duration,
) -> WaveformState {
    debug!(url = %url, "Loading waveform");
    let task_url = url.clone();
    let task = tokio::task::spawn_blocking(move || {
        let audio = source.fetch(&task_url)?;
        Ok::<_, HarmonicError>(Waveform::compute(
            &audio.samples,
            samples_per_peak,
            audio.sample_rate,
        ))
    });

    let state = match tokio::time::timeout(timeout, task).await {
        Err(_) => WaveformState::Failed(format!(
            "Waveform decode timed out after {} ms",
            timeout.as_millis()
        )),
        Ok(Err(join)) => WaveformState::Failed(format!("Waveform task failed: {}", join)),
        Ok(Ok(Err(e))) => WaveformState::Failed(e.to_string()),
        Ok(Ok(Ok(waveform))) if waveform.is_empty() => {
            WaveformState::Failed("No audio samples decoded".into())
        }
        Ok(Ok(Ok(waveform))) => WaveformState::Ready(waveform),
    };

    if let WaveformState::Failed(message) = &state {
        warn!(url = %url, error = %message, "Waveform unavailable");
    }
    state
}
