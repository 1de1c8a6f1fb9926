//! Runtime configuration.
//!
//! Loaded from JSON. Every field has a default, so a partial file only
//! overrides what it names. A missing file means "all defaults"; a malformed
//! file is an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{HarmonicError, Result};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "HARMONIC_CONFIG";

/// Transport and timeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Seconds moved by skip forward/back.
    pub skip_seconds: f64,
    /// Initial volume percentage (0-100).
    pub default_volume: u8,
    /// Step used by the volume-up/down shortcuts.
    pub volume_step: u8,
    /// Timeline width in pixels at zoom 1.0.
    pub base_width_px: f32,
    /// How close (in pixels) a click must land to hit a comment marker.
    pub marker_hit_radius_px: f32,
    /// Whether clicking a marker opens the comment editor.
    pub open_editor_on_marker_click: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            skip_seconds: 5.0,
            default_volume: 80,
            volume_step: 10,
            base_width_px: 1000.0,
            marker_hit_radius_px: 6.0,
            open_editor_on_marker_click: true,
        }
    }
}

/// Waveform rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Width of one bar in pixels.
    pub bar_width_px: f32,
    /// Gap between bars in pixels.
    pub bar_gap_px: f32,
    /// Source samples reduced into one peak.
    pub samples_per_peak: usize,
    /// Upper bound on fetching and decoding a track for display.
    pub decode_timeout_ms: u64,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            bar_width_px: 2.0,
            bar_gap_px: 1.0,
            samples_per_peak: 512,
            decode_timeout_ms: 10_000,
        }
    }
}

/// Comment board settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    /// Width of the time buckets comments are grouped into.
    pub bucket_seconds: f64,
    /// Maximum comment length in characters.
    pub max_length: usize,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            bucket_seconds: 10.0,
            max_length: 2000,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonicConfig {
    pub transport: TransportConfig,
    pub waveform: WaveformConfig,
    pub comments: CommentConfig,
}

impl HarmonicConfig {
    /// Parse a config from JSON text and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| HarmonicError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| HarmonicError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Load from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `$HARMONIC_CONFIG`, falling back to the default path.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path);
        Self::load(&path)
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("harmonic")
            .join("config.json")
    }

    /// Reject values the rest of the system cannot work with.
    pub fn validate(&self) -> Result<()> {
        let t = &self.transport;
        if !(t.skip_seconds.is_finite() && t.skip_seconds > 0.0) {
            return Err(HarmonicError::Config(format!(
                "transport.skip_seconds must be positive, got {}",
                t.skip_seconds
            )));
        }
        if t.default_volume > 100 {
            return Err(HarmonicError::Config(format!(
                "transport.default_volume must be 0-100, got {}",
                t.default_volume
            )));
        }
        if t.base_width_px <= 0.0 {
            return Err(HarmonicError::Config(
                "transport.base_width_px must be positive".into(),
            ));
        }
        if self.waveform.samples_per_peak == 0 {
            return Err(HarmonicError::Config(
                "waveform.samples_per_peak must be at least 1".into(),
            ));
        }
        if self.waveform.bar_width_px <= 0.0 || self.waveform.bar_gap_px < 0.0 {
            return Err(HarmonicError::Config(
                "waveform bar width must be positive and gap non-negative".into(),
            ));
        }
        if !(self.comments.bucket_seconds.is_finite() && self.comments.bucket_seconds > 0.0) {
            return Err(HarmonicError::Config(
                "comments.bucket_seconds must be positive".into(),
            ));
        }
        Ok(())
    }
}
