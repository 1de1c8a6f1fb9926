//! Headless playback preview.
//!
//! Drives the playback controller through a short keyboard script against
//! the in-memory backend and renders what a timeline view would show.

use anyhow::{Context, Result};
use harmonic_core::{HarmonicConfig, HarmonicError};
use harmonic_playback::{
    DecodedAudio, HeadlessBackend, Key, Mixer, PlaybackController, SampleSource, Shortcut,
    VisualizationMode,
};
use harmonic_project::{Project, ProjectStore};
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::fmt::Write;
use std::sync::Arc;
use tracing::debug;

/// Duration assumed for tracks that never reported one.
const FALLBACK_SECONDS: f64 = 60.0;
const PREVIEW_SAMPLE_RATE: u32 = 4_000;
const WAVEFORM_COLUMNS: usize = 64;
const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Deterministic tones standing in for decoded audio, one per URL.
struct SyntheticSource {
    durations: HashMap<String, f64>,
}

impl SyntheticSource {
    fn render(url: &str, duration: f64) -> Vec<f32> {
        let seed = url
            .bytes()
            .fold(7u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
        let rate = PREVIEW_SAMPLE_RATE as f32;
        let freq = 110.0 + (seed % 330) as f32;
        let phase = (seed % 100) as f32 / 100.0 * TAU;
        let len = (duration * f64::from(PREVIEW_SAMPLE_RATE)) as usize;
        (0..len)
            .map(|i| {
                let t = i as f32 / rate;
                let swell = 0.3 + 0.6 * (0.5 + 0.5 * (t * 0.1 * TAU + phase).sin());
                swell * (t * freq * TAU).sin()
            })
            .collect()
    }
}

impl SampleSource for SyntheticSource {
    fn fetch(&self, url: &str) -> harmonic_core::Result<DecodedAudio> {
        let duration = self
            .durations
            .get(url)
            .copied()
            .ok_or_else(|| HarmonicError::Decode(format!("No audio at '{}'", url)))?;
        Ok(DecodedAudio {
            samples: Self::render(url, duration),
            sample_rate: PREVIEW_SAMPLE_RATE,
        })
    }
}

/// Play through the first playable track of the catalog.
pub async fn run(store: &ProjectStore, config: &HarmonicConfig) -> Result<String> {
    let project = store
        .list()
        .iter()
        .find(|p| p.tracks.iter().any(|t| t.has_versions()))
        .context("No project has a playable track")?;
    let track = project
        .tracks
        .iter()
        .find(|t| t.has_versions())
        .context("No playable track")?;

    let mut backend = HeadlessBackend::new();
    let mut durations = HashMap::new();
    for t in &project.tracks {
        if let Some(version) = t.current_version() {
            let duration = if t.duration > 0.0 { t.duration } else { FALLBACK_SECONDS };
            backend.add_media(version.audio_url(), duration);
            durations.insert(version.audio_url().to_string(), duration);
        }
    }
    let source = Arc::new(SyntheticSource { durations });

    let mut ctl = PlaybackController::new(backend, config);
    let events = ctl.subscribe();
    let mut out = String::new();

    ctl.select_track(track)?;
    ctl.load_waveform(Arc::clone(&source)).await;
    let label = ctl
        .selected()
        .map(|s| s.version_label.clone())
        .unwrap_or_default();
    writeln!(out, "{} / {} ({})", project.title, track.name, label)?;
    writeln!(out, "{}", waveform_line(&ctl))?;

    let script = [
        Shortcut::plain(Key::Space),
        Shortcut::plain(Key::ArrowRight),
        Shortcut::plain(Key::ArrowRight),
        Shortcut::plain(Key::Char('=')),
        Shortcut::plain(Key::ArrowDown),
        Shortcut::plain(Key::char('s')),
        Shortcut::plain(Key::Space),
    ];
    for shortcut in &script {
        let Some(action) = ctl.handle_shortcut(shortcut) else {
            continue;
        };
        if ctl.is_playing() {
            ctl.backend_mut().advance(12.0);
            ctl.sync();
        }
        writeln!(
            out,
            "  {:<6} {:<14} {}  zoom {}  vol {}",
            shortcut.display(),
            action.name(),
            ctl.clock_text(),
            ctl.zoom(),
            ctl.volume()
        )?;
    }
    if let Some(error) = ctl.error() {
        writeln!(out, "  error: {}", error)?;
    }

    for marker in ctl.markers(project.comments().iter()) {
        let click = ctl.click_marker(&marker)?;
        let text = project
            .comments()
            .get(click.comment_id)
            .map(|c| c.text.as_str())
            .unwrap_or_default();
        writeln!(
            out,
            "  marker {} [{}] {}",
            ctl.clock_text(),
            marker.emotion,
            text
        )?;
    }

    writeln!(out, "{}", mix_line(project, &ctl, &source))?;

    let received = events.try_iter().count();
    debug!(events = received, "Preview finished");
    writeln!(out, "{} playback events", received)?;
    Ok(out)
}

fn waveform_line(ctl: &PlaybackController<HeadlessBackend>) -> String {
    let style = ctl.bar_style(VisualizationMode::Bars);
    let bars = ctl.waveform_bars(1.0, &style);
    if bars.is_empty() {
        return "  (no waveform)".to_string();
    }
    let step = bars.len().div_ceil(WAVEFORM_COLUMNS).max(1);
    let line: String = bars
        .iter()
        .step_by(step)
        .map(|bar| {
            let level = (bar.height * (LEVELS.len() - 1) as f32).round() as usize;
            LEVELS[level.min(LEVELS.len() - 1)]
        })
        .collect();
    format!("  {}", line)
}

/// Peak of a one-second mix at the playhead, honoring mute/solo.
fn mix_line(
    project: &Project,
    ctl: &PlaybackController<HeadlessBackend>,
    source: &SyntheticSource,
) -> String {
    let mut mixer = Mixer::new();
    mixer.limiter_enabled = true;
    mixer.apply_routing(ctl.routing());

    let start = (ctl.position() * f64::from(PREVIEW_SAMPLE_RATE)) as usize;
    let window = PREVIEW_SAMPLE_RATE as usize;
    let rendered: Vec<_> = project
        .tracks
        .iter()
        .filter_map(|t| {
            let audio = source.fetch(t.current_version()?.audio_url()).ok()?;
            Some((t.id, audio.samples))
        })
        .collect();
    let sources: Vec<_> = rendered
        .iter()
        .map(|(id, samples)| {
            let from = start.min(samples.len());
            let to = (start + window).min(samples.len());
            (*id, &samples[from..to])
        })
        .collect();

    let mut output = vec![0.0f32; window];
    mixer.mix(&sources, &mut output);
    let peak = output.iter().fold(0.0f32, |p, s| p.max(s.abs()));
    let audible = sources.iter().filter(|(id, _)| mixer.is_audible(*id)).count();
    format!(
        "  mix peak {:.2} ({} of {} tracks audible)",
        peak,
        audible,
        sources.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonic_project::sample_catalog;

    #[test]
    fn test_synthetic_source_is_deterministic() {
        let a = SyntheticSource::render("/a.mp3", 0.5);
        let b = SyntheticSource::render("/a.mp3", 0.5);
        assert_eq!(a.len(), 2_000);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| s.abs() <= 1.0));
    }

    #[tokio::test]
    async fn test_preview_runs_on_sample_catalog() {
        let store = sample_catalog().unwrap();
        let text = run(&store, &HarmonicConfig::default()).await.unwrap();

        assert!(text.starts_with("Midnight Echoes / Vocals (v2)"));
        assert!(text.contains("Play/Pause"));
        assert!(text.contains("1 of 4 tracks audible"));
        assert!(!text.contains("(no waveform)"));
    }
}
