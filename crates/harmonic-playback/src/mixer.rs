//! Preview mixer: sums per-track mono sources into one output buffer.

use harmonic_core::TrackId;
use std::collections::BTreeMap;

use crate::routing::{is_audible, Routing};

/// Per-track mixer strip.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStrip {
    /// Volume (0.0 to 1.0).
    pub volume: f32,
    pub muted: bool,
    pub solo: bool,
}

impl Default for ChannelStrip {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            solo: false,
        }
    }
}

impl ChannelStrip {
    /// Effective gain given whether any strip in the mix is soloed.
    pub fn gain(&self, any_solo: bool) -> f32 {
        if is_audible(self.muted, self.solo, any_solo) {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Mixer that combines track sources into a mono preview.
pub struct Mixer {
    strips: BTreeMap<TrackId, ChannelStrip>,
    /// Master volume.
    pub master_volume: f32,
    /// Master limiter enabled.
    pub limiter_enabled: bool,
    /// Limiter threshold in linear amplitude.
    pub limiter_threshold: f32,
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            strips: BTreeMap::new(),
            master_volume: 1.0,
            limiter_enabled: false,
            limiter_threshold: 0.95,
        }
    }

    pub fn strip(&self, track: TrackId) -> Option<&ChannelStrip> {
        self.strips.get(&track)
    }

    /// Strip for a track, created with defaults on first use.
    pub fn strip_mut(&mut self, track: TrackId) -> &mut ChannelStrip {
        self.strips.entry(track).or_default()
    }

    pub fn strip_count(&self) -> usize {
        self.strips.len()
    }

    fn any_solo(&self) -> bool {
        self.strips.values().any(|s| s.solo)
    }

    pub fn is_audible(&self, track: TrackId) -> bool {
        let strip = self.strips.get(&track).cloned().unwrap_or_default();
        is_audible(strip.muted, strip.solo, self.any_solo())
    }

    /// Copy mute/solo flags from the controller's routing onto the strips.
    pub fn apply_routing(&mut self, routing: &Routing) {
        for track in routing.muted().chain(routing.soloed()) {
            self.strips.entry(track).or_default();
        }
        for (track, strip) in self.strips.iter_mut() {
            strip.muted = routing.is_muted(*track);
            strip.solo = routing.is_soloed(*track);
        }
    }

    /// Mix mono sources into `output`, which is overwritten.
    ///
    /// Sources shorter than the output contribute silence for the rest;
    /// tracks without a strip use a default one.
    pub fn mix(&self, sources: &[(TrackId, &[f32])], output: &mut [f32]) {
        output.iter_mut().for_each(|s| *s = 0.0);

        let any_solo = self.any_solo();
        for (track, source) in sources {
            let gain = self
                .strips
                .get(track)
                .cloned()
                .unwrap_or_default()
                .gain(any_solo);
            if gain == 0.0 {
                continue;
            }
            for (out, sample) in output.iter_mut().zip(source.iter()) {
                *out += sample * gain;
            }
        }

        for s in output.iter_mut() {
            *s *= self.master_volume;
        }

        // Simple hard clamp
        if self.limiter_enabled {
            let threshold = self.limiter_threshold;
            for s in output.iter_mut() {
                *s = s.clamp(-threshold, threshold);
            }
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_gain_muted() {
        let strip = ChannelStrip {
            muted: true,
            ..Default::default()
        };
        assert_eq!(strip.gain(false), 0.0);
    }

    #[test]
    fn test_mixer_basic() {
        let mixer = Mixer::new();
        let a = vec![0.5f32; 4];
        let b = vec![0.25f32; 4];
        let mut out = vec![0.0f32; 4];

        mixer.mix(&[(TrackId::new(), &a[..]), (TrackId::new(), &b[..])], &mut out);

        for s in &out {
            assert!((s - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mixer_solo() {
        let mut mixer = Mixer::new();
        let (a, b) = (TrackId::new(), TrackId::new());
        mixer.strip_mut(b).solo = true;

        let loud = vec![1.0f32; 4];
        let quiet = vec![0.5f32; 4];
        let mut out = vec![0.0f32; 4];
        mixer.mix(&[(a, &loud[..]), (b, &quiet[..])], &mut out);

        assert!(out.iter().all(|s| (s - 0.5).abs() < 1e-6));
        assert!(!mixer.is_audible(a));
    }

    #[test]
    fn test_mixer_mute_beats_solo() {
        let mut mixer = Mixer::new();
        let a = TrackId::new();
        let strip = mixer.strip_mut(a);
        strip.solo = true;
        strip.muted = true;

        let src = vec![1.0f32; 4];
        let mut out = vec![1.0f32; 4];
        mixer.mix(&[(a, &src[..])], &mut out);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_mixer_limiter() {
        let mut mixer = Mixer::new();
        mixer.limiter_enabled = true;
        mixer.limiter_threshold = 0.8;

        let loud = vec![2.0f32; 8];
        let mut out = vec![0.0f32; 8];
        mixer.mix(&[(TrackId::new(), &loud[..])], &mut out);
        assert!(out.iter().all(|s| s.abs() <= 0.8));
    }

    #[test]
    fn test_short_source_pads_with_silence() {
        let mixer = Mixer::new();
        let short = vec![0.5f32; 2];
        let mut out = vec![9.0f32; 4];
        mixer.mix(&[(TrackId::new(), &short[..])], &mut out);
        assert_eq!(out, vec![0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_apply_routing() {
        let mut mixer = Mixer::new();
        let (a, b) = (TrackId::new(), TrackId::new());
        mixer.strip_mut(a).muted = true;

        let mut routing = Routing::new();
        routing.set_soloed(b, true);
        mixer.apply_routing(&routing);

        assert!(!mixer.strip(a).unwrap().muted);
        assert!(mixer.strip(b).unwrap().solo);
        assert!(!mixer.is_audible(a));
        assert!(mixer.is_audible(b));
    }
}
