//! Mute/solo routing.
//!
//! A track is audible unless it is explicitly muted, or some track is
//! soloed and it is not one of them. Mute always wins over solo.

use harmonic_core::TrackId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The routing rule on raw flags.
pub fn is_audible(muted: bool, soloed: bool, any_solo: bool) -> bool {
    !muted && (soloed || !any_solo)
}

/// Mute and solo sets for the tracks of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routing {
    muted: BTreeSet<TrackId>,
    soloed: BTreeSet<TrackId>,
}

impl Routing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_muted(&self, track: TrackId) -> bool {
        self.muted.contains(&track)
    }

    pub fn is_soloed(&self, track: TrackId) -> bool {
        self.soloed.contains(&track)
    }

    pub fn has_solo(&self) -> bool {
        !self.soloed.is_empty()
    }

    pub fn is_audible(&self, track: TrackId) -> bool {
        is_audible(self.is_muted(track), self.is_soloed(track), self.has_solo())
    }

    pub fn set_muted(&mut self, track: TrackId, muted: bool) {
        if muted {
            self.muted.insert(track);
        } else {
            self.muted.remove(&track);
        }
    }

    pub fn set_soloed(&mut self, track: TrackId, soloed: bool) {
        if soloed {
            self.soloed.insert(track);
        } else {
            self.soloed.remove(&track);
        }
    }

    /// Flip mute; returns the new state.
    pub fn toggle_mute(&mut self, track: TrackId) -> bool {
        let muted = !self.is_muted(track);
        self.set_muted(track, muted);
        muted
    }

    /// Flip solo; returns the new state.
    pub fn toggle_solo(&mut self, track: TrackId) -> bool {
        let soloed = !self.is_soloed(track);
        self.set_soloed(track, soloed);
        soloed
    }

    pub fn clear_solo(&mut self) {
        self.soloed.clear();
    }

    pub fn muted(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.muted.iter().copied()
    }

    pub fn soloed(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.soloed.iter().copied()
    }
}
