//! Tracks and their version history.

use harmonic_core::{EntityKind, HarmonicError, Result, TrackId, UserId, VersionId};
use serde::{Deserialize, Serialize};

use crate::version::TrackVersion;

/// A named audio stream within a project.
///
/// The version list is append-only and `current_version_id` is a single
/// pointer into it: `None` only while the track has no versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTrack {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Duration in seconds, as reported by the audio backend
    #[serde(default)]
    pub duration: f64,
    versions: Vec<TrackVersion>,
    current_version_id: Option<VersionId>,
}

impl ProjectTrack {
    /// Create a track with no versions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            duration: 0.0,
            versions: Vec::new(),
            current_version_id: None,
        }
    }

    /// All versions, oldest first.
    pub fn versions(&self) -> &[TrackVersion] {
        &self.versions
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    pub fn has_versions(&self) -> bool {
        !self.versions.is_empty()
    }

    pub fn current_version_id(&self) -> Option<VersionId> {
        self.current_version_id
    }

    /// The version the current pointer selects.
    pub fn current_version(&self) -> Option<&TrackVersion> {
        self.current_version_id.and_then(|id| self.version(id))
    }

    /// The most recently appended version.
    pub fn latest_version(&self) -> Option<&TrackVersion> {
        self.versions.last()
    }

    /// Find a version by id.
    pub fn version(&self, id: VersionId) -> Option<&TrackVersion> {
        self.versions.iter().find(|v| v.id() == id)
    }

    pub fn has_version(&self, id: VersionId) -> bool {
        self.version(id).is_some()
    }

    /// Append a version and point `current_version_id` at it.
    pub(crate) fn push_version(
        &mut self,
        audio_url: String,
        author_id: UserId,
        changes: Vec<String>,
    ) -> VersionId {
        let number = self.versions.len() as u32 + 1;
        let version = TrackVersion::new(number, audio_url, author_id, changes);
        let id = version.id();
        self.versions.push(version);
        self.current_version_id = Some(id);
        id
    }

    /// Move the current pointer to any version in this track's history.
    pub fn set_current_version(&mut self, id: VersionId) -> Result<()> {
        if !self.has_version(id) {
            return Err(HarmonicError::not_found(EntityKind::Version, id));
        }
        self.current_version_id = Some(id);
        Ok(())
    }

    /// Check the pointer invariant.
    pub fn validate(&self) -> Result<()> {
        match self.current_version_id {
            None if self.versions.is_empty() => Ok(()),
            None => Err(HarmonicError::Invariant(format!(
                "track '{}' has {} versions but no current version",
                self.name,
                self.versions.len()
            ))),
            Some(id) if self.has_version(id) => Ok(()),
            Some(id) => Err(HarmonicError::Invariant(format!(
                "track '{}' points at version {} which it does not own",
                self.name, id
            ))),
        }
    }
}
