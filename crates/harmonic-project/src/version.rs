//! Immutable track versions.

use harmonic_core::{now, HarmonicError, Result, Timestamp, UserId, VersionId};
use serde::{Deserialize, Serialize};

use crate::track::ProjectTrack;

/// One uploaded take of a track. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackVersion {
    id: VersionId,
    number: u32,
    label: String,
    audio_url: String,
    created_at: Timestamp,
    author_id: UserId,
    changes: Vec<String>,
}

impl TrackVersion {
    pub(crate) fn new(
        number: u32,
        audio_url: String,
        author_id: UserId,
        changes: Vec<String>,
    ) -> Self {
        Self {
            id: VersionId::new(),
            number,
            label: format!("v{}", number),
            audio_url,
            created_at: now(),
            author_id,
            changes,
        }
    }

    pub fn id(&self) -> VersionId {
        self.id
    }

    /// 1-based position in the track history.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Display label, `v{number}`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn audio_url(&self) -> &str {
        &self.audio_url
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Free-text list of what changed in this take.
    pub fn changes(&self) -> &[String] {
        &self.changes
    }
}

/// Append a new version to `track` and make it current.
///
/// The label is derived from the existing version count: a track with two
/// versions receives `v3`.
pub fn create_track_version(
    track: &mut ProjectTrack,
    audio_url: impl Into<String>,
    author_id: UserId,
    changes: Vec<String>,
) -> Result<VersionId> {
    let audio_url = audio_url.into();
    if audio_url.trim().is_empty() {
        return Err(HarmonicError::Validation(
            "audio URL must not be empty".into(),
        ));
    }
    Ok(track.push_version(audio_url, author_id, changes))
}

/// Tolerant version lookup: a missing track or id simply yields `None`.
pub fn get_track_version(
    track: Option<&ProjectTrack>,
    version_id: Option<VersionId>,
) -> Option<&TrackVersion> {
    let track = track?;
    let id = version_id?;
    track.version(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_version_is_v1() {
        let mut track = ProjectTrack::new("Vocals");
        let author = UserId::new();
        let id = create_track_version(&mut track, "/audio/v1.mp3", author, vec![]).unwrap();
        let version = track.version(id).unwrap();
        assert_eq!(version.label(), "v1");
        assert_eq!(version.number(), 1);
        assert_eq!(version.author_id(), author);
        assert_eq!(track.current_version_id(), Some(id));
    }

    #[test]
    fn test_label_follows_previous_count() {
        let mut track = ProjectTrack::new("Bass");
        let author = UserId::new();
        create_track_version(&mut track, "/a.mp3", author, vec![]).unwrap();
        create_track_version(&mut track, "/b.mp3", author, vec![]).unwrap();

        let previous = track.version_count();
        create_track_version(&mut track, "/c.mp3", author, changes(&["tighter groove"])).unwrap();

        let last = track.latest_version().unwrap();
        assert_eq!(last.label(), format!("v{}", previous + 1));
        assert_eq!(last.audio_url(), "/c.mp3");
        assert_eq!(last.changes(), &["tighter groove".to_string()]);
    }

    #[test]
    fn test_empty_url_rejected_without_mutation() {
        let mut track = ProjectTrack::new("Drums");
        let err = create_track_version(&mut track, "   ", UserId::new(), vec![]).unwrap_err();
        assert_eq!(err.reason_code(), "invalid_input");
        assert_eq!(track.version_count(), 0);
        assert_eq!(track.current_version_id(), None);
    }

    #[test]
    fn test_get_track_version_is_tolerant() {
        let mut track = ProjectTrack::new("Keys");
        let id = create_track_version(&mut track, "/k.mp3", UserId::new(), vec![]).unwrap();

        assert!(get_track_version(Some(&track), Some(VersionId::new())).is_none());
        assert!(get_track_version(None, Some(id)).is_none());
        assert!(get_track_version(Some(&track), None).is_none());
        assert_eq!(get_track_version(Some(&track), Some(id)).unwrap().id(), id);
    }
}
