//! Project type.

use harmonic_core::{
    now, CheckpointId, Collaborator, CommentId, EntityKind, HarmonicError, ProjectId, Result,
    Role, Timestamp, TrackId, UserId,
};
use serde::{Deserialize, Serialize};

use crate::checkpoint::Checkpoint;
use crate::comment::{CommentBoard, CommentDraft};
use crate::track::ProjectTrack;

/// A collaborative music project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID
    pub id: ProjectId,
    /// Project title
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// People with access to this project
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    /// Tracks, in display order
    #[serde(default)]
    pub tracks: Vec<ProjectTrack>,
    /// Genre and mood tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Checkpoints, oldest first
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
    /// Timeline comments on this project's tracks
    #[serde(default)]
    comments: CommentBoard,
    current_checkpoint_id: Option<CheckpointId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Create a new empty project.
    pub fn new(title: impl Into<String>) -> Self {
        let created = now();
        Self {
            id: ProjectId::new(),
            title: title.into(),
            description: String::new(),
            collaborators: Vec::new(),
            tracks: Vec::new(),
            tags: Vec::new(),
            checkpoints: Vec::new(),
            comments: CommentBoard::default(),
            current_checkpoint_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    // ── Tracks ──────────────────────────────────────────────────

    /// Append an empty track and return its id.
    pub fn add_track(&mut self, name: impl Into<String>) -> TrackId {
        let track = ProjectTrack::new(name);
        let id = track.id;
        self.tracks.push(track);
        self.touch();
        id
    }

    pub fn track(&self, id: TrackId) -> Option<&ProjectTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut ProjectTrack> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Like [`Project::track`] but as a `NotFound` error.
    pub fn require_track(&self, id: TrackId) -> Result<&ProjectTrack> {
        self.track(id)
            .ok_or_else(|| HarmonicError::not_found(EntityKind::Track, id))
    }

    /// Longest track duration in seconds.
    pub fn duration(&self) -> f64 {
        self.tracks.iter().map(|t| t.duration).fold(0.0, f64::max)
    }

    // ── Checkpoints ─────────────────────────────────────────────

    pub fn checkpoint(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| c.id == id)
    }

    pub fn current_checkpoint_id(&self) -> Option<CheckpointId> {
        self.current_checkpoint_id
    }

    pub fn current_checkpoint(&self) -> Option<&Checkpoint> {
        self.current_checkpoint_id.and_then(|id| self.checkpoint(id))
    }

    pub(crate) fn set_current_checkpoint(&mut self, id: Option<CheckpointId>) {
        self.current_checkpoint_id = id;
    }

    // ── Comments ────────────────────────────────────────────────

    pub fn comments(&self) -> &CommentBoard {
        &self.comments
    }

    /// Likes, replies and moderation. New comments go through
    /// [`Project::add_comment`].
    pub fn comments_mut(&mut self) -> &mut CommentBoard {
        &mut self.comments
    }

    /// Pin a comment to one of this project's tracks.
    pub fn add_comment(&mut self, draft: CommentDraft) -> Result<CommentId> {
        self.require_track(draft.track_id)?;
        let id = self.comments.add(draft)?;
        self.touch();
        Ok(id)
    }

    // ── Collaborators ───────────────────────────────────────────

    pub fn collaborator(&self, user_id: UserId) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| c.id() == user_id)
    }

    pub fn owner(&self) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| c.role == Role::Owner)
    }

    /// Add a collaborator. Adding the same user twice is rejected.
    pub fn add_collaborator(&mut self, collaborator: Collaborator) -> Result<()> {
        if self.collaborator(collaborator.id()).is_some() {
            return Err(HarmonicError::Validation(format!(
                "{} is already a collaborator",
                collaborator.user.name
            )));
        }
        self.collaborators.push(collaborator);
        self.touch();
        Ok(())
    }

    /// Remove a collaborator. The last owner cannot be removed.
    pub fn remove_collaborator(&mut self, user_id: UserId) -> Result<Collaborator> {
        let index = self
            .collaborators
            .iter()
            .position(|c| c.id() == user_id)
            .ok_or_else(|| HarmonicError::not_found(EntityKind::Collaborator, user_id))?;
        if self.collaborators[index].role == Role::Owner && self.owner_count() == 1 {
            return Err(HarmonicError::Validation(
                "cannot remove the last owner of a project".into(),
            ));
        }
        self.touch();
        Ok(self.collaborators.remove(index))
    }

    /// Change a collaborator's role. Demoting the last owner is rejected.
    pub fn set_role(&mut self, user_id: UserId, role: Role) -> Result<()> {
        let owners = self.owner_count();
        let collaborator = self
            .collaborators
            .iter_mut()
            .find(|c| c.id() == user_id)
            .ok_or_else(|| HarmonicError::not_found(EntityKind::Collaborator, user_id))?;
        if collaborator.role == Role::Owner && role != Role::Owner && owners == 1 {
            return Err(HarmonicError::Validation(
                "cannot demote the last owner of a project".into(),
            ));
        }
        collaborator.role = role;
        self.touch();
        Ok(())
    }

    fn owner_count(&self) -> usize {
        self.collaborators
            .iter()
            .filter(|c| c.role == Role::Owner)
            .count()
    }

    // ── Invariants ──────────────────────────────────────────────

    /// Check every structural invariant, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        for track in &self.tracks {
            track.validate()?;
        }
        for checkpoint in &self.checkpoints {
            for (track_id, version_id) in &checkpoint.track_versions {
                let track = self.track(*track_id).ok_or_else(|| {
                    HarmonicError::Invariant(format!(
                        "checkpoint '{}' references unknown track {}",
                        checkpoint.name, track_id
                    ))
                })?;
                if !track.has_version(*version_id) {
                    return Err(HarmonicError::Invariant(format!(
                        "checkpoint '{}' references version {} missing from track '{}'",
                        checkpoint.name, version_id, track.name
                    )));
                }
            }
        }
        if let Some(id) = self.current_checkpoint_id {
            if self.checkpoint(id).is_none() {
                return Err(HarmonicError::Invariant(format!(
                    "current checkpoint {} does not exist",
                    id
                )));
            }
        }
        for comment in self.comments.iter() {
            if self.track(comment.track_id).is_none() {
                return Err(HarmonicError::Invariant(format!(
                    "comment {} is attached to unknown track {}",
                    comment.id, comment.track_id
                )));
            }
        }
        Ok(())
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled Project")
    }
}
