//! In-memory project store.
//!
//! The store is an explicit value owned by the caller, not a global. Every
//! mutation goes through it and returns a typed result, so callers always
//! read the state they just wrote.

use harmonic_core::{
    CheckpointId, Collaborator, CommentId, EntityKind, HarmonicError, ProjectId, Result, Role,
    TrackId, User, UserId, VersionId,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::checkpoint;
use crate::comment::CommentDraft;
use crate::project::Project;
use crate::template::ProjectTemplate;

/// A store shared between several owners on the same thread or across threads.
pub type SharedProjectStore = Arc<RwLock<ProjectStore>>;

/// Which track an upload lands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Append to an existing track.
    Existing(TrackId),
    /// Create a new track with this name first.
    NewTrack { name: String },
}

/// A version upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub target: UploadTarget,
    pub audio_url: String,
    pub author_id: UserId,
    pub changes: Vec<String>,
}

/// What an upload produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub track_id: TrackId,
    pub version_id: VersionId,
    pub version_label: String,
    pub created_track: bool,
}

/// Partial update of a project's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct ProjectDetails {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Owns every project in the session.
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    projects: Vec<Project>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_projects(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Wrap the store for shared ownership.
    pub fn into_shared(self) -> SharedProjectStore {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// All projects, in creation order.
    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    pub fn into_projects(self) -> Vec<Project> {
        self.projects
    }

    pub fn get(&self, id: ProjectId) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| HarmonicError::not_found(EntityKind::Project, id))
    }

    pub fn get_mut(&mut self, id: ProjectId) -> Result<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| HarmonicError::not_found(EntityKind::Project, id))
    }

    /// An owned copy of a project, independent of later mutations.
    pub fn snapshot(&self, id: ProjectId) -> Result<Project> {
        self.get(id).cloned()
    }

    // ── Project lifecycle ───────────────────────────────────────

    /// Insert an existing project (e.g. loaded from a file).
    pub fn insert(&mut self, project: Project) -> Result<ProjectId> {
        if self.get(project.id).is_ok() {
            return Err(HarmonicError::Validation(format!(
                "project {} already exists",
                project.id
            )));
        }
        project.validate()?;
        let id = project.id;
        self.projects.push(project);
        Ok(id)
    }

    /// Create an empty project owned by `owner`.
    pub fn create_project(
        &mut self,
        title: &str,
        description: &str,
        owner: User,
    ) -> Result<ProjectId> {
        self.create_from_template(title, description, ProjectTemplate::Blank, owner)
    }

    /// Create a project from a template, owned by `owner`.
    pub fn create_from_template(
        &mut self,
        title: &str,
        description: &str,
        template: ProjectTemplate,
        owner: User,
    ) -> Result<ProjectId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(HarmonicError::Validation("project title is required".into()));
        }
        let mut project = template.instantiate(title).with_description(description.trim());
        project.add_collaborator(Collaborator::new(owner, Role::Owner))?;
        let id = project.id;
        info!(project = %id, template = %template, tracks = project.tracks.len(), "Project created");
        self.projects.push(project);
        Ok(id)
    }

    /// Update title, description and/or tags.
    pub fn update_details(&mut self, id: ProjectId, details: ProjectDetails) -> Result<()> {
        if let Some(title) = &details.title {
            if title.trim().is_empty() {
                return Err(HarmonicError::Validation("project title is required".into()));
            }
        }
        let project = self.get_mut(id)?;
        if let Some(title) = details.title {
            project.title = title.trim().to_string();
        }
        if let Some(description) = details.description {
            project.description = description;
        }
        if let Some(tags) = details.tags {
            project.tags = tags;
        }
        project.touch();
        Ok(())
    }

    /// Remove a project and everything it owns.
    pub fn delete_project(&mut self, id: ProjectId) -> Result<Project> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| HarmonicError::not_found(EntityKind::Project, id))?;
        let removed = self.projects.remove(index);
        info!(project = %id, title = %removed.title, "Project deleted");
        Ok(removed)
    }

    // ── Tracks & versions ───────────────────────────────────────

    /// Append an empty track.
    pub fn add_track(&mut self, id: ProjectId, name: &str) -> Result<TrackId> {
        let name = validate_track_name(name)?;
        let project = self.get_mut(id)?;
        let track_id = project.add_track(name);
        debug!(project = %id, track = %track_id, "Track added");
        Ok(track_id)
    }

    /// Record the duration the audio backend reported for a track.
    pub fn set_track_duration(
        &mut self,
        id: ProjectId,
        track_id: TrackId,
        seconds: f64,
    ) -> Result<()> {
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(HarmonicError::Validation(format!(
                "track duration must be non-negative, got {}",
                seconds
            )));
        }
        let project = self.get_mut(id)?;
        let track = project
            .track_mut(track_id)
            .ok_or_else(|| HarmonicError::not_found(EntityKind::Track, track_id))?;
        track.duration = seconds;
        Ok(())
    }

    /// Upload a new version, optionally creating its track first.
    ///
    /// Inputs are validated before anything is written, so a rejected upload
    /// never leaves an orphaned empty track behind.
    pub fn upload_track_version(
        &mut self,
        id: ProjectId,
        request: UploadRequest,
    ) -> Result<UploadOutcome> {
        if request.audio_url.trim().is_empty() {
            return Err(HarmonicError::Validation(
                "audio URL must not be empty".into(),
            ));
        }
        let project = self.get_mut(id)?;

        let (track_id, created_track) = match &request.target {
            UploadTarget::Existing(track_id) => {
                if project.track(*track_id).is_none() {
                    warn!(project = %id, track = %track_id, "Upload to unknown track rejected");
                    return Err(HarmonicError::not_found(EntityKind::Track, track_id));
                }
                (*track_id, false)
            }
            UploadTarget::NewTrack { name } => {
                let name = validate_track_name(name)?;
                (project.add_track(name), true)
            }
        };

        let track = project
            .track_mut(track_id)
            .ok_or_else(|| HarmonicError::not_found(EntityKind::Track, track_id))?;
        let version_id = crate::version::create_track_version(
            track,
            request.audio_url,
            request.author_id,
            request.changes,
        )?;
        let version_label = track
            .version(version_id)
            .map(|v| v.label().to_string())
            .unwrap_or_default();
        project.touch();

        info!(
            project = %id,
            track = %track_id,
            version = %version_label,
            created_track,
            "Track version uploaded"
        );
        Ok(UploadOutcome {
            track_id,
            version_id,
            version_label,
            created_track,
        })
    }

    // ── Checkpoints ─────────────────────────────────────────────

    /// Snapshot every track's current version.
    pub fn create_checkpoint(
        &mut self,
        id: ProjectId,
        name: &str,
        author_id: UserId,
        label: Option<String>,
        description: Option<String>,
    ) -> Result<CheckpointId> {
        let project = self.get_mut(id)?;
        let checkpoint_id =
            checkpoint::create_checkpoint(project, name.trim(), author_id, label, description)?;
        info!(project = %id, checkpoint = %checkpoint_id, "Checkpoint created");
        Ok(checkpoint_id)
    }

    /// Restore a checkpoint. Unknown ids fail without touching the project.
    pub fn apply_checkpoint(&mut self, id: ProjectId, checkpoint_id: CheckpointId) -> Result<()> {
        let project = self.get_mut(id)?;
        checkpoint::apply_checkpoint(project, checkpoint_id).map_err(|e| {
            warn!(project = %id, checkpoint = %checkpoint_id, error = %e, "Checkpoint not applied");
            e
        })
    }

    // ── Collaborators ───────────────────────────────────────────

    pub fn add_collaborator(&mut self, id: ProjectId, collaborator: Collaborator) -> Result<()> {
        self.get_mut(id)?.add_collaborator(collaborator)
    }

    pub fn remove_collaborator(&mut self, id: ProjectId, user_id: UserId) -> Result<Collaborator> {
        self.get_mut(id)?.remove_collaborator(user_id)
    }

    pub fn set_role(&mut self, id: ProjectId, user_id: UserId, role: Role) -> Result<()> {
        self.get_mut(id)?.set_role(user_id, role)
    }

    // ── Comments ────────────────────────────────────────────────

    /// Pin a comment to a track of the project.
    pub fn add_comment(&mut self, id: ProjectId, draft: CommentDraft) -> Result<CommentId> {
        let track_id = draft.track_id;
        let comment_id = self.get_mut(id)?.add_comment(draft).map_err(|e| {
            warn!(project = %id, track = %track_id, error = %e, "Comment rejected");
            e
        })?;
        debug!(project = %id, comment = %comment_id, "Comment pinned");
        Ok(comment_id)
    }
}

fn validate_track_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HarmonicError::Validation("track name is required".into()));
    }
    Ok(name)
}
