//! Checkpoints: named snapshots of the current version of every track.
//!
//! Applying a checkpoint only moves per-track pointers and the project's
//! current-checkpoint pointer. Version history is never touched.

use harmonic_core::{
    now, CheckpointId, EntityKind, HarmonicError, Result, Timestamp, TrackId, UserId, VersionId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::project::Project;

/// A frozen combination of per-track versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub name: String,
    pub label: String,
    pub created_at: Timestamp,
    pub author_id: UserId,
    /// Version that was current on each track at snapshot time.
    pub track_versions: BTreeMap<TrackId, VersionId>,
    #[serde(default)]
    pub description: Option<String>,
}

/// How applying a checkpoint would move one track's pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerMove {
    pub track_id: TrackId,
    pub from: Option<VersionId>,
    pub to: VersionId,
}

/// Snapshot the current version of every track that has one.
///
/// The label defaults to `v{n}.0` where `n` is the new checkpoint count.
pub fn create_checkpoint(
    project: &mut Project,
    name: impl Into<String>,
    author_id: UserId,
    label: Option<String>,
    description: Option<String>,
) -> Result<CheckpointId> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(HarmonicError::Validation(
            "checkpoint name must not be empty".into(),
        ));
    }

    let track_versions: BTreeMap<TrackId, VersionId> = project
        .tracks
        .iter()
        .filter_map(|t| t.current_version_id().map(|v| (t.id, v)))
        .collect();

    let label = label
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| format!("v{}.0", project.checkpoints.len() + 1));

    let checkpoint = Checkpoint {
        id: CheckpointId::new(),
        name,
        label,
        created_at: now(),
        author_id,
        track_versions,
        description: description.filter(|d| !d.trim().is_empty()),
    };
    let id = checkpoint.id;

    debug!(
        checkpoint = %id,
        tracks = checkpoint.track_versions.len(),
        "Checkpoint captured"
    );
    project.checkpoints.push(checkpoint);
    project.touch();
    Ok(id)
}

/// Compute the pointer moves applying `checkpoint_id` would make, without
/// mutating anything. Fails if the checkpoint or any recorded version is
/// missing.
pub fn plan_checkpoint(project: &Project, checkpoint_id: CheckpointId) -> Result<Vec<PointerMove>> {
    let checkpoint = project
        .checkpoint(checkpoint_id)
        .ok_or_else(|| HarmonicError::not_found(EntityKind::Checkpoint, checkpoint_id))?;

    checkpoint
        .track_versions
        .iter()
        .map(|(&track_id, &version_id)| {
            let track = project
                .track(track_id)
                .ok_or_else(|| HarmonicError::not_found(EntityKind::Track, track_id))?;
            if !track.has_version(version_id) {
                return Err(HarmonicError::not_found(EntityKind::Version, version_id));
            }
            Ok(PointerMove {
                track_id,
                from: track.current_version_id(),
                to: version_id,
            })
        })
        .collect()
}

/// Restore every recorded pointer and mark the checkpoint as current.
///
/// Only the current pointers and the current checkpoint change; even
/// `updated_at` is left alone. All references are checked before the first
/// write, so a failure leaves the project untouched. Applying the same
/// checkpoint twice is a no-op the second time.
pub fn apply_checkpoint(project: &mut Project, checkpoint_id: CheckpointId) -> Result<()> {
    let moves = plan_checkpoint(project, checkpoint_id)?;

    for mv in &moves {
        if let Some(track) = project.track_mut(mv.track_id) {
            track.set_current_version(mv.to)?;
        }
    }
    project.set_current_checkpoint(Some(checkpoint_id));

    info!(
        checkpoint = %checkpoint_id,
        moved = moves.iter().filter(|m| m.from != Some(m.to)).count(),
        "Checkpoint applied"
    );
    Ok(())
}
