//! Harmonic Project - Project, version and checkpoint model
//!
//! Implements the collaboration data model:
//! - Projects containing tracks, collaborators and checkpoints
//! - Tracks holding an append-only history of versions
//! - Checkpoints freezing one version per track, restorable later
//! - Timeline comments with emotions and conflict moderation
//! - An explicit in-memory store and a versioned export format

pub mod checkpoint;
pub mod comment;
pub mod project;
pub mod sample;
pub mod serialization;
pub mod store;
pub mod template;
pub mod track;
pub mod version;

pub use checkpoint::{apply_checkpoint, create_checkpoint, plan_checkpoint, Checkpoint, PointerMove};
pub use comment::{
    Comment, CommentBoard, CommentBucket, CommentDraft, CommentFilter, ConflictState, Reply,
};
pub use project::Project;
pub use sample::{sample_catalog, SampleCast};
pub use serialization::ProjectFile;
pub use store::{
    ProjectDetails, ProjectStore, SharedProjectStore, UploadOutcome, UploadRequest, UploadTarget,
};
pub use template::ProjectTemplate;
pub use track::ProjectTrack;
pub use version::{create_track_version, get_track_version, TrackVersion};
