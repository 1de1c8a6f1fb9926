//! Timeline comments with emotion tags and conflict moderation.
//!
//! Comments live in a flat list. Views over them are predicates
//! ([`CommentFilter`]) and fixed-width time buckets.

use harmonic_core::limits::MAX_NORMALIZED_POSITION;
use harmonic_core::{
    now, Collaborator, CommentId, Emotion, EntityKind, HarmonicError, Result, TimeSpan,
    Timestamp, TrackId, User, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Default maximum comment length in characters.
pub const DEFAULT_MAX_LENGTH: usize = 2000;

/// Moderation state of a comment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConflictState {
    #[default]
    None,
    Flagged {
        reason: String,
    },
    Resolved {
        resolution: String,
        resolved_by: UserId,
    },
}

/// A reply under a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub author: User,
    pub text: String,
    pub created_at: Timestamp,
}

/// A comment pinned to a point on a track's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub track_id: TrackId,
    /// Normalized position on the timeline, 0-100.
    pub position: f64,
    /// Absolute position in seconds.
    pub time_position: f64,
    pub author: User,
    pub text: String,
    pub emotion: Emotion,
    pub created_at: Timestamp,
    #[serde(default)]
    pub conflict: ConflictState,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl Comment {
    /// Flagged and not yet resolved.
    pub fn is_open_conflict(&self) -> bool {
        matches!(self.conflict, ConflictState::Flagged { .. })
    }

    /// Ever involved in a conflict, resolved or not.
    pub fn has_conflict(&self) -> bool {
        !matches!(self.conflict, ConflictState::None)
    }

    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }
}

/// Input for a new comment.
#[derive(Debug, Clone)]
pub struct CommentDraft {
    pub track_id: TrackId,
    pub author: User,
    pub text: String,
    pub emotion: Emotion,
    pub position: f64,
    pub time_position: f64,
}

impl CommentDraft {
    /// Draft at `time_position`, deriving the normalized position from the
    /// track duration. Unknown (zero) durations map to position 0.
    pub fn at_time(
        track_id: TrackId,
        author: User,
        text: impl Into<String>,
        emotion: Emotion,
        time_position: f64,
        track_duration: f64,
    ) -> Self {
        let position = if track_duration > 0.0 {
            (time_position / track_duration * MAX_NORMALIZED_POSITION)
                .clamp(0.0, MAX_NORMALIZED_POSITION)
        } else {
            0.0
        };
        Self {
            track_id,
            author,
            text: text.into(),
            emotion,
            position,
            time_position,
        }
    }
}

/// Predicate over comments. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentFilter {
    pub track: Option<TrackId>,
    pub span: Option<TimeSpan>,
    pub emotion: Option<Emotion>,
    pub conflicts_only: bool,
}

impl CommentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_track(mut self, track: TrackId) -> Self {
        self.track = Some(track);
        self
    }

    pub fn within(mut self, span: TimeSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    pub fn conflicts_only(mut self) -> Self {
        self.conflicts_only = true;
        self
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        self.track.map_or(true, |t| comment.track_id == t)
            && self.span.map_or(true, |s| s.contains(comment.time_position))
            && self.emotion.map_or(true, |e| comment.emotion == e)
            && (!self.conflicts_only || comment.is_open_conflict())
    }
}

/// Comments falling into one fixed-width time window.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentBucket {
    pub span: TimeSpan,
    pub comment_ids: Vec<CommentId>,
}

/// The flat comment list of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentBoard {
    comments: Vec<Comment>,
    #[serde(default = "default_max_length")]
    max_length: usize,
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

impl Default for CommentBoard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl CommentBoard {
    pub fn new(max_length: usize) -> Self {
        Self {
            comments: Vec::new(),
            max_length,
        }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter()
    }

    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: CommentId) -> Result<&mut Comment> {
        self.comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| HarmonicError::not_found(EntityKind::Comment, id))
    }

    /// Validate and append a comment. The owning project checks the track.
    pub(crate) fn add(&mut self, draft: CommentDraft) -> Result<CommentId> {
        let text = self.validate_text(&draft.text)?;
        if !(0.0..=MAX_NORMALIZED_POSITION).contains(&draft.position) {
            return Err(HarmonicError::Validation(format!(
                "comment position must be 0-100, got {}",
                draft.position
            )));
        }
        if !(draft.time_position.is_finite() && draft.time_position >= 0.0) {
            return Err(HarmonicError::Validation(format!(
                "comment time must be a non-negative number of seconds, got {}",
                draft.time_position
            )));
        }

        let comment = Comment {
            id: CommentId::new(),
            track_id: draft.track_id,
            position: draft.position,
            time_position: draft.time_position,
            author: draft.author,
            text,
            emotion: draft.emotion,
            created_at: now(),
            conflict: ConflictState::None,
            likes: 0,
            replies: Vec::new(),
        };
        let id = comment.id;
        debug!(comment = %id, emotion = %comment.emotion, "Comment added");
        self.comments.push(comment);
        Ok(id)
    }

    fn validate_text(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HarmonicError::Validation("comment text is required".into()));
        }
        if text.chars().count() > self.max_length {
            return Err(HarmonicError::Validation(format!(
                "comment exceeds {} characters",
                self.max_length
            )));
        }
        Ok(text.to_string())
    }

    /// All comments matching `filter`, in insertion order.
    pub fn filter<'a>(&'a self, filter: &'a CommentFilter) -> impl Iterator<Item = &'a Comment> {
        self.comments.iter().filter(move |c| filter.matches(c))
    }

    /// Comments sorted by timeline position.
    pub fn in_time_order(&self) -> Vec<&Comment> {
        let mut sorted: Vec<&Comment> = self.comments.iter().collect();
        sorted.sort_by(|a, b| a.time_position.total_cmp(&b.time_position));
        sorted
    }

    /// Group comments into non-empty `[k*w, (k+1)*w)` buckets, earliest first.
    pub fn buckets(&self, bucket_seconds: f64) -> Result<Vec<CommentBucket>> {
        if !(bucket_seconds.is_finite() && bucket_seconds > 0.0) {
            return Err(HarmonicError::Validation(format!(
                "bucket width must be positive, got {}",
                bucket_seconds
            )));
        }
        let mut grouped: BTreeMap<u64, Vec<CommentId>> = BTreeMap::new();
        for comment in &self.comments {
            let index = (comment.time_position / bucket_seconds).floor() as u64;
            grouped.entry(index).or_default().push(comment.id);
        }
        Ok(grouped
            .into_iter()
            .map(|(index, comment_ids)| CommentBucket {
                span: TimeSpan::from_start(index as f64 * bucket_seconds, bucket_seconds),
                comment_ids,
            })
            .collect())
    }

    /// Increment the like counter, returning the new count.
    pub fn like(&mut self, id: CommentId) -> Result<u32> {
        let comment = self.get_mut(id)?;
        comment.likes = comment.likes.saturating_add(1);
        Ok(comment.likes)
    }

    /// Add a reply, returning the new reply count.
    pub fn reply(&mut self, id: CommentId, author: User, text: &str) -> Result<usize> {
        let text = self.validate_text(text)?;
        let comment = self.get_mut(id)?;
        comment.replies.push(Reply {
            author,
            text,
            created_at: now(),
        });
        Ok(comment.replies.len())
    }

    /// Mark a comment as conflicting.
    pub fn flag_conflict(&mut self, id: CommentId, reason: impl Into<String>) -> Result<()> {
        let comment = self.get_mut(id)?;
        comment.conflict = ConflictState::Flagged {
            reason: reason.into(),
        };
        Ok(())
    }

    /// Resolve a flagged comment. Only owners may moderate.
    pub fn resolve_conflict(
        &mut self,
        id: CommentId,
        resolution: impl Into<String>,
        moderator: &Collaborator,
    ) -> Result<()> {
        if !moderator.role.can_moderate() {
            return Err(HarmonicError::Validation(format!(
                "{} ({}) may not resolve conflicts",
                moderator.user.name, moderator.role
            )));
        }
        let comment = self.get_mut(id)?;
        if !comment.is_open_conflict() {
            return Err(HarmonicError::Validation(format!(
                "comment {} has no open conflict",
                id
            )));
        }
        comment.conflict = ConflictState::Resolved {
            resolution: resolution.into(),
            resolved_by: moderator.id(),
        };
        Ok(())
    }

    /// Comments with an unresolved conflict.
    pub fn open_conflicts(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| c.is_open_conflict())
    }

    /// Number of comments per emotion.
    pub fn emotion_summary(&self) -> BTreeMap<Emotion, usize> {
        let mut summary = BTreeMap::new();
        for comment in &self.comments {
            *summary.entry(comment.emotion).or_insert(0) += 1;
        }
        summary
    }
}
