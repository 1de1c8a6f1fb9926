//! Comment markers overlaid on the waveform.

use harmonic_core::{CommentId, Emotion, TrackId};
use harmonic_project::Comment;

use crate::zoom::TimelineView;

/// A comment's position on the rendered timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentMarker {
    pub comment_id: CommentId,
    pub time_position: f64,
    pub x: f32,
    pub emotion: Emotion,
    /// Hex color from the emotion palette.
    pub color: &'static str,
    /// Open conflict; drawn with a warning badge.
    pub conflict: bool,
}

/// Result of clicking a marker: the playhead moves to `seek_to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerClick {
    pub comment_id: CommentId,
    pub seek_to: f64,
    pub open_editor: bool,
}

/// Markers for the comments on `track`, ordered by time.
pub fn layout_markers<'a>(
    comments: impl IntoIterator<Item = &'a Comment>,
    track: TrackId,
    view: &TimelineView,
) -> Vec<CommentMarker> {
    let mut markers: Vec<CommentMarker> = comments
        .into_iter()
        .filter(|c| c.track_id == track)
        .map(|c| CommentMarker {
            comment_id: c.id,
            time_position: c.time_position,
            x: view.x_for_time(c.time_position),
            emotion: c.emotion,
            color: c.emotion.palette().color,
            conflict: c.is_open_conflict(),
        })
        .collect();
    markers.sort_by(|a, b| a.time_position.total_cmp(&b.time_position));
    markers
}

/// Closest marker within `radius` pixels of `x`.
pub fn marker_at(markers: &[CommentMarker], x: f32, radius: f32) -> Option<&CommentMarker> {
    markers
        .iter()
        .map(|m| (m, (m.x - x).abs()))
        .filter(|(_, dist)| *dist <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(m, _)| m)
}
