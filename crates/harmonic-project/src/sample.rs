//! Built-in sample catalog used by demos and the CLI when no file is given.

use harmonic_core::{Collaborator, Emotion, ProjectId, Result, Role, User};

use crate::comment::CommentDraft;
use crate::store::{ProjectStore, UploadOutcome, UploadRequest, UploadTarget};
use crate::template::ProjectTemplate;

/// The people appearing in the sample catalog.
pub struct SampleCast {
    pub alex: User,
    pub jordan: User,
    pub sam: User,
}

impl SampleCast {
    pub fn new() -> Self {
        Self {
            alex: User::new("Alex Rivera", "AR").with_mood(Emotion::Inspired),
            jordan: User::new("Jordan Lee", "JL").with_mood(Emotion::Calm),
            sam: User::new("Sam Taylor", "ST").with_mood(Emotion::Excited),
        }
    }
}

impl Default for SampleCast {
    fn default() -> Self {
        Self::new()
    }
}

fn upload(
    store: &mut ProjectStore,
    project: ProjectId,
    target: UploadTarget,
    url: &str,
    author: &User,
    changes: &[&str],
) -> Result<UploadOutcome> {
    store.upload_track_version(
        project,
        UploadRequest {
            target,
            audio_url: url.to_string(),
            author_id: author.id,
            changes: changes.iter().map(|c| c.to_string()).collect(),
        },
    )
}

/// Build the sample catalog: two projects with versions, a checkpoint and
/// a handful of comments, one of them an open conflict.
pub fn sample_catalog() -> Result<ProjectStore> {
    let cast = SampleCast::new();
    let mut store = ProjectStore::new();

    // ── Midnight Echoes: band demo ──────────────────────────────
    let echoes = store.create_from_template(
        "Midnight Echoes",
        "Late-night indie demo with layered vocals",
        ProjectTemplate::Band,
        cast.alex.clone(),
    )?;
    store.add_collaborator(echoes, Collaborator::new(cast.jordan.clone(), Role::Editor))?;
    store.add_collaborator(echoes, Collaborator::new(cast.sam.clone(), Role::Viewer))?;

    let track_ids: Vec<_> = store.get(echoes)?.tracks.iter().map(|t| t.id).collect();
    let durations = [212.0, 212.0, 210.5, 211.0];
    for (track_id, (name, duration)) in track_ids
        .iter()
        .zip(["vocals", "guitar", "bass", "drums"].iter().zip(durations))
    {
        upload(
            &mut store,
            echoes,
            UploadTarget::Existing(*track_id),
            &format!("/audio/midnight-echoes/{}-v1.mp3", name),
            &cast.alex,
            &["first take"],
        )?;
        store.set_track_duration(echoes, *track_id, duration)?;
    }
    upload(
        &mut store,
        echoes,
        UploadTarget::Existing(track_ids[0]),
        "/audio/midnight-echoes/vocals-v2.mp3",
        &cast.jordan,
        &["added harmonies", "fixed pitch in bridge"],
    )?;
    store.create_checkpoint(
        echoes,
        "Rough mix",
        cast.alex.id,
        None,
        Some("All tracks tracked once, harmonies in".into()),
    )?;

    let vocals = track_ids[0];
    let hook = store.add_comment(
        echoes,
        CommentDraft::at_time(
            vocals,
            cast.jordan.clone(),
            "The chorus hook really lands here",
            Emotion::Happy,
            45.0,
            212.0,
        ),
    )?;
    let bridge = store.add_comment(
        echoes,
        CommentDraft::at_time(
            vocals,
            cast.sam.clone(),
            "Bridge feels rushed compared to the demo",
            Emotion::Frustrated,
            132.5,
            212.0,
        ),
    )?;
    store.add_comment(
        echoes,
        CommentDraft::at_time(
            vocals,
            cast.alex.clone(),
            "Outro could breathe a little longer",
            Emotion::Nostalgic,
            198.0,
            212.0,
        ),
    )?;
    let board = store.get_mut(echoes)?.comments_mut();
    board.like(hook)?;
    board.flag_conflict(bridge, "Tempo of the bridge disputed")?;
    board.reply(bridge, cast.alex.clone(), "Let's try it at 92 bpm")?;

    // ── Neon Skyline: electronic sketch ─────────────────────────
    let skyline = store.create_from_template(
        "Neon Skyline",
        "Synthwave sketch",
        ProjectTemplate::Electronic,
        cast.jordan.clone(),
    )?;
    store.add_collaborator(skyline, Collaborator::new(cast.alex.clone(), Role::Editor))?;
    let lead = store
        .get(skyline)?
        .tracks
        .iter()
        .find(|t| t.name == "Synth Lead")
        .map(|t| t.id);
    if let Some(lead) = lead {
        upload(
            &mut store,
            skyline,
            UploadTarget::Existing(lead),
            "/audio/neon-skyline/lead-v1.wav",
            &cast.jordan,
            &["arpeggio sketch"],
        )?;
        store.set_track_duration(skyline, lead, 96.0)?;
    }
    upload(
        &mut store,
        skyline,
        UploadTarget::NewTrack {
            name: "Vocal Chops".into(),
        },
        "/audio/neon-skyline/chops-v1.wav",
        &cast.alex,
        &["sliced from Alex's hum"],
    )?;

    Ok(store)
}
