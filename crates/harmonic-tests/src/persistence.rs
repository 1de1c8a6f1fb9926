//! Integration tests for project files and configuration on disk.

use harmonic_core::{Emotion, HarmonicConfig, TrackId, User};
use harmonic_project::{
    sample_catalog, CommentDraft, Project, ProjectFile, ProjectStore, ProjectTrack, UploadRequest,
    UploadTarget,
};

// ── Helpers ────────────────────────────────────────────────────

/// Compare the parts of two projects that versioning depends on.
fn assert_same_versions(a: &Project, b: &Project) {
    assert_eq!(a.id, b.id);
    assert_eq!(a.title, b.title);
    assert_eq!(a.collaborators.len(), b.collaborators.len());
    assert_eq!(a.current_checkpoint_id(), b.current_checkpoint_id());
    assert_eq!(a.checkpoints, b.checkpoints);
    assert_eq!(a.tracks.len(), b.tracks.len());
    for (x, y) in a.tracks.iter().zip(&b.tracks) {
        assert_eq!(x.id, y.id);
        assert_eq!(x.current_version_id(), y.current_version_id());
        let urls = |t: &ProjectTrack| {
            t.versions()
                .iter()
                .map(|v| v.audio_url().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(urls(x), urls(y));
    }
    assert_eq!(a.comments().len(), b.comments().len());
    assert_eq!(
        a.comments().open_conflicts().count(),
        b.comments().open_conflicts().count()
    );
}

// ── Project files ──────────────────────────────────────────────

#[test]
fn sample_catalog_survives_a_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let store = sample_catalog().unwrap();

    ProjectFile::from_store(&store).save_to_file(&path).unwrap();
    let loaded = ProjectFile::load_from_file(&path)
        .unwrap()
        .into_store()
        .unwrap();

    assert_eq!(loaded.len(), store.len());
    for (a, b) in store.list().iter().zip(loaded.list()) {
        assert_same_versions(a, b);
    }
}

#[test]
fn restored_checkpoint_pointer_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("restored.json");
    let mut store = sample_catalog().unwrap();
    let project = store.list()[0].id;
    let vocals = store.get(project).unwrap().tracks[0].id;
    let checkpoint = store.get(project).unwrap().checkpoints[0].id;

    store
        .upload_track_version(
            project,
            UploadRequest {
                target: UploadTarget::Existing(vocals),
                audio_url: "/audio/midnight-echoes/vocals-v3.mp3".into(),
                author_id: User::new("Alex", "AR").id,
                changes: Vec::new(),
            },
        )
        .unwrap();
    store.apply_checkpoint(project, checkpoint).unwrap();
    ProjectFile::from_store(&store).save_to_file(&path).unwrap();

    let loaded = ProjectFile::load_from_file(&path)
        .and_then(ProjectFile::into_store)
        .unwrap();
    let p = loaded.get(project).unwrap();
    let track = p.track(vocals).unwrap();
    assert_eq!(track.version_count(), 3);
    assert_eq!(track.current_version().unwrap().label(), "v2");
    assert_eq!(p.current_checkpoint_id(), Some(checkpoint));
}

#[test]
fn commented_project_reloads_after_rejected_orphan() {
    let mut store = sample_catalog().unwrap();
    let project = store.list()[0].id;
    let drums = store.get(project).unwrap().tracks[3].id;
    let owner = store.get(project).unwrap().owner().unwrap().clone();
    let draft = |track| {
        CommentDraft::at_time(
            track,
            owner.user.clone(),
            "Fill before the last chorus",
            Emotion::Excited,
            180.0,
            211.0,
        )
    };

    let err = store.add_comment(project, draft(TrackId::new())).unwrap_err();
    assert_eq!(err.reason_code(), "track_not_found");

    let fill = store.add_comment(project, draft(drums)).unwrap();
    let board = store.get_mut(project).unwrap().comments_mut();
    board.like(fill).unwrap();
    board.reply(fill, owner.user.clone(), "Agreed").unwrap();
    board.flag_conflict(fill, "Too busy").unwrap();
    board.resolve_conflict(fill, "Kept, but sparser", &owner).unwrap();

    let data = ProjectFile::from_store(&store).to_json().unwrap();
    let loaded = ProjectFile::from_json(&data)
        .and_then(ProjectFile::into_store)
        .unwrap();

    let p = loaded.get(project).unwrap();
    assert_eq!(p.comments().len(), 4);
    let comment = p.comments().get(fill).unwrap();
    assert_eq!(comment.track_id, drums);
    assert_eq!(comment.likes, 1);
    assert_eq!(comment.reply_count(), 1);
    assert!(comment.has_conflict() && !comment.is_open_conflict());
}

#[test]
fn bare_project_array_is_migrated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    let store = sample_catalog().unwrap();
    let legacy = serde_json::to_vec(store.list()).unwrap();
    std::fs::write(&path, legacy).unwrap();

    let file = ProjectFile::load_from_file(&path).unwrap();
    assert_eq!(file.version, 1);
    assert_eq!(file.app_version, "0.0.0");

    let loaded = file.into_store().unwrap();
    assert_same_versions(&store.list()[0], &loaded.list()[0]);
}

#[test]
fn corrupt_file_is_a_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let err = ProjectFile::load_from_file(&path).unwrap_err();
    assert_eq!(err.reason_code(), "serialization_failure");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProjectFile::load_from_file(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.reason_code(), "io");
}

#[test]
fn duplicate_projects_are_rejected_on_import() {
    let store = sample_catalog().unwrap();
    let first = store.list()[0].clone();
    let file = ProjectFile::new(vec![first.clone(), first]);

    assert!(file.into_store().is_err());
    assert!(ProjectFile::new(Vec::new()).into_store().unwrap().is_empty());
    assert!(ProjectStore::new().is_empty());
}

// ── Configuration ──────────────────────────────────────────────

#[test]
fn missing_config_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = HarmonicConfig::load(&dir.path().join("config.json")).unwrap();
    assert_eq!(config, HarmonicConfig::default());
}

#[test]
fn partial_config_file_overrides_named_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "transport": { "skip_seconds": 15.0 }, "waveform": { "bar_width_px": 3.0 } }"#,
    )
    .unwrap();

    let config = HarmonicConfig::load(&path).unwrap();
    assert_eq!(config.transport.skip_seconds, 15.0);
    assert_eq!(config.waveform.bar_width_px, 3.0);
    assert_eq!(config.comments, HarmonicConfig::default().comments);
}

#[test]
fn malformed_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    std::fs::write(&path, "transport = 5").unwrap();
    let err = HarmonicConfig::load(&path).unwrap_err();
    assert_eq!(err.reason_code(), "invalid_config");

    std::fs::write(&path, r#"{ "transport": { "default_volume": 140 } }"#).unwrap();
    let err = HarmonicConfig::load(&path).unwrap_err();
    assert_eq!(err.reason_code(), "invalid_config");
}

#[test]
fn config_roundtrips_through_its_own_output() {
    let mut config = HarmonicConfig::default();
    config.transport.skip_seconds = 2.5;
    config.comments.bucket_seconds = 30.0;

    let text = config.to_json().unwrap();
    assert_eq!(HarmonicConfig::from_json(&text).unwrap(), config);
}
