//! Integration tests for track versions and checkpoints through the store.

use harmonic_core::{
    CheckpointId, Collaborator, ProjectId, Role, TrackId, User, UserId, VersionId,
};
use harmonic_project::{
    get_track_version, ProjectStore, UploadOutcome, UploadRequest, UploadTarget,
};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────

fn upload(
    store: &mut ProjectStore,
    project: ProjectId,
    target: UploadTarget,
    url: &str,
    author: UserId,
) -> UploadOutcome {
    store
        .upload_track_version(
            project,
            UploadRequest {
                target,
                audio_url: url.to_string(),
                author_id: author,
                changes: vec![format!("uploaded {}", url)],
            },
        )
        .unwrap()
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn checkpoint_restores_earlier_version() {
    let owner = User::new("Alex", "AR");
    let mut store = ProjectStore::new();
    let project = store.create_project("Demo", "", owner.clone()).unwrap();

    let first = upload(
        &mut store,
        project,
        UploadTarget::NewTrack {
            name: "Vocals".into(),
        },
        "/vocals-v1.mp3",
        owner.id,
    );
    let track = first.track_id;
    let v2 = upload(
        &mut store,
        project,
        UploadTarget::Existing(track),
        "/vocals-v2.mp3",
        owner.id,
    );
    assert_eq!(v2.version_label, "v2");

    let checkpoint = store
        .create_checkpoint(project, "A", owner.id, None, None)
        .unwrap();
    {
        let p = store.get(project).unwrap();
        let cp = p.checkpoint(checkpoint).unwrap();
        assert_eq!(cp.label, "v1.0");
        assert_eq!(cp.track_versions.get(&track), Some(&v2.version_id));
    }

    let v3 = upload(
        &mut store,
        project,
        UploadTarget::Existing(track),
        "/vocals-v3.mp3",
        owner.id,
    );
    assert_eq!(
        store.get(project).unwrap().track(track).unwrap().current_version_id(),
        Some(v3.version_id)
    );

    store.apply_checkpoint(project, checkpoint).unwrap();

    let p = store.get(project).unwrap();
    assert_eq!(p.track(track).unwrap().current_version_id(), Some(v2.version_id));
    assert_eq!(p.current_checkpoint_id(), Some(checkpoint));
    assert_eq!(p.track(track).unwrap().version_count(), 3);
}

#[test]
fn unknown_checkpoint_changes_nothing() {
    let owner = User::new("Alex", "AR");
    let mut store = ProjectStore::new();
    let project = store.create_project("Demo", "", owner.clone()).unwrap();
    upload(
        &mut store,
        project,
        UploadTarget::NewTrack {
            name: "Bass".into(),
        },
        "/bass-v1.mp3",
        owner.id,
    );
    let before = store.snapshot(project).unwrap();

    let err = store
        .apply_checkpoint(project, CheckpointId::new())
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.reason_code(), "checkpoint_not_found");
    assert_eq!(store.snapshot(project).unwrap(), before);
}

#[test]
fn upload_to_missing_track_leaves_project_untouched() {
    let owner = User::new("Alex", "AR");
    let mut store = ProjectStore::new();
    let project = store.create_project("Demo", "", owner.clone()).unwrap();
    let before = store.snapshot(project).unwrap();

    let err = store
        .upload_track_version(
            project,
            UploadRequest {
                target: UploadTarget::Existing(TrackId::new()),
                audio_url: "/ghost.mp3".into(),
                author_id: owner.id,
                changes: Vec::new(),
            },
        )
        .unwrap_err();

    assert_eq!(err.reason_code(), "track_not_found");
    assert_eq!(store.snapshot(project).unwrap(), before);
}

#[test]
fn version_lookup_is_tolerant() {
    let owner = User::new("Alex", "AR");
    let mut store = ProjectStore::new();
    let project = store.create_project("Demo", "", owner.clone()).unwrap();
    let outcome = upload(
        &mut store,
        project,
        UploadTarget::NewTrack {
            name: "Keys".into(),
        },
        "/keys-v1.mp3",
        owner.id,
    );

    let p = store.get(project).unwrap();
    let track = p.track(outcome.track_id);
    assert!(get_track_version(track, Some(outcome.version_id)).is_some());
    assert!(get_track_version(track, Some(VersionId::new())).is_none());
    assert!(get_track_version(track, None).is_none());
    assert!(get_track_version(None, Some(outcome.version_id)).is_none());
}

#[test]
fn shared_store_sees_writes() {
    let owner = User::new("Alex", "AR");
    let shared = ProjectStore::new().into_shared();
    let project = shared
        .write()
        .create_project("Shared", "", owner.clone())
        .unwrap();

    let editor = User::new("Jordan", "JL");
    shared
        .write()
        .add_collaborator(project, Collaborator::new(editor.clone(), Role::Editor))
        .unwrap();

    let reader = std::sync::Arc::clone(&shared);
    let guard = reader.read();
    let p = guard.get(project).unwrap();
    assert_eq!(p.collaborators.len(), 2);
    assert_eq!(p.collaborator(editor.id).unwrap().role, Role::Editor);
}

// ── Properties ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Upload(usize),
    NewTrack,
    Checkpoint,
    Apply(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..4).prop_map(Op::Upload),
        1 => Just(Op::NewTrack),
        2 => Just(Op::Checkpoint),
        2 => (0usize..4).prop_map(Op::Apply),
    ]
}

proptest! {
    #[test]
    fn current_pointer_always_names_an_own_version(ops in prop::collection::vec(op(), 1..40)) {
        let owner = User::new("Alex", "AR");
        let mut store = ProjectStore::new();
        let project = store.create_project("Fuzz", "", owner.clone()).unwrap();
        let mut checkpoints = Vec::new();

        for (i, op) in ops.into_iter().enumerate() {
            let tracks: Vec<_> = store.get(project).unwrap().tracks.iter().map(|t| t.id).collect();
            match op {
                Op::Upload(n) if !tracks.is_empty() => {
                    let track = tracks[n % tracks.len()];
                    let before = store.get(project).unwrap().track(track).unwrap().version_count();
                    let outcome = upload(
                        &mut store,
                        project,
                        UploadTarget::Existing(track),
                        &format!("/take-{}.mp3", i),
                        owner.id,
                    );
                    prop_assert_eq!(outcome.version_label, format!("v{}", before + 1));
                }
                Op::Upload(_) | Op::NewTrack => {
                    upload(
                        &mut store,
                        project,
                        UploadTarget::NewTrack { name: format!("Track {}", i) },
                        &format!("/new-{}.mp3", i),
                        owner.id,
                    );
                }
                Op::Checkpoint => {
                    checkpoints.push(
                        store.create_checkpoint(project, "cp", owner.id, None, None).unwrap(),
                    );
                }
                Op::Apply(n) if !checkpoints.is_empty() => {
                    let id = checkpoints[n % checkpoints.len()];
                    store.apply_checkpoint(project, id).unwrap();
                    let once = store.snapshot(project).unwrap();
                    store.apply_checkpoint(project, id).unwrap();
                    let twice = store.snapshot(project).unwrap();
                    for (a, b) in once.tracks.iter().zip(&twice.tracks) {
                        prop_assert_eq!(a.current_version_id(), b.current_version_id());
                    }
                }
                Op::Apply(_) => {}
            }

            let p = store.get(project).unwrap();
            prop_assert!(p.validate().is_ok());
            for track in &p.tracks {
                match track.current_version_id() {
                    Some(id) => prop_assert!(track.has_version(id)),
                    None => prop_assert!(!track.has_versions()),
                }
            }
        }
    }
}
