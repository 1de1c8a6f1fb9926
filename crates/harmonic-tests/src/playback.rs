//! Integration tests for the playback controller driven by store state.

use harmonic_core::{HarmonicConfig, Result, User};
use harmonic_playback::{
    BackendCall, DecodedAudio, HeadlessBackend, Key, Mixer, PlaybackController, PlaybackEvent,
    SampleSource, Shortcut,
};
use harmonic_project::{sample_catalog, ProjectStore, UploadRequest, UploadTarget};
use std::sync::Arc;

// ── Helpers ────────────────────────────────────────────────────

/// Backend that knows every current-version URL in the store.
fn backend_for(store: &ProjectStore) -> HeadlessBackend {
    let mut backend = HeadlessBackend::new();
    for project in store.list() {
        for track in &project.tracks {
            for version in track.versions() {
                backend.add_media(version.audio_url(), track.duration.max(1.0));
            }
        }
    }
    backend
}

struct Flat;

impl SampleSource for Flat {
    fn fetch(&self, _url: &str) -> Result<DecodedAudio> {
        Ok(DecodedAudio {
            samples: vec![0.25; 8_000],
            sample_rate: 8_000,
        })
    }
}

// ── Selection & checkpoints ────────────────────────────────────

#[test]
fn selecting_after_checkpoint_loads_restored_version() {
    let mut store = sample_catalog().unwrap();
    let project_id = store.list()[0].id;
    let owner = User::new("Alex", "AR");
    let vocals = store.get(project_id).unwrap().tracks[0].id;
    let checkpoint = store.get(project_id).unwrap().checkpoints[0].id;

    store
        .upload_track_version(
            project_id,
            UploadRequest {
                target: UploadTarget::Existing(vocals),
                audio_url: "/audio/midnight-echoes/vocals-v3.mp3".into(),
                author_id: owner.id,
                changes: vec!["new ad-libs".into()],
            },
        )
        .unwrap();

    let mut ctl = PlaybackController::with_defaults(backend_for(&store));
    ctl.select_track(store.get(project_id).unwrap().track(vocals).unwrap())
        .unwrap();
    assert_eq!(ctl.selected().unwrap().version_label, "v3");
    ctl.seek(40.0).unwrap();

    store.apply_checkpoint(project_id, checkpoint).unwrap();
    ctl.select_track(store.get(project_id).unwrap().track(vocals).unwrap())
        .unwrap();

    assert_eq!(ctl.selected().unwrap().version_label, "v2");
    assert_eq!(
        ctl.backend().loaded(),
        Some("/audio/midnight-echoes/vocals-v2.mp3")
    );
    // Same track, so the remembered position carries over.
    assert_eq!(ctl.position(), 40.0);
}

#[test]
fn every_track_switch_releases_previous_source() {
    let store = sample_catalog().unwrap();
    let backend = backend_for(&store);
    let calls = backend.calls();
    let mut ctl = PlaybackController::with_defaults(backend);

    let project = &store.list()[0];
    for track in &project.tracks {
        ctl.select_track(track).unwrap();
        ctl.play().unwrap();
    }

    let log = calls.lock();
    let loads = log.iter().filter(|c| matches!(c, BackendCall::Load(_))).count();
    let releases = log.iter().filter(|c| **c == BackendCall::Release).count();
    assert_eq!(loads, project.tracks.len());
    assert_eq!(releases, project.tracks.len() - 1);
}

#[test]
fn events_describe_a_session() {
    let store = sample_catalog().unwrap();
    let mut ctl = PlaybackController::new(backend_for(&store), &HarmonicConfig::default());
    let events = ctl.subscribe();
    let track = &store.list()[0].tracks[1];

    ctl.select_track(track).unwrap();
    ctl.handle_shortcut(&Shortcut::plain(Key::Space));
    ctl.backend_mut().advance(3.0);
    ctl.sync();
    ctl.handle_shortcut(&Shortcut::plain(Key::char('m')));
    ctl.handle_shortcut(&Shortcut::plain(Key::Space));

    let received: Vec<_> = events.try_iter().collect();
    assert!(received
        .iter()
        .any(|e| matches!(e, PlaybackEvent::TrackSelected { previous_track_id: None, .. })));
    assert!(received.contains(&PlaybackEvent::StateChanged { playing: true }));
    assert!(received.contains(&PlaybackEvent::StateChanged { playing: false }));
    assert!(received.iter().any(|e| matches!(
        e,
        PlaybackEvent::RoutingChanged {
            muted: true,
            audible: false,
            ..
        }
    )));
    assert!(received.iter().any(|e| matches!(
        e,
        PlaybackEvent::PositionChanged { position, .. } if (*position - 3.0).abs() < 1e-9
    )));
}

// ── Routing & mixing ───────────────────────────────────────────

#[test]
fn muted_track_in_solo_set_stays_silent() {
    let store = sample_catalog().unwrap();
    let project = &store.list()[0];
    let (vocals, guitar) = (project.tracks[0].id, project.tracks[1].id);

    let mut ctl = PlaybackController::with_defaults(backend_for(&store));
    ctl.toggle_solo(vocals);
    ctl.toggle_solo(guitar);
    ctl.toggle_mute(vocals);

    assert!(!ctl.is_audible(vocals));
    assert!(ctl.is_audible(guitar));
    assert!(!ctl.is_audible(project.tracks[2].id));

    let mut mixer = Mixer::new();
    mixer.apply_routing(ctl.routing());
    let loud = vec![1.0f32; 16];
    let quiet = vec![0.25f32; 16];
    let mut out = vec![0.0f32; 16];
    mixer.mix(&[(vocals, &loud[..]), (guitar, &quiet[..])], &mut out);
    assert!(out.iter().all(|s| (s - 0.25).abs() < 1e-6));
}

// ── Comments on the timeline ───────────────────────────────────

#[test]
fn comment_markers_seek_the_selected_track() {
    let store = sample_catalog().unwrap();
    let project = &store.list()[0];
    let vocals = &project.tracks[0];

    let mut ctl = PlaybackController::with_defaults(backend_for(&store));
    assert!(ctl.markers(project.comments().iter()).is_empty());

    ctl.select_track(vocals).unwrap();
    let markers = ctl.markers(project.comments().iter());
    assert_eq!(markers.len(), 3);
    assert!(markers.windows(2).all(|w| w[0].x <= w[1].x));
    assert_eq!(markers.iter().filter(|m| m.conflict).count(), 1);

    let click = ctl.click_marker(&markers[1]).unwrap();
    assert_eq!(click.seek_to, 132.5);
    assert_eq!(ctl.position(), 132.5);
    assert_eq!(ctl.clock_text(), "2:12 / 3:32");
}

// ── Waveform ───────────────────────────────────────────────────

#[tokio::test]
async fn waveform_gates_transport_per_track() {
    let store = sample_catalog().unwrap();
    let project = &store.list()[0];
    let mut ctl = PlaybackController::with_defaults(backend_for(&store));
    let source = Arc::new(Flat);

    ctl.select_track(&project.tracks[0]).unwrap();
    ctl.load_waveform(Arc::clone(&source)).await;
    assert!(ctl.transport_enabled());

    ctl.select_track(&project.tracks[1]).unwrap();
    assert!(!ctl.transport_enabled());
    ctl.load_waveform(source).await;
    assert!(ctl.transport_enabled());
}
