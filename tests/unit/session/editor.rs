use std::cell::RefCell;

use super::*;
use crate::{
    foundation::settings::NarrationSettings,
    narration::{
        output::HeadlessOutput,
        provider::{SynthesisRequest, Voice},
    },
    playback::{cursor::PlaybackState, scheduler::ManualScheduler},
    timeline::catalog::Image,
};

type Session = EditorSession<ManualScheduler, HeadlessOutput>;

#[derive(Default)]
struct FakeProvider {
    fail_on: Vec<&'static str>,
    requests: RefCell<Vec<SynthesisRequest>>,
}

impl NarrationProvider for FakeProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> StoryboardResult<Vec<u8>> {
        self.requests.borrow_mut().push(request.clone());
        if self.fail_on.iter().any(|f| *f == request.text) {
            return Err(StoryboardError::narration("rate limited"));
        }
        Ok(b"ID3".to_vec())
    }

    async fn voices(&self) -> StoryboardResult<Vec<Voice>> {
        Err(StoryboardError::narration("unauthorized"))
    }
}

fn catalog() -> ImageCatalog {
    ImageCatalog::new(vec![
        Image {
            id: ImageId::new("1"),
            url: "https://example.test/1.jpg".into(),
            alt: "Mountain landscape".into(),
            duration: 5.0,
        },
        Image {
            id: ImageId::new("2"),
            url: "https://example.test/2.jpg".into(),
            alt: "Forest landscape".into(),
            duration: 3.0,
        },
    ])
}

fn settings() -> EditorSettings {
    EditorSettings {
        narration: NarrationSettings {
            inter_request_delay_ms: 0,
            ..NarrationSettings::default()
        },
        ..EditorSettings::default()
    }
}

fn session() -> Session {
    EditorSession::new(
        settings(),
        catalog(),
        ManualScheduler::new(),
        HeadlessOutput::new(),
    )
}

fn session_with(images: &[&str]) -> (Session, Vec<SceneId>) {
    let mut s = session();
    let ids = images
        .iter()
        .map(|i| s.add_image(&ImageId::new(*i)).unwrap())
        .collect();
    (s, ids)
}

#[test]
fn add_image_appends_with_default_duration() {
    let (s, ids) = session_with(&["1", "2", "1"]);
    assert_eq!(ids[0], SceneId::new("scene-1"));
    assert_eq!(ids[2], SceneId::new("scene-3"));
    let scenes = s.timeline().scenes();
    assert_eq!(scenes[1].duration, 3.0);
    assert_eq!(scenes[2].start_time(), 8.0);
    assert_eq!(scenes[0].caption.as_deref(), Some(""));
}

#[test]
fn unknown_image_is_rejected() {
    let mut s = session();
    let err = s.add_image(&ImageId::new("nope")).unwrap_err();
    assert!(err.to_string().contains("unknown image"));
    assert!(s.timeline().is_empty());
}

#[test]
fn duration_edits_are_clamped() {
    let (mut s, ids) = session_with(&["1"]);
    assert_eq!(s.set_duration(&ids[0], 120.0), Some(30.0));
    assert_eq!(s.set_duration(&ids[0], 0.2), Some(1.0));
    assert_eq!(s.set_duration(&SceneId::new("ghost"), 4.0), None);
    assert_eq!(s.timeline().total_duration(), 1.0);
}

#[test]
fn edit_during_playback_stops_and_rewinds() {
    let (mut s, ids) = session_with(&["1", "2"]);
    s.play(Instant::now());
    s.tick(2.0);
    assert!(s.engine().is_playing());

    assert!(s.set_caption(&ids[1], "Tall trees"));
    let snap = s.snapshot();
    assert_eq!(snap.state, PlaybackState::Stopped);
    assert_eq!(snap.global_time, 0.0);
    assert_eq!(s.engine().scheduler().pending_len(), 0);
}

#[test]
fn reorder_requires_a_permutation() {
    let (mut s, ids) = session_with(&["1", "2"]);
    assert!(s.reorder(&[ids[0].clone()]).is_err());
    assert!(s.reorder(&[ids[0].clone(), ids[0].clone()]).is_err());
    s.reorder(&[ids[1].clone(), ids[0].clone()]).unwrap();
    assert_eq!(s.timeline().scenes()[0].id, ids[1]);
    assert_eq!(s.timeline().scenes()[1].start_time(), 3.0);
}

#[test]
fn waveform_click_seeks_only_when_halted() {
    let (mut s, _) = session_with(&["1", "2"]);
    let width = f64::from(s.settings().waveform.width);

    let snap = s.seek_at_x(width / 2.0).unwrap();
    assert_eq!(snap.global_time, 4.0);
    assert_eq!(snap.cursor.scene_index, 0);

    s.play(Instant::now());
    assert!(s.seek_at_x(0.0).is_none());
    assert_eq!(s.snapshot().global_time, 4.0);
}

#[test]
fn generated_script_lands_on_scenes() {
    let (mut s, _) = session_with(&["1", "2"]);
    assert_eq!(s.generate_script(3), ScriptAssignment::Applied(2));
    let script = s.script().unwrap().to_string();
    assert!(script.starts_with("[Scene 1]: Mountain landscape - "));
    for scene in s.timeline().scenes() {
        assert!(!scene.script.as_deref().unwrap().starts_with("[Scene"));
    }
}

#[test]
fn mismatched_script_becomes_a_notice() {
    let (mut s, _) = session_with(&["1", "2"]);
    let out = s.assign_script("only one segment");
    assert!(matches!(out, ScriptAssignment::CountMismatch { .. }));
    assert_eq!(s.take_notices().len(), 1);
    assert!(s.notices().is_empty());
}

#[test]
fn clock_readout_formats_elapsed_and_total() {
    let (mut s, _) = session_with(&["1", "1", "1", "1", "1", "1", "1", "1", "1", "1", "1", "1", "1"]);
    s.seek(61.5);
    assert_eq!(s.clock_readout(), ("01:01".to_string(), "01:05".to_string()));
}

#[tokio::test]
async fn narrate_all_falls_back_to_premade_voice_and_reports_failures() {
    let (mut s, ids) = session_with(&["1", "2", "1"]);
    s.set_caption(&ids[0], "Morning over the ridge");
    s.set_caption(&ids[1], "boom");
    s.set_caption(&ids[2], "Back to the peaks");

    let provider = FakeProvider {
        fail_on: vec!["boom"],
        ..FakeProvider::default()
    };
    let report = s.narrate_all(&provider).await;

    assert_eq!(report.generated, [ids[0].clone(), ids[2].clone()]);
    assert_eq!(report.failed.len(), 1);
    let requests = provider.requests.borrow();
    assert!(requests.iter().all(|r| r.voice_id == "pNInz6obpgDQGcFmaJgB"));
    assert_eq!(requests[0].model_id, "eleven_multilingual_v2");

    let scenes = s.timeline().scenes();
    assert!(scenes[0].narration.is_some());
    assert!(scenes[1].narration.is_none());
    assert!(s.store().playback_handle_for(&ids[2]).is_some());

    let notices = s.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].scene_id.as_ref(), Some(&ids[1]));
    assert!(notices[0].message.contains("rate limited"));
}

#[tokio::test]
async fn removing_a_scene_releases_its_narration() {
    let (mut s, ids) = session_with(&["1", "2"]);
    s.set_caption(&ids[0], "Hello");
    s.narrate_all(&FakeProvider::default()).await;
    assert!(s.store().playback_handle_for(&ids[0]).is_some());

    assert!(s.remove_scene(&ids[0]));
    assert!(s.store().playback_handle_for(&ids[0]).is_none());
    assert!(!s.remove_scene(&ids[0]));
    assert_eq!(s.timeline().len(), 1);
}

#[tokio::test]
async fn rejected_clip_surfaces_as_notice_and_playback_continues() {
    let (mut s, ids) = session_with(&["2", "2"]);
    s.set_caption(&ids[0], "First");
    s.set_caption(&ids[1], "Second");
    s.narrate_all(&FakeProvider::default()).await;

    let second = s.timeline().scenes()[1].narration.clone().unwrap();
    s.engine_mut().output_mut().reject(second);

    let start = Instant::now();
    s.play(start);
    s.tick(3.0);
    assert_eq!(s.snapshot().cursor.scene_index, 1);
    let notices = s.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].scene_id.as_ref(), Some(&ids[1]));

    s.tick(3.0);
    assert_eq!(s.snapshot().state, PlaybackState::Ended);
}
