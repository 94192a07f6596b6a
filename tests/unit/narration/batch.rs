use std::cell::RefCell;

use super::*;
use crate::{
    foundation::error::{StoryboardError, StoryboardResult},
    narration::provider::{SynthesisRequest, Voice},
    timeline::model::Scene,
};

#[derive(Default)]
struct ScriptedProvider {
    fail_on: Vec<&'static str>,
    calls: RefCell<Vec<String>>,
}

impl NarrationProvider for ScriptedProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> StoryboardResult<Vec<u8>> {
        self.calls.borrow_mut().push(request.text.clone());
        if self.fail_on.iter().any(|f| request.text == *f) {
            return Err(StoryboardError::Other(anyhow::anyhow!("network unreachable")));
        }
        Ok(vec![1, 2, 3])
    }

    async fn voices(&self) -> StoryboardResult<Vec<Voice>> {
        Ok(Vec::new())
    }
}

fn voice() -> VoiceParams {
    VoiceParams {
        voice_id: "v".to_string(),
        model_id: "m".to_string(),
        output_format: "mp3_44100_128".to_string(),
    }
}

fn captioned(captions: &[&str]) -> Timeline {
    let mut t = Timeline::new();
    for (i, c) in captions.iter().enumerate() {
        t.add_scene(Scene::new(format!("s{i}"), "img", 2.0).with_caption(*c));
    }
    t
}

#[tokio::test]
async fn failure_in_the_middle_does_not_stop_later_scenes() {
    let mut timeline = captioned(&["first", "second", "third"]);
    let mut store = NarrationStore::new();
    let provider = ScriptedProvider {
        fail_on: vec!["second"],
        ..Default::default()
    };

    let report = narrate_timeline(
        &mut timeline,
        &mut store,
        &provider,
        &voice(),
        Duration::ZERO,
    )
    .await;

    assert_eq!(*provider.calls.borrow(), vec!["first", "second", "third"]);
    assert_eq!(
        report.generated,
        vec![SceneId::new("s0"), SceneId::new("s2")]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert!(report.failed[0].reason.contains("network unreachable"));
    assert!(!report.is_clean());

    assert!(timeline.scenes()[0].narration.is_some());
    assert!(timeline.scenes()[1].narration.is_none());
    assert!(timeline.scenes()[2].narration.is_some());
    assert_eq!(
        timeline.scenes()[2].narration.as_ref(),
        store.playback_handle_for(&SceneId::new("s2"))
    );
}

#[tokio::test]
async fn scenes_without_caption_text_are_skipped() {
    let mut timeline = captioned(&["hello", "   ", ""]);
    let mut store = NarrationStore::new();
    let provider = ScriptedProvider::default();

    let report = narrate_timeline(
        &mut timeline,
        &mut store,
        &provider,
        &voice(),
        Duration::ZERO,
    )
    .await;

    assert_eq!(provider.calls.borrow().len(), 1);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.attempted(), 1);
    assert!(report.is_clean());
}

#[tokio::test(start_paused = true)]
async fn requests_are_spaced_by_the_delay() {
    let mut timeline = captioned(&["a", "b", "c"]);
    let mut store = NarrationStore::new();
    let provider = ScriptedProvider::default();

    let started = tokio::time::Instant::now();
    narrate_timeline(
        &mut timeline,
        &mut store,
        &provider,
        &voice(),
        Duration::from_millis(500),
    )
    .await;

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(1500));
}
