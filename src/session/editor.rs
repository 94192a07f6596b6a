use std::time::Instant;

use crate::{
    foundation::{
        core::{ImageId, SceneId, format_clock},
        error::{StoryboardError, StoryboardResult},
        settings::EditorSettings,
    },
    narration::{
        batch::{NarrationReport, narrate_timeline},
        output::NarrationOutput,
        provider::{NarrationProvider, VoiceParams, resolve_voices},
        store::NarrationStore,
    },
    playback::{
        cursor::PlaybackSnapshot,
        engine::PlaybackEngine,
        scheduler::{TickScheduler, TickToken},
    },
    script::{
        assign::{ScriptAssignment, assign_script},
        generate::compose_script,
    },
    session::document::Storyboard,
    timeline::{
        catalog::ImageCatalog,
        model::{Direction, Scene, Timeline},
    },
    waveform::render::{WaveformFrame, WaveformRenderer},
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Inline message for the user; never fatal.
pub struct Notice {
    /// Scene the message is about, if any.
    pub scene_id: Option<SceneId>,
    /// Human-readable text.
    pub message: String,
}

/// One editing session: timeline, narration, playback and waveform behind a single owner.
///
/// Every structural edit goes through the session, which resets the playback cursor in
/// the same call so no command ever observes a stale scene index.
pub struct EditorSession<S: TickScheduler, O: NarrationOutput> {
    settings: EditorSettings,
    catalog: ImageCatalog,
    timeline: Timeline,
    store: NarrationStore,
    engine: PlaybackEngine<S, O>,
    waveform: WaveformRenderer,
    script: Option<String>,
    notices: Vec<Notice>,
    next_scene_seq: u64,
}

impl<S: TickScheduler, O: NarrationOutput> EditorSession<S, O> {
    /// Empty timeline over `catalog`.
    pub fn new(settings: EditorSettings, catalog: ImageCatalog, scheduler: S, output: O) -> Self {
        let engine = PlaybackEngine::new(scheduler, output, &settings.playback);
        let waveform = WaveformRenderer::new(&settings.waveform);
        Self {
            settings,
            catalog,
            timeline: Timeline::new(),
            store: NarrationStore::new(),
            engine,
            waveform,
            script: None,
            notices: Vec::new(),
            next_scene_seq: 0,
        }
    }

    /// Session opened on an existing document.
    pub fn open(
        settings: EditorSettings,
        board: Storyboard,
        scheduler: S,
        output: O,
    ) -> StoryboardResult<Self> {
        board.timeline.validate()?;
        let mut session = Self::new(settings, board.images, scheduler, output);
        session.next_scene_seq = board.timeline.len() as u64;
        session.timeline = board.timeline;
        session.engine.reset(&session.timeline);
        Ok(session)
    }

    /// Current document.
    pub fn to_storyboard(&self) -> Storyboard {
        Storyboard {
            images: self.catalog.clone(),
            timeline: self.timeline.clone(),
        }
    }

    /// Active settings.
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Image library.
    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    /// Scene sequence.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Narration resources.
    pub fn store(&self) -> &NarrationStore {
        &self.store
    }

    /// Playback engine, for hosts that pump its scheduler or inspect its sink.
    pub fn engine(&self) -> &PlaybackEngine<S, O> {
        &self.engine
    }

    /// Mutable playback engine access.
    pub fn engine_mut(&mut self) -> &mut PlaybackEngine<S, O> {
        &mut self.engine
    }

    /// Last generated script text.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Pending inline notices.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replace the waveform label font.
    pub fn set_label_font(&mut self, font_bytes: Vec<u8>) -> StoryboardResult<()> {
        self.waveform = WaveformRenderer::new(&self.settings.waveform).with_label_font(font_bytes)?;
        Ok(())
    }

    /// Drag-to-add: append a scene showing `image_id` for the image's default duration.
    pub fn add_image(&mut self, image_id: &ImageId) -> StoryboardResult<SceneId> {
        let image = self
            .catalog
            .get(image_id)
            .ok_or_else(|| StoryboardError::validation(format!("unknown image '{image_id}'")))?;
        if !(image.duration.is_finite() && image.duration > 0.0) {
            return Err(StoryboardError::validation(format!(
                "image '{image_id}' has no usable default duration"
            )));
        }

        let id = loop {
            self.next_scene_seq += 1;
            let candidate = SceneId::new(format!("scene-{}", self.next_scene_seq));
            if self.timeline.get(&candidate).is_none() {
                break candidate;
            }
        };
        let scene = Scene::from_image(id.clone(), image);
        self.mutate(|t| {
            t.add_scene(scene);
        });
        tracing::debug!(scene = %id, image = %image_id, "scene added");
        Ok(id)
    }

    /// Remove a scene and release its narration. Returns `false` for unknown ids.
    pub fn remove_scene(&mut self, id: &SceneId) -> bool {
        if self.timeline.get(id).is_none() {
            return false;
        }
        self.store.release(id);
        self.mutate(|t| {
            t.remove_scene(id);
        });
        true
    }

    /// Edit a caption. Returns `false` for unknown ids.
    pub fn set_caption(&mut self, id: &SceneId, caption: impl Into<String>) -> bool {
        let Some(mut scene) = self.timeline.get(id).cloned() else {
            return false;
        };
        scene.caption = Some(caption.into());
        self.mutate(|t| {
            t.update_scene(scene);
        });
        true
    }

    /// Edit a duration, clamped to the configured bounds. Returns the value applied.
    pub fn set_duration(&mut self, id: &SceneId, secs: f64) -> Option<f64> {
        let mut scene = self.timeline.get(id).cloned()?;
        let applied = self.settings.durations.clamp(secs);
        scene.duration = applied;
        self.mutate(|t| {
            t.update_scene(scene);
        });
        Some(applied)
    }

    /// Replace the order with `ids`, which must name every scene exactly once.
    pub fn reorder(&mut self, ids: &[SceneId]) -> StoryboardResult<()> {
        if ids.len() != self.timeline.len() {
            return Err(StoryboardError::validation(format!(
                "reorder lists {} scenes, timeline has {}",
                ids.len(),
                self.timeline.len()
            )));
        }
        let mut order = Vec::with_capacity(ids.len());
        for id in ids {
            let scene = self
                .timeline
                .get(id)
                .ok_or_else(|| StoryboardError::validation(format!("unknown scene '{id}'")))?;
            if order.iter().any(|s: &Scene| &s.id == id) {
                return Err(StoryboardError::validation(format!(
                    "scene '{id}' listed twice"
                )));
            }
            order.push(scene.clone());
        }
        self.mutate(|t| {
            t.reorder_scenes(order);
        });
        Ok(())
    }

    /// Drag-and-drop move from one position to another.
    pub fn move_scene(&mut self, from: usize, to: usize) {
        self.mutate(|t| {
            t.move_scene(from, to);
        });
    }

    /// Move a scene one slot earlier or later.
    pub fn nudge_scene(&mut self, index: usize, direction: Direction) {
        self.mutate(|t| {
            t.nudge_scene(index, direction);
        });
    }

    /// Compose a script for the current scenes and assign it to them.
    pub fn generate_script(&mut self, seed: u64) -> ScriptAssignment {
        let text = compose_script(&self.timeline, &self.catalog, seed);
        let outcome = self.assign_script(&text);
        self.script = Some(text);
        outcome
    }

    /// Assign `text` segment by segment; a count mismatch leaves scenes unchanged.
    pub fn assign_script(&mut self, text: &str) -> ScriptAssignment {
        let mut outcome = ScriptAssignment::Applied(0);
        self.mutate(|t| outcome = assign_script(t, text));
        if let ScriptAssignment::CountMismatch { segments, scenes } = outcome {
            self.notices.push(Notice {
                scene_id: None,
                message: format!("script has {segments} segments for {scenes} scenes; not applied"),
            });
        }
        outcome
    }

    /// Generate narration for every captioned scene, one request at a time.
    ///
    /// Uses the configured voice, or the first voice the provider (or the premade list)
    /// offers. Failures become notices and leave those scenes silent.
    ///
    /// # Panics
    ///
    /// Must be polled inside a Tokio runtime with the time driver enabled unless the
    /// configured inter-request delay is zero; see [`narrate_timeline`].
    pub async fn narrate_all<P: NarrationProvider>(&mut self, provider: &P) -> NarrationReport {
        let mut voice_id = self.settings.narration.voice_id.clone();
        if voice_id.trim().is_empty() {
            voice_id = resolve_voices(provider)
                .await
                .into_iter()
                .next()
                .map(|v| v.id)
                .unwrap_or_default();
        }
        let voice = VoiceParams::from_settings(&self.settings.narration, voice_id);
        let delay = self.settings.narration.inter_request_delay();

        let before = self.timeline.revision();
        let report = narrate_timeline(&mut self.timeline, &mut self.store, provider, &voice, delay).await;
        if self.timeline.revision() != before {
            self.engine.reset(&self.timeline);
        }

        for failure in &report.failed {
            self.notices.push(Notice {
                scene_id: Some(failure.scene_id.clone()),
                message: format!("scene {}: {}", failure.index + 1, failure.reason),
            });
        }
        report
    }

    /// Start or resume playback.
    pub fn play(&mut self, now: Instant) {
        self.engine.play(&self.timeline, now);
        self.collect_audio_error();
    }

    /// Pause playback.
    pub fn pause(&mut self) {
        self.engine.pause(&self.timeline);
    }

    /// Play/pause button.
    pub fn toggle(&mut self, now: Instant) {
        self.engine.toggle(&self.timeline, now);
        self.collect_audio_error();
    }

    /// Deliver a scheduled tick.
    pub fn on_timer(&mut self, token: TickToken, now: Instant) -> bool {
        let applied = self.engine.on_timer(&self.timeline, token, now);
        self.collect_audio_error();
        applied
    }

    /// Advance playback by an explicit amount of time.
    pub fn tick(&mut self, delta_secs: f64) -> PlaybackSnapshot {
        let snap = self.engine.tick(&self.timeline, delta_secs);
        self.collect_audio_error();
        snap
    }

    /// Seek to a global time; ignored while playing.
    pub fn seek(&mut self, target: f64) -> PlaybackSnapshot {
        self.engine.seek(&self.timeline, target)
    }

    /// Seek from a click on the waveform strip. `None` when ignored because playback runs.
    pub fn seek_at_x(&mut self, x: f64) -> Option<PlaybackSnapshot> {
        if self.engine.is_playing() {
            tracing::debug!(x, "waveform click ignored while playing");
            return None;
        }
        let target = self.waveform.time_at_x(x, self.timeline.total_duration());
        Some(self.seek(target))
    }

    /// Preview one scene's narration while halted.
    pub fn audition(&mut self, id: &SceneId) -> bool {
        let sounding = self.engine.audition(&self.timeline, id);
        self.collect_audio_error();
        sounding
    }

    /// Engine state for the UI.
    pub fn snapshot(&mut self) -> PlaybackSnapshot {
        self.engine.snapshot(&self.timeline)
    }

    /// Scene under the play-head.
    pub fn current_scene(&mut self) -> Option<&Scene> {
        self.engine.current_scene(&self.timeline)
    }

    /// `(elapsed, total)` as `MM:SS`.
    pub fn clock_readout(&mut self) -> (String, String) {
        let snap = self.snapshot();
        (format_clock(snap.global_time), format_clock(snap.total_duration))
    }

    /// Draw the waveform strip at the current play-head.
    pub fn render_waveform(&mut self) -> StoryboardResult<WaveformFrame> {
        let snap = self.engine.snapshot(&self.timeline);
        self.waveform
            .render(self.timeline.scenes(), snap.global_time, snap.total_duration)
    }

    fn mutate(&mut self, edit: impl FnOnce(&mut Timeline)) {
        let before = self.timeline.revision();
        edit(&mut self.timeline);
        if self.timeline.revision() != before {
            self.engine.reset(&self.timeline);
        }
    }

    fn collect_audio_error(&mut self) {
        if let Some(err) = self.engine.last_audio_error() {
            let message = err.to_string();
            let scene_id = self.engine.current_scene(&self.timeline).map(|s| s.id.clone());
            self.engine.clear_audio_error();
            self.notices.push(Notice { scene_id, message });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
