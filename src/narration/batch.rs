use std::time::Duration;

use crate::{
    foundation::core::SceneId,
    narration::provider::{NarrationProvider, VoiceParams},
    narration::store::NarrationStore,
    timeline::model::Timeline,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// A scene whose narration could not be generated.
pub struct NarrationFailure {
    /// Position of the scene when the batch started.
    pub index: usize,
    /// Scene identifier.
    pub scene_id: SceneId,
    /// Human-readable reason, suitable for an inline notice.
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Outcome of [`narrate_timeline`].
pub struct NarrationReport {
    /// Scenes that received a narration handle.
    pub generated: Vec<SceneId>,
    /// Scenes without caption text.
    pub skipped: Vec<SceneId>,
    /// Scenes whose request failed; they stay silent.
    pub failed: Vec<NarrationFailure>,
}

impl NarrationReport {
    /// Number of provider requests issued.
    pub fn attempted(&self) -> usize {
        self.generated.len() + self.failed.len()
    }

    /// `true` when every attempted scene got narration.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Generate narration for every captioned scene, one request at a time in scene order.
///
/// `delay` is awaited between consecutive requests. A failing scene is recorded and the
/// batch moves on; successful handles are written onto the scenes via
/// [`Timeline::update_scene`].
///
/// # Panics
///
/// The delay uses the Tokio timer, so polling this with a non-zero `delay` outside a
/// Tokio runtime with the time driver enabled panics. A zero delay never touches it.
#[tracing::instrument(skip_all, fields(scenes = timeline.len()))]
pub async fn narrate_timeline<P: NarrationProvider>(
    timeline: &mut Timeline,
    store: &mut NarrationStore,
    provider: &P,
    voice: &VoiceParams,
    delay: Duration,
) -> NarrationReport {
    let jobs: Vec<(usize, SceneId, Option<String>)> = timeline
        .scenes()
        .iter()
        .enumerate()
        .map(|(i, s)| (i, s.id.clone(), s.spoken_caption().map(str::to_string)))
        .collect();

    let mut report = NarrationReport::default();
    for (index, scene_id, caption) in jobs {
        let Some(text) = caption else {
            report.skipped.push(scene_id);
            continue;
        };

        if report.attempted() > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        tracing::info!(scene = %scene_id, index, "requesting narration");
        match store.request(&scene_id, &text, voice, provider).await {
            Ok(handle) => {
                if let Some(mut scene) = timeline.get(&scene_id).cloned() {
                    scene.narration = Some(handle);
                    timeline.update_scene(scene);
                }
                report.generated.push(scene_id);
            }
            Err(e) => {
                tracing::warn!(scene = %scene_id, index, error = %e, "narration failed, scene stays silent");
                report.failed.push(NarrationFailure {
                    index,
                    scene_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        generated = report.generated.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "narration batch finished"
    );
    report
}

#[cfg(test)]
#[path = "../../tests/unit/narration/batch.rs"]
mod tests;
