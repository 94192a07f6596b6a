use std::{
    collections::HashSet,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    foundation::core::{ImageId, SceneId},
    foundation::error::{StoryboardError, StoryboardResult},
    narration::store::NarrationHandle,
    timeline::catalog::Image,
};

/// One timeline entry: an image shown for `duration` seconds, with optional text and narration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Stable identifier for the lifetime of the scene.
    pub id: SceneId,
    /// Catalog image shown during the scene.
    pub image_id: ImageId,
    // derived from sequence order; never read back from documents
    #[serde(default, skip_deserializing)]
    start_time: f64,
    /// Display time in seconds (> 0).
    pub duration: f64,
    /// User-authored caption, also the narration source text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Generator-assigned script text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Narration resource, present once synthesis succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<NarrationHandle>,
}

impl Scene {
    /// New scene with no caption, script or narration; start time is assigned by the timeline.
    pub fn new(id: impl Into<SceneId>, image_id: impl Into<ImageId>, duration: f64) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            start_time: 0.0,
            duration,
            caption: None,
            script: None,
            narration: None,
        }
    }

    /// Scene created by dropping `image` onto the timeline: default duration, empty caption.
    pub fn from_image(id: impl Into<SceneId>, image: &Image) -> Self {
        Self {
            caption: Some(String::new()),
            ..Self::new(id, image.id.clone(), image.duration)
        }
    }

    /// Builder-style caption setter.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Seconds from timeline start to this scene (derived).
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Seconds from timeline start to the end of this scene.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Caption text if it has any non-whitespace content.
    pub fn spoken_caption(&self) -> Option<&str> {
        self.caption.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Neighbour direction for [`Timeline::nudge_scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Towards index 0.
    Earlier,
    /// Towards the end of the timeline.
    Later,
}

// shared by every timeline in the process
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Ordered scene sequence with derived start times.
///
/// Start times satisfy `scenes[0].start_time() == 0` and
/// `scenes[i].start_time() == scenes[i-1].start_time() + scenes[i-1].duration`
/// after every mutation. The mutation methods below are the only way to change them.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<Scene>", into = "Vec<Scene>")]
pub struct Timeline {
    scenes: Vec<Scene>,
    revision: u64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            scenes: Vec::new(),
            revision: next_revision(),
        }
    }
}

impl From<Vec<Scene>> for Timeline {
    fn from(scenes: Vec<Scene>) -> Self {
        let mut timeline = Self {
            scenes,
            revision: next_revision(),
        };
        timeline.recompute_start_times();
        timeline
    }
}

impl From<Timeline> for Vec<Scene> {
    fn from(value: Timeline) -> Self {
        value.scenes
    }
}

impl Timeline {
    /// Empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scenes in playback order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// `true` when there are no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Sequence identity, renewed by every mutation that changes something.
    ///
    /// Revisions come from one process-wide counter, so equal revisions mean the same
    /// sequence: the same timeline, or an unedited clone of it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Sum of all scene durations.
    pub fn total_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration).sum()
    }

    /// Scene at `index`, if any.
    pub fn scene_at(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Scene with identifier `id`, if any.
    pub fn get(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| &s.id == id)
    }

    /// Index of the scene with identifier `id`.
    pub fn position(&self, id: &SceneId) -> Option<usize> {
        self.scenes.iter().position(|s| &s.id == id)
    }

    /// Append a scene.
    pub fn add_scene(&mut self, scene: Scene) -> &[Scene] {
        self.scenes.push(scene);
        self.touch();
        &self.scenes
    }

    /// Remove the scene with identifier `id`; absent ids are a no-op.
    pub fn remove_scene(&mut self, id: &SceneId) -> &[Scene] {
        if let Some(index) = self.position(id) {
            self.scenes.remove(index);
            self.touch();
        }
        &self.scenes
    }

    /// Replace the scene carrying `updated.id` in place; unknown ids are a no-op.
    pub fn update_scene(&mut self, updated: Scene) -> &[Scene] {
        if let Some(index) = self.position(&updated.id) {
            let mut updated = updated;
            updated.start_time = self.scenes[index].start_time;
            if self.scenes[index] != updated {
                self.scenes[index] = updated;
                self.touch();
            }
        }
        &self.scenes
    }

    /// Replace the whole sequence with a caller-supplied permutation.
    ///
    /// Set equality with the previous scenes is the caller's contract and is not checked.
    /// Handing back the current sequence unchanged is a no-op.
    pub fn reorder_scenes(&mut self, new_order: Vec<Scene>) -> &[Scene] {
        if new_order == self.scenes {
            return &self.scenes;
        }
        self.scenes = new_order;
        self.touch();
        &self.scenes
    }

    /// Drag-and-drop move: take the scene at `from` and insert it at `to`.
    pub fn move_scene(&mut self, from: usize, to: usize) -> &[Scene] {
        let len = self.scenes.len();
        if from == to || from >= len || to >= len {
            return &self.scenes;
        }
        let mut order = self.scenes.clone();
        let scene = order.remove(from);
        order.insert(to, scene);
        self.reorder_scenes(order)
    }

    /// Swap the scene at `index` with its neighbour; no-op at either end.
    pub fn nudge_scene(&mut self, index: usize, direction: Direction) -> &[Scene] {
        let target = match direction {
            Direction::Earlier => index.checked_sub(1),
            Direction::Later => index.checked_add(1),
        };
        let Some(target) = target.filter(|&t| t < self.scenes.len()) else {
            return &self.scenes;
        };
        if index >= self.scenes.len() {
            return &self.scenes;
        }
        let mut order = self.scenes.clone();
        order.swap(index, target);
        self.reorder_scenes(order)
    }

    /// Check durations are finite and positive and ids are unique.
    pub fn validate(&self) -> StoryboardResult<()> {
        let mut seen = HashSet::new();
        for scene in &self.scenes {
            if !seen.insert(&scene.id) {
                return Err(StoryboardError::validation(format!(
                    "duplicate scene id '{}'",
                    scene.id
                )));
            }
            if !scene.duration.is_finite() || scene.duration <= 0.0 {
                return Err(StoryboardError::validation(format!(
                    "scene '{}' duration must be finite and > 0",
                    scene.id
                )));
            }
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.recompute_start_times();
        self.revision = next_revision();
    }

    fn recompute_start_times(&mut self) {
        let mut t = 0.0;
        for scene in &mut self.scenes {
            scene.start_time = t;
            t += scene.duration;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
