use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    foundation::core::SceneId,
    foundation::error::{StoryboardError, StoryboardResult},
    narration::provider::{NarrationProvider, SynthesisRequest, VoiceParams},
};

/// Playable reference to a synthesized narration clip (the session-local equivalent of a blob URL).
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NarrationHandle(String);

impl NarrationHandle {
    /// Wrap an externally produced locator.
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Locator string the audio sink opens.
    pub fn locator(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NarrationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug)]
/// Audio bytes owned by the store for one scene.
pub struct NarrationResource {
    /// Handle given out to scenes and the audio sink.
    pub handle: NarrationHandle,
    /// Encoding the bytes were requested in (e.g. `mp3_44100_128`).
    pub format: String,
    /// Raw encoded audio.
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Lifecycle of a scene's narration.
pub enum NarrationStatus {
    /// A request was issued and has not completed.
    Requested,
    /// Synthesis succeeded; the handle is playable.
    Resolved(NarrationHandle),
    /// Synthesis failed; the scene stays silent.
    Failed(String),
}

/// Ownership map from scene id to its narration resource.
///
/// At most one resource exists per scene. Requests take `&mut self`, so two requests
/// can never be in flight at the same time.
#[derive(Debug, Default)]
pub struct NarrationStore {
    resources: HashMap<SceneId, NarrationResource>,
    status: HashMap<SceneId, NarrationStatus>,
    next_seq: u64,
}

impl NarrationStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesize `text` for `scene_id` and keep the result as the scene's narration.
    ///
    /// A previous resource for the scene is replaced only on success. Every failure is
    /// returned as [`StoryboardError::Narration`].
    pub async fn request<P: NarrationProvider>(
        &mut self,
        scene_id: &SceneId,
        text: &str,
        voice: &VoiceParams,
        provider: &P,
    ) -> StoryboardResult<NarrationHandle> {
        if text.trim().is_empty() {
            let reason = "narration text is empty".to_string();
            self.status
                .insert(scene_id.clone(), NarrationStatus::Failed(reason.clone()));
            return Err(StoryboardError::narration(format!(
                "scene '{scene_id}': {reason}"
            )));
        }

        self.status
            .insert(scene_id.clone(), NarrationStatus::Requested);
        let request = SynthesisRequest {
            voice_id: voice.voice_id.clone(),
            model_id: voice.model_id.clone(),
            output_format: voice.output_format.clone(),
            text: text.to_string(),
        };

        let outcome = match provider.synthesize(&request).await {
            Ok(bytes) if bytes.is_empty() => Err("provider returned no audio".to_string()),
            Ok(bytes) => Ok(bytes),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(bytes) => {
                self.next_seq += 1;
                let handle = NarrationHandle::new(format!(
                    "narration:{}#{}",
                    scene_id, self.next_seq
                ));
                tracing::debug!(scene = %scene_id, bytes = bytes.len(), %handle, "narration resolved");
                self.resources.insert(
                    scene_id.clone(),
                    NarrationResource {
                        handle: handle.clone(),
                        format: voice.output_format.clone(),
                        bytes: Arc::new(bytes),
                    },
                );
                self.status
                    .insert(scene_id.clone(), NarrationStatus::Resolved(handle.clone()));
                Ok(handle)
            }
            Err(reason) => {
                self.status
                    .insert(scene_id.clone(), NarrationStatus::Failed(reason.clone()));
                Err(StoryboardError::narration(format!(
                    "scene '{scene_id}': {reason}"
                )))
            }
        }
    }

    /// Handle of the scene's resolved narration, if any.
    pub fn playback_handle_for(&self, scene_id: &SceneId) -> Option<&NarrationHandle> {
        self.resources.get(scene_id).map(|r| &r.handle)
    }

    /// Full resource (bytes + format) of the scene's narration.
    pub fn resource(&self, scene_id: &SceneId) -> Option<&NarrationResource> {
        self.resources.get(scene_id)
    }

    /// Resource behind a handle, for audio sinks that load by locator.
    pub fn resource_by_handle(&self, handle: &NarrationHandle) -> Option<&NarrationResource> {
        self.resources.values().find(|r| &r.handle == handle)
    }

    /// Lifecycle state; `None` means nothing was ever requested.
    pub fn status(&self, scene_id: &SceneId) -> Option<&NarrationStatus> {
        self.status.get(scene_id)
    }

    /// Drop the scene's resource and lifecycle record.
    pub fn release(&mut self, scene_id: &SceneId) -> Option<NarrationResource> {
        self.status.remove(scene_id);
        let released = self.resources.remove(scene_id);
        if let Some(r) = &released {
            tracing::debug!(scene = %scene_id, handle = %r.handle, "narration released");
        }
        released
    }

    /// Number of resolved resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// `true` when no resources are held.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/store.rs"]
mod tests;
