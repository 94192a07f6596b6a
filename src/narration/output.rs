use std::collections::{HashMap, HashSet};

use crate::{
    foundation::error::{StoryboardError, StoryboardResult},
    narration::store::NarrationHandle,
};

/// Audio sink for narration clips (one "audio element" per handle).
pub trait NarrationOutput {
    /// Start the clip, or resume it from where it was paused.
    fn play(&mut self, handle: &NarrationHandle) -> StoryboardResult<()>;

    /// Pause without moving the clip position.
    fn pause(&mut self, handle: &NarrationHandle);

    /// Move the clip position back to the start.
    fn rewind(&mut self, handle: &NarrationHandle);
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Call recorded by [`HeadlessOutput`].
pub enum OutputEvent {
    /// `play` succeeded.
    Play(NarrationHandle),
    /// `play` was rejected.
    Rejected(NarrationHandle),
    /// `pause` was called.
    Pause(NarrationHandle),
    /// `rewind` was called.
    Rewind(NarrationHandle),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ClipState {
    playing: bool,
    at_start: bool,
}

/// In-memory sink that tracks clip state without producing sound.
///
/// Used for headless previews and to observe the engine's audio calls.
#[derive(Debug, Default)]
pub struct HeadlessOutput {
    clips: HashMap<NarrationHandle, ClipState>,
    rejected: HashSet<NarrationHandle>,
    events: Vec<OutputEvent>,
}

impl HeadlessOutput {
    /// Sink with no clips.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `play` of `handle` fail, like a clip whose source cannot load.
    pub fn reject(&mut self, handle: NarrationHandle) {
        self.rejected.insert(handle);
    }

    /// Handles currently producing sound.
    pub fn audible(&self) -> Vec<&NarrationHandle> {
        self.clips
            .iter()
            .filter(|(_, c)| c.playing)
            .map(|(h, _)| h)
            .collect()
    }

    /// `true` if `handle` is playing.
    pub fn is_playing(&self, handle: &NarrationHandle) -> bool {
        self.clips.get(handle).is_some_and(|c| c.playing)
    }

    /// `true` if `handle` was rewound and has not played since.
    pub fn is_at_start(&self, handle: &NarrationHandle) -> bool {
        self.clips.get(handle).is_none_or(|c| c.at_start)
    }

    /// Every call received, in order.
    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }
}

impl NarrationOutput for HeadlessOutput {
    fn play(&mut self, handle: &NarrationHandle) -> StoryboardResult<()> {
        if self.rejected.contains(handle) {
            self.events.push(OutputEvent::Rejected(handle.clone()));
            return Err(StoryboardError::playback(format!(
                "clip '{handle}' could not be played"
            )));
        }
        let clip = self.clips.entry(handle.clone()).or_insert(ClipState {
            playing: false,
            at_start: true,
        });
        clip.playing = true;
        clip.at_start = false;
        self.events.push(OutputEvent::Play(handle.clone()));
        Ok(())
    }

    fn pause(&mut self, handle: &NarrationHandle) {
        if let Some(clip) = self.clips.get_mut(handle) {
            clip.playing = false;
        }
        self.events.push(OutputEvent::Pause(handle.clone()));
    }

    fn rewind(&mut self, handle: &NarrationHandle) {
        if let Some(clip) = self.clips.get_mut(handle) {
            clip.at_start = true;
        }
        self.events.push(OutputEvent::Rewind(handle.clone()));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/output.rs"]
mod tests;
