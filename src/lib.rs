//! Storyboard is the core of a scene-based video editor.
//!
//! A storyboard is an ordered list of image scenes. Each scene shows one image for a
//! number of seconds and may carry a caption, a generated script line and a synthesized
//! narration clip.
//!
//! # Pieces
//!
//! 1. **Timeline** ([`Timeline`]): the scene sequence. Start times are derived from
//!    order and durations on every mutation and never stored independently.
//! 2. **Playback** ([`PlaybackEngine`]): a tick-driven play-head over the timeline that
//!    keeps one narration clip in step with the current scene.
//! 3. **Waveform** ([`WaveformRenderer`]): a deterministic raster strip with scene bands,
//!    a synthetic envelope and the playhead, plus click-to-time mapping.
//! 4. **Narration** ([`NarrationStore`], [`narrate_timeline`]): sequential text-to-speech
//!    requests through a [`NarrationProvider`], tolerant of per-scene failure.
//! 5. **Script** ([`compose_script`], [`assign_script`]): template-written scene text
//!    split back onto the scenes.
//!
//! [`EditorSession`] ties them together the way an interactive editor drives them.
//!
//! The design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded host model**: timers and audio are host capabilities
//!   ([`TickScheduler`], [`NarrationOutput`]) called back on one thread.
//! - **Cursor never outlives a mutation**: the engine resets whenever the timeline
//!   revision changes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod foundation;
mod narration;
mod playback;
mod script;
mod session;
mod timeline;
mod waveform;

pub use foundation::core::{ImageId, Rgba8, SceneId, format_clock, non_negative_secs};
pub use foundation::error::{StoryboardError, StoryboardResult};
pub use foundation::settings::{
    DurationBounds, EditorSettings, NarrationSettings, PlaybackSettings, WaveformSettings,
};
pub use narration::batch::{NarrationFailure, NarrationReport, narrate_timeline};
pub use narration::output::{HeadlessOutput, NarrationOutput, OutputEvent};
pub use narration::provider::{
    NarrationProvider, SynthesisRequest, Voice, VoiceParams, premade_voices, resolve_voices,
};
pub use narration::store::{NarrationHandle, NarrationResource, NarrationStatus, NarrationStore};
pub use playback::cursor::{PlaybackCursor, PlaybackSnapshot, PlaybackState, locate};
pub use playback::engine::PlaybackEngine;
pub use playback::scheduler::{ManualScheduler, ScheduledTick, TickScheduler, TickToken};
pub use script::assign::{ScriptAssignment, assign_script, split_script, strip_scene_prefix};
pub use script::generate::{
    FALLBACK_ALT, SEGMENT_SEPARATOR, compose_script, narration_line, template_count,
};
pub use session::document::Storyboard;
pub use session::editor::{EditorSession, Notice};
pub use timeline::catalog::{Image, ImageCatalog};
pub use timeline::model::{Direction, Scene, Timeline};
pub use waveform::envelope::{envelope_outline, synth_envelope};
pub use waveform::render::{SceneBand, SceneLabel, WaveformFrame, WaveformRenderer, WaveformStyle};
