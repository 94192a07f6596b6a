use crate::{foundation::core::non_negative_secs, timeline::model::Timeline};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
/// Engine transport state.
pub enum PlaybackState {
    /// Cursor at the very start, nothing playing.
    Stopped,
    /// Ticks are advancing the cursor.
    Playing,
    /// Halted somewhere inside the timeline.
    Paused,
    /// Cursor moved past the last scene; there is no current scene.
    Ended,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
/// Position of the play-head: scene index plus seconds into that scene.
///
/// `scene_index == scene count` means the timeline has ended.
pub struct PlaybackCursor {
    /// Index of the current scene.
    pub scene_index: usize,
    /// Seconds elapsed inside the current scene.
    pub elapsed_in_scene: f64,
}

impl PlaybackCursor {
    /// Cursor at timeline start.
    pub const START: Self = Self {
        scene_index: 0,
        elapsed_in_scene: 0.0,
    };

    /// Global time of this cursor on `timeline`.
    pub fn global_time(self, timeline: &Timeline) -> f64 {
        match timeline.scene_at(self.scene_index) {
            Some(scene) => scene.start_time() + self.elapsed_in_scene,
            None => timeline.total_duration(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Read-only view of the engine for UI code.
pub struct PlaybackSnapshot {
    /// Transport state.
    pub state: PlaybackState,
    /// Cursor position.
    pub cursor: PlaybackCursor,
    /// Seconds since timeline start.
    pub global_time: f64,
    /// Sum of scene durations.
    pub total_duration: f64,
    /// Number of scenes.
    pub scene_count: usize,
}

impl PlaybackSnapshot {
    /// Progress in `[0, 1]`; zero for an empty timeline.
    pub fn progress_fraction(&self) -> f64 {
        if self.total_duration > 0.0 {
            (self.global_time / self.total_duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Clamp `target` to `[0, total]` and find the scene whose `[start, start + duration)` holds it.
///
/// A target at or beyond the end maps to the last scene with zero elapsed time so the
/// result is always a valid scene. Returns `None` for an empty timeline.
pub fn locate(timeline: &Timeline, target: f64) -> Option<PlaybackCursor> {
    let last = timeline.len().checked_sub(1)?;
    let total = timeline.total_duration();
    let t = non_negative_secs(target).min(total);

    if t >= total {
        return Some(PlaybackCursor {
            scene_index: last,
            elapsed_in_scene: 0.0,
        });
    }

    let scenes = timeline.scenes();
    // first scene that ends after t
    let index = scenes
        .partition_point(|s| s.end_time() <= t)
        .min(last);
    let elapsed = (t - scenes[index].start_time()).max(0.0);
    Some(PlaybackCursor {
        scene_index: index,
        elapsed_in_scene: elapsed,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/playback/cursor.rs"]
mod tests;
