use std::time::{Duration, Instant};

use crate::{
    foundation::core::{SceneId, non_negative_secs},
    foundation::settings::PlaybackSettings,
    narration::output::NarrationOutput,
    narration::store::NarrationHandle,
    playback::cursor::{PlaybackCursor, PlaybackSnapshot, PlaybackState, locate},
    playback::scheduler::{TickScheduler, TickToken},
    timeline::model::{Scene, Timeline},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NarrationRole {
    /// Narration of the scene under the play-head.
    Scene,
    /// A single clip previewed while the transport is halted.
    Audition,
}

#[derive(Clone, Debug)]
struct ActiveNarration {
    scene_id: SceneId,
    handle: NarrationHandle,
    role: NarrationRole,
}

/// Drives a virtual play-head across the timeline and keeps narration in step.
///
/// Every public method takes the [`Timeline`] it operates on. When the timeline's
/// revision differs from the one the cursor was computed for, the engine first resets
/// to `Stopped` at (0, 0), so a mutation can never leave a stale index behind.
///
/// Visual progress comes from ticks only. Narration is started when a scene becomes
/// current and stopped (paused and rewound) when it ends; the audio clock is never used
/// to correct the cursor.
pub struct PlaybackEngine<S: TickScheduler, O: NarrationOutput> {
    scheduler: S,
    output: O,
    tick_interval: Duration,
    state: PlaybackState,
    cursor: PlaybackCursor,
    bound_revision: Option<u64>,
    live_tick: Option<TickToken>,
    next_token: u64,
    last_tick_at: Option<Instant>,
    active: Option<ActiveNarration>,
    last_audio_error: Option<String>,
}

impl<S: TickScheduler, O: NarrationOutput> PlaybackEngine<S, O> {
    /// Engine in `Stopped` state using the given timer capability and audio sink.
    pub fn new(scheduler: S, output: O, settings: &PlaybackSettings) -> Self {
        Self {
            scheduler,
            output,
            tick_interval: settings.tick_interval(),
            state: PlaybackState::Stopped,
            cursor: PlaybackCursor::START,
            bound_revision: None,
            live_tick: None,
            next_token: 0,
            last_tick_at: None,
            active: None,
            last_audio_error: None,
        }
    }

    /// Transport state as of the last call.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// `true` while ticks are advancing the cursor.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Raw cursor as of the last call.
    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    /// Tick cadence requested from the scheduler.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Most recent narration playback failure, for an inline notice.
    pub fn last_audio_error(&self) -> Option<&str> {
        self.last_audio_error.as_deref()
    }

    /// Clear the stored narration failure once it has been shown.
    pub fn clear_audio_error(&mut self) {
        self.last_audio_error = None;
    }

    /// Handle of the clip the engine currently owns (playing or paused mid-clip).
    pub fn active_narration(&self) -> Option<&NarrationHandle> {
        self.active.as_ref().map(|a| &a.handle)
    }

    /// The timer capability.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access to the timer capability, for hosts that pump it.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The audio sink.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Mutable access to the audio sink.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Snapshot for UI code, after re-binding to `timeline` if it changed.
    pub fn snapshot(&mut self, timeline: &Timeline) -> PlaybackSnapshot {
        self.sync(timeline);
        PlaybackSnapshot {
            state: self.state,
            cursor: self.cursor,
            global_time: self.cursor.global_time(timeline),
            total_duration: timeline.total_duration(),
            scene_count: timeline.len(),
        }
    }

    /// Scene under the play-head; `None` when the timeline is empty or has ended.
    pub fn current_scene<'t>(&mut self, timeline: &'t Timeline) -> Option<&'t Scene> {
        self.sync(timeline);
        if self.state == PlaybackState::Ended {
            return None;
        }
        timeline.scene_at(self.cursor.scene_index)
    }

    /// Force the cursor back to `Stopped` at (0, 0) and silence narration.
    pub fn reset(&mut self, timeline: &Timeline) {
        self.cancel_tick();
        self.stop_active();
        self.cursor = PlaybackCursor::START;
        self.state = PlaybackState::Stopped;
        self.bound_revision = Some(timeline.revision());
        tracing::debug!(revision = timeline.revision(), "playback reset");
    }

    /// Start or resume playback. Restarts from the beginning when `Ended`.
    ///
    /// Playing an empty timeline is a no-op.
    pub fn play(&mut self, timeline: &Timeline, now: Instant) {
        self.sync(timeline);
        if timeline.is_empty() {
            tracing::debug!("play ignored: timeline is empty");
            return;
        }
        match self.state {
            PlaybackState::Playing => return,
            PlaybackState::Ended => self.cursor = PlaybackCursor::START,
            PlaybackState::Stopped | PlaybackState::Paused => {}
        }

        self.state = PlaybackState::Playing;
        tracing::debug!(
            scene = self.cursor.scene_index,
            elapsed = self.cursor.elapsed_in_scene,
            "playback started"
        );
        self.start_scene_narration(timeline);
        self.last_tick_at = Some(now);
        self.schedule_tick();
    }

    /// Halt playback, keeping the cursor and pausing (not rewinding) narration.
    pub fn pause(&mut self, timeline: &Timeline) {
        self.sync(timeline);
        if self.state != PlaybackState::Playing {
            return;
        }
        self.cancel_tick();
        if let Some(active) = &self.active {
            self.output.pause(&active.handle);
        }
        self.state = PlaybackState::Paused;
        tracing::debug!(
            scene = self.cursor.scene_index,
            elapsed = self.cursor.elapsed_in_scene,
            "playback paused"
        );
    }

    /// `pause` while playing, `play` otherwise.
    pub fn toggle(&mut self, timeline: &Timeline, now: Instant) {
        self.sync(timeline);
        if self.is_playing() {
            self.pause(timeline);
        } else {
            self.play(timeline, now);
        }
    }

    /// Advance the cursor by `delta_secs` of elapsed time; ignored unless `Playing`.
    ///
    /// At most one scene boundary is crossed per tick. Crossing it stops the finished
    /// scene's narration, resets the within-scene time to zero and either starts the next
    /// scene's narration or ends playback.
    pub fn tick(&mut self, timeline: &Timeline, delta_secs: f64) -> PlaybackSnapshot {
        self.sync(timeline);
        if self.state != PlaybackState::Playing {
            return self.snapshot(timeline);
        }

        let delta = if delta_secs.is_finite() {
            non_negative_secs(delta_secs)
        } else {
            0.0
        };

        let Some(scene) = timeline.scene_at(self.cursor.scene_index) else {
            self.finish(timeline);
            return self.snapshot(timeline);
        };

        self.cursor.elapsed_in_scene += delta;
        if self.cursor.elapsed_in_scene >= scene.duration {
            self.stop_active();
            self.cursor.scene_index += 1;
            self.cursor.elapsed_in_scene = 0.0;
            if self.cursor.scene_index < timeline.len() {
                tracing::debug!(scene = self.cursor.scene_index, "advanced to next scene");
                self.start_scene_narration(timeline);
            } else {
                self.finish(timeline);
            }
        }
        self.snapshot(timeline)
    }

    /// Handle a scheduled tick delivered by the host.
    ///
    /// Measures the real time since the previous tick, so late or early timers do not
    /// accumulate drift. Ticks whose token is no longer live (after pause, reset or a
    /// timeline change) are discarded. Returns `true` if the tick was applied.
    pub fn on_timer(&mut self, timeline: &Timeline, token: TickToken, now: Instant) -> bool {
        self.sync(timeline);
        if self.live_tick != Some(token) || self.state != PlaybackState::Playing {
            tracing::trace!(token = token.as_u64(), "stale tick discarded");
            return false;
        }
        self.live_tick = None;

        let delta = self
            .last_tick_at
            .map(|prev| now.saturating_duration_since(prev))
            .unwrap_or(self.tick_interval);
        self.last_tick_at = Some(now);

        self.tick(timeline, delta.as_secs_f64());
        if self.state == PlaybackState::Playing {
            self.schedule_tick();
        }
        true
    }

    /// Move the cursor to `target` seconds (clamped to `[0, total]`).
    ///
    /// Seeking is a no-op while playing or on an empty timeline. It never starts playback.
    /// Narration owned by the engine is stopped, so resuming replays the new scene's clip
    /// from its beginning.
    pub fn seek(&mut self, timeline: &Timeline, target: f64) -> PlaybackSnapshot {
        self.sync(timeline);
        if self.state == PlaybackState::Playing {
            tracing::debug!(target, "seek ignored while playing");
            return self.snapshot(timeline);
        }
        let Some(cursor) = locate(timeline, target) else {
            return self.snapshot(timeline);
        };

        self.stop_active();
        self.cursor = cursor;
        self.state = if cursor == PlaybackCursor::START {
            PlaybackState::Stopped
        } else {
            PlaybackState::Paused
        };
        tracing::debug!(
            target,
            scene = cursor.scene_index,
            elapsed = cursor.elapsed_in_scene,
            "seek"
        );
        self.snapshot(timeline)
    }

    /// Preview one scene's narration while the transport is halted.
    ///
    /// Calling it again for the clip that is being auditioned stops it. Returns `true`
    /// when a clip is now sounding.
    pub fn audition(&mut self, timeline: &Timeline, scene_id: &SceneId) -> bool {
        self.sync(timeline);
        if self.state == PlaybackState::Playing {
            tracing::debug!(scene = %scene_id, "audition ignored while playing");
            return false;
        }

        let same = self
            .active
            .as_ref()
            .is_some_and(|a| a.role == NarrationRole::Audition && &a.scene_id == scene_id);
        self.stop_active();
        if same {
            return false;
        }

        let Some(handle) = timeline.get(scene_id).and_then(|s| s.narration.clone()) else {
            return false;
        };
        let played = self.play_clip(&handle);
        self.active = Some(ActiveNarration {
            scene_id: scene_id.clone(),
            handle,
            role: NarrationRole::Audition,
        });
        played
    }

    fn sync(&mut self, timeline: &Timeline) {
        if self.bound_revision != Some(timeline.revision()) {
            self.reset(timeline);
        }
    }

    fn finish(&mut self, timeline: &Timeline) {
        self.cancel_tick();
        self.stop_active();
        self.cursor = PlaybackCursor {
            scene_index: timeline.len(),
            elapsed_in_scene: 0.0,
        };
        self.state = PlaybackState::Ended;
        tracing::debug!("playback ended");
    }

    fn schedule_tick(&mut self) {
        self.next_token += 1;
        let token = TickToken(self.next_token);
        self.live_tick = Some(token);
        self.scheduler.schedule(token, self.tick_interval);
    }

    fn cancel_tick(&mut self) {
        if let Some(token) = self.live_tick.take() {
            self.scheduler.cancel(token);
        }
        self.last_tick_at = None;
    }

    fn start_scene_narration(&mut self, timeline: &Timeline) {
        let Some(scene) = timeline.scene_at(self.cursor.scene_index) else {
            self.stop_active();
            return;
        };
        let Some(handle) = scene.narration.clone() else {
            self.stop_active();
            return;
        };

        let resuming = self.active.as_ref().is_some_and(|a| {
            a.role == NarrationRole::Scene && a.scene_id == scene.id && a.handle == handle
        });
        if !resuming {
            self.stop_active();
        }
        self.play_clip(&handle);
        self.active = Some(ActiveNarration {
            scene_id: scene.id.clone(),
            handle,
            role: NarrationRole::Scene,
        });
    }

    fn play_clip(&mut self, handle: &NarrationHandle) -> bool {
        match self.output.play(handle) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%handle, error = %e, "narration playback failed, continuing silently");
                self.last_audio_error = Some(e.to_string());
                false
            }
        }
    }

    fn stop_active(&mut self) {
        if let Some(active) = self.active.take() {
            self.output.pause(&active.handle);
            self.output.rewind(&active.handle);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/engine.rs"]
mod tests;
