use std::{path::Path, time::Duration};

use crate::foundation::error::{StoryboardError, StoryboardResult};

/// All tunables of an editor session.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Playback tick cadence.
    pub playback: PlaybackSettings,
    /// Narration synthesis parameters.
    pub narration: NarrationSettings,
    /// Waveform strip geometry.
    pub waveform: WaveformSettings,
    /// Accepted range for user-entered scene durations.
    pub durations: DurationBounds,
}

/// Playback engine tunables.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Wall-clock interval between ticks while playing.
    pub tick_interval_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
        }
    }
}

impl PlaybackSettings {
    /// Tick interval as a [`Duration`] (never zero).
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Narration synthesis tunables.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NarrationSettings {
    /// Provider voice identifier; empty means "first available voice".
    pub voice_id: String,
    /// Provider model identifier.
    pub model_id: String,
    /// Requested audio encoding.
    pub output_format: String,
    /// Pause between consecutive synthesis requests.
    pub inter_request_delay_ms: u64,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            voice_id: String::new(),
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "mp3_44100_128".to_string(),
            inter_request_delay_ms: 500,
        }
    }
}

impl NarrationSettings {
    /// Inter-request delay as a [`Duration`].
    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }
}

/// Waveform strip geometry and envelope seed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WaveformSettings {
    /// Strip width in pixels.
    pub width: u32,
    /// Strip height in pixels.
    pub height: u32,
    /// Seed of the synthetic amplitude envelope.
    pub seed: u64,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 96,
            seed: 0x5EED,
        }
    }
}

/// Inclusive range for scene durations typed into the editor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DurationBounds {
    /// Shortest accepted duration in seconds.
    pub min_secs: f64,
    /// Longest accepted duration in seconds.
    pub max_secs: f64,
}

impl Default for DurationBounds {
    fn default() -> Self {
        Self {
            min_secs: 1.0,
            max_secs: 30.0,
        }
    }
}

impl DurationBounds {
    /// Clamp a requested duration; non-finite input falls back to the minimum.
    pub fn clamp(&self, secs: f64) -> f64 {
        if !secs.is_finite() {
            return self.min_secs;
        }
        secs.clamp(self.min_secs, self.max_secs)
    }
}

impl EditorSettings {
    /// Read settings from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> StoryboardResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            StoryboardError::validation(format!(
                "failed to read settings '{}': {e}",
                path.display()
            ))
        })?;
        let settings: Self = serde_json::from_slice(&bytes)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `STORYBOARD_*` environment overrides; unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = std::env::var("STORYBOARD_TICK_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
        {
            self.playback.tick_interval_ms = ms;
        }
        if let Some(ms) = std::env::var("STORYBOARD_NARRATION_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.narration.inter_request_delay_ms = ms;
        }
        if let Some(voice) = std::env::var("STORYBOARD_VOICE_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            self.narration.voice_id = voice;
        }
        self
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> StoryboardResult<()> {
        if self.playback.tick_interval_ms == 0 {
            return Err(StoryboardError::validation("tick_interval_ms must be > 0"));
        }
        if self.waveform.width == 0 || self.waveform.height == 0 {
            return Err(StoryboardError::validation(
                "waveform width/height must be > 0",
            ));
        }
        let d = self.durations;
        if !(d.min_secs.is_finite() && d.max_secs.is_finite())
            || d.min_secs <= 0.0
            || d.min_secs > d.max_secs
        {
            return Err(StoryboardError::validation(
                "duration bounds must satisfy 0 < min_secs <= max_secs",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/settings.rs"]
mod tests;
