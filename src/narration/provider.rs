use std::future::Future;

use crate::{foundation::error::StoryboardResult, foundation::settings::NarrationSettings};

#[derive(Clone, Debug, PartialEq, Eq)]
/// One text-to-speech call.
pub struct SynthesisRequest {
    /// Provider voice identifier.
    pub voice_id: String,
    /// Provider model identifier.
    pub model_id: String,
    /// Requested encoding, e.g. `mp3_44100_128`.
    pub output_format: String,
    /// Text to speak.
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Voice selection shared by every request of a batch.
pub struct VoiceParams {
    /// Provider voice identifier.
    pub voice_id: String,
    /// Provider model identifier.
    pub model_id: String,
    /// Requested encoding.
    pub output_format: String,
}

impl VoiceParams {
    /// Voice parameters from settings, with `voice_id` overriding the configured one.
    pub fn from_settings(settings: &NarrationSettings, voice_id: impl Into<String>) -> Self {
        Self {
            voice_id: voice_id.into(),
            model_id: settings.model_id.clone(),
            output_format: settings.output_format.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Voice offered by a provider.
pub struct Voice {
    /// Provider voice identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Provider grouping such as `premade`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// External text-to-speech service.
///
/// Implementations may fail freely; the core never lets an error escape a batch.
pub trait NarrationProvider {
    /// Synthesize speech and return the encoded audio bytes.
    fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> impl Future<Output = StoryboardResult<Vec<u8>>>;

    /// List the voices the provider offers.
    fn voices(&self) -> impl Future<Output = StoryboardResult<Vec<Voice>>>;
}

const PREMADE_VOICES: [(&str, &str); 12] = [
    ("pNInz6obpgDQGcFmaJgB", "Adam"),
    ("EXAVITQu4vr4xnSDxMaL", "Antoni"),
    ("ODq5zmih8GrVes37Dizd", "Arnold"),
    ("VR6AewLTigWG4xSOukaG", "Bella"),
    ("yoZ06aMxZJJ28mfd3POQ", "Domi"),
    ("jBpfuIE2acCO8z3wKNLl", "Elli"),
    ("MF3mGyEYCl7XYWbV9V6O", "Freya"),
    ("jsCqWAovK2LkecY7zXl4", "Gigi"),
    ("zcAOhNBS3c14rBihAFp1", "Harry"),
    ("IKne3meq5aSn9XLyUdCD", "Josh"),
    ("XB0fDUnXU5powFXDhCwa", "Rachel"),
    ("TX3LPaxmHKxFdv7VOQHJ", "Thomas"),
];

/// Built-in premade voice list used when the provider cannot list voices.
pub fn premade_voices() -> Vec<Voice> {
    PREMADE_VOICES
        .iter()
        .map(|(id, name)| Voice {
            id: (*id).to_string(),
            name: (*name).to_string(),
            category: Some("premade".to_string()),
        })
        .collect()
}

/// Provider voices, falling back to [`premade_voices`] on error or an empty list.
pub async fn resolve_voices<P: NarrationProvider>(provider: &P) -> Vec<Voice> {
    match provider.voices().await {
        Ok(voices) if !voices.is_empty() => voices,
        Ok(_) => {
            tracing::info!("provider listed no voices, using premade voices");
            premade_voices()
        }
        Err(e) => {
            tracing::warn!(error = %e, "voice listing failed, using premade voices");
            premade_voices()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/provider.rs"]
mod tests;
