/// Convenience result type used across the storyboard engine.
pub type StoryboardResult<T> = Result<T, StoryboardError>;

/// Top-level error taxonomy used by editor APIs.
#[derive(thiserror::Error, Debug)]
pub enum StoryboardError {
    /// Invalid user-provided timeline, settings or document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A narration request failed (provider error, network failure, empty audio).
    #[error("narration error: {0}")]
    Narration(String),

    /// The audio sink refused to start or resume a clip.
    #[error("playback error: {0}")]
    Playback(String),

    /// Errors while rasterizing the waveform strip.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryboardError {
    /// Build a [`StoryboardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryboardError::Narration`] value.
    pub fn narration(msg: impl Into<String>) -> Self {
        Self::Narration(msg.into())
    }

    /// Build a [`StoryboardError::Playback`] value.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`StoryboardError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StoryboardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StoryboardError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
