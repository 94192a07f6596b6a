use std::path::Path;

use crate::{
    foundation::error::{StoryboardError, StoryboardResult},
    timeline::{catalog::ImageCatalog, model::Timeline},
};

/// Serializable editor document: the image library plus the scene sequence.
///
/// Scene start times are re-derived on load; whatever the file says is ignored.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Storyboard {
    /// Images scenes may reference.
    #[serde(default)]
    pub images: ImageCatalog,
    /// Ordered scenes.
    #[serde(default)]
    pub timeline: Timeline,
}

impl Storyboard {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> StoryboardResult<Self> {
        let board: Self = serde_json::from_str(s)?;
        board.timeline.validate()?;
        Ok(board)
    }

    /// Read and validate a JSON document from disk.
    pub fn from_json_file(path: &Path) -> StoryboardResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            StoryboardError::validation(format!(
                "failed to read storyboard '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> StoryboardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty-printed JSON to `path`, creating parent directories.
    pub fn write_json_file(&self, path: &Path) -> StoryboardResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoryboardError::validation(format!(
                    "failed to create '{}': {e}",
                    parent.display()
                ))
            })?;
        }
        std::fs::write(path, self.to_json_pretty()?).map_err(|e| {
            StoryboardError::validation(format!(
                "failed to write storyboard '{}': {e}",
                path.display()
            ))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/document.rs"]
mod tests;
