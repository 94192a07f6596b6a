use crate::{script::generate::SEGMENT_SEPARATOR, timeline::model::Timeline};

/// Outcome of [`assign_script`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptAssignment {
    /// Every scene received its segment.
    Applied(usize),
    /// Segment and scene counts differ; the timeline was left untouched.
    CountMismatch {
        /// Segments found in the text.
        segments: usize,
        /// Scenes on the timeline.
        scenes: usize,
    },
}

/// Split generated text on blank-line separators, keeping segment order.
pub fn split_script(text: &str) -> Vec<&str> {
    text.split(SEGMENT_SEPARATOR).collect()
}

/// Drop a leading `[Scene N]: <label> - ` marker; anything else is returned unchanged.
///
/// The label ends at the first `" - "` on the same line, so dashes inside the spoken
/// content survive.
pub fn strip_scene_prefix(segment: &str) -> &str {
    let Some(rest) = segment.strip_prefix("[Scene ") else {
        return segment;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return segment;
    }
    let Some(rest) = rest[digits..].strip_prefix("]: ") else {
        return segment;
    };
    let line_end = rest.find('\n').unwrap_or(rest.len());
    match rest[..line_end].find(" - ") {
        Some(at) => &rest[at + 3..],
        None => segment,
    }
}

/// Write segment `i` of `text` into the `script` field of scene `i`.
///
/// Applies only when the number of segments equals the number of scenes; otherwise the
/// timeline is not modified.
#[tracing::instrument(skip_all, fields(scenes = timeline.len()))]
pub fn assign_script(timeline: &mut Timeline, text: &str) -> ScriptAssignment {
    let segments = split_script(text);
    if segments.len() != timeline.len() {
        tracing::warn!(
            segments = segments.len(),
            "script segment count does not match scenes, not applied"
        );
        return ScriptAssignment::CountMismatch {
            segments: segments.len(),
            scenes: timeline.len(),
        };
    }

    let updated = timeline
        .scenes()
        .iter()
        .zip(&segments)
        .map(|(scene, segment)| {
            let mut scene = scene.clone();
            scene.script = Some(strip_scene_prefix(segment).to_string());
            scene
        })
        .collect();
    timeline.reorder_scenes(updated);
    tracing::debug!("script assigned");
    ScriptAssignment::Applied(segments.len())
}

#[cfg(test)]
#[path = "../../tests/unit/script/assign.rs"]
mod tests;
