use crate::{
    foundation::math::SplitMix64,
    timeline::{catalog::ImageCatalog, model::Timeline},
};

/// Separator between scene segments of a generated script.
pub const SEGMENT_SEPARATOR: &str = "\n\n";

/// Label used for scenes whose image is missing or has no alt text.
pub const FALLBACK_ALT: &str = "Image";

const TEMPLATES: [(&str, &str); 5] = [
    (
        "Here we see a beautiful ",
        " that showcases the wonders of nature.",
    ),
    (
        "This stunning view of ",
        " reminds us of the importance of preserving our environment.",
    ),
    (
        "The magnificent ",
        " captures the essence of natural beauty in its purest form.",
    ),
    (
        "Looking at this ",
        ", we can appreciate the intricate details that make our world so special.",
    ),
    (
        "This breathtaking ",
        " exemplifies the harmony that exists in nature when left undisturbed.",
    ),
];

/// Number of narration line templates.
pub fn template_count() -> usize {
    TEMPLATES.len()
}

/// Narration line `choice` (taken modulo [`template_count`]) about `subject`.
pub fn narration_line(subject: &str, choice: usize) -> String {
    let (head, tail) = TEMPLATES[choice % TEMPLATES.len()];
    format!("{head}{}{tail}", subject.to_lowercase())
}

/// Write a `[Scene N]: <alt> - <line>` segment per scene, joined by blank lines.
///
/// Lines are picked from the templates with a stream seeded by `seed`, so the same
/// timeline and seed always produce the same text.
pub fn compose_script(timeline: &Timeline, catalog: &ImageCatalog, seed: u64) -> String {
    let mut rng = SplitMix64::new(seed);
    let segments: Vec<String> = timeline
        .scenes()
        .iter()
        .enumerate()
        .map(|(i, scene)| {
            let alt = catalog
                .get(&scene.image_id)
                .map(|img| img.alt.trim())
                .filter(|alt| !alt.is_empty())
                .unwrap_or(FALLBACK_ALT);
            let choice = (rng.next_u64() % TEMPLATES.len() as u64) as usize;
            format!("[Scene {}]: {alt} - {}", i + 1, narration_line(alt, choice))
        })
        .collect();
    tracing::debug!(segments = segments.len(), seed, "script composed");
    segments.join(SEGMENT_SEPARATOR)
}

#[cfg(test)]
#[path = "../../tests/unit/script/generate.rs"]
mod tests;
