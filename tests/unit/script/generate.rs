use super::*;
use crate::{
    foundation::core::ImageId,
    timeline::{catalog::Image, model::Scene},
};

fn catalog() -> ImageCatalog {
    ImageCatalog::new(vec![
        Image {
            id: ImageId::new("1"),
            url: "https://example.test/mountain.jpg".into(),
            alt: "Mountain Landscape".into(),
            duration: 5.0,
        },
        Image {
            id: ImageId::new("2"),
            url: "https://example.test/lake.jpg".into(),
            alt: "Lake and mountains".into(),
            duration: 4.0,
        },
    ])
}

fn board(image_ids: &[&str]) -> Timeline {
    let mut t = Timeline::new();
    for (i, id) in image_ids.iter().enumerate() {
        t.add_scene(Scene::new(format!("scene-{i}"), *id, 5.0));
    }
    t
}

#[test]
fn segments_carry_numbered_prefix_and_alt() {
    let text = compose_script(&board(&["1", "2"]), &catalog(), 11);
    let segments: Vec<&str> = text.split(SEGMENT_SEPARATOR).collect();
    assert_eq!(segments.len(), 2);
    assert!(segments[0].starts_with("[Scene 1]: Mountain Landscape - "));
    assert!(segments[1].starts_with("[Scene 2]: Lake and mountains - "));
    assert!(segments[0].contains("mountain landscape"));
}

#[test]
fn unknown_image_falls_back_to_generic_label() {
    let text = compose_script(&board(&["missing"]), &catalog(), 0);
    assert!(text.starts_with("[Scene 1]: Image - "), "{text}");
    assert!(text.contains(" image"));
}

#[test]
fn same_seed_same_text() {
    let t = board(&["1", "2", "1", "2", "1", "2"]);
    assert_eq!(
        compose_script(&t, &catalog(), 5),
        compose_script(&t, &catalog(), 5)
    );
}

#[test]
fn every_template_mentions_the_subject() {
    for choice in 0..template_count() {
        let line = narration_line("Forest Trail", choice);
        assert!(line.contains("forest trail"), "{line}");
        assert!(line.ends_with('.'));
    }
    assert_eq!(narration_line("x", 0), narration_line("x", template_count()));
}

#[test]
fn empty_timeline_gives_empty_script() {
    assert_eq!(compose_script(&Timeline::new(), &catalog(), 1), "");
}
