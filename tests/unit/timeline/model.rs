use super::*;
use crate::foundation::math::SplitMix64;

fn timeline_of(durations: &[f64]) -> Timeline {
    let mut t = Timeline::new();
    for (i, &d) in durations.iter().enumerate() {
        t.add_scene(Scene::new(format!("s{i}"), "img", d));
    }
    t
}

fn assert_start_times_hold(t: &Timeline) {
    let scenes = t.scenes();
    if let Some(first) = scenes.first() {
        assert_eq!(first.start_time(), 0.0);
    }
    for pair in scenes.windows(2) {
        assert_eq!(
            pair[1].start_time(),
            pair[0].start_time() + pair[0].duration
        );
    }
}

fn durations(t: &Timeline) -> Vec<f64> {
    t.scenes().iter().map(|s| s.duration).collect()
}

#[test]
fn add_assigns_cumulative_start_times() {
    let t = timeline_of(&[5.0, 3.0, 2.0]);
    let starts: Vec<f64> = t.scenes().iter().map(Scene::start_time).collect();
    assert_eq!(starts, vec![0.0, 5.0, 8.0]);
    assert_eq!(t.total_duration(), 10.0);
}

#[test]
fn remove_recomputes_and_ignores_absent_ids() {
    let mut t = timeline_of(&[5.0, 3.0, 2.0]);
    let rev = t.revision();
    t.remove_scene(&SceneId::new("missing"));
    assert_eq!(t.revision(), rev);
    assert_eq!(t.len(), 3);

    t.remove_scene(&SceneId::new("s0"));
    assert_eq!(t.scenes()[0].start_time(), 0.0);
    assert_eq!(t.scenes()[1].start_time(), 3.0);
    assert!(t.revision() > rev);
}

#[test]
fn update_changes_duration_in_place() {
    let mut t = timeline_of(&[5.0, 3.0, 2.0]);
    let mut s1 = t.scene_at(1).unwrap().clone();
    s1.duration = 10.0;
    t.update_scene(s1);
    assert_eq!(t.scenes()[2].start_time(), 15.0);
    assert_eq!(t.position(&SceneId::new("s1")), Some(1));
}

#[test]
fn update_with_unknown_id_is_noop() {
    let mut t = timeline_of(&[5.0]);
    let rev = t.revision();
    t.update_scene(Scene::new("ghost", "img", 1.0));
    assert_eq!(t.len(), 1);
    assert_eq!(t.revision(), rev);
}

#[test]
fn reorder_preserves_total_duration() {
    let mut t = timeline_of(&[1.5, 2.0, 4.25, 3.0]);
    let before = t.total_duration();
    let mut order = t.scenes().to_vec();
    order.reverse();
    t.reorder_scenes(order);
    assert_eq!(t.total_duration(), before);
    assert_eq!(t.scenes()[0].id, SceneId::new("s3"));
    assert_start_times_hold(&t);
}

#[test]
fn move_scene_splices_like_drag_and_drop() {
    let mut t = timeline_of(&[1.0, 2.0, 3.0]);
    t.move_scene(0, 2);
    let ids: Vec<&str> = t.scenes().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2", "s0"]);
    assert_eq!(t.scenes()[2].start_time(), 5.0);

    let rev = t.revision();
    t.move_scene(1, 1);
    t.move_scene(0, 9);
    assert_eq!(t.revision(), rev);
}

#[test]
fn nudge_swaps_neighbours_and_stops_at_ends() {
    let mut t = timeline_of(&[1.0, 2.0, 3.0]);
    let rev = t.revision();
    t.nudge_scene(0, Direction::Earlier);
    t.nudge_scene(2, Direction::Later);
    assert_eq!(t.revision(), rev);

    t.nudge_scene(2, Direction::Earlier);
    let ids: Vec<&str> = t.scenes().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s0", "s2", "s1"]);
    assert_eq!(t.scenes()[2].start_time(), 4.0);
}

#[test]
fn start_time_invariant_holds_under_random_edits() {
    let mut rng = SplitMix64::new(7);
    let mut t = Timeline::new();
    let mut next_id = 0u32;
    for _ in 0..500 {
        let op = rng.next_u64() % 5;
        let len = t.len();
        match op {
            0 | 1 => {
                let d = 0.5 + (rng.next_f64() * 10.0).floor() * 0.5;
                t.add_scene(Scene::new(format!("n{next_id}"), "img", d));
                next_id += 1;
            }
            2 if len > 0 => {
                let id = t.scenes()[(rng.next_u64() as usize) % len].id.clone();
                t.remove_scene(&id);
            }
            3 if len > 0 => {
                let mut s = t.scenes()[(rng.next_u64() as usize) % len].clone();
                s.duration = 0.25 + rng.next_f64() * 7.0;
                t.update_scene(s);
            }
            4 if len > 1 => {
                let before = {
                    let mut d = durations(&t);
                    d.sort_by(f64::total_cmp);
                    d
                };
                let from = (rng.next_u64() as usize) % len;
                let to = (rng.next_u64() as usize) % len;
                t.move_scene(from, to);
                let mut after = durations(&t);
                after.sort_by(f64::total_cmp);
                assert_eq!(before, after);
            }
            _ => {}
        }
        assert_start_times_hold(&t);
    }
}

#[test]
fn validate_flags_duplicates_and_bad_durations() {
    let mut t = timeline_of(&[1.0, 2.0]);
    assert!(t.validate().is_ok());
    t.add_scene(Scene::new("s0", "img", 1.0));
    assert!(t.validate().is_err());

    let t = timeline_of(&[1.0, 0.0]);
    assert!(t.validate().is_err());
    let t = timeline_of(&[f64::NAN]);
    assert!(t.validate().is_err());
}

#[test]
fn deserialized_start_times_are_rederived() {
    let json = r#"[
        { "id": "a", "image_id": "1", "start_time": 99.0, "duration": 4.0 },
        { "id": "b", "image_id": "2", "start_time": 1.0, "duration": 6.0, "caption": "hi" }
    ]"#;
    let t: Timeline = serde_json::from_str(json).unwrap();
    assert_eq!(t.scenes()[0].start_time(), 0.0);
    assert_eq!(t.scenes()[1].start_time(), 4.0);
    assert_eq!(t.scenes()[1].caption.as_deref(), Some("hi"));

    let out = serde_json::to_value(&t).unwrap();
    assert_eq!(out[1]["start_time"], 4.0);
}

#[test]
fn from_image_uses_default_duration() {
    let img = Image {
        id: ImageId::new("7"),
        url: "https://example.invalid/7.jpg".to_string(),
        alt: "Lake".to_string(),
        duration: 5.0,
    };
    let s = Scene::from_image("scene-1", &img);
    assert_eq!(s.duration, 5.0);
    assert_eq!(s.image_id, img.id);
    assert_eq!(s.caption.as_deref(), Some(""));
    assert_eq!(s.spoken_caption(), None);
}

#[test]
fn unchanged_update_and_reorder_keep_revision() {
    let mut t = timeline_of(&[2.0, 3.0]);
    let rev = t.revision();
    let same = t.scene_at(1).unwrap().clone();
    t.update_scene(same);
    t.reorder_scenes(t.scenes().to_vec());
    assert_eq!(t.revision(), rev);

    let mut captioned = t.scene_at(0).unwrap().clone();
    captioned.caption = Some("dawn".to_string());
    t.update_scene(captioned);
    assert_ne!(t.revision(), rev);
}

#[test]
fn separate_timelines_never_share_a_revision() {
    let a = timeline_of(&[5.0, 5.0, 5.0]);
    let mut b = Timeline::new();
    b.add_scene(Scene::new("x0", "img", 1.0));
    b.add_scene(Scene::new("x1", "img", 1.0));
    b.remove_scene(&SceneId::new("x1"));
    assert_ne!(a.revision(), b.revision());
    assert_ne!(Timeline::new().revision(), Timeline::new().revision());

    let mut copy = a.clone();
    assert_eq!(copy.revision(), a.revision());
    copy.remove_scene(&SceneId::new("s2"));
    assert_ne!(copy.revision(), a.revision());
}
