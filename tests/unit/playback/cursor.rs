use super::*;
use crate::timeline::model::Scene;

fn timeline_of(durations: &[f64]) -> Timeline {
    let mut t = Timeline::new();
    for (i, &d) in durations.iter().enumerate() {
        t.add_scene(Scene::new(format!("s{i}"), "img", d));
    }
    t
}

#[test]
fn locate_on_empty_timeline_is_none() {
    assert!(locate(&Timeline::new(), 3.0).is_none());
}

#[test]
fn locate_maps_interior_and_boundary_times() {
    let t = timeline_of(&[2.0, 3.0, 1.5]);
    let c = locate(&t, 0.0).unwrap();
    assert_eq!(c, PlaybackCursor::START);

    let c = locate(&t, 1.999).unwrap();
    assert_eq!(c.scene_index, 0);

    let c = locate(&t, 2.0).unwrap();
    assert_eq!(c.scene_index, 1);
    assert_eq!(c.elapsed_in_scene, 0.0);

    let c = locate(&t, 5.5).unwrap();
    assert_eq!(c.scene_index, 2);
    assert_eq!(c.elapsed_in_scene, 0.5);
}

#[test]
fn cursor_global_time_past_end_is_total() {
    let t = timeline_of(&[2.0, 3.0]);
    let ended = PlaybackCursor {
        scene_index: 2,
        elapsed_in_scene: 0.0,
    };
    assert_eq!(ended.global_time(&t), 5.0);
    let mid = PlaybackCursor {
        scene_index: 1,
        elapsed_in_scene: 1.0,
    };
    assert_eq!(mid.global_time(&t), 3.0);
}

#[test]
fn progress_fraction_handles_empty_total() {
    let snap = PlaybackSnapshot {
        state: PlaybackState::Stopped,
        cursor: PlaybackCursor::START,
        global_time: 0.0,
        total_duration: 0.0,
        scene_count: 0,
    };
    assert_eq!(snap.progress_fraction(), 0.0);
}
