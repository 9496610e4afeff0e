//! Bounds and bucketing tests for timeline event placement.

use storyline_core::{
    CoreError, EventDraft, MemoryAdapter, ProjectDraft, ProjectId, ProjectStore, TimeUnit,
    TimelineDraft, TimelineId,
};

fn setup() -> (ProjectStore<MemoryAdapter>, ProjectId, TimelineId) {
    let mut store = ProjectStore::open(MemoryAdapter::new()).unwrap();
    let project = store
        .create_project(ProjectDraft {
            name: "Saga".to_string(),
            description: String::new(),
        })
        .unwrap();
    let timeline = store
        .save_timeline(
            &project.id,
            None,
            TimelineDraft::new("Main", TimeUnit::Day, 1, 10),
        )
        .unwrap();
    (store, project.id, timeline.id)
}

#[test]
fn test_placement_at_both_bounds() {
    let (mut store, project_id, timeline_id) = setup();

    // Bounds are inclusive on both ends.
    store
        .place_event(&project_id, timeline_id, 1, EventDraft::new("first", "opening"))
        .unwrap();
    store
        .place_event(&project_id, timeline_id, 10, EventDraft::new("last", "finale"))
        .unwrap();

    assert_eq!(store.events_at(timeline_id, 1).len(), 1);
    assert_eq!(store.events_at(timeline_id, 10).len(), 1);
}

#[test]
fn test_placement_outside_bounds_is_rejected() {
    let (mut store, project_id, timeline_id) = setup();

    for time in [0, 11, -3] {
        let err = store
            .place_event(&project_id, timeline_id, time, EventDraft::new("X", "out of range"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Range { .. }), "time {time} must be rejected");
    }
    assert!(store.timeline_events(timeline_id).is_empty());
}

#[test]
fn test_move_is_atomic_and_bounds_checked() {
    let (mut store, project_id, timeline_id) = setup();

    let event = store
        .place_event(&project_id, timeline_id, 3, EventDraft::new("X", "it happens"))
        .unwrap();

    // A rejected move leaves the event where it was.
    let err = store
        .move_event(&project_id, timeline_id, event.id, 99)
        .unwrap_err();
    assert!(matches!(err, CoreError::Range { .. }));
    assert_eq!(store.events_at(timeline_id, 3).len(), 1);

    // A successful move empties the old bucket and fills the new one.
    store
        .move_event(&project_id, timeline_id, event.id, 5)
        .unwrap();
    assert!(store.events_at(timeline_id, 3).is_empty());
    assert_eq!(store.events_at(timeline_id, 5)[0].id, event.id);
}

#[test]
fn test_shrinking_timeline_strands_events() {
    let (mut store, project_id, timeline_id) = setup();

    store
        .place_event(&project_id, timeline_id, 9, EventDraft::new("late", "it happens"))
        .unwrap();

    // Narrow the bounds below the placed event. Existing events are not
    // revalidated; the event is stranded but kept.
    store
        .save_timeline(
            &project_id,
            Some(timeline_id),
            TimelineDraft::new("Main", TimeUnit::Day, 1, 5),
        )
        .unwrap();
    assert_eq!(store.events_at(timeline_id, 9).len(), 1);

    // New placements honor the narrowed bounds.
    let err = store
        .place_event(&project_id, timeline_id, 9, EventDraft::new("more", "too late"))
        .unwrap_err();
    assert!(matches!(err, CoreError::Range { .. }));
}

#[test]
fn test_bucket_accumulates_in_placement_order() {
    let (mut store, project_id, timeline_id) = setup();

    for name in ["a", "b", "c"] {
        store
            .place_event(&project_id, timeline_id, 4, EventDraft::new(name, "same day"))
            .unwrap();
    }

    let names: Vec<_> = store
        .events_at(timeline_id, 4)
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_remove_event_is_idempotent() {
    let (mut store, project_id, timeline_id) = setup();

    let event = store
        .place_event(&project_id, timeline_id, 2, EventDraft::new("X", "it happens"))
        .unwrap();
    store
        .remove_event(&project_id, timeline_id, event.id)
        .unwrap();
    store
        .remove_event(&project_id, timeline_id, event.id)
        .unwrap();
    assert!(store.timeline_events(timeline_id).is_empty());
}
