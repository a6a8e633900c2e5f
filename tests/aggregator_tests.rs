use build_trace_studio::aggregator::{
    build_trace_forest, build_trace_tree, StructuralAnomaly, TraceNode,
};
use build_trace_studio::parser::TraceEvent;
use pretty_assertions::assert_eq;

fn event(id: Option<i64>, parent_id: Option<i64>, name: &str, duration: f64) -> TraceEvent {
    TraceEvent {
        name: name.to_string(),
        duration,
        start_time: 0.0,
        trace_id: "t1".to_string(),
        timestamp: None,
        id,
        parent_id,
        tags: None,
    }
}

fn names(nodes: &[TraceNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

#[test]
fn test_unlinked_events_all_roots() {
    let events = vec![
        event(Some(3), None, "c", 1.0),
        event(Some(1), None, "a", 1.0),
        event(Some(2), None, "b", 1.0),
    ];

    let forest = build_trace_tree(&events);

    assert_eq!(names(&forest), vec!["c", "a", "b"]);
    assert!(forest.iter().all(|n| n.children.is_empty()));
}

#[test]
fn test_child_attached_to_parent() {
    let events = vec![
        event(Some(1), None, "compile", 120.0),
        event(Some(2), Some(1), "resolve", 40.0),
    ];

    let forest = build_trace_tree(&events);

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id, 1);
    assert_eq!(forest[0].children.len(), 1);
    assert_eq!(forest[0].children[0].id, 2);
}

#[test]
fn test_child_before_parent_in_input() {
    let events = vec![
        event(Some(2), Some(1), "resolve", 40.0),
        event(Some(1), None, "compile", 120.0),
    ];

    let forest = build_trace_tree(&events);

    assert_eq!(names(&forest), vec!["compile"]);
    assert_eq!(names(&forest[0].children), vec!["resolve"]);
}

#[test]
fn test_dangling_parent_becomes_root() {
    let events = vec![event(Some(5), Some(99), "orphan", 3.0)];

    let forest = build_trace_forest(&events);

    assert_eq!(names(&forest.roots), vec!["orphan"]);
    assert_eq!(
        forest.anomalies,
        vec![StructuralAnomaly::DanglingParent { id: 5, parent_id: 99 }]
    );
}

#[test]
fn test_events_without_id_excluded() {
    let events = vec![
        event(Some(1), None, "compile", 10.0),
        event(None, Some(1), "anonymous", 5.0),
        event(None, None, "loose", 5.0),
    ];

    let forest = build_trace_forest(&events);

    assert_eq!(names(&forest.roots), vec!["compile"]);
    assert!(forest.roots[0].children.is_empty());
    assert_eq!(forest.skipped_without_id, 2);
    assert_eq!(forest.node_count(), 1);
}

#[test]
fn test_parent_without_id_makes_child_root() {
    let events = vec![
        event(None, None, "parent-without-id", 10.0),
        event(Some(2), Some(1), "child", 5.0),
    ];

    let forest = build_trace_tree(&events);

    assert_eq!(names(&forest), vec!["child"]);
}

#[test]
fn test_duplicate_id_last_wins_first_position() {
    let events = vec![
        event(Some(1), None, "first", 1.0),
        event(Some(2), None, "other", 1.0),
        event(Some(1), None, "second", 7.0),
    ];

    let forest = build_trace_forest(&events);

    assert_eq!(names(&forest.roots), vec!["second", "other"]);
    assert_eq!(forest.roots[0].duration, 7.0);
    assert_eq!(
        forest.anomalies,
        vec![StructuralAnomaly::DuplicateId { id: 1, occurrences: 2 }]
    );
}

#[test]
fn test_duplicate_id_overwrite_relinks() {
    let events = vec![
        event(Some(1), None, "a", 1.0),
        event(Some(2), None, "b", 1.0),
        event(Some(2), Some(1), "b2", 1.0),
    ];

    let forest = build_trace_tree(&events);

    assert_eq!(names(&forest), vec!["a"]);
    assert_eq!(names(&forest[0].children), vec!["b2"]);
}

#[test]
fn test_children_follow_id_definition_order() {
    let events = vec![
        event(Some(10), None, "root", 9.0),
        event(Some(12), Some(10), "second", 1.0),
        event(Some(11), Some(10), "first", 1.0),
        event(Some(12), Some(10), "second-again", 1.0),
    ];

    let forest = build_trace_tree(&events);

    assert_eq!(names(&forest[0].children), vec!["second-again", "first"]);
}

#[test]
fn test_cycle_dropped_and_reported() {
    let events = vec![
        event(Some(1), Some(2), "a", 1.0),
        event(Some(2), Some(1), "b", 1.0),
        event(Some(3), None, "c", 1.0),
    ];

    let forest = build_trace_forest(&events);

    assert_eq!(names(&forest.roots), vec!["c"]);
    assert_eq!(
        forest.anomalies,
        vec![StructuralAnomaly::Cycle { ids: vec![1, 2] }]
    );
    assert!(forest.warnings()[0].contains("[1, 2]"));
}

#[test]
fn test_forest_and_tree_agree() {
    let events = vec![
        event(Some(1), None, "a", 3.0),
        event(Some(2), Some(1), "b", 2.0),
        event(Some(3), Some(7), "c", 1.0),
        event(None, None, "d", 1.0),
    ];

    assert_eq!(build_trace_forest(&events).roots, build_trace_tree(&events));
}

#[test]
fn test_deep_chain() {
    let events: Vec<TraceEvent> = (0..200)
        .map(|i| event(Some(i), if i == 0 { None } else { Some(i - 1) }, "step", 1.0))
        .collect();

    let forest = build_trace_forest(&events);

    assert_eq!(forest.roots.len(), 1);
    assert_eq!(forest.node_count(), 200);
    assert!(forest.anomalies.is_empty());
}
