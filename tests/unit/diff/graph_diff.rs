use super::*;
use crate::graph::model::{Edge, Node};

fn s0() -> Graph {
    Graph::new(
        "s0",
        vec![
            Node::new("A", "File").with_float("loc", 10.0),
            Node::new("B", "File").with_float("loc", 20.0),
        ],
        vec![Edge::new("AB", "A", "B"), Edge::new("BB", "B", "B")],
    )
    .unwrap()
}

fn s1(b_loc: f64) -> Graph {
    Graph::new(
        "s1",
        vec![
            Node::new("B", "File").with_float("loc", b_loc),
            Node::new("C", "File"),
        ],
        vec![Edge::new("BB", "B", "B"), Edge::new("BC", "B", "C")],
    )
    .unwrap()
}

#[test]
fn scenario_classification() {
    let d = GraphDiff::compute(Some(&s0()), &s1(20.0), &AttributeDiff::all_numeric());
    assert_eq!(d.removed_nodes().iter().collect::<Vec<_>>(), vec!["A"]);
    assert_eq!(d.added_nodes().collect::<Vec<_>>(), vec!["C"]);
    assert_eq!(d.difference("B"), Some(Difference::None));
    assert_eq!(d.difference("A"), Some(Difference::Deleted));
    assert_eq!(d.difference("Z"), None);
    assert_eq!(d.removed_edges().iter().collect::<Vec<_>>(), vec!["AB"]);
    assert_eq!(d.added_edges().iter().collect::<Vec<_>>(), vec!["BC"]);
    assert_eq!(d.kept_edges().iter().collect::<Vec<_>>(), vec!["BB"]);

    let changed = GraphDiff::compute(Some(&s0()), &s1(21.0), &AttributeDiff::all_numeric());
    assert_eq!(changed.changed_nodes().collect::<Vec<_>>(), vec!["B"]);
}

#[test]
fn identical_snapshots_are_all_none() {
    let a = s0();
    let b = s0();
    let d = GraphDiff::compute(Some(&a), &b, &AttributeDiff::all_numeric());
    assert!(d.node_differences().all(|(_, x)| x == Difference::None));
    assert!(d.removed_nodes().is_empty());
    assert!(d.removed_edges().is_empty());
    assert!(d.added_edges().is_empty());
}

#[test]
fn missing_current_makes_everything_added() {
    let d = GraphDiff::compute(None, &s0(), &AttributeDiff::all_numeric());
    assert_eq!(d.added_nodes().count(), 2);
    assert_eq!(d.added_edges().len(), 2);
    assert!(d.removed_nodes().is_empty());
}

#[test]
fn configured_attributes_limit_comparison() {
    let mut a = Attributes::default();
    let mut b = Attributes::default();
    a.floats.insert("loc".into(), 1.0);
    b.floats.insert("loc".into(), 2.0);
    a.strings.insert("owner".into(), "x".into());
    b.strings.insert("owner".into(), "x".into());
    assert!(!AttributeDiff::new(["owner"]).differs(&a, &b));
    assert!(AttributeDiff::new(["loc"]).differs(&a, &b));
    b.toggles.insert("Test".into());
    assert!(AttributeDiff::new(["Test"]).differs(&a, &b));
    // numeric-only default ignores strings and toggles
    b.floats.insert("loc".into(), 1.0);
    b.strings.insert("owner".into(), "y".into());
    assert!(!AttributeDiff::all_numeric().differs(&a, &b));
}

#[test]
fn ints_and_floats_compare_numerically_by_default() {
    let mut a = Attributes::default();
    let mut b = Attributes::default();
    a.ints.insert("loc".into(), 3);
    b.floats.insert("loc".into(), 3.0);
    assert!(!AttributeDiff::all_numeric().differs(&a, &b));
    b.floats.insert("extra".into(), 0.0);
    assert!(AttributeDiff::all_numeric().differs(&a, &b));
}

#[test]
fn edges_match_by_identity_only() {
    let m = match_edges([("e1", 1), ("e2", 2)], [("e2", "new2"), ("e3", "new3")]);
    assert_eq!(m.matched, vec![("e2".to_string(), 2, "new2")]);
    assert_eq!(m.stale, vec![("e1".to_string(), 1)]);
    assert_eq!(m.fresh, vec![("e3".to_string(), "new3")]);
}
