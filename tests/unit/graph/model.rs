use super::*;

fn sample() -> Graph {
    Graph::new(
        "r1",
        vec![
            Node::new("root", "Directory"),
            Node::new("a", "File").with_parent("root").with_float("LOC", 10.0),
            Node::new("b", "File").with_parent("root"),
        ],
        vec![Edge::new("a->b", "a", "b")],
    )
    .unwrap()
}

#[test]
fn children_and_leaves_are_derived_from_parents() {
    let g = sample();
    let kids: Vec<&str> = g.children("root").map(|n| n.id.as_str()).collect();
    assert_eq!(kids, vec!["a", "b"]);
    assert!(g.is_leaf("a"));
    assert!(!g.is_leaf("root"));
    assert!(!g.is_leaf("missing"));
    assert_eq!(g.roots().count(), 1);
    assert_eq!(g.outgoing("a").count(), 1);
    assert_eq!(g.numeric("a", "LOC"), Some(10.0));
    assert!(g.is_descendant_of("b", "root"));
    assert!(!g.is_descendant_of("root", "b"));
}

#[test]
fn duplicate_ids_are_rejected() {
    let err = Graph::new(
        "dup",
        vec![Node::new("x", "File"), Node::new("x", "File")],
        vec![],
    )
    .unwrap_err();
    assert!(err.to_string().contains("duplicate node id"));
}

#[test]
fn unknown_parent_and_dangling_edges_are_rejected() {
    assert!(Graph::new("p", vec![Node::new("x", "File").with_parent("nope")], vec![]).is_err());
    assert!(
        Graph::new(
            "e",
            vec![Node::new("x", "File")],
            vec![Edge::new("e", "x", "nope")]
        )
        .is_err()
    );
}

#[test]
fn parent_cycles_are_rejected() {
    let err = Graph::new(
        "cycle",
        vec![
            Node::new("x", "Dir").with_parent("y"),
            Node::new("y", "Dir").with_parent("x"),
        ],
        vec![],
    )
    .unwrap_err();
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn json_series_parses_and_validates() {
    let json = r#"[
        {"name": "r0", "nodes": [{"id": "a", "type": "File", "attributes": {"ints": {"LOC": 3}}}]},
        {"name": "r1", "nodes": [{"id": "a", "type": "File"}, {"id": "b", "type": "File"}],
         "edges": [{"id": "e", "source": "a", "target": "b"}]}
    ]"#;
    let series = GraphSeries::from_reader(json.as_bytes()).unwrap();
    assert_eq!(series.len(), 2);
    let r0 = series.get(SnapshotId(0)).unwrap();
    assert_eq!(r0.numeric("a", "LOC"), Some(3.0));
    assert_eq!(series.get(SnapshotId(1)).unwrap().edge_count(), 1);

    let bad = r#"[{"nodes": [{"id": "a", "parent": "ghost"}]}]"#;
    assert!(GraphSeries::from_reader(bad.as_bytes()).is_err());
}
