use super::*;
use crate::foundation::error::EvoError;
use crate::graph::model::Edge;

fn settings(node_layout: &str) -> EvolutionSettings {
    EvolutionSettings {
        node_layout: node_layout.to_string(),
        width_metric: "w".into(),
        height_metric: "h".into(),
        depth_metric: "w".into(),
        style_metric: "h".into(),
        min_block_length: 1.0,
        max_block_length: 5.0,
        ..EvolutionSettings::default()
    }
}

fn project() -> Graph {
    Graph::new(
        "p",
        vec![
            Node::new("root", "Dir"),
            Node::new("a", "File").with_parent("root").with_float("w", 1.0).with_float("h", 10.0),
            Node::new("b", "File").with_parent("root").with_float("w", 3.0).with_float("h", 20.0),
            Node::new("lib", "Dir").with_parent("root"),
            Node::new("lib/x", "File").with_parent("lib").with_float("w", 2.0).with_float("h", 15.0),
            Node::new("lib/y", "File").with_parent("lib").with_float("w", 2.0).with_float("h", 15.0),
        ],
        vec![Edge::new("ab", "a", "b"), Edge::new("x-a", "lib/x", "a")],
    )
    .unwrap()
}

fn pipeline(s: &EvolutionSettings) -> LayoutPipeline {
    let series = GraphSeries::new(vec![project()]);
    LayoutPipeline::for_series(&LayoutRegistry::default(), s, &series).unwrap()
}

#[test]
fn flat_pass_scales_and_places_leaves_only() {
    let pass = pipeline(&settings("grid")).run(&project()).unwrap();
    assert_eq!(pass.nodes.len(), 4);
    assert!(pass.nodes.by_id("root").is_none());
    let a = pass.nodes.by_id("a").unwrap();
    let b = pass.nodes.by_id("b").unwrap();
    assert_eq!(a.local_scale, Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(b.local_scale, Vec3::new(5.0, 5.0, 5.0));
    for (_, n) in pass.nodes.iter() {
        assert!(n.ground().abs() < 1e-9, "{} grounded at {}", n.id(), n.ground());
    }
    assert_eq!(pass.edges.len(), 2);
    assert_eq!(pass.styles["a"], 0);
    assert_eq!(pass.styles["b"], 9);
}

#[test]
fn nested_pass_includes_inner_nodes() {
    let pass = pipeline(&settings("nested")).run(&project()).unwrap();
    assert_eq!(pass.nodes.len(), 6);
    let root = pass.nodes.by_id("root").unwrap();
    let lib = pass.nodes.by_id("lib").unwrap();
    assert!((lib.ground() - root.roof()).abs() < 1e-9);
    assert_eq!(lib.level(), 1);
}

#[test]
fn sublayout_members_follow_their_root() {
    let mut s = settings("nested");
    s.sublayouts.push(Sublayout {
        root: "lib".into(),
        layout: "strip".into(),
    });
    let pass = pipeline(&s).run(&project()).unwrap();
    let lib = pass.nodes.by_id("lib").unwrap();
    assert!(lib.is_sublayout_root);
    let lib_rect = lib.transform().footprint();
    for id in ["lib/x", "lib/y"] {
        let m = pass.nodes.by_id(id).unwrap();
        assert!(m.is_sublayout_node);
        assert_eq!(m.sublayout_root, pass.nodes.index_of("lib"));
        assert!((m.ground() - lib.roof()).abs() < 1e-9);
        let r = m.transform().footprint();
        assert!(r.x0 >= lib_rect.x0 - 1e-9 && r.x1 <= lib_rect.x1 + 1e-9);
    }
    // strip places members side by side along x
    let x = pass.nodes.by_id("lib/x").unwrap().center_position;
    let y = pass.nodes.by_id("lib/y").unwrap().center_position;
    assert_eq!(x.z, y.z);
    assert!(y.x > x.x);
}

#[test]
fn dangling_edge_target_aborts_the_pass() {
    let g = Graph::new(
        "bad",
        vec![Node::new("dir", "Dir"), Node::new("f", "File").with_parent("dir")],
        vec![Edge::new("f-dir", "f", "dir")],
    )
    .unwrap();
    let series = GraphSeries::new(vec![g.clone()]);
    let p = LayoutPipeline::for_series(&LayoutRegistry::default(), &settings("grid"), &series)
        .unwrap();
    assert!(matches!(p.run(&g), Err(EvoError::Identity(_))));
    // hierarchical layouts register the directory, so the same edge resolves
    let p = LayoutPipeline::for_series(&LayoutRegistry::default(), &settings("nested"), &series)
        .unwrap();
    assert_eq!(p.run(&g).unwrap().edges.len(), 1);
}

#[test]
fn unknown_strategy_is_rejected() {
    let series = GraphSeries::new(vec![project()]);
    let err = LayoutPipeline::for_series(&LayoutRegistry::empty(), &settings("grid"), &series)
        .err()
        .unwrap();
    assert!(matches!(err, EvoError::Validation(_)));
}
