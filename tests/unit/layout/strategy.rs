use super::*;
use crate::graph::model::{Graph, Node};

fn pair() -> Graph {
    Graph::new(
        "p",
        vec![
            Node::new("dir", "Dir"),
            Node::new("a", "File").with_parent("dir"),
            Node::new("b", "File").with_parent("dir"),
        ],
        vec![],
    )
    .unwrap()
}

#[test]
fn apply_layout_converts_ground_to_centre() {
    let g = pair();
    let mut nodes = LayoutNodes::build(&g, |_| true);
    let mut placements = Placements::new();
    for idx in nodes.indices() {
        placements.insert(
            idx,
            NodeTransform::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 4.0, 1.0)),
        );
    }
    apply_layout(&mut nodes, &placements).unwrap();
    for (_, n) in nodes.iter() {
        assert_eq!(n.center_position, Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(n.ground(), 2.0);
    }
}

#[test]
fn apply_layout_rejects_unplaced_nodes() {
    let g = pair();
    let mut nodes = LayoutNodes::build(&g, |_| true);
    let mut placements = Placements::new();
    placements.insert(nodes.index_of("a").unwrap(), NodeTransform::default());
    let err = apply_layout(&mut nodes, &placements).unwrap_err();
    assert!(matches!(err, EvoError::Layout(_)));
}

#[test]
fn apply_layout_tolerates_unplaced_sublayout_members() {
    let g = pair();
    let mut nodes = LayoutNodes::build(&g, |_| true);
    let b = nodes.index_of("b").unwrap();
    nodes.get_mut(b).is_sublayout_node = true;
    let mut placements = Placements::new();
    for idx in nodes.indices().filter(|&i| i != b) {
        placements.insert(idx, NodeTransform::default());
    }
    apply_layout(&mut nodes, &placements).unwrap();
}

#[test]
fn move_to_centres_and_grounds() {
    let g = pair();
    let mut nodes = LayoutNodes::build(&g, |n| n.id != "dir");
    let a = nodes.index_of("a").unwrap();
    let b = nodes.index_of("b").unwrap();
    nodes.get_mut(a).center_position = Vec3::new(10.0, 5.0, 10.0);
    nodes.get_mut(b).center_position = Vec3::new(14.0, 7.0, 10.0);
    move_to(&mut nodes, Vec3::ZERO);
    let (lo, hi) = bounding_box(&nodes);
    assert_eq!(lo.y, 0.0);
    assert_eq!((lo.x + hi.x) / 2.0, 0.0);
    assert_eq!((lo.z + hi.z) / 2.0, 0.0);
}

#[test]
fn stack_puts_children_on_roofs() {
    let g = pair();
    let mut nodes = LayoutNodes::build(&g, |_| true);
    let dir = nodes.index_of("dir").unwrap();
    nodes.get_mut(dir).local_scale = Vec3::new(5.0, 2.0, 5.0);
    stack(&mut nodes, 1.0);
    assert_eq!(nodes.get(dir).ground(), 1.0);
    let a = nodes.by_id("a").unwrap();
    assert_eq!(a.ground(), 3.0);
}

#[test]
fn registry_knows_builtins_and_rejects_unknown_names() {
    let r = LayoutRegistry::default();
    for name in ["grid", "strip", "nested"] {
        assert!(r.has_node_layout(name));
        let layout = r.node_layout(name, &LayoutParams::default()).unwrap();
        assert_eq!(layout.name(), name);
    }
    for name in ["straight", "spline", "none"] {
        assert!(r.has_edge_layout(name));
        let layout = r.edge_layout(name, &LayoutParams::default()).unwrap();
        assert_eq!(layout.name(), name);
    }
    assert!(matches!(
        r.node_layout("treemap", &LayoutParams::default()),
        Err(EvoError::Validation(_))
    ));
    assert!(!LayoutRegistry::empty().has_edge_layout("spline"));
}
