use super::*;
use crate::graph::model::{Graph, Node};
use crate::layout::strategy::apply_layout;

fn project() -> Graph {
    Graph::new(
        "proj",
        vec![
            Node::new("src", "Dir"),
            Node::new("src/a.rs", "File").with_parent("src"),
            Node::new("src/b.rs", "File").with_parent("src"),
            Node::new("src/util", "Dir").with_parent("src"),
            Node::new("src/util/c.rs", "File").with_parent("src/util"),
            Node::new("docs", "Dir"),
        ],
        vec![],
    )
    .unwrap()
}

fn laid_out() -> LayoutNodes {
    let g = project();
    let mut nodes = LayoutNodes::build(&g, |_| true);
    nodes.set_levels();
    let layout = NestedLayout::new(LayoutParams::default());
    let placements = layout.layout(&nodes).unwrap();
    assert_eq!(placements.len(), nodes.len());
    apply_layout(&mut nodes, &placements).unwrap();
    nodes
}

fn contains(outer: Rect, inner: Rect) -> bool {
    const EPS: f64 = 1e-9;
    inner.x0 >= outer.x0 - EPS
        && inner.y0 >= outer.y0 - EPS
        && inner.x1 <= outer.x1 + EPS
        && inner.y1 <= outer.y1 + EPS
}

#[test]
fn is_hierarchical() {
    assert!(NestedLayout::new(LayoutParams::default()).is_hierarchical());
}

#[test]
fn children_sit_inside_and_on_top_of_parents() {
    let nodes = laid_out();
    for idx in nodes.indices() {
        let Some(parent) = nodes.parent(idx) else {
            continue;
        };
        let (c, p) = (nodes.get(idx), nodes.get(parent));
        assert!(contains(p.transform().footprint(), c.transform().footprint()));
        assert!((c.ground() - p.roof()).abs() < 1e-9);
    }
}

#[test]
fn inner_nodes_are_thin_plates() {
    let nodes = laid_out();
    let src = nodes.by_id("src").unwrap();
    assert_eq!(src.local_scale.y, LayoutParams::default().inner_node_height);
    let file = nodes.by_id("src/a.rs").unwrap();
    assert_eq!(file.local_scale.y, 1.0);
}

#[test]
fn roots_do_not_overlap() {
    let nodes = laid_out();
    let a = nodes.by_id("src").unwrap().transform().footprint();
    let b = nodes.by_id("docs").unwrap().transform().footprint();
    assert!(a.intersect(b).area() < 1e-9);
}

#[test]
fn sublayout_root_is_treated_as_a_box() {
    let g = project();
    let mut nodes = LayoutNodes::build(&g, |_| true);
    let util = nodes.index_of("src/util").unwrap();
    let c = nodes.index_of("src/util/c.rs").unwrap();
    nodes.get_mut(util).is_sublayout_node = true;
    nodes.get_mut(util).is_sublayout_root = true;
    nodes.get_mut(util).local_scale = Vec3::new(3.0, 0.5, 2.0);
    nodes.get_mut(c).is_sublayout_node = true;
    let p = NestedLayout::new(LayoutParams::default()).layout(&nodes).unwrap();
    assert!(!p.contains_key(&c));
    assert_eq!(p[&util].scale, Vec3::new(3.0, 0.5, 2.0));
}
