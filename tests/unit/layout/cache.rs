use super::*;
use crate::config::EvolutionSettings;
use crate::graph::model::{Edge, Node};
use crate::layout::strategy::LayoutRegistry;
use crate::scene::headless::HeadlessScene;

fn series() -> GraphSeries {
    GraphSeries::new(vec![
        Graph::new("s0", vec![Node::new("A", "File"), Node::new("B", "File")], vec![]).unwrap(),
        Graph::new(
            "s1",
            vec![Node::new("B", "File"), Node::new("C", "File")],
            vec![Edge::new("BC", "B", "C")],
        )
        .unwrap(),
    ])
}

fn build(series: &GraphSeries) -> EvoResult<(LayoutCache, ObjectManager, HeadlessScene)> {
    let settings = EvolutionSettings::default();
    let pipeline = LayoutPipeline::for_series(&LayoutRegistry::default(), &settings, series)?;
    let mut objects = ObjectManager::new();
    let mut scene = HeadlessScene::new();
    let cache = LayoutCache::precompute(series, &pipeline, &mut objects, &mut scene)?;
    Ok((cache, objects, scene))
}

#[test]
fn every_snapshot_is_cached() {
    let s = series();
    let (cache, _, _) = build(&s).unwrap();
    assert_eq!(cache.len(), 2);
    let s1 = cache.try_get(SnapshotId(1)).unwrap();
    assert_eq!(s1.snapshot(), SnapshotId(1));
    assert_eq!(s1.graph().name(), "s1");
    assert!(s1.contains_node("C"));
    assert!(!s1.contains_node("A"));
    assert!(s1.transform("B").is_some());
    assert_eq!(s1.edge_path("BC").unwrap().control_points.len(), 4);
    assert!(cache.try_get(SnapshotId(2)).is_none());
}

#[test]
fn proxies_exist_for_every_node_ever_seen_and_start_hidden() {
    let s = series();
    let (_, objects, scene) = build(&s).unwrap();
    assert_eq!(objects.node_count(), 3);
    assert!(objects.node("C").is_some());
    assert!(scene.visible_nodes().is_empty());
    assert_eq!(objects.edge_count(), 0);
}

#[test]
fn failing_snapshot_aborts_precompute() {
    let s = GraphSeries::new(vec![
        Graph::new("ok", vec![Node::new("A", "File")], vec![]).unwrap(),
        Graph::new(
            "broken",
            vec![Node::new("d", "Dir"), Node::new("f", "File").with_parent("d")],
            vec![Edge::new("e", "f", "d")],
        )
        .unwrap(),
    ]);
    let err = build(&s).err().unwrap();
    assert!(matches!(err, EvoError::Identity(_)));
    assert!(err.to_string().contains("snapshot 1 ('broken')"));
}
