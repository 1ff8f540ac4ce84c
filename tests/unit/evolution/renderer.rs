use super::*;
use crate::config::AnimationSettings;
use crate::graph::model::{Edge, Graph, Node};
use crate::scene::headless::HeadlessScene;

const DT: f64 = 0.02;

fn file(id: &str, loc: f64) -> Node {
    Node::new(id, "File").with_float("loc", loc)
}

fn series() -> GraphSeries {
    GraphSeries::new(vec![
        Graph::new("s0", vec![file("A", 10.0), file("B", 20.0)], vec![Edge::new("AB", "A", "B")])
            .unwrap(),
        Graph::new("s1", vec![file("B", 20.0), file("C", 5.0)], vec![Edge::new("BC", "B", "C")])
            .unwrap(),
        Graph::new(
            "s2",
            vec![file("B", 30.0), file("C", 5.0), file("D", 1.0)],
            vec![Edge::new("BC", "B", "C")],
        )
        .unwrap(),
    ])
}

fn settings() -> EvolutionSettings {
    EvolutionSettings {
        width_metric: "loc".into(),
        height_metric: "loc".into(),
        depth_metric: "loc".into(),
        style_metric: "loc".into(),
        min_block_length: 1.0,
        max_block_length: 3.0,
        animation: AnimationSettings {
            duration_secs: 0.2,
            ..AnimationSettings::default()
        },
        ..EvolutionSettings::default()
    }
}

fn renderer() -> EvolutionRenderer<HeadlessScene> {
    let mut r = EvolutionRenderer::new(settings(), HeadlessScene::new()).unwrap();
    r.precompute(&series()).unwrap();
    r
}

fn settle(r: &mut EvolutionRenderer<HeadlessScene>) {
    for _ in 0..10_000 {
        if !r.is_animating() && !r.is_auto_play() && !r.is_auto_play_reverse() {
            return;
        }
        r.tick(DT);
    }
    panic!("renderer did not settle");
}

fn shown(r: &mut EvolutionRenderer<HeadlessScene>, index: usize) {
    assert!(r.show_index(index).is_accepted());
    settle(r);
    r.take_events();
}

#[test]
fn requests_before_precompute_are_rejected() {
    let mut r = EvolutionRenderer::new(settings(), HeadlessScene::new()).unwrap();
    assert_eq!(r.show_first(), Request::Rejected(RejectReason::NotPrecomputed));
    assert_eq!(r.show_next(), Request::Rejected(RejectReason::NotPrecomputed));
    assert_eq!(r.set_auto_play(true), Request::Rejected(RejectReason::NotPrecomputed));
    assert_eq!(r.graph_count(), 0);
    assert!(r.take_events().is_empty());
}

#[test]
fn invalid_settings_fail_construction() {
    let bad = EvolutionSettings {
        node_layout: "circle-packing".into(),
        ..settings()
    };
    assert!(EvolutionRenderer::new(bad, HeadlessScene::new()).is_err());
}

#[test]
fn stepping_needs_a_shown_graph() {
    let mut r = renderer();
    assert_eq!(r.graph_count(), 3);
    assert_eq!(r.show_next(), Request::Rejected(RejectReason::NothingShown));
    assert_eq!(r.set_auto_play(true), Request::Rejected(RejectReason::NothingShown));
}

#[test]
fn show_first_raises_every_node() {
    let mut r = renderer();
    assert!(r.show_first().is_accepted());
    assert!(r.is_animating());
    assert_eq!(
        r.take_events(),
        vec![EvolutionEvent::TransitionStarted {
            from: None,
            to: SnapshotId(0)
        }]
    );
    // edges appear only once the transition completes
    assert!(r.factory().edges().is_empty());
    settle(&mut r);

    assert_eq!(r.current_index(), Some(SnapshotId(0)));
    assert_eq!(r.factory().visible_nodes(), vec!["A", "B"]);
    assert_eq!(r.factory().edges(), vec!["AB"]);
    let changes = r.last_changes().unwrap();
    assert_eq!(changes.added, vec!["A".to_string(), "B".to_string()]);
    let events = r.take_events();
    assert_eq!(events[0], EvolutionEvent::ShownGraphChanged { index: SnapshotId(0) });
    assert!(matches!(
        events[1],
        EvolutionEvent::TransitionFinished { index: SnapshotId(0), .. }
    ));
}

#[test]
fn second_request_during_transition_is_rejected() {
    let mut r = renderer();
    shown(&mut r, 0);
    assert!(r.show_next().is_accepted());
    assert_eq!(r.show_next(), Request::Rejected(RejectReason::Transitioning));
    assert_eq!(r.show_index(2), Request::Rejected(RejectReason::Transitioning));
    assert_eq!(r.session().unwrap().to(), SnapshotId(1));
    assert_eq!(r.current_index(), Some(SnapshotId(0)));
    settle(&mut r);
    assert_eq!(r.current_index(), Some(SnapshotId(1)));
}

#[test]
fn bounds_are_reported() {
    let mut r = renderer();
    assert_eq!(
        r.show_index(7),
        Request::Rejected(RejectReason::IndexOutOfRange { index: 7, len: 3 })
    );
    shown(&mut r, 0);
    assert_eq!(r.show_previous(), Request::Rejected(RejectReason::AtFirstGraph));
    shown(&mut r, 2);
    assert_eq!(r.show_next(), Request::Rejected(RejectReason::AtLastGraph));
    assert!(r.show_previous().is_accepted());
}

#[test]
fn removed_nodes_are_destroyed_after_sinking() {
    let mut r = renderer();
    shown(&mut r, 0);
    assert!(r.show_next().is_accepted());
    r.tick(DT);
    let a = r.factory().node("A").unwrap();
    assert_eq!(a.marker, Some(crate::scene::proxy::Marker::Dead));
    settle(&mut r);
    assert!(r.factory().node("A").is_none());
    assert_eq!(r.factory().visible_nodes(), vec!["B", "C"]);
    assert_eq!(r.factory().edges(), vec!["BC"]);
    let changes = r.last_changes().unwrap();
    assert_eq!(changes.removed, vec!["A".to_string()]);
    assert_eq!(changes.added, vec!["C".to_string()]);
    assert!(changes.changed.is_empty());
}

#[test]
fn changed_nodes_are_reported() {
    let mut r = renderer();
    shown(&mut r, 1);
    assert!(r.show_next().is_accepted());
    settle(&mut r);
    let changes = r.last_changes().unwrap();
    assert_eq!(changes.changed, vec!["B".to_string()]);
    assert_eq!(changes.added, vec!["D".to_string()]);
}

#[test]
fn transitions_last_at_least_the_minimal_wait() {
    let mut r = renderer();
    assert!(r.set_animation_duration(0.0).is_accepted());
    assert!(r.show_first().is_accepted());
    r.tick(0.05);
    assert!(r.is_animating());
    r.tick(0.06);
    assert!(!r.is_animating());
    assert_eq!(
        r.set_animation_duration(f64::NAN),
        Request::Rejected(RejectReason::InvalidDuration)
    );
    assert_eq!(r.animation_duration(), 0.0);
}

#[test]
fn auto_play_runs_to_the_end_and_switches_off() {
    let mut r = renderer();
    shown(&mut r, 0);
    assert!(r.set_auto_play(true).is_accepted());
    assert!(r.is_auto_play());
    assert_eq!(r.show_next(), Request::Rejected(RejectReason::Transitioning));
    settle(&mut r);
    assert!(!r.is_auto_play());
    assert_eq!(r.current_index(), Some(SnapshotId(2)));

    let events = r.take_events();
    let finished: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            EvolutionEvent::TransitionFinished { index, .. } => Some(index.0),
            _ => None,
        })
        .collect();
    assert_eq!(finished, vec![1, 2]);
    assert_eq!(
        events.last(),
        Some(&EvolutionEvent::AutoPlayChanged {
            enabled: false,
            reverse: false
        })
    );
}

#[test]
fn manual_steps_are_rejected_during_auto_play() {
    let mut r = renderer();
    shown(&mut r, 0);
    assert!(r.set_auto_play(true).is_accepted());
    // let the first transition finish, stop before the next one starts
    while r.is_animating() {
        r.tick(DT);
    }
    assert!(r.is_auto_play());
    assert_eq!(r.show_previous(), Request::Rejected(RejectReason::AutoPlayActive));
    assert_eq!(r.show_index(0), Request::Rejected(RejectReason::AutoPlayActive));
    assert!(r.set_auto_play(false).is_accepted());
    assert!(!r.is_auto_play());
    r.tick(DT);
    assert!(!r.is_animating());
}

#[test]
fn reverse_auto_play_walks_back() {
    let mut r = renderer();
    shown(&mut r, 2);
    assert!(r.set_auto_play_reverse(true).is_accepted());
    assert!(r.is_auto_play_reverse());
    settle(&mut r);
    assert_eq!(r.current_index(), Some(SnapshotId(0)));
    assert_eq!(r.factory().visible_nodes(), vec!["A", "B"]);
}

#[test]
fn auto_play_at_the_end_is_refused() {
    let mut r = renderer();
    shown(&mut r, 2);
    assert_eq!(r.set_auto_play(true), Request::Rejected(RejectReason::AtLastGraph));
    assert!(!r.is_auto_play());
}

#[test]
fn failed_precompute_leaves_renderer_unprecomputed() {
    let mut r = renderer();
    let broken = GraphSeries::new(vec![
        Graph::new(
            "broken",
            vec![Node::new("d", "Dir"), Node::new("f", "File").with_parent("d")],
            vec![Edge::new("e", "f", "d")],
        )
        .unwrap(),
    ]);
    assert!(matches!(r.precompute(&broken), Err(EvoError::Identity(_))));
    assert_eq!(r.graph_count(), 0);
    assert_eq!(r.show_first(), Request::Rejected(RejectReason::NotPrecomputed));
}

#[test]
fn zero_duration_still_interpolates_edges_until_completion() {
    let mut r = renderer();
    shown(&mut r, 1);
    assert!(r.set_animation_duration(0.0).is_accepted());
    assert!(r.show_next().is_accepted());
    let target = r.session().unwrap().morphs().next().unwrap().target().to_vec();

    r.tick(0.001);
    assert!(r.is_animating());
    let line = &r.factory().edge("BC").unwrap().line;
    assert_ne!(line, &target);
    assert!(r.session().unwrap().progress() < 0.1);

    settle(&mut r);
    assert_eq!(r.factory().edge("BC").unwrap().line, target);
}

#[test]
fn slow_frames_halve_edge_resolution_once_per_transition() {
    let mut r = EvolutionRenderer::new(
        EvolutionSettings {
            animation: AnimationSettings {
                duration_secs: 2.0,
                ..AnimationSettings::default()
            },
            ..settings()
        },
        HeadlessScene::new(),
    )
    .unwrap();
    r.precompute(&series()).unwrap();
    shown(&mut r, 1);
    assert_eq!(r.performance_score(), 10);

    assert!(r.show_next().is_accepted());
    let samples = |r: &EvolutionRenderer<HeadlessScene>| {
        r.session().unwrap().morphs().next().unwrap().samples()
    };
    let full = samples(&r);
    assert!(full > 4);

    // -2 per slow frame: the score is 0 after five frames and drops below the floor on the sixth
    for _ in 0..5 {
        r.tick(0.05);
    }
    assert_eq!(r.performance_score(), 0);
    assert_eq!(samples(&r), full);

    r.tick(0.05);
    let halved = samples(&r);
    assert_eq!(halved, (full / 2).max(2) + (full / 2).max(2) % 2);
    assert_eq!(r.factory().edge("BC").unwrap().line.len(), halved);

    for _ in 0..6 {
        r.tick(0.05);
    }
    assert!(r.performance_score() < -10);
    assert_eq!(samples(&r), halved);
    settle(&mut r);
    assert_eq!(r.current_index(), Some(SnapshotId(2)));
}

#[test]
fn degenerate_edge_pair_is_snapped_at_completion() {
    let loop_series = GraphSeries::new(vec![
        Graph::new(
            "s0",
            vec![file("A", 10.0), file("B", 20.0)],
            vec![Edge::new("BB", "B", "B"), Edge::new("AB", "A", "B")],
        )
        .unwrap(),
        Graph::new(
            "s1",
            vec![file("A", 30.0), file("B", 20.0)],
            vec![Edge::new("BB", "B", "B"), Edge::new("AB", "A", "B")],
        )
        .unwrap(),
    ]);
    let mut r = EvolutionRenderer::new(
        EvolutionSettings {
            edge_layout: "straight".into(),
            ..settings()
        },
        HeadlessScene::new(),
    )
    .unwrap();
    r.precompute(&loop_series).unwrap();
    shown(&mut r, 0);
    assert!(r.show_next().is_accepted());

    let session = r.session().unwrap();
    assert_eq!(session.snapped_edges(), ["BB".to_string()]);
    let morphed: Vec<&str> = session.morphs().map(|m| m.edge_id()).collect();
    assert_eq!(morphed, vec!["AB"]);

    settle(&mut r);
    assert_eq!(r.current_index(), Some(SnapshotId(1)));
    let b = r.factory().node("B").unwrap().transform;
    let roof = b.position + Vec3::new(0.0, b.scale.y / 2.0, 0.0);
    let line = &r.factory().edge("BB").unwrap().line;
    assert!(!line.is_empty());
    assert!(line.iter().all(|p| p.distance(roof) < 1e-9));
}

#[test]
fn none_edge_layout_draws_no_edges() {
    let mut r = EvolutionRenderer::new(
        EvolutionSettings {
            edge_layout: "none".into(),
            ..settings()
        },
        HeadlessScene::new(),
    )
    .unwrap();
    r.precompute(&series()).unwrap();
    shown(&mut r, 0);
    assert!(r.factory().edges().is_empty());
    assert!(r.show_next().is_accepted());
    assert_eq!(r.session().unwrap().morphs().count(), 0);
    settle(&mut r);
    assert!(r.factory().edges().is_empty());
    assert_eq!(r.factory().visible_nodes(), vec!["B", "C"]);
}
