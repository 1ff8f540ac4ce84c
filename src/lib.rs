//! evocity lays out and animates the evolution of "software city" graph series.
//!
//! A series is an ordered list of immutable hierarchical graph snapshots. Nodes and edges keep
//! their string identity across snapshots; that identity is the only thing tying a node in one
//! revision to the "same" node in another.
//!
//! # Pipeline overview
//!
//! 1. **Layout**: every snapshot is laid out up front (`LayoutPipeline` over a `LayoutNodes`
//!    arena) with a registered node layout, an edge layout and a series-wide `Scaler`, and the
//!    results are kept in a `LayoutCache`.
//! 2. **Diff**: a transition between two cached snapshots classifies every node as added,
//!    changed, deleted or unchanged (`GraphDiff`) and pairs edges by identity (`match_edges`).
//! 3. **Animate**: `EvolutionRenderer` drives node tweens (`NodeAnimator`) and interpolates
//!    matched edge curves itself, lowering curve resolution when frames get slow.
//!
//! Visual output goes through the `VisualFactory` trait; `HeadlessScene` records it in memory.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded and tick driven**: nothing blocks, all waiting is "resume on a later tick".
//! - **Refusals are values**: control requests return `Request::Rejected` instead of failing.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod config;
mod diff;
mod evolution;
mod foundation;
mod graph;
mod layout;
mod scene;

pub use animation::animator::{FinishedTween, NodeAnimator, OnComplete};
pub use animation::deferred::DeferredQueue;
pub use animation::ease::Ease;
pub use animation::sampler::{
    EdgeMorph, PerformanceScore, SAMPLE_BOUNDS, SamplingPolicy, curve_length, resample_polyline,
    sample_curve,
};
pub use config::{AnimationSettings, EvolutionSettings};
pub use diff::graph_diff::{AttributeDiff, Difference, EdgeMatch, GraphDiff, match_edges};
pub use evolution::renderer::{EvolutionEvent, EvolutionRenderer, RejectReason, Request};
pub use evolution::session::{AnimationSession, RevisionChanges};
pub use foundation::core::{NodeTransform, Point, Rect, Size, SnapshotId, Vec3};
pub use foundation::error::{EvoError, EvoResult};
pub use graph::model::{Attributes, Edge, Graph, GraphSeries, Node};
pub use layout::cache::{LaidOutGraph, LayoutCache};
pub use layout::edges::{EdgeLayout, EdgePath, NoEdgeLayout, SplineEdgeLayout, StraightEdgeLayout};
pub use layout::flat::{GridLayout, StripLayout};
pub use layout::nested::NestedLayout;
pub use layout::node::{LayoutIdx, LayoutNode, LayoutNodes};
pub use layout::pipeline::{BlockMetrics, LayoutPass, LayoutPipeline, Sublayout};
pub use layout::scale::{DEFAULT_ZSCORE_WINDOW, Scaler, ScalingMode, style_index};
pub use layout::strategy::{
    LayoutParams, LayoutRegistry, NodeLayout, Placements, apply_layout, bounding_box,
    is_placed_by_main, move_to, stack,
};
pub use scene::headless::{HeadlessScene, ProxyKind, ProxyState};
pub use scene::objects::ObjectManager;
pub use scene::proxy::{Marker, ProxyHandle, VisualFactory};
