use crate::foundation::core::{NodeTransform, SnapshotId};
use crate::foundation::error::{EvoError, EvoResult};
use crate::graph::model::{Graph, GraphSeries};
use crate::layout::edges::EdgePath;
use crate::layout::node::LayoutNodes;
use crate::layout::pipeline::LayoutPipeline;
use crate::scene::objects::ObjectManager;
use crate::scene::proxy::VisualFactory;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A snapshot paired with its computed layout. Immutable once cached.
#[derive(Clone, Debug)]
pub struct LaidOutGraph {
    snapshot: SnapshotId,
    graph: Arc<Graph>,
    nodes: LayoutNodes,
    edges: BTreeMap<String, EdgePath>,
    styles: BTreeMap<String, usize>,
}

impl LaidOutGraph {
    /// Position of the snapshot in its series.
    pub fn snapshot(&self) -> SnapshotId {
        self.snapshot
    }

    /// The laid-out snapshot.
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Laid-out nodes, addressed by graph-node identity.
    pub fn nodes(&self) -> &LayoutNodes {
        &self.nodes
    }

    /// Whether node `id` takes part in this layout.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.index_of(id).is_some()
    }

    /// Target transform of node `id` (block centre).
    pub fn transform(&self, id: &str) -> Option<NodeTransform> {
        self.nodes.by_id(id).map(|n| n.transform())
    }

    /// Identities of the laid-out nodes, in registration order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|(_, n)| n.id())
    }

    /// Control polygon of edge `id`.
    pub fn edge_path(&self, id: &str) -> Option<&EdgePath> {
        self.edges.get(id)
    }

    /// Edge paths ordered by edge identity.
    pub fn edge_paths(&self) -> impl Iterator<Item = &EdgePath> {
        self.edges.values()
    }

    /// Style of leaf `id`.
    pub fn style(&self, id: &str) -> Option<usize> {
        self.styles.get(id).copied()
    }
}

fn in_snapshot(e: EvoError, id: SnapshotId, name: &str) -> EvoError {
    let at = |msg: String| format!("snapshot {} ('{name}'): {msg}", id.0);
    match e {
        EvoError::Validation(m) => EvoError::Validation(at(m)),
        EvoError::Identity(m) => EvoError::Identity(at(m)),
        EvoError::Geometry(m) => EvoError::Geometry(at(m)),
        EvoError::Layout(m) => EvoError::Layout(at(m)),
        EvoError::Serde(m) => EvoError::Serde(at(m)),
        other => other,
    }
}

/// One [`LaidOutGraph`] per snapshot of a series, computed up front.
#[derive(Clone, Debug, Default)]
pub struct LayoutCache {
    entries: Vec<LaidOutGraph>,
}

impl LayoutCache {
    /// Lay out every snapshot of `series` in order.
    ///
    /// A hidden proxy is registered in `objects` for every node that is laid out in any
    /// snapshot. The first failing snapshot aborts the whole computation.
    #[tracing::instrument(skip_all, fields(snapshots = series.len()))]
    pub fn precompute(
        series: &GraphSeries,
        pipeline: &LayoutPipeline,
        objects: &mut ObjectManager,
        factory: &mut dyn VisualFactory,
    ) -> EvoResult<Self> {
        let mut entries = Vec::with_capacity(series.len());
        for (id, graph) in series.iter() {
            let pass = pipeline
                .run(graph)
                .map_err(|e| in_snapshot(e, id, graph.name()))?;
            for (_, n) in pass.nodes.iter() {
                let Some(node) = graph.node(n.id()) else {
                    continue;
                };
                let (h, created) = objects.get_or_create_node(factory, node);
                if created {
                    factory.set_visible(h, false);
                }
            }
            tracing::debug!(
                snapshot = id.0,
                nodes = pass.nodes.len(),
                edges = pass.edges.len(),
                "snapshot laid out"
            );
            entries.push(LaidOutGraph {
                snapshot: id,
                graph: Arc::clone(graph),
                nodes: pass.nodes,
                edges: pass
                    .edges
                    .into_iter()
                    .map(|e| (e.edge_id.clone(), e))
                    .collect(),
                styles: pass.styles,
            });
        }
        Ok(Self { entries })
    }

    /// Cached layout of `id`; `None` if the snapshot was never precomputed.
    pub fn try_get(&self, id: SnapshotId) -> Option<&LaidOutGraph> {
        self.entries.get(id.0)
    }

    /// Number of cached snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/cache.rs"]
mod tests;
