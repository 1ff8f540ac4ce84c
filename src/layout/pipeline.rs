use crate::config::EvolutionSettings;
use crate::foundation::core::{NodeTransform, Vec3};
use crate::foundation::error::EvoResult;
use crate::graph::model::{Graph, GraphSeries, Node};
use crate::layout::edges::{EdgeLayout, EdgePath};
use crate::layout::node::{LayoutIdx, LayoutNodes};
use crate::layout::scale::Scaler;
use crate::layout::strategy::{
    LayoutParams, LayoutRegistry, NodeLayout, apply_layout, bounding_box, move_to,
};
use std::collections::BTreeMap;

/// A subtree laid out by its own strategy and re-embedded into the main pass.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sublayout {
    /// Identity of the subtree root.
    pub root: String,
    /// Registered node-layout name used inside the subtree.
    pub layout: String,
}

/// Metric names that drive block dimensions and style.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlockMetrics {
    /// Metric mapped onto block width.
    pub width: String,
    /// Metric mapped onto block height.
    pub height: String,
    /// Metric mapped onto block depth.
    pub depth: String,
    /// Metric selecting the node style.
    pub style: String,
}

impl Default for BlockMetrics {
    fn default() -> Self {
        Self {
            width: "Metric.Number_of_Tokens".to_string(),
            height: "Metric.Lines.LOC".to_string(),
            depth: "Metric.Number_of_Tokens".to_string(),
            style: "Metric.Complexity".to_string(),
        }
    }
}

impl BlockMetrics {
    /// Distinct metric names in use.
    pub fn names(&self) -> Vec<String> {
        let mut out: Vec<String> = [&self.width, &self.height, &self.depth, &self.style]
            .into_iter()
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

/// Output of one layout pass over a snapshot.
#[derive(Clone, Debug)]
pub struct LayoutPass {
    /// Placed nodes, block centres at `position`.
    pub nodes: LayoutNodes,
    /// Edge control polygons computed from the placed nodes.
    pub edges: Vec<EdgePath>,
    /// Discrete style of every registered leaf.
    pub styles: BTreeMap<String, usize>,
}

struct SubPass {
    root: String,
    members: BTreeMap<String, NodeTransform>,
    footprint: Vec3,
}

/// Everything needed to lay out any snapshot of one series.
pub struct LayoutPipeline {
    node_layout: Box<dyn NodeLayout>,
    edge_layout: Box<dyn EdgeLayout>,
    sublayouts: Vec<(String, Box<dyn NodeLayout>)>,
    scaler: Scaler,
    metrics: BlockMetrics,
    style_count: usize,
    params: LayoutParams,
}

impl LayoutPipeline {
    /// Instantiate the strategies named in `settings` from `registry`.
    pub fn new(
        registry: &LayoutRegistry,
        settings: &EvolutionSettings,
        scaler: Scaler,
    ) -> EvoResult<Self> {
        let params = settings.layout;
        let sublayouts = settings
            .sublayouts
            .iter()
            .map(|s| Ok((s.root.clone(), registry.node_layout(&s.layout, &params)?)))
            .collect::<EvoResult<Vec<_>>>()?;
        Ok(Self {
            node_layout: registry.node_layout(&settings.node_layout, &params)?,
            edge_layout: registry.edge_layout(&settings.edge_layout, &params)?,
            sublayouts,
            scaler,
            metrics: settings.block_metrics(),
            style_count: settings.style_count,
            params,
        })
    }

    /// Pipeline whose scaler is fitted over every snapshot of `series`.
    pub fn for_series(
        registry: &LayoutRegistry,
        settings: &EvolutionSettings,
        series: &GraphSeries,
    ) -> EvoResult<Self> {
        let scaler = Scaler::new(
            settings.scaling,
            series.iter().map(|(_, g)| g.as_ref()),
            &settings.block_metrics().names(),
            settings.min_block_length,
            settings.max_block_length,
        )?
        .with_zscore_window(settings.zscore_window)?;
        Self::new(registry, settings, scaler)
    }

    /// Name of the main node layout.
    pub fn node_layout_name(&self) -> &str {
        self.node_layout.name()
    }

    /// Name of the edge layout.
    pub fn edge_layout_name(&self) -> &str {
        self.edge_layout.name()
    }

    fn leaf_scale(&self, graph: &Graph, id: &str) -> Vec3 {
        Vec3::new(
            self.scaler.normalized_value(&self.metrics.width, graph, id),
            self.scaler.normalized_value(&self.metrics.height, graph, id),
            self.scaler.normalized_value(&self.metrics.depth, graph, id),
        )
    }

    fn scale_leaves(&self, graph: &Graph, nodes: &mut LayoutNodes) {
        for idx in nodes.indices() {
            let n = nodes.get_mut(idx);
            if n.is_leaf() {
                n.local_scale = self.leaf_scale(graph, n.id());
            }
        }
    }

    fn place(&self, layout: &dyn NodeLayout, nodes: &mut LayoutNodes) -> EvoResult<()> {
        if layout.uses_edges() {
            for idx in nodes.indices() {
                nodes.outgoing(idx)?;
            }
        }
        let placements = layout.layout(nodes)?;
        apply_layout(nodes, &placements)
    }

    fn run_sublayout(
        &self,
        graph: &Graph,
        root: &str,
        layout: &dyn NodeLayout,
    ) -> EvoResult<Option<SubPass>> {
        let hierarchical = layout.is_hierarchical();
        let mut nodes = LayoutNodes::build(graph, |n| {
            n.id != root
                && graph.is_descendant_of(&n.id, root)
                && (hierarchical || graph.is_leaf(&n.id))
        });
        if nodes.is_empty() {
            return Ok(None);
        }
        self.scale_leaves(graph, &mut nodes);
        nodes.set_levels();
        self.place(layout, &mut nodes)?;
        move_to(&mut nodes, Vec3::ZERO);
        let (lo, hi) = bounding_box(&nodes);
        Ok(Some(SubPass {
            root: root.to_string(),
            members: nodes.transforms(),
            footprint: Vec3::new(hi.x - lo.x, self.params.inner_node_height, hi.z - lo.z),
        }))
    }

    /// Lay out `graph`.
    ///
    /// Fails if an edge of a registered node targets a node missing from the pass.
    #[tracing::instrument(level = "debug", skip_all, fields(graph = graph.name()))]
    pub fn run(&self, graph: &Graph) -> EvoResult<LayoutPass> {
        let mut subs: Vec<SubPass> = Vec::new();
        for (root, layout) in &self.sublayouts {
            if !graph.contains_node(root) {
                continue;
            }
            if subs.iter().any(|s| graph.is_descendant_of(root, &s.root)) {
                tracing::warn!(root = %root, "sub-layout nested in another sub-layout ignored");
                continue;
            }
            if let Some(sub) = self.run_sublayout(graph, root, layout.as_ref())? {
                subs.push(sub);
            }
        }

        let hierarchical = self.node_layout.is_hierarchical();
        let admit = |n: &Node| {
            hierarchical
                || graph.is_leaf(&n.id)
                || subs
                    .iter()
                    .any(|s| s.root == n.id || s.members.contains_key(&n.id))
        };
        let mut nodes = LayoutNodes::build(graph, admit);
        self.scale_leaves(graph, &mut nodes);
        nodes.set_levels();

        let mut members: Vec<LayoutIdx> = Vec::new();
        for sub in &subs {
            let Some(root) = nodes.index_of(&sub.root) else {
                continue;
            };
            let r = nodes.get_mut(root);
            r.is_sublayout_node = true;
            r.is_sublayout_root = true;
            r.local_scale = sub.footprint;
            for (id, t) in &sub.members {
                let Some(m) = nodes.index_of(id) else {
                    continue;
                };
                let n = nodes.get_mut(m);
                n.is_sublayout_node = true;
                n.sublayout_root = Some(root);
                n.relative_position = t.position;
                n.local_scale = t.scale;
                n.rotation = t.rotation;
                members.push(m);
            }
        }

        self.place(self.node_layout.as_ref(), &mut nodes)?;
        for m in members {
            let Some(root) = nodes.get(m).sublayout_root else {
                continue;
            };
            let (r_center, r_roof) = {
                let r = nodes.get(root);
                (r.center_position, r.roof())
            };
            let n = nodes.get_mut(m);
            n.center_position = Vec3::new(
                r_center.x + n.relative_position.x,
                r_roof + n.relative_position.y,
                r_center.z + n.relative_position.z,
            );
        }
        move_to(&mut nodes, Vec3::new(0.0, self.params.ground_level, 0.0));

        let edges = self.edge_layout.create(&nodes)?;
        let styles = nodes
            .iter()
            .filter(|(_, n)| n.is_leaf())
            .map(|(_, n)| {
                let s = self
                    .scaler
                    .style_index(&self.metrics.style, graph, n.id(), self.style_count);
                (n.id().to_string(), s)
            })
            .collect();
        Ok(LayoutPass {
            nodes,
            edges,
            styles,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/pipeline.rs"]
mod tests;
