use crate::foundation::core::{NodeTransform, Vec3};
use crate::foundation::error::{EvoError, EvoResult};
use crate::graph::model::{Graph, Node};
use std::collections::{BTreeMap, VecDeque};

/// Index of a [`LayoutNode`] within its [`LayoutNodes`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutIdx(pub usize);

/// Transient spatial proxy for one graph node, scoped to one layout pass.
#[derive(Clone, Debug)]
pub struct LayoutNode {
    id: String,
    is_leaf: bool,
    /// Centre of the block.
    pub center_position: Vec3,
    /// Extent of the block along each axis.
    pub local_scale: Vec3,
    /// Rotation about the y axis, in degrees.
    pub rotation: f64,
    /// Whether the node is laid out by a sub-layout rather than the main strategy.
    pub is_sublayout_node: bool,
    /// Whether the node roots a sub-layout.
    pub is_sublayout_root: bool,
    /// Root of the sub-layout this node belongs to.
    pub sublayout_root: Option<LayoutIdx>,
    /// Offset from the sub-layout root centre, valid for sub-layout members.
    pub relative_position: Vec3,
    level: usize,
    parent_id: Option<String>,
    child_ids: Vec<String>,
    outgoing: Vec<(String, String)>,
    parent: Option<LayoutIdx>,
    children: Vec<LayoutIdx>,
}

impl LayoutNode {
    fn new(node: &Node, graph: &Graph) -> Self {
        Self {
            id: node.id.clone(),
            is_leaf: graph.is_leaf(&node.id),
            center_position: Vec3::ZERO,
            local_scale: Vec3::ONE,
            rotation: 0.0,
            is_sublayout_node: false,
            is_sublayout_root: false,
            sublayout_root: None,
            relative_position: Vec3::ZERO,
            level: 0,
            parent_id: node.parent.clone(),
            child_ids: graph.children(&node.id).map(|c| c.id.clone()).collect(),
            outgoing: graph
                .outgoing(&node.id)
                .map(|e| (e.id.clone(), e.target.clone()))
                .collect(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Identity of the underlying graph node.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the underlying graph node is a leaf (independent of filtering).
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Tree level; roots are at level 0.
    pub fn level(&self) -> usize {
        self.level
    }

    /// y co-ordinate of the bottom face.
    pub fn ground(&self) -> f64 {
        self.center_position.y - self.local_scale.y / 2.0
    }

    /// y co-ordinate of the top face.
    pub fn roof(&self) -> f64 {
        self.center_position.y + self.local_scale.y / 2.0
    }

    /// Scale the block uniformly by `factor`.
    pub fn scale_by(&mut self, factor: f64) {
        self.local_scale *= factor;
    }

    /// Current spatial state.
    pub fn transform(&self) -> NodeTransform {
        NodeTransform {
            position: self.center_position,
            scale: self.local_scale,
            rotation: self.rotation,
        }
    }

    /// Overwrite the spatial state.
    pub fn set_transform(&mut self, t: NodeTransform) {
        self.center_position = t.position;
        self.local_scale = t.scale;
        self.rotation = t.rotation;
    }
}

/// Arena of [`LayoutNode`]s for one layout pass, addressed by graph-node identity.
///
/// Parent/child queries only see nodes registered in this pass: an unregistered parent makes the
/// node a root, unregistered children are skipped.
#[derive(Clone, Debug, Default)]
pub struct LayoutNodes {
    nodes: Vec<LayoutNode>,
    index: BTreeMap<String, LayoutIdx>,
}

impl LayoutNodes {
    /// Register every node of `graph` accepted by `admit`, then resolve the hierarchy.
    pub fn build(graph: &Graph, mut admit: impl FnMut(&Node) -> bool) -> Self {
        // Phase 1: register identities.
        let mut out = Self::default();
        for node in graph.nodes() {
            if admit(node) {
                let idx = LayoutIdx(out.nodes.len());
                out.index.insert(node.id.clone(), idx);
                out.nodes.push(LayoutNode::new(node, graph));
            }
        }

        // Phase 2: resolve references through the map.
        for i in 0..out.nodes.len() {
            let parent = out.nodes[i]
                .parent_id
                .as_deref()
                .and_then(|p| out.index.get(p).copied());
            let children = out.nodes[i]
                .child_ids
                .iter()
                .filter_map(|c| out.index.get(c).copied())
                .collect();
            out.nodes[i].parent = parent;
            out.nodes[i].children = children;
        }
        out
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `idx`.
    pub fn get(&self, idx: LayoutIdx) -> &LayoutNode {
        &self.nodes[idx.0]
    }

    /// Mutable node at `idx`.
    pub fn get_mut(&mut self, idx: LayoutIdx) -> &mut LayoutNode {
        &mut self.nodes[idx.0]
    }

    /// Arena index of graph node `id`, if registered.
    pub fn index_of(&self, id: &str) -> Option<LayoutIdx> {
        self.index.get(id).copied()
    }

    /// Node registered for graph node `id`.
    pub fn by_id(&self, id: &str) -> Option<&LayoutNode> {
        self.index_of(id).map(|i| self.get(i))
    }

    /// All arena indices in registration order.
    pub fn indices(&self) -> impl Iterator<Item = LayoutIdx> + use<> {
        (0..self.nodes.len()).map(LayoutIdx)
    }

    /// Nodes paired with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (LayoutIdx, &LayoutNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (LayoutIdx(i), n))
    }

    /// Registered parent of `idx`.
    pub fn parent(&self, idx: LayoutIdx) -> Option<LayoutIdx> {
        self.nodes[idx.0].parent
    }

    /// Registered children of `idx`.
    pub fn children(&self, idx: LayoutIdx) -> &[LayoutIdx] {
        &self.nodes[idx.0].children
    }

    /// Nodes without a registered parent.
    pub fn roots(&self) -> impl Iterator<Item = LayoutIdx> + '_ {
        self.indices().filter(move |&i| self.parent(i).is_none())
    }

    /// Outgoing edges of `idx` as `(edge id, target)` pairs.
    ///
    /// Fails if any target was not registered in this pass.
    pub fn outgoing(&self, idx: LayoutIdx) -> EvoResult<Vec<(&str, LayoutIdx)>> {
        let node = &self.nodes[idx.0];
        node.outgoing
            .iter()
            .map(|(edge, target)| {
                let t = self.index_of(target).ok_or_else(|| {
                    EvoError::identity(format!(
                        "edge '{edge}' from '{}' targets node '{target}' which is not part of this layout",
                        node.id
                    ))
                })?;
                Ok((edge.as_str(), t))
            })
            .collect()
    }

    /// Targets of the outgoing edges of `idx`.
    ///
    /// Fails if any target was not registered in this pass.
    pub fn successors(&self, idx: LayoutIdx) -> EvoResult<Vec<LayoutIdx>> {
        Ok(self.outgoing(idx)?.into_iter().map(|(_, t)| t).collect())
    }

    /// Assign tree levels top-down from the roots.
    pub fn set_levels(&mut self) {
        let mut queue: VecDeque<(LayoutIdx, usize)> = self.roots().map(|r| (r, 0)).collect();
        while let Some((idx, level)) = queue.pop_front() {
            self.nodes[idx.0].level = level;
            for &child in &self.nodes[idx.0].children {
                queue.push_back((child, level + 1));
            }
        }
    }

    /// Map from graph-node identity to the node's current transform.
    pub fn transforms(&self) -> BTreeMap<String, NodeTransform> {
        self.nodes
            .iter()
            .map(|n| (n.id.clone(), n.transform()))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/node.rs"]
mod tests;
