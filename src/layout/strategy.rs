use crate::foundation::core::{NodeTransform, Vec3};
use crate::foundation::error::{EvoError, EvoResult};
use crate::layout::edges::{EdgeLayout, NoEdgeLayout, SplineEdgeLayout, StraightEdgeLayout};
use crate::layout::flat::{GridLayout, StripLayout};
use crate::layout::nested::NestedLayout;
use crate::layout::node::{LayoutIdx, LayoutNodes};
use std::collections::BTreeMap;

/// Ground-centred transforms produced by a [`NodeLayout`], keyed by arena index.
pub type Placements = BTreeMap<LayoutIdx, NodeTransform>;

/// Geometry knobs shared by the built-in strategies.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Space between neighbouring blocks.
    pub gap: f64,
    /// Margin between an inner node's border and its children.
    pub padding: f64,
    /// Height of inner-node plates.
    pub inner_node_height: f64,
    /// y co-ordinate every root stands on.
    pub ground_level: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            gap: 0.5,
            padding: 0.5,
            inner_node_height: 0.01,
            ground_level: 0.0,
        }
    }
}

/// A node-placement algorithm.
///
/// A strategy receives every [`crate::LayoutNode`] of one pass with levels, hierarchy and leaf
/// scales already populated, and must return a placement for each node it is responsible for:
/// every node except members of a sub-layout (sub-layout roots included).
pub trait NodeLayout {
    /// Registered name.
    fn name(&self) -> &str;

    /// Whether inner nodes take part in the layout; flat layouts see leaves only.
    fn is_hierarchical(&self) -> bool;

    /// Whether placement reads the connecting edges through [`LayoutNodes::outgoing`].
    fn uses_edges(&self) -> bool {
        false
    }

    /// Compute placements; `position` is the ground centre of each block.
    fn layout(&self, nodes: &LayoutNodes) -> EvoResult<Placements>;
}

/// Whether the main strategy of a pass is responsible for placing `idx`.
pub fn is_placed_by_main(nodes: &LayoutNodes, idx: LayoutIdx) -> bool {
    let n = nodes.get(idx);
    !n.is_sublayout_node || n.is_sublayout_root
}

/// Copy `placements` onto `nodes`, converting ground-centred positions to block centres.
///
/// Fails if a node the strategy is responsible for was left unplaced.
pub fn apply_layout(nodes: &mut LayoutNodes, placements: &Placements) -> EvoResult<()> {
    for idx in nodes.indices() {
        if let Some(t) = placements.get(&idx) {
            let mut t = *t;
            t.position.y += t.scale.y / 2.0;
            nodes.get_mut(idx).set_transform(t);
        } else if is_placed_by_main(nodes, idx) {
            return Err(EvoError::layout(format!(
                "layout left node '{}' unplaced",
                nodes.get(idx).id()
            )));
        }
    }
    Ok(())
}

/// Axis-aligned box enclosing every block, as `(min corner, max corner)`.
pub fn bounding_box(nodes: &LayoutNodes) -> (Vec3, Vec3) {
    if nodes.is_empty() {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    let mut lo = Vec3::splat(f64::INFINITY);
    let mut hi = Vec3::splat(f64::NEG_INFINITY);
    for (_, n) in nodes.iter() {
        let extent = n.local_scale / 2.0;
        lo = lo.min(n.center_position - extent);
        hi = hi.max(n.center_position + extent);
    }
    (lo, hi)
}

/// Translate every block so that the x/z centre of the bounding box lands on `target` and the
/// lowest ground sits at `target.y`.
pub fn move_to(nodes: &mut LayoutNodes, target: Vec3) {
    let (lo, hi) = bounding_box(nodes);
    let center = (lo + hi) / 2.0;
    let offset = Vec3::new(target.x - center.x, target.y - lo.y, target.z - center.z);
    for idx in nodes.indices() {
        nodes.get_mut(idx).center_position += offset;
    }
}

/// Put every root on `ground_level` and each child on its parent's roof.
pub fn stack(nodes: &mut LayoutNodes, ground_level: f64) {
    let roots: Vec<LayoutIdx> = nodes.roots().collect();
    let mut pending: Vec<(LayoutIdx, f64)> = roots.into_iter().map(|r| (r, ground_level)).collect();
    while let Some((idx, ground)) = pending.pop() {
        let n = nodes.get_mut(idx);
        n.center_position.y = ground + n.local_scale.y / 2.0;
        let roof = n.roof();
        for &child in nodes.children(idx) {
            pending.push((child, roof));
        }
    }
}

type NodeLayoutCtor = Box<dyn Fn(&LayoutParams) -> Box<dyn NodeLayout>>;
type EdgeLayoutCtor = Box<dyn Fn(&LayoutParams) -> Box<dyn EdgeLayout>>;

/// Name-indexed constructors for node and edge layouts.
///
/// New strategies are added by registering a constructor; nothing downstream switches on
/// layout kinds.
pub struct LayoutRegistry {
    node_layouts: BTreeMap<String, NodeLayoutCtor>,
    edge_layouts: BTreeMap<String, EdgeLayoutCtor>,
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl LayoutRegistry {
    /// Registry without any strategy.
    pub fn empty() -> Self {
        Self {
            node_layouts: BTreeMap::new(),
            edge_layouts: BTreeMap::new(),
        }
    }

    /// Registry with the built-in node layouts (`grid`, `strip`, `nested`) and edge layouts
    /// (`straight`, `spline`, `none`).
    pub fn with_builtins() -> Self {
        let mut r = Self::empty();
        r.register_node_layout("grid", |p| Box::new(GridLayout::new(*p)));
        r.register_node_layout("strip", |p| Box::new(StripLayout::new(*p)));
        r.register_node_layout("nested", |p| Box::new(NestedLayout::new(*p)));
        r.register_edge_layout("straight", |_| Box::new(StraightEdgeLayout));
        r.register_edge_layout("spline", |_| Box::new(SplineEdgeLayout::default()));
        r.register_edge_layout("none", |_| Box::new(NoEdgeLayout));
        r
    }

    /// Register (or replace) a node layout under `name`.
    pub fn register_node_layout(
        &mut self,
        name: impl Into<String>,
        ctor: impl Fn(&LayoutParams) -> Box<dyn NodeLayout> + 'static,
    ) {
        self.node_layouts.insert(name.into(), Box::new(ctor));
    }

    /// Register (or replace) an edge layout under `name`.
    pub fn register_edge_layout(
        &mut self,
        name: impl Into<String>,
        ctor: impl Fn(&LayoutParams) -> Box<dyn EdgeLayout> + 'static,
    ) {
        self.edge_layouts.insert(name.into(), Box::new(ctor));
    }

    /// Whether a node layout called `name` exists.
    pub fn has_node_layout(&self, name: &str) -> bool {
        self.node_layouts.contains_key(name)
    }

    /// Whether an edge layout called `name` exists.
    pub fn has_edge_layout(&self, name: &str) -> bool {
        self.edge_layouts.contains_key(name)
    }

    /// Instantiate the node layout called `name`.
    pub fn node_layout(&self, name: &str, params: &LayoutParams) -> EvoResult<Box<dyn NodeLayout>> {
        self.node_layouts
            .get(name)
            .map(|ctor| ctor(params))
            .ok_or_else(|| EvoError::validation(format!("unknown node layout '{name}'")))
    }

    /// Instantiate the edge layout called `name`.
    pub fn edge_layout(&self, name: &str, params: &LayoutParams) -> EvoResult<Box<dyn EdgeLayout>> {
        self.edge_layouts
            .get(name)
            .map(|ctor| ctor(params))
            .ok_or_else(|| EvoError::validation(format!("unknown edge layout '{name}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/strategy.rs"]
mod tests;
