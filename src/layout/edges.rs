use crate::foundation::core::Vec3;
use crate::foundation::error::EvoResult;
use crate::layout::node::{LayoutIdx, LayoutNodes};

/// Control polygon computed for one edge.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EdgePath {
    /// Edge identity.
    pub edge_id: String,
    /// Control points from source to target.
    pub control_points: Vec<Vec3>,
}

/// An edge-routing algorithm.
pub trait EdgeLayout {
    /// Registered name.
    fn name(&self) -> &str;

    /// Control points between two block roofs.
    fn route(&self, from: Vec3, to: Vec3) -> Vec<Vec3>;

    /// Route every outgoing edge of every node in `nodes`.
    ///
    /// Edges are walked from their (registered) source; a target that is not registered in the
    /// pass is an identity failure and aborts the whole computation.
    fn create(&self, nodes: &LayoutNodes) -> EvoResult<Vec<EdgePath>> {
        let mut out = Vec::new();
        for idx in nodes.indices() {
            for (edge_id, target) in nodes.outgoing(idx)? {
                out.push(EdgePath {
                    edge_id: edge_id.to_string(),
                    control_points: self.route(roof_center(nodes, idx), roof_center(nodes, target)),
                });
            }
        }
        Ok(out)
    }
}

fn roof_center(nodes: &LayoutNodes, idx: LayoutIdx) -> Vec3 {
    let n = nodes.get(idx);
    Vec3::new(n.center_position.x, n.roof(), n.center_position.z)
}

/// Direct line between the two roofs.
#[derive(Clone, Copy, Debug, Default)]
pub struct StraightEdgeLayout;

impl EdgeLayout for StraightEdgeLayout {
    fn name(&self) -> &str {
        "straight"
    }

    fn route(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        vec![from, to]
    }
}

/// Draws no edges at all; edge animation is switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEdgeLayout;

impl EdgeLayout for NoEdgeLayout {
    fn name(&self) -> &str {
        "none"
    }

    fn route(&self, _from: Vec3, _to: Vec3) -> Vec<Vec3> {
        Vec::new()
    }

    fn create(&self, _nodes: &LayoutNodes) -> EvoResult<Vec<EdgePath>> {
        Ok(Vec::new())
    }
}

/// Cubic arch rising above the taller roof, higher for more distant endpoints.
#[derive(Clone, Copy, Debug)]
pub struct SplineEdgeLayout {
    /// Arch height per unit of ground distance.
    pub arch_factor: f64,
    /// Minimal arch height above the taller roof.
    pub min_lift: f64,
}

impl Default for SplineEdgeLayout {
    fn default() -> Self {
        Self {
            arch_factor: 0.3,
            min_lift: 1.0,
        }
    }
}

impl EdgeLayout for SplineEdgeLayout {
    fn name(&self) -> &str {
        "spline"
    }

    fn route(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        let ground_distance = Vec3::new(to.x - from.x, 0.0, to.z - from.z).length();
        let top = from.y.max(to.y) + (ground_distance * self.arch_factor).max(self.min_lift);
        vec![
            from,
            Vec3::new(from.x, top, from.z),
            Vec3::new(to.x, top, to.z),
            to,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/edges.rs"]
mod tests;
