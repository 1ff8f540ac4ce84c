use crate::foundation::core::{NodeTransform, Point, Rect, Size, Vec3};
use crate::foundation::error::EvoResult;
use crate::layout::node::{LayoutIdx, LayoutNodes};
use crate::layout::strategy::{LayoutParams, NodeLayout, Placements, is_placed_by_main};

/// Nodes the main strategy must place, ordered by identity so that a node keeps its relative
/// slot across revisions.
fn placeable(nodes: &LayoutNodes) -> Vec<LayoutIdx> {
    let mut out: Vec<LayoutIdx> = nodes
        .indices()
        .filter(|&i| is_placed_by_main(nodes, i))
        .collect();
    out.sort_by(|&a, &b| nodes.get(a).id().cmp(nodes.get(b).id()));
    out
}

fn footprint(nodes: &LayoutNodes, idx: LayoutIdx) -> Size {
    let s = nodes.get(idx).local_scale;
    Size::new(s.x, s.z)
}

fn place_in(cell: Rect, nodes: &LayoutNodes, idx: LayoutIdx, ground: f64) -> NodeTransform {
    let c = cell.center();
    NodeTransform::new(Vec3::new(c.x, ground, c.y), nodes.get(idx).local_scale)
}

/// Flat layout: blocks in a square-ish grid of uniform cells.
#[derive(Clone, Debug)]
pub struct GridLayout {
    params: LayoutParams,
}

impl GridLayout {
    /// Grid layout with the given spacing.
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }
}

impl NodeLayout for GridLayout {
    fn name(&self) -> &str {
        "grid"
    }

    fn is_hierarchical(&self) -> bool {
        false
    }

    fn layout(&self, nodes: &LayoutNodes) -> EvoResult<Placements> {
        let order = placeable(nodes);
        let mut out = Placements::new();
        if order.is_empty() {
            return Ok(out);
        }
        let cols = (order.len() as f64).sqrt().ceil().max(1.0) as usize;
        let cell = order
            .iter()
            .map(|&i| footprint(nodes, i))
            .fold(Size::ZERO, |acc, s| {
                Size::new(acc.width.max(s.width), acc.height.max(s.height))
            });
        let gap = self.params.gap;
        for (k, &idx) in order.iter().enumerate() {
            let row = k / cols;
            let col = k % cols;
            let origin = Point::new(
                (col as f64) * (cell.width + gap),
                (row as f64) * (cell.height + gap),
            );
            let rect = Rect::from_origin_size(origin, cell);
            out.insert(idx, place_in(rect, nodes, idx, self.params.ground_level));
        }
        Ok(out)
    }
}

/// Flat layout: blocks side by side along the x axis, centred on z = 0.
#[derive(Clone, Debug)]
pub struct StripLayout {
    params: LayoutParams,
}

impl StripLayout {
    /// Strip layout with the given spacing.
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }
}

impl NodeLayout for StripLayout {
    fn name(&self) -> &str {
        "strip"
    }

    fn is_hierarchical(&self) -> bool {
        false
    }

    fn layout(&self, nodes: &LayoutNodes) -> EvoResult<Placements> {
        let mut out = Placements::new();
        let mut x = 0.0;
        for idx in placeable(nodes) {
            let size = footprint(nodes, idx);
            let rect = Rect::from_origin_size(Point::new(x, -size.height / 2.0), size);
            out.insert(idx, place_in(rect, nodes, idx, self.params.ground_level));
            x += size.width + self.params.gap;
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/flat.rs"]
mod tests;
