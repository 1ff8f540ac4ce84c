use crate::foundation::core::{NodeTransform, Point, Rect, Size, Vec3};
use crate::foundation::error::EvoResult;
use crate::layout::node::{LayoutIdx, LayoutNodes};
use crate::layout::strategy::{LayoutParams, NodeLayout, Placements, is_placed_by_main};
use std::collections::BTreeMap;

struct Frame {
    size: Size,
    // Offsets of each child's min corner from this node's min corner.
    child_offsets: Vec<(LayoutIdx, Point)>,
}

/// Hierarchical layout: every inner node is a plate enclosing its children, which are arranged
/// in a grid on top of it.
#[derive(Clone, Debug)]
pub struct NestedLayout {
    params: LayoutParams,
}

impl NestedLayout {
    /// Nested layout with the given spacing.
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }

    fn kids(nodes: &LayoutNodes, idx: LayoutIdx) -> Vec<LayoutIdx> {
        let mut kids: Vec<LayoutIdx> = nodes
            .children(idx)
            .iter()
            .copied()
            .filter(|&c| is_placed_by_main(nodes, c))
            .collect();
        kids.sort_by(|&a, &b| nodes.get(a).id().cmp(nodes.get(b).id()));
        kids
    }

    fn measure(
        &self,
        nodes: &LayoutNodes,
        idx: LayoutIdx,
        frames: &mut BTreeMap<LayoutIdx, Frame>,
    ) -> Size {
        let kids = Self::kids(nodes, idx);
        if kids.is_empty() {
            let s = nodes.get(idx).local_scale;
            let size = Size::new(s.x, s.z);
            frames.insert(
                idx,
                Frame {
                    size,
                    child_offsets: Vec::new(),
                },
            );
            return size;
        }

        let sizes: Vec<Size> = kids
            .iter()
            .map(|&k| self.measure(nodes, k, frames))
            .collect();
        let cols = (kids.len() as f64).sqrt().ceil().max(1.0) as usize;
        let rows = kids.len().div_ceil(cols);
        let mut col_w = vec![0.0f64; cols];
        let mut row_d = vec![0.0f64; rows];
        for (k, s) in sizes.iter().enumerate() {
            col_w[k % cols] = col_w[k % cols].max(s.width);
            row_d[k / cols] = row_d[k / cols].max(s.height);
        }

        let (pad, gap) = (self.params.padding, self.params.gap);
        let mut child_offsets = Vec::with_capacity(kids.len());
        for (k, &kid) in kids.iter().enumerate() {
            let (row, col) = (k / cols, k % cols);
            let x = pad + col_w[..col].iter().sum::<f64>() + (col as f64) * gap;
            let z = pad + row_d[..row].iter().sum::<f64>() + (row as f64) * gap;
            // Centre the child within its cell.
            let x = x + (col_w[col] - sizes[k].width) / 2.0;
            let z = z + (row_d[row] - sizes[k].height) / 2.0;
            child_offsets.push((kid, Point::new(x, z)));
        }

        let width = col_w.iter().sum::<f64>() + (cols.saturating_sub(1) as f64) * gap + 2.0 * pad;
        let depth = row_d.iter().sum::<f64>() + (rows.saturating_sub(1) as f64) * gap + 2.0 * pad;
        let size = Size::new(width, depth);
        frames.insert(
            idx,
            Frame {
                size,
                child_offsets,
            },
        );
        size
    }

    fn place(
        &self,
        nodes: &LayoutNodes,
        idx: LayoutIdx,
        origin: Point,
        ground: f64,
        frames: &BTreeMap<LayoutIdx, Frame>,
        out: &mut Placements,
    ) {
        let Some(frame) = frames.get(&idx) else {
            return;
        };
        let rect = Rect::from_origin_size(origin, frame.size);
        let c = rect.center();
        let height = if frame.child_offsets.is_empty() {
            nodes.get(idx).local_scale.y
        } else {
            self.params.inner_node_height
        };
        let scale = Vec3::new(frame.size.width, height, frame.size.height);
        out.insert(idx, NodeTransform::new(Vec3::new(c.x, ground, c.y), scale));
        for &(kid, off) in &frame.child_offsets {
            let child_origin = Point::new(origin.x + off.x, origin.y + off.y);
            self.place(nodes, kid, child_origin, ground + height, frames, out);
        }
    }
}

impl NodeLayout for NestedLayout {
    fn name(&self) -> &str {
        "nested"
    }

    fn is_hierarchical(&self) -> bool {
        true
    }

    fn layout(&self, nodes: &LayoutNodes) -> EvoResult<Placements> {
        let mut roots: Vec<LayoutIdx> = nodes
            .roots()
            .filter(|&r| is_placed_by_main(nodes, r))
            .collect();
        roots.sort_by(|&a, &b| nodes.get(a).id().cmp(nodes.get(b).id()));

        let mut frames = BTreeMap::new();
        let mut out = Placements::new();
        let mut x = 0.0;
        for root in roots {
            let size = self.measure(nodes, root, &mut frames);
            let origin = Point::new(x, -size.height / 2.0);
            self.place(
                nodes,
                root,
                origin,
                self.params.ground_level,
                &frames,
                &mut out,
            );
            x += size.width + self.params.gap;
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/nested.rs"]
mod tests;
