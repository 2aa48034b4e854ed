//! R-tree of laid-out node boxes using the rstar crate.
//!
//! Supports hit testing (which node is under a point), rectangle queries and
//! an overlap check used to verify layouts.

use rstar::{AABB, Envelope, PointDistance, RTree, RTreeObject};

use crate::graph::{NodeRecord, Offset};

/// A node's box in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    /// Request slot of the node.
    pub slot: usize,
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl NodeBox {
    pub fn new(slot: usize, offset: Offset, width: f32, height: f32) -> Self {
        Self {
            slot,
            min: [offset.dx, offset.dy],
            max: [offset.dx + width.max(0.0), offset.dy + height.max(0.0)],
        }
    }

    /// Whether the interiors of both boxes intersect (touching edges do not count).
    pub fn overlaps(&self, other: &NodeBox) -> bool {
        self.min[0] < other.max[0]
            && other.min[0] < self.max[0]
            && self.min[1] < other.max[1]
            && other.min[1] < self.max[1]
    }

    fn area(&self) -> f32 {
        (self.max[0] - self.min[0]) * (self.max[1] - self.min[1])
    }
}

impl RTreeObject for NodeBox {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for NodeBox {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        Envelope::distance_2(&self.envelope(), point)
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        (self.min[0]..=self.max[0]).contains(&point[0])
            && (self.min[1]..=self.max[1]).contains(&point[1])
    }
}

/// Spatial index over one layout result.
pub struct LayoutIndex {
    tree: RTree<NodeBox>,
}

impl LayoutIndex {
    /// Bulk-load the boxes of `offsets` (indexed like `nodes`).
    pub fn new(offsets: &[Offset], nodes: &[NodeRecord]) -> Self {
        let boxes: Vec<NodeBox> = offsets
            .iter()
            .zip(nodes)
            .enumerate()
            .map(|(slot, (&offset, node))| {
                NodeBox::new(slot, offset, node.size.width, node.size.height)
            })
            .collect();

        Self {
            tree: RTree::bulk_load(boxes),
        }
    }

    /// Slot of the node under `(x, y)`. When boxes are stacked the smallest wins.
    pub fn at(&self, x: f32, y: f32) -> Option<usize> {
        self.tree
            .locate_all_at_point(&[x, y])
            .min_by(|a, b| a.area().total_cmp(&b.area()).then(a.slot.cmp(&b.slot)))
            .map(|node| node.slot)
    }

    /// Slots of every node intersecting the rectangle, ascending.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<usize> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|node| node.slot)
            .collect();
        slots.sort_unstable();
        slots
    }

    /// Every pair of nodes whose boxes overlap with positive area, as
    /// `(lower slot, higher slot)` in ascending order.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for node in self.tree.iter() {
            for other in self.tree.locate_in_envelope_intersecting(&node.envelope()) {
                if node.slot < other.slot && node.overlaps(other) {
                    pairs.push((node.slot, other.slot));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for LayoutIndex {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}
