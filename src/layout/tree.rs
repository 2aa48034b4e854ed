//! Depth-first tree placement.
//!
//! Every node is placed relative to its parent:
//!
//! - **x:** children sit `spacing_x(depth)` beyond the parent's box in the
//!   growth direction (right of its right edge, or left of its left edge).
//! - **y:** the children's subtree bands are stacked into one block of height
//!   `sum(band heights) + node_spacing(depth + 1) * (n - 1)`, centred on the
//!   parent's own box. Each child is centred inside its own band, so its
//!   descendants never leave the band.
//!
//! Placement walks an explicit work list instead of recursing.

use super::spacing::SpacingModel;
use super::subtree::SubtreeHeights;
use crate::graph::{NodeRecord, Offset, Side, Size, Tree};

/// Places tree nodes; positions are indexed by arena node.
pub struct TreePlacer<'a> {
    tree: &'a Tree,
    nodes: &'a [NodeRecord],
    spacing: SpacingModel,
    heights: SubtreeHeights<'a>,
    positions: Vec<Offset>,
}

impl<'a> TreePlacer<'a> {
    /// Create a placer with the root at the local origin.
    pub fn new(tree: &'a Tree, nodes: &'a [NodeRecord], spacing: SpacingModel) -> Self {
        Self {
            tree,
            nodes,
            spacing,
            heights: SubtreeHeights::new(tree, nodes, spacing),
            positions: vec![Offset::ZERO; tree.len()],
        }
    }

    /// Subtree heights shared with the side assigner.
    pub fn heights(&mut self) -> &mut SubtreeHeights<'a> {
        &mut self.heights
    }

    /// Position of an arena node.
    pub fn position(&self, node: usize) -> Offset {
        self.positions.get(node).copied().unwrap_or(Offset::ZERO)
    }

    /// Lay out `children` of `parent` as one block growing towards `side`,
    /// then everything below them in the same direction.
    ///
    /// `children` need not be all of the parent's children: balanced layouts
    /// call this once per side of the root.
    pub fn place_children(&mut self, parent: usize, children: &[usize], side: Side) {
        let tree = self.tree;
        let mut work: Vec<(usize, &[usize])> = vec![(parent, children)];

        while let Some((parent, block)) = work.pop() {
            if block.is_empty() {
                continue;
            }
            let depth = tree.nodes[parent].depth;
            let child_depth = depth + 1;
            let origin = self.position(parent);
            let parent_size = self.size_of(parent);

            let block_height = self.heights.block_height(block, child_depth);
            let gap = self.spacing.node_spacing(child_depth);
            let reach = self.spacing.spacing_x(depth);

            let mut cursor = origin.dy + (parent_size.height - block_height) / 2.0;
            for &child in block {
                let size = self.size_of(child);
                let band = self.heights.height(child, child_depth);

                let centre = origin.dx
                    + parent_size.width / 2.0
                    + side.dir() * (parent_size.width / 2.0 + reach + size.width / 2.0);
                let x = centre - size.width / 2.0;
                let y = cursor + (band - size.height) / 2.0;
                self.positions[child] = Offset::new(x, y);
                cursor += band + gap;

                work.push((child, tree.nodes[child].children.as_slice()));
            }
        }
    }

    /// Positions by request slot. Slots not reachable from the root share the
    /// root's position.
    pub fn into_slot_offsets(self, slot_count: usize) -> Vec<Offset> {
        let root = self.position(Tree::ROOT);
        let mut offsets = vec![root; slot_count];
        for (idx, node) in self.tree.nodes.iter().enumerate() {
            if let Some(slot) = offsets.get_mut(node.slot) {
                *slot = self.positions[idx];
            }
        }
        offsets
    }

    fn size_of(&self, node: usize) -> Size {
        let slot = self.tree.nodes[node].slot;
        self.nodes.get(slot).map(|n| n.size).unwrap_or_default()
    }
}
