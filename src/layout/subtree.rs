//! Subtree height computation.
//!
//! The subtree height of a node is the vertical extent needed to draw the node
//! and all of its descendants without siblings overlapping:
//!
//! - leaf: its own height
//! - internal: `max(own height, sum(child subtree heights) + node_spacing(depth + 1) * (n - 1))`
//!
//! Results are memoized per `(node, depth)` for the duration of one layout
//! call. Evaluation uses an explicit stack rather than recursion.

use std::collections::HashMap;

use super::spacing::SpacingModel;
use crate::graph::{NodeRecord, Tree};

/// Memoized subtree heights for one tree.
pub struct SubtreeHeights<'a> {
    tree: &'a Tree,
    nodes: &'a [NodeRecord],
    spacing: SpacingModel,
    memo: HashMap<(usize, u32), f32>,
}

impl<'a> SubtreeHeights<'a> {
    pub fn new(tree: &'a Tree, nodes: &'a [NodeRecord], spacing: SpacingModel) -> Self {
        Self {
            tree,
            nodes,
            spacing,
            memo: HashMap::with_capacity(tree.len()),
        }
    }

    /// Subtree height of arena node `node` when placed at `depth`.
    pub fn height(&mut self, node: usize, depth: u32) -> f32 {
        if let Some(&h) = self.memo.get(&(node, depth)) {
            return h;
        }

        let tree = self.tree;

        // Post-order: a node is finished once all of its children are.
        let mut stack: Vec<(usize, u32, bool)> = vec![(node, depth, false)];
        while let Some((n, d, expanded)) = stack.pop() {
            if self.memo.contains_key(&(n, d)) {
                continue;
            }
            let children = &tree.nodes[n].children;
            if !expanded && !children.is_empty() {
                stack.push((n, d, true));
                stack.extend(children.iter().map(|&c| (c, d + 1, false)));
                continue;
            }

            let own = self.own_height(n);
            let h = if children.is_empty() {
                own
            } else {
                let sum: f32 = children
                    .iter()
                    .map(|&c| self.memo.get(&(c, d + 1)).copied().unwrap_or(0.0))
                    .sum();
                let gaps = self.spacing.node_spacing(d + 1) * (children.len() - 1) as f32;
                own.max(sum + gaps)
            };
            self.memo.insert((n, d), h);
        }

        self.memo.get(&(node, depth)).copied().unwrap_or(0.0)
    }

    /// Total height of a vertical block of sibling subtrees at `depth`.
    pub fn block_height(&mut self, siblings: &[usize], depth: u32) -> f32 {
        if siblings.is_empty() {
            return 0.0;
        }
        let sum: f32 = siblings.iter().map(|&c| self.height(c, depth)).sum();
        sum + self.spacing.node_spacing(depth) * (siblings.len() - 1) as f32
    }

    /// The node's own box height.
    pub fn own_height(&self, node: usize) -> f32 {
        let slot = self.tree.nodes[node].slot;
        self.nodes.get(slot).map(|n| n.size.height).unwrap_or(0.0)
    }
}
