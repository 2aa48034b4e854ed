//! Forest - topology of a single layout request.
//!
//! The forest stores the parent→child structure using petgraph's StableGraph,
//! keyed by the caller's node keys. Node weights are slots into the request's
//! node slice, so every graph index maps straight back to `nodes[slot]`.
//!
//! Layout never walks the petgraph structure directly. Instead it works on a
//! [`Tree`] arena extracted from the root with an explicit stack, which bounds
//! stack usage on deep trees and cuts cycles and second parents.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};
use tracing::debug;

use super::edge::EdgeRecord;
use super::node::{NodeKey, NodeRecord};
use crate::error::{LayoutError, Result};

/// Parent→child topology of one request.
pub struct Forest {
    /// Node weights are slots into the request's node slice, edges carry nothing.
    graph: StableGraph<usize, (), Directed>,

    /// Edges dropped while building (dangling endpoint or self loop)
    dropped_edges: usize,
}

impl Forest {
    /// Build the topology from caller records.
    ///
    /// Edges that reference unknown keys, and self loops, are silently
    /// dropped (logged at debug level).
    pub fn from_records(nodes: &[NodeRecord], edges: &[EdgeRecord]) -> Self {
        let mut graph = StableGraph::with_capacity(nodes.len(), edges.len());
        // First record wins on duplicate keys
        let mut key_to_index: HashMap<&NodeKey, NodeIndex> = HashMap::with_capacity(nodes.len());

        for (slot, node) in nodes.iter().enumerate() {
            let index = graph.add_node(slot);
            key_to_index.entry(&node.key).or_insert(index);
        }

        let mut dropped_edges = 0;
        for edge in edges {
            if edge.is_self_loop() {
                debug!(%edge, "dropping self loop");
                dropped_edges += 1;
                continue;
            }
            match (key_to_index.get(&edge.from), key_to_index.get(&edge.to)) {
                (Some(&parent), Some(&child)) => {
                    graph.add_edge(parent, child, ());
                }
                _ => {
                    debug!(%edge, "dropping dangling edge");
                    dropped_edges += 1;
                }
            }
        }

        Self {
            graph,
            dropped_edges,
        }
    }

    /// Number of edges that survived filtering.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of edges dropped while building.
    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    /// Children of `slot` in edge-declaration order.
    pub fn children(&self, slot: usize) -> Vec<usize> {
        let index = NodeIndex::new(slot);
        if !self.graph.contains_node(index) {
            return Vec::new();
        }
        // petgraph yields the most recently added edge first
        let mut children: Vec<usize> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        children.reverse();
        children
    }

    /// Whether `slot` has at least one incoming edge.
    pub fn has_parent(&self, slot: usize) -> bool {
        self.parent_count(slot) > 0
    }

    fn parent_count(&self, slot: usize) -> usize {
        let index = NodeIndex::new(slot);
        if !self.graph.contains_node(index) {
            return 0;
        }
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .count()
    }

    /// All slots without an incoming edge, in input order.
    pub fn roots(&self) -> Vec<usize> {
        (0..self.graph.node_count())
            .filter(|&slot| !self.has_parent(slot))
            .collect()
    }

    /// The layout root: the first parentless node in input order, or the
    /// first node overall when every node has a parent.
    ///
    /// Returns None only for an empty forest.
    pub fn root(&self) -> Option<usize> {
        if self.graph.node_count() == 0 {
            return None;
        }
        let roots = self.roots();
        match roots.as_slice() {
            [] => {
                debug!("no parentless node; falling back to the first node");
                Some(0)
            }
            [root] => Some(*root),
            [first, rest @ ..] => {
                debug!(extra = rest.len(), "multiple roots; using the first in input order");
                Some(*first)
            }
        }
    }

    /// Extract the tree arena reachable from `root`.
    ///
    /// Uses an explicit stack and a visited set: a node reached a second time
    /// (cycle back-edge or second parent) is skipped.
    pub fn tree(&self, root: usize) -> Tree {
        let slot_count = self.graph.node_count();
        let mut nodes: Vec<TreeNode> = Vec::with_capacity(slot_count);
        let mut slot_to_node: Vec<Option<usize>> = vec![None; slot_count];
        let mut visited: HashSet<usize> = HashSet::with_capacity(slot_count);

        if root >= slot_count {
            return Tree {
                nodes,
                slot_to_node,
            };
        }

        let mut stack: Vec<(usize, Option<usize>, u32)> = vec![(root, None, 0)];
        while let Some((slot, parent, depth)) = stack.pop() {
            if !visited.insert(slot) {
                continue;
            }

            let node_idx = nodes.len();
            nodes.push(TreeNode {
                slot,
                depth,
                parent,
                children: Vec::new(),
            });
            slot_to_node[slot] = Some(node_idx);
            if let Some(parent_idx) = parent {
                nodes[parent_idx].children.push(node_idx);
            }

            // Reverse so siblings are popped (and attached) in edge order
            for child in self.children(slot).into_iter().rev() {
                if !visited.contains(&child) {
                    stack.push((child, Some(node_idx), depth + 1));
                }
            }
        }

        Tree {
            nodes,
            slot_to_node,
        }
    }
}

/// A node of the extracted tree arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Index into the request's node slice.
    pub slot: usize,
    /// Depth in the tree (root = 0).
    pub depth: u32,
    /// Parent arena index (None for root).
    pub parent: Option<usize>,
    /// Children arena indices, in edge order.
    pub children: Vec<usize>,
}

/// Index-addressed tree arena. Arena index 0 is the root; every parent
/// precedes its children.
#[derive(Debug, Clone)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
    slot_to_node: Vec<Option<usize>>,
}

impl Tree {
    /// Arena index of the root.
    pub const ROOT: usize = 0;

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Arena index for a request slot, if the slot is reachable from the root.
    pub fn node_of_slot(&self, slot: usize) -> Option<usize> {
        self.slot_to_node.get(slot).copied().flatten()
    }

    /// Children of the root, as arena indices.
    pub fn root_children(&self) -> &[usize] {
        self.nodes
            .first()
            .map(|root| root.children.as_slice())
            .unwrap_or(&[])
    }
}

/// Check that `nodes` and `edges` describe exactly one tree.
///
/// This is stricter than layout, which silently drops bad edges and falls
/// back to the first node as root. Problems are reported in a fixed order:
/// duplicate key, dangling edge, self loop, multiple parents, no root,
/// multiple roots, cycle.
pub fn validate_structure(nodes: &[NodeRecord], edges: &[EdgeRecord]) -> Result<()> {
    let mut seen: HashSet<&NodeKey> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(&node.key) {
            return Err(LayoutError::DuplicateKey {
                key: node.key.clone(),
            });
        }
    }

    if let Some(edge) = edges
        .iter()
        .find(|e| !seen.contains(&e.from) || !seen.contains(&e.to))
    {
        return Err(LayoutError::DanglingEdge {
            from: edge.from.clone(),
            to: edge.to.clone(),
        });
    }

    if let Some(edge) = edges.iter().find(|e| e.is_self_loop()) {
        return Err(LayoutError::SelfLoop {
            key: edge.from.clone(),
        });
    }

    let forest = Forest::from_records(nodes, edges);
    if let Some(slot) = (0..nodes.len()).find(|&slot| forest.parent_count(slot) > 1) {
        return Err(LayoutError::MultipleParents {
            key: nodes[slot].key.clone(),
        });
    }

    let roots = forest.roots();
    let root = match roots.as_slice() {
        [] if nodes.is_empty() => return Ok(()),
        [] => return Err(LayoutError::NoRoot),
        [root] => *root,
        _ => {
            return Err(LayoutError::MultipleRoots {
                roots: roots.iter().map(|&slot| nodes[slot].key.clone()).collect(),
            });
        }
    };

    let tree = forest.tree(root);
    if let Some(slot) = (0..nodes.len()).find(|&slot| tree.node_of_slot(slot).is_none()) {
        return Err(LayoutError::Cycle {
            key: nodes[slot].key.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(keys: &[&str]) -> Vec<NodeRecord> {
        keys.iter().map(|&k| NodeRecord::new(k, 40.0, 20.0)).collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<EdgeRecord> {
        pairs.iter().map(|&(a, b)| EdgeRecord::new(a, b)).collect()
    }

    #[test]
    fn test_children_keep_edge_order() {
        let forest = Forest::from_records(
            &nodes(&["r", "a", "b", "c"]),
            &edges(&[("r", "c"), ("r", "a"), ("r", "b")]),
        );
        assert_eq!(forest.children(0), vec![3, 1, 2]);
    }

    #[test]
    fn test_root_detection() {
        // Root is not first in input order
        let forest = Forest::from_records(&nodes(&["a", "r"]), &edges(&[("r", "a")]));
        assert_eq!(forest.root(), Some(1));
    }

    #[test]
    fn test_root_fallback_multiple_roots() {
        let forest = Forest::from_records(&nodes(&["x", "y", "z"]), &edges(&[("y", "z")]));
        assert_eq!(forest.roots(), vec![0, 1]);
        assert_eq!(forest.root(), Some(0));
    }

    #[test]
    fn test_root_fallback_no_root() {
        let forest = Forest::from_records(&nodes(&["a", "b"]), &edges(&[("a", "b"), ("b", "a")]));
        assert!(forest.roots().is_empty());
        assert_eq!(forest.root(), Some(0));
    }

    #[test]
    fn test_empty_forest_has_no_root() {
        let forest = Forest::from_records(&[], &[]);
        assert_eq!(forest.root(), None);
        assert!(forest.tree(0).is_empty());
    }

    #[test]
    fn test_dangling_and_self_loop_dropped() {
        let forest = Forest::from_records(
            &nodes(&["r", "a"]),
            &edges(&[("r", "a"), ("r", "ghost"), ("a", "a")]),
        );
        assert_eq!(forest.edge_count(), 1);
        assert_eq!(forest.dropped_edges(), 2);
        assert_eq!(forest.children(0), vec![1]);
    }

    #[test]
    fn test_tree_arena_depths_and_order() {
        // r → a, r → b, a → c
        let forest = Forest::from_records(
            &nodes(&["r", "a", "b", "c"]),
            &edges(&[("r", "a"), ("r", "b"), ("a", "c")]),
        );
        let tree = forest.tree(0);
        assert_eq!(tree.len(), 4);

        let root = &tree.nodes[Tree::ROOT];
        assert_eq!(root.slot, 0);
        let child_slots: Vec<usize> = root.children.iter().map(|&c| tree.nodes[c].slot).collect();
        assert_eq!(child_slots, vec![1, 2]);

        let c = tree.node_of_slot(3).unwrap();
        assert_eq!(tree.nodes[c].depth, 2);
        assert_eq!(tree.nodes[c].parent, tree.node_of_slot(1));

        // Parents precede children
        for (idx, node) in tree.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                assert!(parent < idx);
            }
        }
    }

    #[test]
    fn test_tree_cuts_cycles() {
        // r → a → b → a (back-edge)
        let forest = Forest::from_records(
            &nodes(&["r", "a", "b"]),
            &edges(&[("r", "a"), ("a", "b"), ("b", "a")]),
        );
        let tree = forest.tree(0);
        assert_eq!(tree.len(), 3, "Every node visited exactly once");
    }

    #[test]
    fn test_tree_skips_unreachable() {
        let forest = Forest::from_records(&nodes(&["r", "a", "lonely"]), &edges(&[("r", "a")]));
        let tree = forest.tree(0);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.node_of_slot(2), None);
    }

    #[test]
    fn test_validate_accepts_tree() {
        let result = validate_structure(
            &nodes(&["r", "a", "b"]),
            &edges(&[("r", "a"), ("a", "b")]),
        );
        assert_eq!(result, Ok(()));
        assert_eq!(validate_structure(&[], &[]), Ok(()));
    }

    #[test]
    fn test_validate_reports_problems() {
        assert!(matches!(
            validate_structure(&nodes(&["a", "a"]), &[]),
            Err(LayoutError::DuplicateKey { .. })
        ));
        assert!(matches!(
            validate_structure(&nodes(&["a"]), &edges(&[("a", "b")])),
            Err(LayoutError::DanglingEdge { .. })
        ));
        assert!(matches!(
            validate_structure(&nodes(&["a"]), &edges(&[("a", "a")])),
            Err(LayoutError::SelfLoop { .. })
        ));
        assert!(matches!(
            validate_structure(&nodes(&["r", "a", "b"]), &edges(&[("r", "b"), ("a", "b")])),
            Err(LayoutError::MultipleParents { .. })
        ));
        assert_eq!(
            validate_structure(&nodes(&["a", "b"]), &edges(&[("a", "b"), ("b", "a")])),
            Err(LayoutError::NoRoot)
        );
        assert_eq!(
            validate_structure(&nodes(&["a", "b"]), &[]),
            Err(LayoutError::MultipleRoots {
                roots: vec![NodeKey::new("a"), NodeKey::new("b")],
            })
        );
        assert_eq!(
            validate_structure(
                &nodes(&["r", "a", "b"]),
                &edges(&[("a", "b"), ("b", "a")])
            ),
            Err(LayoutError::Cycle {
                key: NodeKey::new("a"),
            })
        );
    }
}
