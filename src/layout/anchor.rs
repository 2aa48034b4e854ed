//! Reconciliation of a fresh layout with anchored (pinned) nodes.
//!
//! One top-down pass over the tree arena carries two offsets:
//!
//! - **follow:** how far the nearest anchored ancestor was pulled away from
//!   its fresh position. Unanchored nodes are shifted by it, so a dragged
//!   node takes its whole unanchored subtree along.
//! - **inherited:** how far the ancestors moved since the previous layout.
//!   It starts at zero below the root. An anchored node lands at its
//!   previous position plus the inherited offset, so it stays exactly where
//!   it was unless an ancestor moved.
//!
//! Movement is measured in the root's frame: when recentring shifts the
//! whole layout, the root's own shift is subtracted before anything is
//! passed down. A node's inherited offset for its children is
//! `inherited + own delta`, which equals its movement since the previous
//! layout when the caller knows its previous position. Anchored nodes and
//! nodes without a previous position add nothing of their own.

use crate::graph::{NodeRecord, Offset, Tree};

/// Apply anchors to `base` (the centred layout, indexed by request slot).
pub fn propagate_anchors(tree: &Tree, nodes: &[NodeRecord], base: &[Offset]) -> Vec<Offset> {
    let mut result = base.to_vec();
    let mut follow = vec![Offset::ZERO; tree.len()];
    let mut inherited = vec![Offset::ZERO; tree.len()];
    let root_shift = root_shift(tree, nodes, base);

    // Parents precede children in the arena
    for (idx, node) in tree.nodes.iter().enumerate() {
        let (parent_follow, parent_inherited) = node
            .parent
            .map(|p| (follow[p], inherited[p]))
            .unwrap_or((Offset::ZERO, Offset::ZERO));

        let (Some(record), Some(&fresh)) = (nodes.get(node.slot), base.get(node.slot)) else {
            continue;
        };

        match record.anchor() {
            Some(pinned) => {
                let placed = pinned + parent_inherited;
                result[node.slot] = placed;
                follow[idx] = placed - fresh;
                inherited[idx] = parent_inherited;
            }
            None => {
                let placed = fresh + parent_follow;
                result[node.slot] = placed;
                follow[idx] = parent_follow;
                inherited[idx] = match (node.parent, record.previous_absolute_position) {
                    (Some(_), Some(previous)) => placed - previous - root_shift,
                    _ => parent_inherited,
                };
            }
        }
    }

    // Nodes outside the tree have no ancestors to follow
    for (slot, record) in nodes.iter().enumerate() {
        if tree.node_of_slot(slot).is_none() {
            if let Some(pinned) = record.anchor() {
                result[slot] = pinned;
            }
        }
    }

    result
}

/// How far an unanchored root moved since the previous layout.
fn root_shift(tree: &Tree, nodes: &[NodeRecord], base: &[Offset]) -> Offset {
    let Some(root) = tree.nodes.first() else {
        return Offset::ZERO;
    };
    match (nodes.get(root.slot), base.get(root.slot)) {
        (Some(record), Some(&fresh)) if !record.anchored => record
            .previous_absolute_position
            .map(|previous| fresh - previous)
            .unwrap_or(Offset::ZERO),
        _ => Offset::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeRecord, Forest};

    // r → a → c, r → b
    fn fixture(records: Vec<NodeRecord>) -> (Tree, Vec<NodeRecord>) {
        let edges = vec![
            EdgeRecord::new("r", "a"),
            EdgeRecord::new("a", "c"),
            EdgeRecord::new("r", "b"),
        ];
        let forest = Forest::from_records(&records, &edges);
        (forest.tree(0), records)
    }

    fn base() -> Vec<Offset> {
        vec![
            Offset::new(0.0, 100.0),
            Offset::new(200.0, 50.0),
            Offset::new(200.0, 150.0),
            Offset::new(400.0, 50.0),
        ]
    }

    fn plain() -> Vec<NodeRecord> {
        ["r", "a", "b", "c"]
            .iter()
            .map(|&k| NodeRecord::new(k, 50.0, 20.0))
            .collect()
    }

    #[test]
    fn test_no_anchors_is_identity() {
        let (tree, nodes) = fixture(plain());
        assert_eq!(propagate_anchors(&tree, &nodes, &base()), base());
    }

    #[test]
    fn test_anchored_node_keeps_position() {
        let mut nodes = plain();
        nodes[2] = nodes[2].clone().anchored_at(Offset::new(-75.0, 333.0));
        let (tree, nodes) = fixture(nodes);

        let result = propagate_anchors(&tree, &nodes, &base());
        assert_eq!(result[2], Offset::new(-75.0, 333.0));
        assert_eq!(result[1], base()[1], "siblings are untouched");
    }

    #[test]
    fn test_unanchored_subtree_follows_anchor() {
        let mut nodes = plain();
        // a dragged 30 right and 10 up from its fresh spot
        nodes[1] = nodes[1].clone().anchored_at(Offset::new(230.0, 40.0));
        let (tree, nodes) = fixture(nodes);

        let result = propagate_anchors(&tree, &nodes, &base());
        assert_eq!(result[1], Offset::new(230.0, 40.0));
        assert_eq!(result[3], Offset::new(430.0, 40.0));
        assert_eq!(result[2], base()[2]);
    }

    #[test]
    fn test_anchor_follows_moving_parent() {
        let mut nodes = plain();
        // a was at (200, 20) last time; the fresh layout moved it down 30
        nodes[1] = nodes[1].clone().previously_at(Offset::new(200.0, 20.0));
        nodes[3] = nodes[3].clone().anchored_at(Offset::new(500.0, 0.0));
        let (tree, nodes) = fixture(nodes);

        let result = propagate_anchors(&tree, &nodes, &base());
        assert_eq!(result[3], Offset::new(500.0, 30.0));
    }

    #[test]
    fn test_root_shift_alone_does_not_move_anchors() {
        let mut nodes = plain();
        nodes[0] = nodes[0].clone().previously_at(Offset::new(0.0, 90.0));
        nodes[1] = nodes[1].clone().anchored_at(Offset::new(260.0, 0.0));
        nodes[3] = nodes[3].clone().anchored_at(Offset::new(600.0, 0.0));
        let (tree, nodes) = fixture(nodes);

        let result = propagate_anchors(&tree, &nodes, &base());
        assert_eq!(result[0], Offset::new(0.0, 100.0));
        assert_eq!(result[1], Offset::new(260.0, 0.0));
        assert_eq!(result[3], Offset::new(600.0, 0.0));
    }

    #[test]
    fn test_uniform_recentring_keeps_deep_anchor_exact() {
        // Everything moved 5 left and 5 up since last time, as recentring does
        let mut nodes = plain();
        for (i, offset) in base().into_iter().enumerate() {
            nodes[i] = nodes[i].clone().previously_at(offset + Offset::new(5.0, 5.0));
        }
        nodes[3] = nodes[3].clone().anchored_at(Offset::new(700.0, 700.0));
        let (tree, nodes) = fixture(nodes);

        let result = propagate_anchors(&tree, &nodes, &base());
        assert_eq!(result[3], Offset::new(700.0, 700.0));
        assert_eq!(result[1], base()[1]);
    }

    #[test]
    fn test_anchor_follows_parent_moving_against_root() {
        // Root moved 10 down, a moved 40 down: a's child follows the extra 30
        let mut nodes = plain();
        nodes[0] = nodes[0].clone().previously_at(Offset::new(0.0, 90.0));
        nodes[1] = nodes[1].clone().previously_at(Offset::new(200.0, 10.0));
        nodes[3] = nodes[3].clone().anchored_at(Offset::new(500.0, 0.0));
        let (tree, nodes) = fixture(nodes);

        let result = propagate_anchors(&tree, &nodes, &base());
        assert_eq!(result[3], Offset::new(500.0, 30.0));
    }

    #[test]
    fn test_stationary_previous_positions_keep_anchor_exact() {
        let mut nodes = plain();
        for (i, offset) in base().into_iter().enumerate() {
            nodes[i] = nodes[i].clone().previously_at(offset);
        }
        nodes[3] = nodes[3].clone().anchored_at(Offset::new(700.0, 700.0));
        let (tree, nodes) = fixture(nodes);

        let result = propagate_anchors(&tree, &nodes, &base());
        assert_eq!(result[3], Offset::new(700.0, 700.0));
    }

    #[test]
    fn test_anchor_outside_tree() {
        let mut nodes = plain();
        nodes.push(NodeRecord::new("stray", 10.0, 10.0).anchored_at(Offset::new(9.0, 9.0)));
        let (tree, nodes) = fixture(nodes);
        let mut fresh = base();
        fresh.push(Offset::ZERO);

        let result = propagate_anchors(&tree, &nodes, &fresh);
        assert_eq!(result[4], Offset::new(9.0, 9.0));
    }
}
