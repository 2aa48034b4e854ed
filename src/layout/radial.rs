//! Radial placement for small, flat graphs.
//!
//! The root sits at the local origin; every other node is spread on one
//! circle around the root's centre, in input order, starting at angle 0.
//! There is no depth or subtree awareness.

use std::f32::consts::TAU;

use super::LayoutConfig;
use crate::graph::{NodeRecord, Offset};

/// Place all nodes; the result is indexed by request slot.
pub fn place_radial(nodes: &[NodeRecord], root: usize, config: &LayoutConfig) -> Vec<Offset> {
    let mut offsets = vec![Offset::ZERO; nodes.len()];
    let Some(root_node) = nodes.get(root) else {
        return offsets;
    };

    let orbit: Vec<usize> = (0..nodes.len()).filter(|&slot| slot != root).collect();
    if orbit.is_empty() {
        return offsets;
    }

    let root_size = root_node.size;
    let radius = root_size.width.max(root_size.height) + config.radial_margin.max(0.0);
    // The root counts towards the divisor, so the ring never closes fully.
    let step = (TAU / nodes.len() as f32).max(config.min_radial_angle);
    let cx = root_size.width / 2.0;
    let cy = root_size.height / 2.0;

    for (i, &slot) in orbit.iter().enumerate() {
        let angle = step * i as f32;
        let size = nodes[slot].size;
        offsets[slot] = Offset::new(
            cx + radius * angle.cos() - size.width / 2.0,
            cy + radius * angle.sin() - size.height / 2.0,
        );
    }

    offsets
}
