//! Mind-map layout engine.
//!
//! Given a tree of sized nodes, computes a collision-free, depth-aware and
//! optionally left/right-balanced placement plus the container size.
//!
//! # Pipeline
//!
//! 1. **Topology:** build the [`Forest`] and extract the tree arena from the
//!    root (first parentless node, or the first node).
//! 2. **Placement:** one of
//!    - [`LayoutMode::Radial`]: root at the origin, everything else on a circle;
//!    - [`LayoutMode::Tree`]: one depth-first pass growing towards `direction`;
//!    - [`LayoutMode::TreeBalanced`]: split the root's children into a Left
//!      and a Right group, then one pass per side.
//! 3. **Centring:** translate everything into the available area.
//! 4. **Anchors:** pin anchored nodes to their previous positions and drag
//!    their unanchored descendants along.
//!
//! The engine is a pure function of its inputs; the only memo (subtree
//! heights) lives for a single call.

pub mod anchor;
pub mod centering;
pub mod radial;
pub mod sides;
pub mod spacing;
pub mod subtree;
pub mod tree;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::graph::{EdgeRecord, Forest, NodeKey, NodeRecord, Offset, Side, Size, Tree};
use sides::{SideCandidate, assign_sides};
use spacing::SpacingModel;
use tree::TreePlacer;

pub use centering::Bounds;

/// Placement strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    /// Root at the origin, all other nodes on a circle around it.
    Radial,
    /// Whole tree grows towards a single direction.
    Tree,
    /// Root's children split between Left and Right.
    #[default]
    TreeBalanced,
}

/// Bounds for the final container; any side may be unbounded (infinite).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min_width: 0.0,
            max_width: f32::INFINITY,
            min_height: 0.0,
            max_height: f32::INFINITY,
        }
    }
}

impl Constraints {
    /// Up to `width` × `height`, no minimum.
    pub fn loose(width: f32, height: f32) -> Self {
        Self {
            min_width: 0.0,
            max_width: width,
            min_height: 0.0,
            max_height: height,
        }
    }

    /// Smallest size the constraints allow (unbounded minimums count as zero).
    pub fn min_size(&self) -> Size {
        let finite = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Size::new(finite(self.min_width), finite(self.min_height))
    }
}

/// Configuration for the mind-map layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Base horizontal gap between a parent and its children.
    pub spacing_x: f32,
    /// Base vertical gap between siblings.
    pub spacing_y: f32,
    /// Radial mode: distance added to the root's larger dimension.
    pub radial_margin: f32,
    /// Radial mode: smallest angular step between neighbours (radians).
    pub min_radial_angle: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing_x: 80.0,
            spacing_y: 20.0,
            radial_margin: 100.0,
            min_radial_angle: std::f32::consts::PI / 18.0,
        }
    }
}

impl LayoutConfig {
    /// Spacing functions for this configuration.
    pub fn spacing(&self) -> SpacingModel {
        SpacingModel::new(self.spacing_x, self.spacing_y)
    }
}

fn default_direction() -> Side {
    Side::Right
}

/// Everything one layout call needs, in a form that can be decoded from JS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub mode: LayoutMode,
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    /// Growth direction for [`LayoutMode::Tree`].
    #[serde(default = "default_direction")]
    pub direction: Side,
    /// Sides from the previous balanced layout.
    #[serde(default)]
    pub previous_sides: Option<HashMap<NodeKey, Side>>,
}

impl LayoutRequest {
    /// A request with default constraints, balanced mode and no history.
    pub fn new(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Self {
        Self {
            constraints: Constraints::default(),
            mode: LayoutMode::default(),
            nodes,
            edges,
            direction: default_direction(),
            previous_sides: None,
        }
    }
}

/// Result of a layout call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    /// One offset per input node, in input order.
    pub offsets: Vec<Offset>,
    /// Container size.
    pub size: Size,
    /// Sides to feed back as `previous_sides` next time: the incoming map with
    /// the root's current children updated, so a node that is only briefly
    /// re-parented keeps its remembered side.
    pub updated_sides: HashMap<NodeKey, Side>,
}

/// The mind-map layout engine.
#[derive(Debug, Clone, Default)]
pub struct MindMapLayout {
    config: LayoutConfig,
}

impl MindMapLayout {
    /// Create a new layout engine with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute the layout for a decoded request.
    pub fn compute_request(&self, request: &LayoutRequest) -> LayoutResult {
        self.compute(
            &request.constraints,
            request.mode,
            &request.nodes,
            &request.edges,
            request.direction,
            request.previous_sides.as_ref(),
        )
    }

    /// Compute node offsets and the container size.
    ///
    /// # Arguments
    ///
    /// * `constraints` - Bounds for the container
    /// * `mode` - Placement strategy
    /// * `nodes` - Node records; their order defines the order of `offsets`
    /// * `edges` - Directed parent→child edges; sibling order follows edge order
    /// * `direction` - Growth direction, used only by [`LayoutMode::Tree`]
    /// * `previous_sides` - Sides from the previous call, used only by
    ///   [`LayoutMode::TreeBalanced`]
    ///
    /// Never fails: empty input yields the minimum size and no offsets,
    /// dangling edges are ignored and an ambiguous root falls back to the
    /// first parentless node (or the first node).
    pub fn compute(
        &self,
        constraints: &Constraints,
        mode: LayoutMode,
        nodes: &[NodeRecord],
        edges: &[EdgeRecord],
        direction: Side,
        previous_sides: Option<&HashMap<NodeKey, Side>>,
    ) -> LayoutResult {
        let span = debug_span!(
            "mindmap_layout",
            ?mode,
            nodes = nodes.len(),
            edges = edges.len()
        );
        let _enter = span.enter();

        let mut updated_sides = previous_sides.cloned().unwrap_or_default();

        let forest = Forest::from_records(nodes, edges);
        debug!(
            edges = forest.edge_count(),
            dropped = forest.dropped_edges(),
            "topology built"
        );
        let Some(root) = forest.root() else {
            debug!("empty input");
            return LayoutResult {
                offsets: Vec::new(),
                size: constraints.min_size(),
                updated_sides,
            };
        };
        let tree = forest.tree(root);
        let spacing = self.config.spacing();

        let mut offsets = match mode {
            LayoutMode::Radial => radial::place_radial(nodes, root, &self.config),
            LayoutMode::Tree => {
                let mut placer = TreePlacer::new(&tree, nodes, spacing);
                placer.place_children(Tree::ROOT, tree.root_children(), direction);
                placer.into_slot_offsets(nodes.len())
            }
            LayoutMode::TreeBalanced => {
                let mut placer = TreePlacer::new(&tree, nodes, spacing);
                let children = tree.root_children();

                let candidates: Vec<SideCandidate> = children
                    .iter()
                    .map(|&child| {
                        let record = &nodes[tree.nodes[child].slot];
                        SideCandidate {
                            height: placer.heights().height(child, 1),
                            pref_side: record.pref_side,
                            previous_side: previous_sides
                                .and_then(|sides| sides.get(&record.key))
                                .copied(),
                        }
                    })
                    .collect();
                let sides = assign_sides(&candidates, spacing.node_spacing(1));

                let mut left = Vec::new();
                let mut right = Vec::new();
                for (&child, &side) in children.iter().zip(&sides) {
                    match side {
                        Side::Left => left.push(child),
                        Side::Right => right.push(child),
                    }
                    updated_sides.insert(nodes[tree.nodes[child].slot].key.clone(), side);
                }
                debug!(left = left.len(), right = right.len(), "balanced split");

                placer.place_children(Tree::ROOT, &left, Side::Left);
                placer.place_children(Tree::ROOT, &right, Side::Right);
                placer.into_slot_offsets(nodes.len())
            }
        };

        let size = centering::center(&mut offsets, nodes, constraints);
        let offsets = anchor::propagate_anchors(&tree, nodes, &offsets);

        LayoutResult {
            offsets,
            size,
            updated_sides,
        }
    }
}
