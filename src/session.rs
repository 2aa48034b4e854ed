//! LayoutSession - stateful wrapper around the layout engine.
//!
//! The engine itself is a pure function. A session plays the caller's part
//! between repeated calls:
//! - remembers the sides from the last balanced layout and feeds them back
//! - remembers every node's last position so anchors can follow moving parents
//! - keeps pinned nodes anchored at an explicit position
//! - answers an identical request from a single-entry cache
//! - keeps a spatial index of the last result for hit testing

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use tracing::trace;

use crate::graph::{NodeKey, Offset, Side};
use crate::layout::{LayoutConfig, LayoutRequest, LayoutResult, MindMapLayout};
use crate::spatial::LayoutIndex;

/// Single-entry memo of the last layout, keyed by a request signature.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entry: Option<(u64, LayoutResult)>,
    hits: u64,
    misses: u64,
}

impl LayoutCache {
    /// Cached result for `signature`, counting the hit or miss.
    pub fn get(&mut self, signature: u64) -> Option<&LayoutResult> {
        match &self.entry {
            Some((cached, result)) if *cached == signature => {
                self.hits += 1;
                Some(result)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, signature: u64, result: LayoutResult) {
        self.entry = Some((signature, result));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Caller-side state carried across layout calls.
#[derive(Default)]
pub struct LayoutSession {
    engine: MindMapLayout,

    /// Sides returned by the last layout
    previous_sides: HashMap<NodeKey, Side>,

    /// Offsets returned by the last layout
    last_positions: HashMap<NodeKey, Offset>,

    /// Nodes pinned at an explicit position
    pinned: HashMap<NodeKey, Offset>,

    cache: LayoutCache,

    /// Index over the last result; slots map through `last_keys`
    index: LayoutIndex,
    last_keys: Vec<NodeKey>,
}

impl LayoutSession {
    /// Create a session with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with the given configuration.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            engine: MindMapLayout::new(config),
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.engine.config()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out `request`, filling in what the session remembers.
    ///
    /// Pinned nodes become anchored at their pinned position. Nodes without a
    /// previous position get the one from the last result. Without explicit
    /// `previous_sides` the sides from the last result are used.
    pub fn compute(&mut self, request: &LayoutRequest) -> LayoutResult {
        let request = self.prepare(request);
        let signature = signature(self.engine.config(), &request);

        if let Some(result) = self.cache.get(signature) {
            trace!(signature, "layout cache hit");
            return result.clone();
        }
        trace!(signature, "layout cache miss");

        let result = self.engine.compute_request(&request);

        self.previous_sides = result.updated_sides.clone();
        self.last_keys = request.nodes.iter().map(|n| n.key.clone()).collect();
        self.last_positions = self
            .last_keys
            .iter()
            .cloned()
            .zip(result.offsets.iter().copied())
            .collect();
        self.index = LayoutIndex::new(&result.offsets, &request.nodes);
        self.cache.insert(signature, result.clone());

        result
    }

    fn prepare(&self, request: &LayoutRequest) -> LayoutRequest {
        let mut request = request.clone();
        for node in &mut request.nodes {
            if let Some(&position) = self.pinned.get(&node.key) {
                node.anchored = true;
                node.previous_absolute_position = Some(position);
            } else if node.previous_absolute_position.is_none() {
                node.previous_absolute_position = self.last_positions.get(&node.key).copied();
            }
        }
        if request.previous_sides.is_none() && !self.previous_sides.is_empty() {
            request.previous_sides = Some(self.previous_sides.clone());
        }
        request
    }

    // =========================================================================
    // Pinning
    // =========================================================================

    /// Keep `key` at `position` in every following layout.
    pub fn pin_node(&mut self, key: impl Into<NodeKey>, position: Offset) {
        self.pinned.insert(key.into(), position);
    }

    /// Let `key` be placed by the layout again.
    ///
    /// Returns true if the node was pinned.
    pub fn unpin_node(&mut self, key: &NodeKey) -> bool {
        self.pinned.remove(key).is_some()
    }

    pub fn is_node_pinned(&self, key: &NodeKey) -> bool {
        self.pinned.contains_key(key)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Node under `(x, y)` in the last result.
    pub fn node_at(&self, x: f32, y: f32) -> Option<&NodeKey> {
        self.index.at(x, y).and_then(|slot| self.last_keys.get(slot))
    }

    /// Nodes intersecting the rectangle in the last result, in input order.
    pub fn nodes_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<NodeKey> {
        self.index
            .in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .filter_map(|slot| self.last_keys.get(slot).cloned())
            .collect()
    }

    /// Sides that will be fed into the next balanced layout.
    pub fn previous_sides(&self) -> &HashMap<NodeKey, Side> {
        &self.previous_sides
    }

    /// Last offset of `key`, if it was part of the last result.
    pub fn last_position(&self, key: &NodeKey) -> Option<Offset> {
        self.last_positions.get(key).copied()
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    /// Forget everything remembered from earlier calls, including pins.
    pub fn clear(&mut self) {
        self.previous_sides.clear();
        self.last_positions.clear();
        self.pinned.clear();
        self.cache.clear();
        self.index = LayoutIndex::default();
        self.last_keys.clear();
    }
}

/// 64-bit signature of everything a layout depends on.
fn signature(config: &LayoutConfig, request: &LayoutRequest) -> u64 {
    let mut hasher = FxHasher::default();
    let float = |hasher: &mut FxHasher, v: f32| v.to_bits().hash(hasher);

    float(&mut hasher, config.spacing_x);
    float(&mut hasher, config.spacing_y);
    float(&mut hasher, config.radial_margin);
    float(&mut hasher, config.min_radial_angle);

    let c = &request.constraints;
    for v in [c.min_width, c.max_width, c.min_height, c.max_height] {
        float(&mut hasher, v);
    }
    request.mode.hash(&mut hasher);
    request.direction.hash(&mut hasher);

    request.nodes.len().hash(&mut hasher);
    for node in &request.nodes {
        node.key.hash(&mut hasher);
        float(&mut hasher, node.size.width);
        float(&mut hasher, node.size.height);
        node.pref_side.hash(&mut hasher);
        node.anchored.hash(&mut hasher);
        match node.previous_absolute_position {
            Some(p) => {
                1u8.hash(&mut hasher);
                float(&mut hasher, p.dx);
                float(&mut hasher, p.dy);
            }
            None => 0u8.hash(&mut hasher),
        }
    }

    request.edges.len().hash(&mut hasher);
    for edge in &request.edges {
        edge.hash(&mut hasher);
    }

    match &request.previous_sides {
        Some(sides) => {
            let mut sorted: Vec<_> = sides.iter().collect();
            sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
            sorted.hash(&mut hasher);
        }
        None => 0u8.hash(&mut hasher),
    }

    hasher.finish()
}
