//! Mind-map Layout - WASM Module
//!
//! Computes positions for the nodes of a mind map: a root with children
//! growing to the right, to the left, or split between both sides, plus a
//! radial mode for small flat maps. It is compiled to WebAssembly and
//! exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: node/edge records and petgraph-backed topology
//! - `layout`: the layout engine (spacing, subtree sizes, sides, placement,
//!   centring, anchors)
//! - `spatial`: R-tree over the laid-out boxes for hit testing
//! - `session`: caller-side state across repeated layouts (sides, pins, cache)

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;
pub mod session;
pub mod spatial;

pub use error::LayoutError;
pub use graph::{EdgeRecord, NodeKey, NodeRecord, Offset, Side, Size, validate_structure};
pub use layout::{
    Constraints, LayoutConfig, LayoutMode, LayoutRequest, LayoutResult, MindMapLayout,
};
pub use session::{LayoutCache, LayoutSession};
pub use spatial::LayoutIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

// =============================================================================
// JS Conversion
// =============================================================================

fn from_js<T: DeserializeOwned>(value: JsValue) -> error::Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| LayoutError::InvalidInput(e.to_string()))
}

/// Maps become plain objects so `updatedSides[key]` works on the JS side.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&e.to_string()))
}

// =============================================================================
// Stateless API
// =============================================================================

/// Compute a layout from a request object.
///
/// The request is `{ nodes, edges, mode?, constraints?, direction?,
/// previousSides? }`; the result is `{ offsets, size, updatedSides }` with
/// one offset per input node, in input order.
#[wasm_bindgen(js_name = computeLayout)]
pub fn compute_layout(request: JsValue) -> Result<JsValue, JsError> {
    let request: LayoutRequest = from_js(request)?;
    let result = MindMapLayout::with_defaults().compute_request(&request);
    to_js(&result)
}

/// Check that `nodes` and `edges` form exactly one tree.
///
/// Throws with a description of the first problem found.
#[wasm_bindgen(js_name = validateStructure)]
pub fn validate_structure_js(nodes: JsValue, edges: JsValue) -> Result<(), JsError> {
    let nodes: Vec<NodeRecord> = from_js(nodes)?;
    let edges: Vec<EdgeRecord> = from_js(edges)?;
    validate_structure(&nodes, &edges)?;
    Ok(())
}

// =============================================================================
// Session API
// =============================================================================

/// Stateful layout engine.
///
/// Remembers sides, positions and pins between calls so repeated layouts of
/// an edited map stay stable.
#[wasm_bindgen]
pub struct MindMapLayoutWasm {
    session: LayoutSession,
}

#[wasm_bindgen]
impl MindMapLayoutWasm {
    /// Create a layout engine with default spacing.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            session: LayoutSession::new(),
        }
    }

    /// Create a layout engine from a config object.
    ///
    /// # Arguments
    ///
    /// * `config` - `{ spacingX?, spacingY?, radialMargin?, minRadialAngle? }`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<MindMapLayoutWasm, JsError> {
        let config: LayoutConfig = from_js(config)?;
        Ok(Self {
            session: LayoutSession::with_config(config),
        })
    }

    /// Compute a layout; see `computeLayout` for the request shape.
    pub fn compute(&mut self, request: JsValue) -> Result<JsValue, JsError> {
        let request: LayoutRequest = from_js(request)?;
        let result = self.session.compute(&request);
        to_js(&result)
    }

    // =========================================================================
    // Pinning
    // =========================================================================

    /// Pin a node at a position (e.g. after the user dragged it).
    #[wasm_bindgen(js_name = pinNode)]
    pub fn pin_node(&mut self, key: &str, x: f32, y: f32) {
        self.session.pin_node(key, Offset::new(x, y));
    }

    /// Unpin a node. Returns true if it was pinned.
    #[wasm_bindgen(js_name = unpinNode)]
    pub fn unpin_node(&mut self, key: &str) -> bool {
        self.session.unpin_node(&NodeKey::new(key))
    }

    /// Check if a node is pinned.
    #[wasm_bindgen(js_name = isNodePinned)]
    pub fn is_node_pinned(&self, key: &str) -> bool {
        self.session.is_node_pinned(&NodeKey::new(key))
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Key of the node under a point in the last layout.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32) -> Option<String> {
        self.session.node_at(x, y).map(|key| key.as_str().to_owned())
    }

    /// Keys of all nodes intersecting a rectangle in the last layout.
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<String> {
        self.session
            .nodes_in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(|key| key.0)
            .collect()
    }

    /// Forget remembered sides, positions and pins.
    pub fn clear(&mut self) {
        self.session.clear();
    }
}

impl Default for MindMapLayoutWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Asymmetric tree: some nodes get many children, some none.
    fn hierarchical(node_count: usize) -> (Vec<NodeRecord>, Vec<EdgeRecord>) {
        let mut nodes = vec![NodeRecord::new("n0", 160.0, 48.0)];
        let mut edges = Vec::new();
        let mut queue = vec![0usize];

        while nodes.len() < node_count {
            let mut next_queue = Vec::new();
            for &parent in &queue {
                let children = match parent % 5 {
                    0 => 5,
                    1 => 3,
                    2 => 2,
                    3 => 1,
                    _ => 0,
                };
                for _ in 0..children {
                    if nodes.len() >= node_count {
                        break;
                    }
                    let id = nodes.len();
                    let height = 24.0 + (id % 7) as f32 * 6.0;
                    let width = 60.0 + (id % 4) as f32 * 20.0;
                    nodes.push(NodeRecord::new(format!("n{id}"), width, height));
                    edges.push(EdgeRecord::new(format!("n{parent}"), format!("n{id}")));
                    next_queue.push(id);
                }
            }
            if next_queue.is_empty() {
                break;
            }
            queue = next_queue;
        }
        (nodes, edges)
    }

    fn layout(mode: LayoutMode, nodes: &[NodeRecord], edges: &[EdgeRecord]) -> LayoutResult {
        MindMapLayout::with_defaults().compute(
            &Constraints::default(),
            mode,
            nodes,
            edges,
            Side::Right,
            None,
        )
    }

    #[test]
    fn test_large_hierarchical_tree() {
        let (nodes, edges) = hierarchical(1000);
        assert!(validate_structure(&nodes, &edges).is_ok());

        for mode in [LayoutMode::Tree, LayoutMode::TreeBalanced] {
            let result = layout(mode, &nodes, &edges);
            assert_eq!(result.offsets.len(), nodes.len());
            assert!(
                result.offsets.iter().all(|o| o.dx.is_finite() && o.dy.is_finite()),
                "{mode:?}: all offsets should be finite"
            );

            let index = LayoutIndex::new(&result.offsets, &nodes);
            let overlaps = index.overlapping_pairs();
            assert!(overlaps.is_empty(), "{mode:?}: {} overlapping pairs", overlaps.len());

            // Everything fits in the reported size
            let bounds = layout::Bounds::of(&result.offsets, &nodes).unwrap();
            assert!(bounds.min_x >= -0.5 && bounds.min_y >= -0.5);
            assert!(bounds.max_x <= result.size.width + 0.5);
            assert!(bounds.max_y <= result.size.height + 0.5);
        }
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 2000;
        let nodes: Vec<NodeRecord> = (0..depth)
            .map(|i| NodeRecord::new(format!("d{i}"), 40.0, 20.0))
            .collect();
        let edges: Vec<EdgeRecord> = (1..depth)
            .map(|i| EdgeRecord::new(format!("d{}", i - 1), format!("d{i}")))
            .collect();

        let result = layout(LayoutMode::Tree, &nodes, &edges);
        assert_eq!(result.offsets.len(), depth);
        for pair in result.offsets.windows(2) {
            assert!(pair[1].dx > pair[0].dx, "chain should keep growing outward");
        }
    }

    #[test]
    fn test_session_edit_cycle() {
        let (nodes, edges) = hierarchical(200);
        let mut session = LayoutSession::new();
        let mut request = LayoutRequest::new(nodes, edges);

        let first = session.compute(&request);
        let dragged = NodeKey::new("n3");
        let slot = request.nodes.iter().position(|n| n.key == dragged).unwrap();
        let target = first.offsets[slot] + Offset::new(0.0, 500.0);
        session.pin_node(dragged.clone(), target);

        // Add a leaf far from the dragged node
        request.nodes.push(NodeRecord::new("late", 80.0, 30.0));
        request.edges.push(EdgeRecord::new("n1", "late"));
        let second = session.compute(&request);

        for (key, side) in &first.updated_sides {
            assert_eq!(second.updated_sides.get(key), Some(side), "{key} changed side");
        }
        assert_eq!(second.offsets[slot], target, "pinned node should stay put");
        assert!(session.is_node_pinned(&dragged));
    }

    #[test]
    fn test_request_decodes_with_defaults() {
        let (nodes, edges) = hierarchical(5);
        let request = LayoutRequest::new(nodes, edges);
        assert_eq!(request.mode, LayoutMode::TreeBalanced);
        assert_eq!(request.direction, Side::Right);
        assert_eq!(request.constraints, Constraints::default());
    }

    #[test]
    fn test_invalid_structure_is_reported() {
        let nodes = vec![NodeRecord::new("a", 10.0, 10.0), NodeRecord::new("b", 10.0, 10.0)];
        let edges = vec![EdgeRecord::new("a", "b"), EdgeRecord::new("b", "a")];
        assert!(validate_structure(&nodes, &edges).is_err());
        // compute still produces something usable
        let result = layout(LayoutMode::Tree, &nodes, &edges);
        assert_eq!(result.offsets.len(), 2);
    }
}
