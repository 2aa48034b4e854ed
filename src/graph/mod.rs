//! Node/edge records and request topology.
//!
//! Records are plain serde types owned by the caller. The [`Forest`] turns
//! them into a petgraph StableGraph for root detection and adjacency, and
//! extracts an index-addressed [`Tree`] arena for the layout passes.

mod edge;
mod forest;
mod node;

pub use edge::EdgeRecord;
pub use forest::{Forest, Tree, TreeNode, validate_structure};
pub use node::{NodeKey, NodeRecord, Offset, Side, Size};
