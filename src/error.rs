//! Error type for the fallible edges of the crate.
//!
//! Layout computation itself never fails; these errors come from the opt-in
//! structural validation and from decoding requests handed over from JS.

use crate::graph::NodeKey;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("duplicate node key: {key}")]
    DuplicateKey { key: NodeKey },

    #[error("edge {from} -> {to} references a node that does not exist")]
    DanglingEdge { from: NodeKey, to: NodeKey },

    #[error("edge on {key} points back at itself")]
    SelfLoop { key: NodeKey },

    #[error("{key} has more than one parent")]
    MultipleParents { key: NodeKey },

    #[error("every node has a parent; there is no root")]
    NoRoot,

    #[error("more than one node has no parent: {roots:?}")]
    MultipleRoots { roots: Vec<NodeKey> },

    #[error("{key} is not reachable from the root (cycle)")]
    Cycle { key: NodeKey },

    #[error("invalid layout input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
