//! Edge records.
//!
//! Edges are directed parent→child links between node keys. Their order is
//! significant: siblings are laid out in edge-declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeKey;

/// A directed parent→child edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: NodeKey,
    pub to: NodeKey,
}

impl EdgeRecord {
    /// Create a new edge from `from` (parent) to `to` (child).
    #[inline]
    pub fn new(from: impl Into<NodeKey>, to: impl Into<NodeKey>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Whether the edge points back at its own source.
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for EdgeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({} -> {})", self.from.as_str(), self.to.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_display() {
        let edge = EdgeRecord::new("a", "b");
        assert_eq!(format!("{}", edge), "Edge(a -> b)");
    }

    #[test]
    fn test_self_loop() {
        assert!(EdgeRecord::new("a", "a").is_self_loop());
        assert!(!EdgeRecord::new("a", "b").is_self_loop());
    }
}
