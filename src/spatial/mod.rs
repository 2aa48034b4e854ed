//! Spatial indexing of laid-out nodes for hit testing and overlap checks.

mod rtree;

pub use rtree::{LayoutIndex, NodeBox};
