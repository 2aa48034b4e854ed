//! Node records and the small geometry types that travel with them.
//!
//! A node is described entirely by the caller:
//! - A unique key (stable across recomputations)
//! - A measured size (the engine never measures content)
//! - An optional preferred side of the root
//! - Anchor state plus the last known absolute position

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier.
///
/// Keys are supplied by the caller and must be unique within one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(pub String);

impl NodeKey {
    /// Create a new NodeKey.
    #[inline]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the raw key.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<&str> for NodeKey {
    #[inline]
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for NodeKey {
    #[inline]
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Side of the root a subtree grows towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// Children grow leftwards (x decreases).
    Left,
    /// Children grow rightwards (x increases).
    Right,
}

impl Side {
    /// Horizontal direction multiplier: -1 for Left, +1 for Right.
    #[inline]
    pub fn dir(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// The other side.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Width and height of a node or of the whole layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[inline]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Position relative to the layout's local origin (top-left of a node box).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f32,
    pub dy: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    #[inline]
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

impl std::ops::Add for Offset {
    type Output = Offset;

    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl std::ops::Sub for Offset {
    type Output = Offset;

    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

/// One diagram node as seen by the layout engine.
///
/// The record's position in the input slice is its index; `offsets[i]` in the
/// result belongs to `nodes[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub key: NodeKey,
    pub size: Size,
    /// Explicit placement hint for direct children of the root.
    #[serde(default)]
    pub pref_side: Option<Side>,
    /// Pin the node to `previous_absolute_position` instead of recomputing it.
    #[serde(default)]
    pub anchored: bool,
    #[serde(default)]
    pub previous_absolute_position: Option<Offset>,
}

impl NodeRecord {
    /// Create an unanchored node without a side preference.
    pub fn new(key: impl Into<NodeKey>, width: f32, height: f32) -> Self {
        Self {
            key: key.into(),
            size: Size::new(width, height),
            pref_side: None,
            anchored: false,
            previous_absolute_position: None,
        }
    }

    /// Builder-style side preference.
    pub fn with_pref_side(mut self, side: Side) -> Self {
        self.pref_side = Some(side);
        self
    }

    /// Builder-style anchor at a previously known absolute position.
    pub fn anchored_at(mut self, position: Offset) -> Self {
        self.anchored = true;
        self.previous_absolute_position = Some(position);
        self
    }

    /// Builder-style previous position without anchoring.
    pub fn previously_at(mut self, position: Offset) -> Self {
        self.previous_absolute_position = Some(position);
        self
    }

    /// The previous position, but only if the node is actually anchored.
    #[inline]
    pub fn anchor(&self) -> Option<Offset> {
        if self.anchored {
            self.previous_absolute_position
        } else {
            None
        }
    }
}
