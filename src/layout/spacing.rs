//! Depth-aware spacing.
//!
//! Deeper levels get progressively more room: both the horizontal gap to the
//! parent and the vertical gap between siblings grow by 10% of the base value
//! per level, rounded to whole units.

/// Lower bound applied to both base spacings.
pub const MIN_SPACING: f32 = 8.0;

/// Growth per depth level, as a fraction of the base spacing.
const DEPTH_GROWTH: f32 = 0.1;

/// Spacing functions built once per layout call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingModel {
    base_x: f32,
    base_y: f32,
}

impl SpacingModel {
    /// Build a spacing model; both bases are floored at [`MIN_SPACING`].
    pub fn new(spacing_x: f32, spacing_y: f32) -> Self {
        Self {
            base_x: floor_spacing(spacing_x),
            base_y: floor_spacing(spacing_y),
        }
    }

    /// Horizontal gap between a node at `depth` and its children.
    #[inline]
    pub fn spacing_x(&self, depth: u32) -> f32 {
        grow(self.base_x, depth)
    }

    /// Vertical gap between siblings at `depth`.
    #[inline]
    pub fn node_spacing(&self, depth: u32) -> f32 {
        grow(self.base_y, depth)
    }
}

fn floor_spacing(value: f32) -> f32 {
    // NaN also lands on the floor
    if value >= MIN_SPACING { value } else { MIN_SPACING }
}

#[inline]
fn grow(base: f32, depth: u32) -> f32 {
    (base * (1.0 + DEPTH_GROWTH * depth as f32)).round()
}
