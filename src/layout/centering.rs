//! Bounding box and centring of a placed layout.

use super::Constraints;
use crate::graph::{NodeRecord, Offset, Size};

/// Axis-aligned bounds of a set of node boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Bounds over every `(offset, size)` pair, or None when there are none.
    pub fn of(offsets: &[Offset], nodes: &[NodeRecord]) -> Option<Self> {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for (offset, node) in offsets.iter().zip(nodes) {
            min_x = min_x.min(offset.dx);
            min_y = min_y.min(offset.dy);
            max_x = max_x.max(offset.dx + node.size.width);
            max_y = max_y.max(offset.dy + node.size.height);
        }

        if min_x == f32::INFINITY {
            return None;
        }
        Some(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Translate `offsets` so the content is centred in the available area and
/// return the container size.
///
/// A finite, positive maximum constraint is the available extent on that
/// axis; otherwise the content's own extent is used (never below the
/// minimum constraint).
pub fn center(offsets: &mut [Offset], nodes: &[NodeRecord], constraints: &Constraints) -> Size {
    let Some(bounds) = Bounds::of(offsets, nodes) else {
        return constraints.min_size();
    };

    let width = available(constraints.max_width, constraints.min_width, bounds.width());
    let height = available(constraints.max_height, constraints.min_height, bounds.height());

    let dx = ((width - bounds.width()) / 2.0 - bounds.min_x).round();
    let dy = ((height - bounds.height()) / 2.0 - bounds.min_y).round();
    let shift = Offset::new(dx, dy);
    for offset in offsets.iter_mut() {
        *offset = *offset + shift;
    }

    Size::new(width, height)
}

fn available(max: f32, min: f32, content: f32) -> f32 {
    if max.is_finite() && max > 0.0 {
        max
    } else if min.is_finite() {
        content.max(min)
    } else {
        content
    }
}
