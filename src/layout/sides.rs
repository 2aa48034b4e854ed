//! Left/right partition of the root's children for balanced layouts.
//!
//! # Algorithm
//!
//! 1. **Greedy pass:** walk the children in edge order. A child with an
//!    explicit preference (or, failing that, a remembered side from the
//!    previous layout) goes to that side; any other child goes to the side
//!    with the smaller running height, ties favouring Left. Each side's total
//!    accumulates subtree heights plus the sibling gap between them.
//! 2. **Rebalancing:** while the count difference is above one, move a child
//!    from the larger side to the smaller one. Only children without an
//!    explicit preference may move; children without a remembered side move
//!    first, then the smallest subtree height wins.
//! 3. **Parity:** with an even number of children the loop keeps going until
//!    both sides hold the same count, so the split depends only on parity
//!    once the greedy pass is close.

use tracing::trace;

use crate::graph::Side;

/// One direct child of the root, as seen by the side assigner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideCandidate {
    /// Subtree height at depth 1.
    pub height: f32,
    /// Explicit caller preference; never overridden.
    pub pref_side: Option<Side>,
    /// Side from the previous layout; honoured unless rebalancing needs it.
    pub previous_side: Option<Side>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    height: f32,
    count: usize,
}

impl Tally {
    fn push(&mut self, height: f32, gap: f32) {
        if self.count > 0 {
            self.height += gap;
        }
        self.height += height;
        self.count += 1;
    }
}

/// Assign a side to each candidate; the result is aligned with `candidates`.
///
/// `gap` is the sibling spacing at depth 1.
pub fn assign_sides(candidates: &[SideCandidate], gap: f32) -> Vec<Side> {
    let mut sides: Vec<Side> = Vec::with_capacity(candidates.len());
    let mut left = Tally::default();
    let mut right = Tally::default();

    for (i, candidate) in candidates.iter().enumerate() {
        let side = match candidate.pref_side.or(candidate.previous_side) {
            Some(side) => side,
            None if left.height <= right.height => Side::Left,
            None => Side::Right,
        };
        match side {
            Side::Left => left.push(candidate.height, gap),
            Side::Right => right.push(candidate.height, gap),
        }
        trace!(child = i, ?side, left = left.height, right = right.height, "greedy side");
        sides.push(side);
    }

    let even = candidates.len() % 2 == 0;
    loop {
        let diff = left.count.abs_diff(right.count);
        if diff <= 1 && !(even && diff != 0) {
            break;
        }

        let from = if left.count > right.count {
            Side::Left
        } else {
            Side::Right
        };
        let pick = candidates
            .iter()
            .enumerate()
            .filter(|&(i, c)| sides[i] == from && c.pref_side.is_none())
            .min_by(|(_, a), (_, b)| {
                a.previous_side
                    .is_some()
                    .cmp(&b.previous_side.is_some())
                    .then(a.height.total_cmp(&b.height))
            })
            .map(|(i, _)| i);

        let Some(i) = pick else {
            trace!(?from, "no movable child; preferences win over balance");
            break;
        };

        sides[i] = from.opposite();
        match from {
            Side::Left => {
                left.count -= 1;
                right.count += 1;
            }
            Side::Right => {
                right.count -= 1;
                left.count += 1;
            }
        }
        trace!(child = i, to = ?sides[i], "rebalanced");
    }

    sides
}
