// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Precomputed candidate position tables.
//!
//! Leader-line and callout searches walk fixed, finite candidate sequences.
//! The offset tables are rebuilt once per configuration change, not per
//! call, and every search short-circuits on the first accepted candidate.

use alloc::vec::Vec;

use kurbo::{Point, Size};

/// Ring distances for leader-line slots, as multiples of the leader margin.
pub(crate) const LEADER_RING_FACTORS: [f64; 3] = [1.0, 2.0, 3.0];

/// Ring distances for callout candidates around the centroid, as multiples
/// of the leader margin.
pub(crate) const CALLOUT_RING_FACTORS: [f64; 3] = [1.0, 2.0, 3.0];

/// Compass direction of a leader-line slot relative to its anchor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LeaderDir {
    Right,
    RightUp,
    RightDown,
    Left,
    LeftUp,
    LeftDown,
    Above,
    Below,
}

/// Fixed direction order within one ring. Rightward slots come first: they
/// read most naturally next to a moving point.
const LEADER_DIRS: [LeaderDir; 8] = [
    LeaderDir::Right,
    LeaderDir::RightUp,
    LeaderDir::RightDown,
    LeaderDir::Left,
    LeaderDir::LeftUp,
    LeaderDir::LeftDown,
    LeaderDir::Above,
    LeaderDir::Below,
];

/// One leader-line candidate: a direction at a ring distance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct LeaderSlot {
    pub dir: LeaderDir,
    pub dist: f64,
}

impl LeaderSlot {
    /// Top-left origin of a `size` box placed in this slot.
    ///
    /// Leftward and upward slots subtract the box extent so the box sits on
    /// the correct side of the anchor for the direction.
    pub(crate) fn origin(&self, anchor: Point, size: Size) -> Point {
        let d = self.dist;
        let (w, h) = (size.width, size.height);
        match self.dir {
            LeaderDir::Right => Point::new(anchor.x + d, anchor.y - h * 0.5),
            LeaderDir::RightUp => Point::new(anchor.x + d, anchor.y - d - h),
            LeaderDir::RightDown => Point::new(anchor.x + d, anchor.y + d),
            LeaderDir::Left => Point::new(anchor.x - d - w, anchor.y - h * 0.5),
            LeaderDir::LeftUp => Point::new(anchor.x - d - w, anchor.y - d - h),
            LeaderDir::LeftDown => Point::new(anchor.x - d - w, anchor.y + d),
            LeaderDir::Above => Point::new(anchor.x - w * 0.5, anchor.y - d - h),
            LeaderDir::Below => Point::new(anchor.x - w * 0.5, anchor.y + d),
        }
    }
}

/// The full leader-slot table, ring-major so nearer candidates come first.
pub(crate) fn leader_slots(margin: f64) -> Vec<LeaderSlot> {
    let mut slots = Vec::with_capacity(LEADER_RING_FACTORS.len() * LEADER_DIRS.len());
    for factor in LEADER_RING_FACTORS {
        for dir in LEADER_DIRS {
            slots.push(LeaderSlot {
                dir,
                dist: margin * factor,
            });
        }
    }
    slots
}

/// Compass side of a callout candidate relative to the cluster centroid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CalloutSide {
    Right,
    Left,
    Above,
    Below,
}

const CALLOUT_SIDES: [CalloutSide; 4] = [
    CalloutSide::Right,
    CalloutSide::Left,
    CalloutSide::Above,
    CalloutSide::Below,
];

/// One callout candidate: a side at a ring distance from the centroid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct CalloutSlot {
    pub side: CalloutSide,
    pub dist: f64,
}

impl CalloutSlot {
    /// Top-left origin of a `size` callout box placed on this side.
    pub(crate) fn origin(&self, centroid: Point, size: Size) -> Point {
        let d = self.dist;
        let (w, h) = (size.width, size.height);
        match self.side {
            CalloutSide::Right => Point::new(centroid.x + d, centroid.y - h * 0.5),
            CalloutSide::Left => Point::new(centroid.x - d - w, centroid.y - h * 0.5),
            CalloutSide::Above => Point::new(centroid.x - w * 0.5, centroid.y - d - h),
            CalloutSide::Below => Point::new(centroid.x - w * 0.5, centroid.y + d),
        }
    }
}

/// The callout candidate table, ring-major.
pub(crate) fn callout_slots(margin: f64) -> Vec<CalloutSlot> {
    let mut slots = Vec::with_capacity(CALLOUT_RING_FACTORS.len() * CALLOUT_SIDES.len());
    for factor in CALLOUT_RING_FACTORS {
        for side in CALLOUT_SIDES {
            slots.push(CalloutSlot {
                side,
                dist: margin * factor,
            });
        }
    }
    slots
}

/// Cells of the square ring at Chebyshev radius `ring`, in a fixed
/// deterministic order (row-major over the ring's bounding square).
///
/// Ring 0 is the single center cell. Used for the last-resort callout sweep;
/// the caller bounds `ring` by the viewport so the search always terminates.
pub(crate) fn square_ring(ring: i32) -> impl Iterator<Item = (i32, i32)> {
    debug_assert!(ring >= 0, "ring radius must be non-negative");
    (-ring..=ring).flat_map(move |dy| {
        (-ring..=ring)
            .filter(move |dx| dx.abs().max(dy.abs()) == ring)
            .map(move |dx| (dx, dy))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn leader_table_is_ring_major_and_complete() {
        let slots = leader_slots(10.0);
        assert_eq!(slots.len(), 24);
        // First ring exhausts all eight directions before distances grow.
        assert!(slots[..8].iter().all(|s| s.dist == 10.0));
        assert_eq!(slots[8].dist, 20.0);
        assert_eq!(slots[0].dir, LeaderDir::Right);
    }

    #[test]
    fn slot_origins_sit_on_the_right_side_of_the_anchor() {
        let anchor = Point::new(100.0, 100.0);
        let size = Size::new(40.0, 16.0);

        let right = LeaderSlot {
            dir: LeaderDir::Right,
            dist: 10.0,
        };
        let origin = right.origin(anchor, size);
        assert!(origin.x > anchor.x);
        assert_eq!(origin.y, anchor.y - 8.0);

        let left = LeaderSlot {
            dir: LeaderDir::Left,
            dist: 10.0,
        };
        let origin = left.origin(anchor, size);
        // The whole box (origin + width) stays left of the anchor.
        assert_eq!(origin.x + size.width, anchor.x - 10.0);

        let above = LeaderSlot {
            dir: LeaderDir::Above,
            dist: 10.0,
        };
        let origin = above.origin(anchor, size);
        assert_eq!(origin.y + size.height, anchor.y - 10.0);
        assert_eq!(origin.x, anchor.x - 20.0);
    }

    #[test]
    fn callout_sides_clear_the_centroid() {
        let centroid = Point::new(50.0, 50.0);
        let size = Size::new(60.0, 40.0);
        for slot in callout_slots(12.0) {
            let origin = slot.origin(centroid, size);
            let inside_x = origin.x < centroid.x && centroid.x < origin.x + size.width;
            let inside_y = origin.y < centroid.y && centroid.y < origin.y + size.height;
            // The centroid may be inside the box's span on one axis but
            // never on both: each side pushes the box clear of the point.
            assert!(!(inside_x && inside_y), "slot {slot:?} covers the centroid");
        }
    }

    #[test]
    fn square_rings_tile_without_duplicates() {
        let mut seen: Vec<(i32, i32)> = Vec::new();
        for ring in 0..=3 {
            let cells: Vec<_> = square_ring(ring).collect();
            let expected = if ring == 0 { 1 } else { 8 * ring as usize };
            assert_eq!(cells.len(), expected, "ring {ring} perimeter size");
            for c in cells {
                assert!(!seen.contains(&c), "cell {c:?} emitted twice");
                seen.push(c);
            }
        }
        // Rings 0..=3 exactly tile the 7x7 square.
        assert_eq!(seen.len(), 49);
    }
}
