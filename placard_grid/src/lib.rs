// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=placard_grid --heading-base-level=0

//! Placard Grid: a uniform-cell broad-phase overlap index for label placement.
//!
//! Placard Grid answers one question quickly: "does this screen-space box
//! overlap anything accepted so far this frame?" It is the collision substrate
//! under a greedy placement pass that commits boxes one at a time.
//!
//! - Insert axis-aligned boxes as they are accepted.
//! - Query candidate boxes for strict overlap against the accumulated set.
//! - Clear once per frame; the index is rebuilt wholesale, so there is no
//!   removal or update operation.
//!
//! It is generic over the scalar type `T` (`f32`, `f64`) and does not depend
//! on any geometry crate. Higher layers compute screen-space boxes and feed
//! them here.
//!
//! Overlap is *strict*: two boxes that merely share an edge are considered
//! non-overlapping, so labels may sit flush against each other. See
//! [`Aabb2D::overlaps`].
//!
//! # Example
//!
//! ```rust
//! use placard_grid::{Aabb2D, FrameGrid};
//!
//! // One grid per placement pass; cell size on the order of a label box.
//! let mut grid: FrameGrid<f64> = FrameGrid::new(48.0);
//!
//! // Accept a first label.
//! let a = Aabb2D::from_xywh(100.0, 100.0, 72.0, 16.0);
//! assert!(!grid.has_overlap(&a));
//! grid.insert(a);
//!
//! // A candidate intruding into it is rejected...
//! assert!(grid.has_overlap(&Aabb2D::from_xywh(130.0, 110.0, 72.0, 16.0)));
//!
//! // ...but a candidate sharing only an edge is fine.
//! assert!(!grid.has_overlap(&Aabb2D::from_xywh(100.0, 116.0, 72.0, 16.0)));
//!
//! // Next frame starts from scratch.
//! grid.clear();
//! ```
//!
//! ## Scaling note
//!
//! Buckets are vectors of indices into a dense box array, deduplicated at
//! query time. For the populations this crate targets (tens to low hundreds
//! of concurrently placed boxes) that is adequate; a workload with thousands
//! of boxes per frame would want a bounding-volume hierarchy instead.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Debug builds
//! may assert.

#![no_std]

extern crate alloc;

mod grid;
mod types;

pub use grid::FrameGrid;
pub use types::{Aabb2D, GridScalar};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_accumulation_pattern() {
        // Mimic a placement pass: test, accept, insert, repeat.
        let mut grid: FrameGrid<f64> = FrameGrid::new(48.0);
        let candidates = [
            Aabb2D::from_xywh(10.0, 10.0, 60.0, 14.0),
            Aabb2D::from_xywh(40.0, 12.0, 60.0, 14.0), // collides with the first
            Aabb2D::from_xywh(10.0, 24.0, 60.0, 14.0), // flush below the first
        ];

        let mut accepted = 0;
        for c in &candidates {
            if !grid.has_overlap(c) {
                grid.insert(*c);
                accepted += 1;
            }
        }
        assert_eq!(accepted, 2);
        assert_eq!(grid.len(), 2);
    }
}
