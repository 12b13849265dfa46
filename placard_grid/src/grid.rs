// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform-cell broad-phase grid, rebuilt wholesale every frame.
//!
//! The grid buckets inserted boxes into fixed-size cells and answers overlap
//! queries by touching only the cells the query box spans. It is intended for
//! the per-frame accumulation pattern of a placement pass:
//!
//! - boxes are only ever inserted as they are accepted,
//! - queries ask "does this candidate overlap anything accepted so far?",
//! - the whole structure is cleared once per frame and rebuilt.
//!
//! There is deliberately no removal or update operation.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::types::{Aabb2D, GridScalar};

/// Uniform grid accumulating accepted boxes for one frame.
///
/// Cell buckets hold indices into a dense box array, so a box spanning
/// several cells is stored once and referenced cheaply. Queries deduplicate
/// candidate indices before testing true rectangle overlap.
///
/// # Example
///
/// ```
/// use placard_grid::{Aabb2D, FrameGrid};
///
/// let mut grid: FrameGrid<f64> = FrameGrid::new(48.0);
/// grid.insert(Aabb2D::from_xywh(10.0, 10.0, 60.0, 16.0));
///
/// assert!(grid.has_overlap(&Aabb2D::from_xywh(40.0, 12.0, 60.0, 16.0)));
/// assert!(!grid.has_overlap(&Aabb2D::from_xywh(10.0, 26.0, 60.0, 16.0)));
///
/// grid.clear();
/// assert!(grid.is_empty());
/// ```
pub struct FrameGrid<T: GridScalar> {
    cell_size: T,
    cells: HashMap<(i32, i32), SmallVec<[usize; 8]>>,
    boxes: Vec<Aabb2D<T>>,
}

impl<T: GridScalar> Debug for FrameGrid<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameGrid")
            .field("cell_size", &self.cell_size)
            .field("boxes", &self.boxes.len())
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}

impl<T: GridScalar> FrameGrid<T> {
    /// Create a new grid with the given cell size.
    ///
    /// The cell size is configured once and should be on the order of the
    /// boxes being inserted, so that most boxes span only a handful of cells.
    pub fn new(cell_size: T) -> Self {
        debug_assert!(
            cell_size > T::zero(),
            "cell_size must be strictly positive"
        );
        Self {
            cell_size,
            cells: HashMap::new(),
            boxes: Vec::new(),
        }
    }

    /// The configured cell size.
    pub fn cell_size(&self) -> T {
        self.cell_size
    }

    /// Number of boxes inserted since the last [`clear`][Self::clear].
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether no boxes have been inserted since the last clear.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Insert a box, appending its index to every cell bucket it spans.
    ///
    /// Empty or inverted boxes are stored but can never report overlap, so
    /// callers need not filter degenerate input.
    pub fn insert(&mut self, aabb: Aabb2D<T>) {
        let idx = self.boxes.len();
        let (ix0, ix1) = self.cell_range(aabb.min_x, aabb.max_x);
        let (iy0, iy1) = self.cell_range(aabb.min_y, aabb.max_y);
        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                self.cells.entry((ix, iy)).or_default().push(idx);
            }
        }
        self.boxes.push(aabb);
    }

    /// Whether `aabb` strictly overlaps any inserted box.
    ///
    /// Short-circuits on the first hit.
    pub fn has_overlap(&self, aabb: &Aabb2D<T>) -> bool {
        let mut hit = false;
        self.visit_candidates(aabb, |other| {
            if aabb.overlaps(other) {
                hit = true;
                false
            } else {
                true
            }
        });
        hit
    }

    /// Visit every inserted box that strictly overlaps `aabb`.
    ///
    /// Each overlapping box is visited exactly once, even when it spans
    /// several of the query's cells. Does not allocate result storage beyond
    /// the dedup set.
    pub fn visit_overlaps<F: FnMut(&Aabb2D<T>)>(&self, aabb: &Aabb2D<T>, mut f: F) {
        self.visit_candidates(aabb, |other| {
            if aabb.overlaps(other) {
                f(other);
            }
            true
        });
    }

    /// Collect every inserted box that strictly overlaps `aabb`.
    pub fn query_overlaps(&self, aabb: &Aabb2D<T>) -> Vec<Aabb2D<T>> {
        let mut out = Vec::new();
        self.visit_overlaps(aabb, |b| out.push(*b));
        out
    }

    /// Drop all buckets and boxes. Called once per frame before placement.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.boxes.clear();
    }

    fn cell_range(&self, min: T, max: T) -> (i32, i32) {
        let c0 = T::cell_coord(min, self.cell_size);
        let c1 = T::cell_coord(max, self.cell_size);
        if c0 <= c1 { (c0, c1) } else { (c1, c0) }
    }

    /// Walk the deduplicated candidate set for `aabb`'s spanned cells.
    ///
    /// The visitor returns `false` to stop early.
    fn visit_candidates<F: FnMut(&Aabb2D<T>) -> bool>(&self, aabb: &Aabb2D<T>, mut f: F) {
        let (ix0, ix1) = self.cell_range(aabb.min_x, aabb.max_x);
        let (iy0, iy1) = self.cell_range(aabb.min_y, aabb.max_y);

        let mut seen: HashSet<usize> = HashSet::new();

        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                if let Some(bucket) = self.cells.get(&(ix, iy)) {
                    for &idx in bucket {
                        if !seen.insert(idx) {
                            continue;
                        }
                        if !f(&self.boxes[idx]) {
                            return;
                        }
                    }
                }
            }
        }
    }
}
