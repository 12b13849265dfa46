// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coarse anchor clustering with sticky cell assignment.
//!
//! Displaced labels are grouped by a coarse grid over their *anchor*
//! positions. The grid is shifted by a caller-supplied offset so cluster
//! boundaries stay fixed in world space while the camera pans, and cell
//! assignment is sticky: an anchor hovering near a boundary keeps its
//! previous cell until it clearly escapes.

use kurbo::{Point, Vec2};
use placard_grid::GridScalar;

/// Coarse cluster cell coordinate, used as the stable cluster identity.
///
/// Keys derive from the cell an anchor falls in, optionally overridden by
/// hysteresis, and index every per-cluster cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ClusterKey(pub i32, pub i32);

/// Cell the anchor falls in under the given grid offset.
pub(crate) fn key_at(anchor: Point, cell_size: f64, grid_offset: Vec2) -> ClusterKey {
    ClusterKey(
        f64::cell_coord(anchor.x - grid_offset.x, cell_size),
        f64::cell_coord(anchor.y - grid_offset.y, cell_size),
    )
}

/// Geometric center of a cluster cell in screen space.
pub(crate) fn cell_center(key: ClusterKey, cell_size: f64, grid_offset: Vec2) -> Point {
    Point::new(
        (f64::from(key.0) + 0.5) * cell_size + grid_offset.x,
        (f64::from(key.1) + 0.5) * cell_size + grid_offset.y,
    )
}

/// Cell assignment with hysteresis against the previous frame.
///
/// The previous key survives until the anchor's Chebyshev distance from the
/// previous cell's center exceeds half a cell plus `margin`, i.e. until it
/// leaves the previous cell dilated by the margin. Anchors hovering right on
/// a boundary therefore do not flap between two cells.
pub(crate) fn sticky_key(
    anchor: Point,
    previous: Option<ClusterKey>,
    cell_size: f64,
    grid_offset: Vec2,
    margin: f64,
) -> ClusterKey {
    let fresh = key_at(anchor, cell_size, grid_offset);
    let Some(previous) = previous else {
        return fresh;
    };
    if previous == fresh {
        return fresh;
    }
    let center = cell_center(previous, cell_size, grid_offset);
    let limit = cell_size * 0.5 + margin;
    let dx = (anchor.x - center.x).abs();
    let dy = (anchor.y - center.y).abs();
    if dx <= limit && dy <= limit {
        previous
    } else {
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: f64 = 144.0;
    const MARGIN: f64 = 4.0;

    #[test]
    fn key_follows_cells_and_offset() {
        assert_eq!(key_at(Point::new(10.0, 10.0), CELL, Vec2::ZERO), ClusterKey(0, 0));
        assert_eq!(key_at(Point::new(150.0, 10.0), CELL, Vec2::ZERO), ClusterKey(1, 0));
        assert_eq!(key_at(Point::new(-1.0, -1.0), CELL, Vec2::ZERO), ClusterKey(-1, -1));

        // Shifting the grid by one cell shifts every key by one.
        let offset = Vec2::new(CELL, 0.0);
        assert_eq!(key_at(Point::new(150.0, 10.0), CELL, offset), ClusterKey(0, 0));
    }

    #[test]
    fn cell_center_matches_key() {
        let key = ClusterKey(2, -1);
        let center = cell_center(key, CELL, Vec2::ZERO);
        assert_eq!(key_at(center, CELL, Vec2::ZERO), key);
        assert_eq!(center, Point::new(2.5 * CELL, -0.5 * CELL));
    }

    #[test]
    fn boundary_hop_is_sticky_until_escape() {
        // Anchor just across the boundary between cell 0 and cell 1.
        let anchor = Point::new(CELL + 2.0, 10.0);
        let fresh = key_at(anchor, CELL, Vec2::ZERO);
        assert_eq!(fresh, ClusterKey(1, 0));

        // With a previous assignment to cell 0, the hop is suppressed: the
        // anchor is only `cell/2 + 2` from the old center.
        let sticky = sticky_key(anchor, Some(ClusterKey(0, 0)), CELL, Vec2::ZERO, MARGIN);
        assert_eq!(sticky, ClusterKey(0, 0));

        // Past the margin the new cell wins.
        let escaped = Point::new(CELL + CELL * 0.5 + MARGIN + 1.0, 10.0);
        let sticky = sticky_key(escaped, Some(ClusterKey(0, 0)), CELL, Vec2::ZERO, MARGIN);
        assert_eq!(sticky, ClusterKey(1, 0));
    }

    #[test]
    fn sub_margin_movement_keeps_the_key() {
        let anchor = Point::new(100.0, 100.0);
        let key = key_at(anchor, CELL, Vec2::ZERO);

        // Moving less than the hysteresis margin can never change the
        // assignment, wherever the anchor sits in its cell.
        let moved = Point::new(anchor.x + MARGIN - 1.0, anchor.y);
        assert_eq!(sticky_key(moved, Some(key), CELL, Vec2::ZERO, MARGIN), key);
    }
}
