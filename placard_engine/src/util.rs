// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Size};
use placard_grid::Aabb2D;

/// Bridge a kurbo rect into the grid crate's AABB.
pub(crate) fn rect_to_aabb(r: Rect) -> Aabb2D<f64> {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

/// Whether the rect lies fully inside a `viewport`-sized area anchored at
/// the origin. Touching the viewport edge counts as inside.
pub(crate) fn inside_viewport(r: &Rect, viewport: Size) -> bool {
    r.x0 >= 0.0 && r.y0 >= 0.0 && r.x1 <= viewport.width && r.y1 <= viewport.height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_containment_is_inclusive_at_edges() {
        let vp = Size::new(100.0, 100.0);
        assert!(inside_viewport(&Rect::new(0.0, 0.0, 100.0, 100.0), vp));
        assert!(inside_viewport(&Rect::new(10.0, 10.0, 90.0, 20.0), vp));
        assert!(!inside_viewport(&Rect::new(-1.0, 10.0, 50.0, 20.0), vp));
        assert!(!inside_viewport(&Rect::new(10.0, 10.0, 101.0, 20.0), vp));
    }

    #[test]
    fn aabb_bridge_preserves_corners() {
        let aabb = rect_to_aabb(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!((aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y), (1.0, 2.0, 3.0, 4.0));
    }
}
