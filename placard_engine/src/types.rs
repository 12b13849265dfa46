// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public input and output types of the placement engine.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};

/// One labelable item, supplied fresh every frame.
///
/// Identity is the `id`, never object identity: the engine's hysteresis
/// caches are keyed by it, so the caller must keep ids stable across frames
/// for the same underlying entity (ids must be unique within one call).
#[derive(Clone, Debug, PartialEq)]
pub struct LabelItem<K> {
    /// Caller-chosen identity, stable across frames.
    pub id: K,
    /// Label text. Items with empty text are skipped.
    pub text: String,
    /// Anchor position in world space; projected to screen space per call.
    pub world: Point,
    /// Placement priority; higher wins when labels compete for space.
    pub priority: f64,
}

impl<K> LabelItem<K> {
    /// Create an item with priority `0.0`.
    pub fn new(id: K, text: impl Into<String>, world: Point) -> Self {
        Self {
            id,
            text: text.into(),
            world,
            priority: 0.0,
        }
    }

    /// Builder-style priority override.
    #[must_use]
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }
}

/// A label the engine placed this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLabel<K> {
    /// The item's identity.
    pub id: K,
    /// The item's text, echoed for the renderer.
    pub text: String,
    /// Screen-space box to draw the label in.
    pub bounds: Rect,
    /// The item's projected anchor.
    pub anchor: Point,
    /// Whether the caller should draw a leader line from `anchor` to
    /// `bounds` (true for displaced labels, false for direct ones).
    pub leader: bool,
}

/// One displayed row of a stacked callout.
#[derive(Clone, Debug, PartialEq)]
pub struct CalloutLine<K> {
    /// The member's identity.
    pub id: K,
    /// The member's text.
    pub text: String,
}

/// A stacked callout: one box summarizing a cluster of nearby items, with a
/// branch line from the box to each member's anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedCallout<K> {
    /// Screen-space box of the callout.
    pub bounds: Rect,
    /// Smoothed cluster centroid in screen space.
    pub centroid: Point,
    /// Rows to display, truncated to the configured maximum.
    pub lines: Vec<CalloutLine<K>>,
    /// Screen anchor of *every* member (including ones not shown as rows),
    /// for drawing branch lines.
    pub anchors: Vec<Point>,
    /// How many members were omitted from `lines` ("+N more").
    pub overflow: usize,
}

/// The "+N hidden" corner indicator.
#[derive(Clone, Debug, PartialEq)]
pub struct IndicatorLabel {
    /// Indicator text, e.g. `"+3 hidden"`.
    pub text: String,
    /// Screen-space box of the indicator.
    pub bounds: Rect,
}

/// Everything the engine decided for one frame.
///
/// The caller owns all drawing: label backgrounds and text, leader lines
/// from anchors to displaced labels, branch lines from callout boxes to
/// member anchors, and the hidden-count indicator.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementResult<K> {
    /// Labels placed adjacent to their anchor, no connecting line.
    pub direct: Vec<PlacedLabel<K>>,
    /// Displaced labels that need a leader line.
    pub leaders: Vec<PlacedLabel<K>>,
    /// Stacked callouts for dense clusters.
    pub callouts: Vec<StackedCallout<K>>,
    /// Items that could not be placed at all this frame.
    pub hidden: usize,
    /// At most one corner indicator summarizing `hidden`; `None` when
    /// nothing is hidden or no corner fits.
    pub indicator: Option<IndicatorLabel>,
}

// Manual impl: a derived `Default` would needlessly require `K: Default`.
impl<K> Default for PlacementResult<K> {
    fn default() -> Self {
        Self {
            direct: Vec::new(),
            leaders: Vec::new(),
            callouts: Vec::new(),
            hidden: 0,
            indicator: None,
        }
    }
}

impl<K> PlacementResult<K> {
    /// Total number of individually placed labels (direct + leader).
    #[must_use]
    pub fn placed_labels(&self) -> usize {
        self.direct.len() + self.leaders.len()
    }
}

/// Per-call parameters: the viewport and camera-dependent offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Viewport size in pixels; all placement happens inside it.
    pub viewport: Size,
    /// Horizontal gap between an anchor and its preferred direct box.
    pub label_offset_x: f64,
    /// Screen-space offset of the cluster grid, supplied by the caller so
    /// cluster boundaries stay fixed in world space while the camera pans.
    pub grid_offset: Vec2,
    /// Freeze membership and slot choices; only re-project the cached
    /// layout and hide whatever no longer fits.
    pub lock_layout: bool,
}

impl Frame {
    /// Frame over a `width × height` viewport with default offsets.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Size::new(width, height),
            label_offset_x: 10.0,
            grid_offset: Vec2::ZERO,
            lock_layout: false,
        }
    }

    /// Builder-style override of the anchor-to-label gap.
    #[must_use]
    pub fn with_label_offset_x(mut self, offset: f64) -> Self {
        self.label_offset_x = offset;
        self
    }

    /// Builder-style override of the cluster grid offset.
    #[must_use]
    pub fn with_grid_offset(mut self, offset: Vec2) -> Self {
        self.grid_offset = offset;
        self
    }

    /// Builder-style layout lock.
    #[must_use]
    pub fn locked(mut self, lock: bool) -> Self {
        self.lock_layout = lock;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_builder_defaults() {
        let item = LabelItem::new(7_u32, "AF1201", Point::new(1.0, 2.0));
        assert_eq!(item.priority, 0.0);
        let item = item.with_priority(5.0);
        assert_eq!(item.priority, 5.0);
        assert_eq!(item.text, "AF1201");
    }

    #[test]
    fn frame_builders() {
        let frame = Frame::new(800.0, 600.0)
            .with_label_offset_x(14.0)
            .with_grid_offset(Vec2::new(3.0, -2.0))
            .locked(true);
        assert_eq!(frame.viewport, Size::new(800.0, 600.0));
        assert_eq!(frame.label_offset_x, 14.0);
        assert_eq!(frame.grid_offset, Vec2::new(3.0, -2.0));
        assert!(frame.lock_layout);
    }
}
