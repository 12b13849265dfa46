// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame placement pipeline.

use alloc::format;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use kurbo::{Point, Rect, Size, Vec2};
use placard_grid::FrameGrid;
use smallvec::{SmallVec, smallvec};

use crate::candidates::{self, CalloutSlot, LeaderSlot, callout_slots, leader_slots};
use crate::cluster::{self, ClusterKey};
use crate::measure::{MeasureFn, WidthCache};
use crate::memory::{CalloutMemory, EngineMemory, ItemMemory, PlacementKind};
use crate::options::{OptionsPatch, PlacementOptions};
use crate::types::{
    CalloutLine, Frame, IndicatorLabel, LabelItem, PlacedLabel, PlacementResult, StackedCallout,
};
use crate::util::{inside_viewport, rect_to_aabb};

/// Anchors further than this outside the viewport are culled outright.
const CULL_MARGIN: f64 = 100.0;

/// Blend factor pulling a cached callout centroid toward the raw one.
const CENTROID_SMOOTHING: f64 = 0.2;

/// Minimum currently visible members before the cached centroid blends;
/// below this the cached value is kept unchanged to resist single-member
/// noise.
const CENTROID_BLEND_MIN_MEMBERS: usize = 2;

/// Gap between the viewport edge and the hidden-count indicator.
const INDICATOR_MARGIN: f64 = 8.0;

/// Real-time label placement engine.
///
/// One engine instance owns all cross-frame hysteresis state; call
/// [`place`][Self::place] once per frame with the current item set. The
/// engine is single-threaded and synchronous: a call runs to completion and
/// the next call must not start before it returns.
///
/// See the [crate docs](crate) for a worked example.
pub struct LabelEngine<K> {
    options: PlacementOptions,
    grid: FrameGrid<f64>,
    widths: WidthCache,
    leader_slots: Vec<LeaderSlot>,
    callout_slots: Vec<CalloutSlot>,
    memory: EngineMemory<K>,
}

impl<K: Clone + Eq + Hash + Debug> Debug for LabelEngine<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LabelEngine")
            .field("options", &self.options)
            .field("grid", &self.grid)
            .field("widths", &self.widths)
            .field("tracked_items", &self.memory.prev.len())
            .field("cached_callouts", &self.memory.callouts.len())
            .field("frame", &self.memory.frame)
            .finish_non_exhaustive()
    }
}

impl<K: Clone + Eq + Hash + Debug> Default for LabelEngine<K> {
    fn default() -> Self {
        Self::new(PlacementOptions::default())
    }
}

impl<K: Clone + Eq + Hash + Debug> LabelEngine<K> {
    /// Create an engine with the given options.
    pub fn new(options: PlacementOptions) -> Self {
        Self {
            grid: FrameGrid::new(options.collision_cell_size()),
            widths: WidthCache::new(),
            leader_slots: leader_slots(options.leader_margin),
            callout_slots: callout_slots(options.leader_margin),
            memory: EngineMemory::new(),
            options,
        }
    }

    /// Current configuration.
    pub fn options(&self) -> &PlacementOptions {
        &self.options
    }

    /// Merge a partial configuration change.
    ///
    /// Rebuilds the collision grid and the candidate tables and invalidates
    /// the width cache. Cross-frame placement caches survive, so a small
    /// tweak does not reshuffle the whole layout.
    pub fn update_options(&mut self, patch: OptionsPatch) {
        self.options.apply(patch);
        self.grid = FrameGrid::new(self.options.collision_cell_size());
        self.leader_slots = leader_slots(self.options.leader_margin);
        self.callout_slots = callout_slots(self.options.leader_margin);
        self.widths.invalidate();
    }

    /// Swap the text measurement strategy and drop cached widths.
    ///
    /// `None` falls back to the character-count estimate.
    pub fn set_measure_fn(&mut self, measure: Option<MeasureFn>) {
        self.widths.set_measure(measure);
    }

    /// Reset every cross-frame cache and the frame counter.
    ///
    /// Callers must invoke this on discontinuous changes (a large zoom jump,
    /// a full dataset reload): stability hints carried across such a change
    /// would bias the fresh layout toward a stale one.
    pub fn clear_state(&mut self) {
        self.memory.clear();
        self.grid.clear();
    }

    /// Cell size of the clustering grid, for caller-side debug overlays.
    pub fn cluster_cell_size(&self) -> f64 {
        self.options.cluster_cell_size()
    }

    /// Compute the frame's placement.
    ///
    /// `projector` maps a world-space anchor to screen space and is treated
    /// as pure; it may be invoked many times. The call is deterministic
    /// given identical inputs and warm cache state, and it never panics:
    /// whatever cannot be placed is reported through
    /// [`PlacementResult::hidden`].
    pub fn place<P: Fn(Point) -> Point>(
        &mut self,
        items: &[LabelItem<K>],
        projector: P,
        frame: &Frame,
    ) -> PlacementResult<K> {
        self.grid.clear();
        let pass = Pass {
            options: &self.options,
            grid: &mut self.grid,
            widths: &mut self.widths,
            leader_slots: &self.leader_slots,
            callout_slots: &self.callout_slots,
            memory: &mut self.memory,
            frame,
            out: PlacementResult::default(),
        };
        if frame.lock_layout {
            pass.run_locked(items, &projector)
        } else {
            pass.run(items, &projector)
        }
    }
}

/// A displaced item: failed or skipped direct placement, waiting for its
/// cluster to resolve.
struct Displaced<'i, K> {
    item: &'i LabelItem<K>,
    anchor: Point,
    size: Size,
    key: ClusterKey,
}

/// Working state of one `place` call, borrowing the engine's pieces.
struct Pass<'e, K> {
    options: &'e PlacementOptions,
    grid: &'e mut FrameGrid<f64>,
    widths: &'e mut WidthCache,
    leader_slots: &'e [LeaderSlot],
    callout_slots: &'e [CalloutSlot],
    memory: &'e mut EngineMemory<K>,
    frame: &'e Frame,
    out: PlacementResult<K>,
}

impl<K: Clone + Eq + Hash + Debug> Pass<'_, K> {
    fn run<P: Fn(Point) -> Point>(
        mut self,
        items: &[LabelItem<K>],
        projector: &P,
    ) -> PlacementResult<K> {
        self.memory.begin_frame();

        let order = priority_order(items);
        let vp = self.frame.viewport;
        let cluster_cell = self.options.cluster_cell_size();
        let mut displaced: Vec<Displaced<'_, K>> = Vec::new();

        // Direct pass: accept what fits next to its anchor, displace the rest.
        for &i in &order {
            let item = &items[i];
            let Some(anchor) = project_visible(item.world, projector, vp) else {
                continue;
            };
            let size = self.label_size(&item.text);
            let prev = self.memory.prev.get(&item.id);
            let key = cluster::sticky_key(
                anchor,
                prev.map(|m| m.cluster),
                cluster_cell,
                self.frame.grid_offset,
                self.options.cluster_hysteresis_margin,
            );

            // An item whose cell is (or was just) callout-owned, or that was
            // itself a callout member last frame, must not escape into a
            // direct label for a single frame only to be recaptured.
            let was_member = prev.is_some_and(|m| m.kind == Some(PlacementKind::CalloutMember));
            if !was_member && !self.memory.callout_alive(key) {
                let origin = Point::new(
                    anchor.x + self.frame.label_offset_x,
                    anchor.y - size.height * 0.5,
                );
                let bounds = Rect::from_origin_size(origin, size);
                if inside_viewport(&bounds, vp) && !self.grid.has_overlap(&rect_to_aabb(bounds)) {
                    self.grid.insert(rect_to_aabb(bounds));
                    self.out.direct.push(PlacedLabel {
                        id: item.id.clone(),
                        text: item.text.clone(),
                        bounds,
                        anchor,
                        leader: false,
                    });
                    self.memory.curr.insert(
                        item.id.clone(),
                        ItemMemory {
                            kind: Some(PlacementKind::Direct),
                            cluster: key,
                        },
                    );
                    continue;
                }
            }
            displaced.push(Displaced {
                item,
                anchor,
                size,
                key,
            });
        }

        // Group by cluster key; keys resolve in discovery order, so a
        // cluster's turn comes when its highest-priority member's does.
        let mut cluster_order: Vec<ClusterKey> = Vec::new();
        let mut clusters: HashMap<ClusterKey, SmallVec<[usize; 8]>> = HashMap::new();
        for (di, d) in displaced.iter().enumerate() {
            match clusters.entry(d.key) {
                Entry::Occupied(mut e) => e.get_mut().push(di),
                Entry::Vacant(e) => {
                    cluster_order.push(d.key);
                    e.insert(smallvec![di]);
                }
            }
        }

        for key in cluster_order {
            let Some(member_idx) = clusters.remove(&key) else {
                continue;
            };
            let members: Vec<&Displaced<'_, K>> =
                member_idx.iter().map(|&di| &displaced[di]).collect();
            self.resolve_cluster(key, &members);
        }

        self.place_indicator();
        self.memory.prune_callouts();
        self.memory.end_frame();
        self.out
    }

    /// Decide callout-vs-leader-lines for one cluster and commit the result.
    fn resolve_cluster(&mut self, key: ClusterKey, members: &[&Displaced<'_, K>]) {
        let size = members.len();
        let form = size >= self.options.callout_threshold
            || (self.memory.callout_was_active(key)
                && size >= self.options.callout_release_threshold)
            || self.memory.callout_alive(key);

        if form {
            if !self.try_callout(key, members) {
                self.hide_members(key, members);
            }
            return;
        }

        let mut rest: Vec<&Displaced<'_, K>> = Vec::new();
        for &d in members {
            if !self.try_leader(d) {
                rest.push(d);
            }
        }
        // Members that found no leader slot fall back to a callout of just
        // the remainder, under the same cluster key.
        if !rest.is_empty() && !self.try_callout(key, &rest) {
            self.hide_members(key, &rest);
        }
    }

    /// Walk the leader slot table, previous winner first.
    fn try_leader(&mut self, d: &Displaced<'_, K>) -> bool {
        let sticky = self.memory.prev.get(&d.item.id).and_then(|m| match m.kind {
            Some(PlacementKind::Leader(idx)) => Some(idx),
            _ => None,
        });
        let slot_count = self.leader_slots.len();
        let candidate_order = sticky
            .into_iter()
            .chain((0..slot_count).filter(move |&i| Some(i) != sticky));

        for idx in candidate_order {
            let Some(slot) = self.leader_slots.get(idx) else {
                continue;
            };
            let bounds = Rect::from_origin_size(slot.origin(d.anchor, d.size), d.size);
            if inside_viewport(&bounds, self.frame.viewport)
                && !self.grid.has_overlap(&rect_to_aabb(bounds))
            {
                self.grid.insert(rect_to_aabb(bounds));
                self.out.leaders.push(PlacedLabel {
                    id: d.item.id.clone(),
                    text: d.item.text.clone(),
                    bounds,
                    anchor: d.anchor,
                    leader: true,
                });
                self.memory.curr.insert(
                    d.item.id.clone(),
                    ItemMemory {
                        kind: Some(PlacementKind::Leader(idx)),
                        cluster: d.key,
                    },
                );
                return true;
            }
        }
        false
    }

    /// Place one stacked callout for `members`, caching its geometry.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "The sweep ring count is bounded by viewport/cell, far below i32 range."
    )]
    fn try_callout(&mut self, key: ClusterKey, members: &[&Displaced<'_, K>]) -> bool {
        if members.is_empty() {
            return false;
        }
        let vp = self.frame.viewport;
        let opts = *self.options;

        let mut sum = Vec2::ZERO;
        for d in members {
            sum += d.anchor.to_vec2();
        }
        let raw = (sum / members.len() as f64).to_point();

        let cell = opts.cluster_cell_size();
        let center = cluster::cell_center(key, cell, self.frame.grid_offset);
        let centroid = match self.memory.callouts.get(&key) {
            Some(m) => {
                let cached = center + m.centroid_offset;
                if members.len() >= CENTROID_BLEND_MIN_MEMBERS {
                    cached.lerp(raw, CENTROID_SMOOTHING)
                } else {
                    cached
                }
            }
            None => raw,
        };

        let shown = members.len().min(opts.max_callout_labels);
        let overflow = members.len() - shown;
        let mut text_w = 0.0_f64;
        for d in &members[..shown] {
            text_w = text_w.max(self.widths.width(
                &d.item.text,
                opts.font_size,
                opts.char_width_ratio,
            ));
        }
        if overflow > 0 {
            let more = format!("+{overflow} more");
            text_w = text_w.max(self.widths.width(&more, opts.font_size, opts.char_width_ratio));
        }
        let rows = shown + usize::from(overflow > 0);
        let size = Size::new(
            text_w + 2.0 * opts.padding,
            rows as f64 * opts.line_height() + 2.0 * opts.padding,
        );
        if size.width > vp.width || size.height > vp.height {
            return false;
        }

        // Candidate order: cached offset, compass rings, square-ring sweep.
        let cached_offset = self.memory.callouts.get(&key).map(|m| m.box_offset);
        let mut chosen: Option<Point> = None;
        if let Some(offset) = cached_offset {
            chosen = self.accept_clamped(centroid + offset, size);
        }
        if chosen.is_none() {
            for slot in self.callout_slots {
                if let Some(p) = self.accept_clamped(slot.origin(centroid, size), size) {
                    chosen = Some(p);
                    break;
                }
            }
        }
        if chosen.is_none() {
            // Last resort: sweep outward over cluster-cell-sized steps. The
            // ring bound covers the whole viewport, guaranteeing termination.
            let base = Point::new(centroid.x - size.width * 0.5, centroid.y - size.height * 0.5);
            let max_ring = (vp.width.max(vp.height) / cell) as i32 + 1;
            'sweep: for ring in 0..=max_ring {
                for (dx, dy) in candidates::square_ring(ring) {
                    let origin = Point::new(
                        base.x + f64::from(dx) * cell,
                        base.y + f64::from(dy) * cell,
                    );
                    if let Some(p) = self.accept_clamped(origin, size) {
                        chosen = Some(p);
                        break 'sweep;
                    }
                }
            }
        }
        let Some(origin) = chosen else {
            return false;
        };

        let bounds = Rect::from_origin_size(origin, size);
        self.grid.insert(rect_to_aabb(bounds));

        let frame_index = self.memory.frame;
        self.memory.callouts.insert(
            key,
            CalloutMemory {
                box_offset: origin - centroid,
                size,
                centroid_offset: centroid - center,
                members: members.iter().map(|d| d.item.id.clone()).collect(),
                last_seen: frame_index,
            },
        );
        for d in members {
            self.memory.curr.insert(
                d.item.id.clone(),
                ItemMemory {
                    kind: Some(PlacementKind::CalloutMember),
                    cluster: key,
                },
            );
        }
        self.out.callouts.push(StackedCallout {
            bounds,
            centroid,
            lines: members[..shown]
                .iter()
                .map(|d| CalloutLine {
                    id: d.item.id.clone(),
                    text: d.item.text.clone(),
                })
                .collect(),
            anchors: members.iter().map(|d| d.anchor).collect(),
            overflow,
        });
        true
    }

    /// Count members hidden, remembering their cluster for next frame.
    fn hide_members(&mut self, key: ClusterKey, members: &[&Displaced<'_, K>]) {
        self.out.hidden += members.len();
        for d in members {
            self.memory.curr.insert(
                d.item.id.clone(),
                ItemMemory {
                    kind: None,
                    cluster: key,
                },
            );
        }
    }

    /// Clamp a candidate box into the viewport and test it against the grid.
    ///
    /// The caller has already rejected sizes larger than the viewport.
    fn accept_clamped(&self, origin: Point, size: Size) -> Option<Point> {
        let vp = self.frame.viewport;
        debug_assert!(
            size.width <= vp.width && size.height <= vp.height,
            "candidate box larger than viewport"
        );
        let clamped = Point::new(
            origin.x.clamp(0.0, vp.width - size.width),
            origin.y.clamp(0.0, vp.height - size.height),
        );
        let bounds = Rect::from_origin_size(clamped, size);
        (!self.grid.has_overlap(&rect_to_aabb(bounds))).then_some(clamped)
    }

    /// Try the "+N hidden" indicator in each viewport corner, placed last so
    /// it can never displace real geometry.
    fn place_indicator(&mut self) {
        if self.out.hidden == 0 {
            return;
        }
        let vp = self.frame.viewport;
        let text = format!("+{} hidden", self.out.hidden);
        let w = self
            .widths
            .width(&text, self.options.font_size, self.options.char_width_ratio)
            + 2.0 * self.options.padding;
        let h = self.options.line_height() + 2.0 * self.options.padding;
        let m = INDICATOR_MARGIN;
        let corners = [
            Point::new(vp.width - w - m, m),
            Point::new(vp.width - w - m, vp.height - h - m),
            Point::new(m, m),
            Point::new(m, vp.height - h - m),
        ];
        let mut placed: Option<Rect> = None;
        for origin in corners {
            let bounds = Rect::from_origin_size(origin, Size::new(w, h));
            if inside_viewport(&bounds, vp) && !self.grid.has_overlap(&rect_to_aabb(bounds)) {
                placed = Some(bounds);
                break;
            }
        }
        if let Some(bounds) = placed {
            self.grid.insert(rect_to_aabb(bounds));
            self.out.indicator = Some(IndicatorLabel { text, bounds });
        }
    }

    /// Locked-layout mode: re-project the cached layout, hide what no
    /// longer fits, and never search. Memory generations carry forward
    /// unchanged so the frozen layout can resurface intact.
    fn run_locked<P: Fn(Point) -> Point>(
        mut self,
        items: &[LabelItem<K>],
        projector: &P,
    ) -> PlacementResult<K> {
        self.memory.begin_locked_frame();

        let order = priority_order(items);
        let vp = self.frame.viewport;

        for &i in &order {
            let item = &items[i];
            let Some(anchor) = project_visible(item.world, projector, vp) else {
                continue;
            };
            let kind = self.memory.prev.get(&item.id).and_then(|m| m.kind);
            match kind {
                Some(PlacementKind::Direct) => {
                    let size = self.label_size(&item.text);
                    let origin = Point::new(
                        anchor.x + self.frame.label_offset_x,
                        anchor.y - size.height * 0.5,
                    );
                    let bounds = Rect::from_origin_size(origin, size);
                    if inside_viewport(&bounds, vp) && !self.grid.has_overlap(&rect_to_aabb(bounds))
                    {
                        self.grid.insert(rect_to_aabb(bounds));
                        self.out.direct.push(PlacedLabel {
                            id: item.id.clone(),
                            text: item.text.clone(),
                            bounds,
                            anchor,
                            leader: false,
                        });
                    } else {
                        self.out.hidden += 1;
                    }
                }
                Some(PlacementKind::Leader(idx)) => {
                    let size = self.label_size(&item.text);
                    let slot = self.leader_slots.get(idx).copied();
                    match slot {
                        Some(slot) => {
                            let bounds = Rect::from_origin_size(slot.origin(anchor, size), size);
                            if inside_viewport(&bounds, vp)
                                && !self.grid.has_overlap(&rect_to_aabb(bounds))
                            {
                                self.grid.insert(rect_to_aabb(bounds));
                                self.out.leaders.push(PlacedLabel {
                                    id: item.id.clone(),
                                    text: item.text.clone(),
                                    bounds,
                                    anchor,
                                    leader: true,
                                });
                            } else {
                                self.out.hidden += 1;
                            }
                        }
                        None => self.out.hidden += 1,
                    }
                }
                // Resolved below through the callout cache.
                Some(PlacementKind::CalloutMember) => {}
                // Hidden last frame, or unknown to the frozen layout.
                None => self.out.hidden += 1,
            }
        }

        // Items by id, for cached member lookups. First occurrence wins.
        let mut by_id: HashMap<&K, usize> = HashMap::new();
        for (i, item) in items.iter().enumerate() {
            by_id.entry(&item.id).or_insert(i);
        }

        let mut keys: Vec<ClusterKey> = self.memory.callouts.keys().copied().collect();
        keys.sort_unstable();
        let cell = self.options.cluster_cell_size();
        let frame_index = self.memory.frame;

        for key in keys {
            let Some((box_offset, size, centroid_offset, member_ids)) = self
                .memory
                .callouts
                .get(&key)
                .map(|m| (m.box_offset, m.size, m.centroid_offset, m.members.clone()))
            else {
                continue;
            };

            let mut present: Vec<usize> = Vec::new();
            let mut anchors: Vec<Point> = Vec::new();
            for id in &member_ids {
                if let Some(&i) = by_id.get(id) {
                    present.push(i);
                    anchors.push(projector(items[i].world));
                }
            }
            if present.is_empty() {
                continue;
            }

            let center = cluster::cell_center(key, cell, self.frame.grid_offset);
            let centroid = center + centroid_offset;
            let bounds = Rect::from_origin_size(centroid + box_offset, size);
            if inside_viewport(&bounds, vp) && !self.grid.has_overlap(&rect_to_aabb(bounds)) {
                self.grid.insert(rect_to_aabb(bounds));
                let shown = present.len().min(self.options.max_callout_labels);
                let overflow = present.len() - shown;
                self.out.callouts.push(StackedCallout {
                    bounds,
                    centroid,
                    lines: present[..shown]
                        .iter()
                        .map(|&i| CalloutLine {
                            id: items[i].id.clone(),
                            text: items[i].text.clone(),
                        })
                        .collect(),
                    anchors,
                    overflow,
                });
                if let Some(m) = self.memory.callouts.get_mut(&key) {
                    m.last_seen = frame_index;
                }
            } else {
                self.out.hidden += present.len();
            }
        }

        self.place_indicator();
        // No generation swap, no pruning: the frozen layout stays intact.
        self.out
    }

    /// Padded box size for one line of text.
    fn label_size(&mut self, text: &str) -> Size {
        let w = self
            .widths
            .width(text, self.options.font_size, self.options.char_width_ratio);
        Size::new(
            w + 2.0 * self.options.padding,
            self.options.line_height() + 2.0 * self.options.padding,
        )
    }
}

/// Indices of placeable items, highest priority first, ties in input order.
fn priority_order<K>(items: &[LabelItem<K>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len())
        .filter(|&i| !items[i].text.is_empty())
        .collect();
    order.sort_by(|&a, &b| items[b].priority.total_cmp(&items[a].priority));
    order
}

/// Project an anchor and cull it when degenerate or far outside the viewport.
fn project_visible<P: Fn(Point) -> Point>(world: Point, projector: &P, vp: Size) -> Option<Point> {
    let anchor = projector(world);
    if !anchor.x.is_finite() || !anchor.y.is_finite() {
        return None;
    }
    let visible = anchor.x >= -CULL_MARGIN
        && anchor.x <= vp.width + CULL_MARGIN
        && anchor.y >= -CULL_MARGIN
        && anchor.y <= vp.height + CULL_MARGIN;
    visible.then_some(anchor)
}
