// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-frame hysteresis state.
//!
//! Per-item memory lives in previous/current generation maps: every call
//! writes the current map only and reads the previous one, and the two are
//! swapped at the end of the call, so a slot is never read and written
//! through concurrently. Callout memory is a single persistent map with
//! last-seen frame stamps, pruned by a fixed TTL.

use core::fmt::Debug;
use core::hash::Hash;

use alloc::vec::Vec;
use hashbrown::HashMap;
use kurbo::{Size, Vec2};

use crate::cluster::ClusterKey;

/// Callout cache entries survive this many frames without being re-placed.
///
/// The TTL is what lets a cluster flicker empty for a frame or two without
/// its members escaping into direct labels and being recaptured; it also
/// bounds cache growth as clusters appear and vanish over a long session.
pub(crate) const CALLOUT_TTL_FRAMES: u64 = 3;

/// How one item was placed in a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PlacementKind {
    /// Adjacent to its anchor, no connecting line.
    Direct,
    /// In the leader slot with this index into the slot table.
    Leader(usize),
    /// Folded into its cluster's stacked callout.
    CalloutMember,
}

/// Per-item memory recorded for one frame.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ItemMemory {
    /// How the item was placed; `None` when it ended up hidden.
    pub kind: Option<PlacementKind>,
    /// The cluster key the item was assigned (sticky).
    pub cluster: ClusterKey,
}

/// Cached geometry of a placed callout, keyed by cluster.
///
/// Offsets are stored relative to moving reference points (the smoothed
/// centroid, the cluster cell's center) so the cached shape survives camera
/// panning unchanged.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CalloutMemory<K> {
    /// Box top-left relative to the smoothed centroid.
    pub box_offset: Vec2,
    /// Box size.
    pub size: Size,
    /// Smoothed centroid relative to the cluster cell's center.
    pub centroid_offset: Vec2,
    /// Member ids in display order.
    pub members: Vec<K>,
    /// Frame index the callout was last successfully placed.
    pub last_seen: u64,
}

/// All cross-frame state owned by the engine.
#[derive(Clone, Debug)]
pub(crate) struct EngineMemory<K> {
    /// Read-only during a call: last frame's item memory.
    pub prev: HashMap<K, ItemMemory>,
    /// Write-only during a call: this frame's item memory.
    pub curr: HashMap<K, ItemMemory>,
    /// Persistent callout cache with last-seen stamps.
    pub callouts: HashMap<ClusterKey, CalloutMemory<K>>,
    /// Monotonic frame counter, advanced once per call.
    pub frame: u64,
}

impl<K: Clone + Eq + Hash + Debug> EngineMemory<K> {
    pub(crate) fn new() -> Self {
        Self {
            prev: HashMap::new(),
            curr: HashMap::new(),
            callouts: HashMap::new(),
            frame: 0,
        }
    }

    /// Advance the frame counter and open a fresh current generation.
    pub(crate) fn begin_frame(&mut self) {
        self.frame += 1;
        self.curr.clear();
    }

    /// Advance the frame counter without touching the generations, for
    /// locked-layout calls that must leave the cached layout intact.
    pub(crate) fn begin_locked_frame(&mut self) {
        self.frame += 1;
    }

    /// Swap generations: the current map becomes the previous one.
    pub(crate) fn end_frame(&mut self) {
        core::mem::swap(&mut self.prev, &mut self.curr);
    }

    /// Evict callout entries not seen within the TTL.
    pub(crate) fn prune_callouts(&mut self) {
        let frame = self.frame;
        self.callouts
            .retain(|_, m| frame.saturating_sub(m.last_seen) <= CALLOUT_TTL_FRAMES);
    }

    /// Whether the key has a live (not-yet-pruned) cached callout.
    pub(crate) fn callout_alive(&self, key: ClusterKey) -> bool {
        self.callouts.contains_key(&key)
    }

    /// Whether the key's callout was actually placed in the previous frame
    /// (a stricter test than [`callout_alive`][Self::callout_alive]).
    pub(crate) fn callout_was_active(&self, key: ClusterKey) -> bool {
        self.callouts
            .get(&key)
            .is_some_and(|m| m.last_seen + 1 == self.frame)
    }

    /// Reset every cache and the frame counter.
    pub(crate) fn clear(&mut self) {
        self.prev.clear();
        self.curr.clear();
        self.callouts.clear();
        self.frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn callout(last_seen: u64) -> CalloutMemory<u32> {
        CalloutMemory {
            box_offset: Vec2::ZERO,
            size: Size::new(10.0, 10.0),
            centroid_offset: Vec2::ZERO,
            members: vec![1, 2, 3],
            last_seen,
        }
    }

    #[test]
    fn generations_swap_without_aliasing() {
        let mut memory: EngineMemory<u32> = EngineMemory::new();
        memory.begin_frame();
        memory.curr.insert(
            7,
            ItemMemory {
                kind: Some(PlacementKind::Direct),
                cluster: ClusterKey(0, 0),
            },
        );
        memory.end_frame();

        assert!(memory.prev.contains_key(&7));
        memory.begin_frame();
        assert!(memory.curr.is_empty());
        assert!(memory.prev.contains_key(&7));
    }

    #[test]
    fn callouts_prune_after_ttl() {
        let mut memory: EngineMemory<u32> = EngineMemory::new();
        memory.frame = 10;
        memory.callouts.insert(ClusterKey(0, 0), callout(10));
        memory.callouts.insert(ClusterKey(1, 0), callout(6));

        memory.prune_callouts();
        assert!(memory.callout_alive(ClusterKey(0, 0)));
        // last seen 6, frame 10: 4 > TTL, evicted.
        assert!(!memory.callout_alive(ClusterKey(1, 0)));
    }

    #[test]
    fn active_test_is_stricter_than_alive() {
        let mut memory: EngineMemory<u32> = EngineMemory::new();
        memory.frame = 5;
        memory.callouts.insert(ClusterKey(0, 0), callout(4));
        memory.callouts.insert(ClusterKey(1, 0), callout(3));

        assert!(memory.callout_was_active(ClusterKey(0, 0)));
        assert!(!memory.callout_was_active(ClusterKey(1, 0)));
        assert!(memory.callout_alive(ClusterKey(1, 0)));
    }

    #[test]
    fn clear_resets_everything() {
        let mut memory: EngineMemory<u32> = EngineMemory::new();
        memory.begin_frame();
        memory.callouts.insert(ClusterKey(0, 0), callout(1));
        memory.clear();
        assert_eq!(memory.frame, 0);
        assert!(memory.callouts.is_empty());
        assert!(memory.prev.is_empty() && memory.curr.is_empty());
    }
}
