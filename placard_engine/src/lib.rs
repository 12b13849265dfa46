// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=placard_engine --heading-base-level=0

//! Placard Engine: real-time screen-space label placement.
//!
//! Placard Engine decides, every frame, where each label of a dense moving
//! scene (a radar or map display, a telemetry overlay) may be drawn without
//! overlapping other labels:
//!
//! - **Direct labels** sit right next to their anchor when there is room.
//! - **Leader lines** carry a label to a nearby free slot when there is not.
//! - **Stacked callouts** collapse a dense cluster into one box with branch
//!   lines to each member.
//! - Whatever still cannot be placed is counted hidden and summarized by an
//!   optional corner indicator.
//!
//! The layout is recomputed from scratch every call, yet must not visibly
//! flicker as items move, the camera pans, or cluster membership drifts.
//! The engine therefore layers hysteresis over its greedy search: sticky
//! cluster assignment, sticky leader slots, callout formation/release
//! thresholds, and a short-lived callout cache that keeps members from
//! escaping for a single frame only to be recaptured.
//!
//! Projection and text measurement are pure collaborator functions supplied
//! by the caller; drawing is entirely the caller's job, driven by the
//! returned [`PlacementResult`].
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use placard_engine::{Frame, LabelEngine, LabelItem};
//!
//! let mut engine: LabelEngine<u32> = LabelEngine::default();
//!
//! // Two tracks, far apart: both labels place directly.
//! let items = vec![
//!     LabelItem::new(1, "AF1201", Point::new(400.0, 300.0)).with_priority(2.0),
//!     LabelItem::new(2, "DL88", Point::new(500.0, 150.0)),
//! ];
//! let frame = Frame::new(800.0, 600.0);
//! let result = engine.place(&items, |p| p, &frame);
//!
//! assert_eq!(result.direct.len(), 2);
//! assert_eq!(result.hidden, 0);
//! assert!(result.direct.iter().all(|label| !label.leader));
//! ```
//!
//! ## Per-frame contract
//!
//! [`LabelEngine::place`] is deterministic given identical inputs and warm
//! cache state, never panics, and degrades every failure to
//! [`PlacementResult::hidden`]. One engine instance must be driven from a
//! single thread, one call at a time; call
//! [`LabelEngine::clear_state`] on discontinuous changes (a zoom jump, a
//! dataset reload) so stale stability hints do not bias the fresh layout.
//!
//! This crate is `no_std` and uses `alloc`. Enable the `std` feature
//! (default) or `libm` for the kurbo dependency's float support.

#![no_std]

extern crate alloc;

mod candidates;
mod cluster;
mod engine;
mod measure;
mod memory;
mod options;
mod types;
mod util;

pub use engine::LabelEngine;
pub use measure::MeasureFn;
pub use options::{OptionsPatch, PlacementOptions};
pub use types::{
    CalloutLine, Frame, IndicatorLabel, LabelItem, PlacedLabel, PlacementResult, StackedCallout,
};
