// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A moving radar swarm driven through several frames of label placement.
//!
//! This example shows the whole engine surface in one loop:
//! - per-frame `place` calls over moving anchors,
//! - direct labels vs leader lines vs stacked callouts in the output,
//! - the hidden count and corner indicator under pressure,
//! - a locked-layout frame, as a caller would issue during a drag.
//!
//! Run:
//! - `cargo run -p placard_demos --example radar_labels`

use placard_demos::spawn_tracks;
use placard_engine::{Frame, LabelEngine, LabelItem, PlacementResult};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;

fn summarize(frame_no: u64, result: &PlacementResult<u32>) {
    let callout_members: usize = result.callouts.iter().map(|c| c.anchors.len()).sum();
    println!(
        "frame {frame_no:>2}: {} direct, {} leader, {} callouts ({} members), {} hidden{}",
        result.direct.len(),
        result.leaders.len(),
        result.callouts.len(),
        callout_members,
        result.hidden,
        result
            .indicator
            .as_ref()
            .map(|ind| format!(" [{}]", ind.text))
            .unwrap_or_default(),
    );
}

fn main() {
    let tracks = spawn_tracks(60, WIDTH, HEIGHT);
    let mut engine: LabelEngine<u32> = LabelEngine::default();
    let frame = Frame::new(WIDTH, HEIGHT);

    println!(
        "placing {} tracks on a {WIDTH}x{HEIGHT} viewport (cluster cell {}px)",
        tracks.len(),
        engine.cluster_cell_size(),
    );

    for t in 0..8_u64 {
        let items: Vec<LabelItem<u32>> = tracks
            .iter()
            .map(|track| {
                // Faster tracks get a higher priority so their labels win
                // contested space.
                LabelItem::new(track.id, track.callsign.clone(), track.position(t as f64))
                    .with_priority(track.speed)
            })
            .collect();
        let result = engine.place(&items, |p| p, &frame);
        summarize(t + 1, &result);
    }

    // A drag starts: freeze membership and slot choices, keep tracking.
    let items: Vec<LabelItem<u32>> = tracks
        .iter()
        .map(|track| {
            LabelItem::new(track.id, track.callsign.clone(), track.position(8.0))
                .with_priority(track.speed)
        })
        .collect();
    let locked = engine.place(&items, |p| p, &frame.locked(true));
    summarize(9, &locked);
    println!("frame  9 ran with a locked layout: no fresh searches were made");

    // Show one callout in detail, if any formed.
    if let Some(callout) = locked.callouts.first() {
        println!(
            "callout at {:.0?}: {} rows{}, branch lines to {} anchors",
            callout.bounds.origin(),
            callout.lines.len(),
            if callout.overflow > 0 {
                format!(" (+{} more)", callout.overflow)
            } else {
                String::new()
            },
            callout.anchors.len(),
        );
    }
}
