// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the Placard demos: a deterministic synthetic radar
//! scene with tracks circling at different radii and speeds.

use kurbo::Point;

/// One synthetic radar track on a circular path.
#[derive(Clone, Debug)]
pub struct Track {
    /// Stable track identity.
    pub id: u32,
    /// Display callsign.
    pub callsign: String,
    /// Orbit center in world space.
    pub center: Point,
    /// Orbit radius.
    pub radius: f64,
    /// Angular speed in radians per frame.
    pub speed: f64,
    /// Starting angle in radians.
    pub phase: f64,
}

impl Track {
    /// World position at frame `t`.
    pub fn position(&self, t: f64) -> Point {
        let a = self.phase + self.speed * t;
        Point::new(
            self.center.x + self.radius * a.cos(),
            self.center.y + self.radius * a.sin(),
        )
    }
}

/// Deterministic pseudo-random track set (small LCG, no rand dependency).
pub fn spawn_tracks(n: usize, width: f64, height: f64) -> Vec<Track> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as f64 / f64::from(1u32 << 31)
    };
    (0..n)
        .map(|i| {
            let id = i as u32;
            Track {
                id,
                callsign: format!("AF{:04}", 1200 + i),
                center: Point::new(next() * width, next() * height),
                radius: 20.0 + next() * 60.0,
                speed: 0.02 + next() * 0.05,
                phase: next() * core::f64::consts::TAU,
            }
        })
        .collect()
}
