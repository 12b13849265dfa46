// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration with documented defaults and partial updates.

/// Collision grid cells are a small multiple of the font size, so a typical
/// label spans only a handful of cells.
pub(crate) const COLLISION_CELL_FACTOR: f64 = 4.0;

/// Cluster cells are much coarser than collision cells: they group labels
/// into visually related neighborhoods, not into collision buckets.
pub(crate) const CLUSTER_CELL_FACTOR: f64 = 12.0;

/// Tuning knobs for the placement engine.
///
/// All fields have working defaults; construct with `PlacementOptions::default()`
/// and override what you need, or merge changes into a live engine with
/// [`LabelEngine::update_options`][crate::LabelEngine::update_options].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementOptions {
    /// Label font size in pixels. Also drives both derived cell sizes.
    pub font_size: f64,
    /// Estimated glyph advance as a fraction of the font size, used when no
    /// measurement function is installed.
    pub char_width_ratio: f64,
    /// Line height as a multiple of the font size.
    pub line_height_ratio: f64,
    /// Inner padding of label and callout boxes, in pixels.
    pub padding: f64,
    /// Cluster size at which a stacked callout forms.
    pub callout_threshold: usize,
    /// Size an existing callout may shrink to before it releases back into
    /// individual labels. Keep below `callout_threshold` for hysteresis.
    pub callout_release_threshold: usize,
    /// Maximum member rows shown inside one callout; the rest collapse into
    /// a trailing "+N more" row.
    pub max_callout_labels: usize,
    /// Base distance unit for leader-line candidate rings, in pixels.
    pub leader_margin: f64,
    /// Extra slack, in pixels, an anchor must move beyond half a cluster
    /// cell before it is re-assigned to a new cluster.
    pub cluster_hysteresis_margin: f64,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            char_width_ratio: 0.6,
            line_height_ratio: 1.3,
            padding: 4.0,
            callout_threshold: 4,
            callout_release_threshold: 3,
            max_callout_labels: 5,
            leader_margin: 12.0,
            cluster_hysteresis_margin: 4.0,
        }
    }
}

impl PlacementOptions {
    /// Cell size of the collision grid (`4 × font_size`).
    #[must_use]
    pub fn collision_cell_size(&self) -> f64 {
        self.font_size * COLLISION_CELL_FACTOR
    }

    /// Cell size of the clustering grid (`12 × font_size`).
    ///
    /// Deliberately coarser than the collision cell: the two grids serve
    /// different purposes (collision granularity vs. visual grouping).
    #[must_use]
    pub fn cluster_cell_size(&self) -> f64 {
        self.font_size * CLUSTER_CELL_FACTOR
    }

    /// Height of one text line in pixels.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.font_size * self.line_height_ratio
    }

    pub(crate) fn apply(&mut self, patch: OptionsPatch) {
        if let Some(v) = patch.font_size {
            self.font_size = v;
        }
        if let Some(v) = patch.char_width_ratio {
            self.char_width_ratio = v;
        }
        if let Some(v) = patch.line_height_ratio {
            self.line_height_ratio = v;
        }
        if let Some(v) = patch.padding {
            self.padding = v;
        }
        if let Some(v) = patch.callout_threshold {
            self.callout_threshold = v;
        }
        if let Some(v) = patch.callout_release_threshold {
            self.callout_release_threshold = v;
        }
        if let Some(v) = patch.max_callout_labels {
            self.max_callout_labels = v;
        }
        if let Some(v) = patch.leader_margin {
            self.leader_margin = v;
        }
        if let Some(v) = patch.cluster_hysteresis_margin {
            self.cluster_hysteresis_margin = v;
        }
    }
}

/// A partial [`PlacementOptions`]: only the `Some` fields are merged.
///
/// ```
/// use placard_engine::OptionsPatch;
///
/// let patch = OptionsPatch {
///     font_size: Some(16.0),
///     ..OptionsPatch::default()
/// };
/// # let _ = patch;
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OptionsPatch {
    /// See [`PlacementOptions::font_size`].
    pub font_size: Option<f64>,
    /// See [`PlacementOptions::char_width_ratio`].
    pub char_width_ratio: Option<f64>,
    /// See [`PlacementOptions::line_height_ratio`].
    pub line_height_ratio: Option<f64>,
    /// See [`PlacementOptions::padding`].
    pub padding: Option<f64>,
    /// See [`PlacementOptions::callout_threshold`].
    pub callout_threshold: Option<usize>,
    /// See [`PlacementOptions::callout_release_threshold`].
    pub callout_release_threshold: Option<usize>,
    /// See [`PlacementOptions::max_callout_labels`].
    pub max_callout_labels: Option<usize>,
    /// See [`PlacementOptions::leader_margin`].
    pub leader_margin: Option<f64>,
    /// See [`PlacementOptions::cluster_hysteresis_margin`].
    pub cluster_hysteresis_margin: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_derived_cells() {
        let opts = PlacementOptions::default();
        assert_eq!(opts.collision_cell_size(), 48.0);
        assert_eq!(opts.cluster_cell_size(), 144.0);
        assert!(opts.callout_release_threshold < opts.callout_threshold);
    }

    #[test]
    fn patch_merges_only_some_fields() {
        let mut opts = PlacementOptions::default();
        opts.apply(OptionsPatch {
            font_size: Some(20.0),
            padding: Some(6.0),
            ..OptionsPatch::default()
        });
        assert_eq!(opts.font_size, 20.0);
        assert_eq!(opts.padding, 6.0);
        // Untouched fields keep their defaults.
        assert_eq!(opts.callout_threshold, 4);
        assert_eq!(opts.cluster_cell_size(), 240.0);
    }
}
