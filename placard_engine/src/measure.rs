// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text width measurement with an engine-lifetime cache.
//!
//! Measurement is a pure collaborator supplied by the caller; without one,
//! widths fall back to a character-count estimate. Either way results are
//! cached by (font size, text) for the engine's lifetime and invalidated
//! when the strategy or the options change.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::string::String;

use hashbrown::HashMap;

/// Pure text measurement function: `(text, font_size) -> width in pixels`.
///
/// May be invoked many times per frame; it must be side-effect free.
pub type MeasureFn = Box<dyn Fn(&str, f64) -> f64>;

/// Width cache wrapping the optional measurement strategy.
///
/// Keys are nested font-size-bits → text so lookups borrow the text slice
/// and only allocate on a miss.
pub(crate) struct WidthCache {
    measure: Option<MeasureFn>,
    widths: HashMap<u64, HashMap<String, f64>>,
}

impl core::fmt::Debug for WidthCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let cached: usize = self.widths.values().map(HashMap::len).sum();
        f.debug_struct("WidthCache")
            .field("has_measure_fn", &self.measure.is_some())
            .field("cached", &cached)
            .finish_non_exhaustive()
    }
}

impl WidthCache {
    pub(crate) fn new() -> Self {
        Self {
            measure: None,
            widths: HashMap::new(),
        }
    }

    /// Swap the measurement strategy, dropping every cached width.
    pub(crate) fn set_measure(&mut self, measure: Option<MeasureFn>) {
        self.measure = measure;
        self.widths.clear();
    }

    /// Drop cached widths (strategy unchanged). Called on options changes.
    pub(crate) fn invalidate(&mut self) {
        self.widths.clear();
    }

    /// Width of `text` at `font_size`, measured or estimated, cached.
    pub(crate) fn width(&mut self, text: &str, font_size: f64, char_width_ratio: f64) -> f64 {
        let by_text = self.widths.entry(font_size.to_bits()).or_default();
        if let Some(&w) = by_text.get(text) {
            return w;
        }
        let w = match &self.measure {
            Some(measure) => measure(text, font_size),
            None => text.chars().count() as f64 * char_width_ratio * font_size,
        };
        by_text.insert(text.to_owned(), w);
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;

    #[test]
    fn estimate_scales_with_chars_and_font() {
        let mut cache = WidthCache::new();
        let w = cache.width("ABCD", 10.0, 0.5);
        assert_eq!(w, 4.0 * 0.5 * 10.0);

        // Multi-byte text is counted in characters, not bytes.
        let w = cache.width("ÅÄÖ", 10.0, 0.5);
        assert_eq!(w, 3.0 * 0.5 * 10.0);
    }

    #[test]
    fn measure_fn_wins_and_is_cached() {
        let mut cache = WidthCache::new();
        cache.set_measure(Some(Box::new(|text, size| text.len() as f64 * size)));
        assert_eq!(cache.width("abc", 10.0, 0.5), 30.0);

        // Swapping the strategy invalidates cached values.
        cache.set_measure(None);
        assert_eq!(cache.width("abc", 10.0, 0.5), 15.0);
    }

    #[test]
    fn distinct_font_sizes_cache_separately() {
        let mut cache = WidthCache::new();
        let small = cache.width("xy", 10.0, 0.6);
        let large = cache.width("xy", 20.0, 0.6);
        assert!(large > small);
    }
}
