// SPDX-License-Identifier: MPL-2.0
//! Preview frame cache for the scrub bar.
//!
//! Frames are keyed by their timestamp in microseconds, so lookups are an
//! ordered-map range query rather than a scan.
//!
//! # Usage
//!
//! ```
//! use playscreen::engine::ImageHandle;
//! use playscreen::screen::thumbnails::ThumbnailCache;
//!
//! let mut cache = ThumbnailCache::new();
//! cache.insert(10.0, ImageHandle::solid(1, 1, [0, 0, 0, 255]));
//! cache.insert(20.0, ImageHandle::solid(1, 1, [9, 9, 9, 255]));
//! assert_eq!(cache.nearest_time(14.9), Some(10.0));
//! assert_eq!(cache.nearest_time(15.1), Some(20.0));
//! ```

use crate::config::THUMBNAIL_SAMPLE_COUNT;
use crate::domain::time_units::{micros_to_secs, secs_to_micros};
use crate::engine::ImageHandle;
use std::collections::BTreeMap;

/// Timestamps sampled for an asset of `duration_secs`.
///
/// One frame per percent of the duration, excluding both ends. Empty when
/// the duration is unknown.
#[must_use]
pub fn sample_times(duration_secs: f64) -> Vec<f64> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Vec::new();
    }
    let steps = f64::from(THUMBNAIL_SAMPLE_COUNT + 1);
    (1..=THUMBNAIL_SAMPLE_COUNT)
        .map(|i| f64::from(i) * duration_secs / steps)
        .collect()
}

/// Timestamp-keyed preview frames of the current asset.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailCache {
    frames: BTreeMap<i64, ImageHandle>,
}

impl ThumbnailCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the frame decoded for `time_secs`, replacing any previous one.
    pub fn insert(&mut self, time_secs: f64, image: ImageHandle) {
        self.frames.insert(secs_to_micros(time_secs), image);
    }

    /// Returns the frame closest to `time_secs`.
    ///
    /// Equidistant candidates resolve to the earlier timestamp.
    #[must_use]
    pub fn nearest(&self, time_secs: f64) -> Option<&ImageHandle> {
        self.nearest_entry(time_secs).map(|(_, image)| image)
    }

    /// Timestamp of the frame [`nearest`](Self::nearest) would return.
    #[must_use]
    pub fn nearest_time(&self, time_secs: f64) -> Option<f64> {
        self.nearest_entry(time_secs)
            .map(|(key, _)| micros_to_secs(key))
    }

    fn nearest_entry(&self, time_secs: f64) -> Option<(i64, &ImageHandle)> {
        let target = secs_to_micros(time_secs);
        let below = self.frames.range(..=target).next_back();
        let above = self.frames.range(target..).next();
        match (below, above) {
            (Some((&lo, lo_image)), Some((&hi, hi_image))) => {
                if target.abs_diff(lo) <= hi.abs_diff(target) {
                    Some((lo, lo_image))
                } else {
                    Some((hi, hi_image))
                }
            }
            (Some((&key, image)), None) | (None, Some((&key, image))) => Some((key, image)),
            (None, None) => None,
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    fn frame(shade: u8) -> ImageHandle {
        ImageHandle::solid(1, 1, [shade, shade, shade, 255])
    }

    fn cache_10_20() -> ThumbnailCache {
        let mut cache = ThumbnailCache::new();
        cache.insert(10.0, frame(1));
        cache.insert(20.0, frame(2));
        cache
    }

    #[test]
    fn empty_cache_returns_none() {
        assert!(ThumbnailCache::new().nearest(5.0).is_none());
    }

    #[test]
    fn nearest_picks_closest_key() {
        let cache = cache_10_20();
        assert_eq!(cache.nearest(14.9), Some(&frame(1)));
        assert_eq!(cache.nearest(15.1), Some(&frame(2)));
    }

    #[test]
    fn nearest_outside_range_picks_edge() {
        let cache = cache_10_20();
        assert_eq!(cache.nearest(-3.0), Some(&frame(1)));
        assert_eq!(cache.nearest(500.0), Some(&frame(2)));
    }

    #[test]
    fn exact_hit_returns_that_frame() {
        let cache = cache_10_20();
        assert_eq!(cache.nearest_time(20.0), Some(20.0));
    }

    #[test]
    fn tie_resolves_to_earlier_key() {
        let cache = cache_10_20();
        assert_eq!(cache.nearest_time(15.0), Some(10.0));
    }

    #[test]
    fn clear_empties_cache() {
        let mut cache = cache_10_20();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn sample_times_cover_one_to_ninety_nine_percent() {
        let times = sample_times(200.0);
        assert_eq!(times.len(), 99);
        assert_abs_diff_eq!(times[0], 2.0);
        assert_abs_diff_eq!(times[49], 100.0);
        assert_abs_diff_eq!(times[98], 198.0);
    }

    #[test]
    fn sample_times_empty_without_duration() {
        assert!(sample_times(0.0).is_empty());
        assert!(sample_times(f64::NAN).is_empty());
    }
}
