// SPDX-License-Identifier: MPL-2.0
//! Player screen newtypes.
//!
//! This module provides type-safe wrappers for the tunable values of the
//! screen, ensuring they are always within valid ranges.

use crate::config::{
    DEFAULT_AUTO_HIDE_DELAY_SECS, DEFAULT_PLAYBACK_RATE, DEFAULT_SKIP_STEP_SECS,
    MAX_AUTO_HIDE_DELAY_SECS, MAX_SKIP_STEP_SECS, MIN_AUTO_HIDE_DELAY_SECS, MIN_SKIP_STEP_SECS,
    PLAYBACK_RATE_EPSILON, PLAYBACK_RATE_PRESETS,
};
use std::time::Duration;

// =============================================================================
// AutoHideDelay
// =============================================================================

/// Inactivity delay before the transport controls hide, in seconds.
///
/// This newtype enforces validity at the type level, ensuring the value
/// is always within the valid range (1–30 seconds).
///
/// # Example
///
/// ```
/// use playscreen::domain::AutoHideDelay;
///
/// let delay = AutoHideDelay::new(5);
/// assert_eq!(delay.value(), 5);
///
/// // Values outside range are clamped
/// let too_long = AutoHideDelay::new(100);
/// assert_eq!(too_long.value(), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoHideDelay(u32);

impl AutoHideDelay {
    /// Creates a new delay, clamping to valid range.
    #[must_use]
    pub fn new(secs: u32) -> Self {
        Self(secs.clamp(MIN_AUTO_HIDE_DELAY_SECS, MAX_AUTO_HIDE_DELAY_SECS))
    }

    /// Returns the value in seconds.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the delay as a Duration.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl Default for AutoHideDelay {
    fn default() -> Self {
        Self(DEFAULT_AUTO_HIDE_DELAY_SECS)
    }
}

// =============================================================================
// SkipStep
// =============================================================================

/// Seconds jumped by the forward/backward skip buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipStep(f64);

impl SkipStep {
    /// Creates a new skip step, clamping to valid range.
    ///
    /// Non-finite input falls back to the default step.
    #[must_use]
    pub fn new(secs: f64) -> Self {
        if !secs.is_finite() {
            return Self::default();
        }
        Self(secs.clamp(MIN_SKIP_STEP_SECS, MAX_SKIP_STEP_SECS))
    }

    /// Returns the value in seconds.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for SkipStep {
    fn default() -> Self {
        Self(DEFAULT_SKIP_STEP_SECS)
    }
}

// =============================================================================
// PlaybackRate
// =============================================================================

/// Playback speed, guaranteed to be one of the speeds the speed menu offers
/// (0.1x, 1x, 2x, 4x, 6x).
///
/// Unlike the other newtypes this one does not clamp: a speed outside the
/// closed set is not representable.
///
/// # Example
///
/// ```
/// use playscreen::domain::PlaybackRate;
///
/// let rate = PlaybackRate::from_value(2.0).unwrap();
/// assert_eq!(rate.label(), "2x");
///
/// assert!(PlaybackRate::from_value(1.5).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    /// Normal speed (1x).
    pub const NORMAL: Self = Self(DEFAULT_PLAYBACK_RATE);

    /// Returns the preset matching `value`, if any.
    #[must_use]
    pub fn from_value(value: f64) -> Option<Self> {
        PLAYBACK_RATE_PRESETS
            .iter()
            .find(|&&preset| (preset - value).abs() < PLAYBACK_RATE_EPSILON)
            .map(|&preset| Self(preset))
    }

    /// Returns the speed value as f64.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns true for normal speed.
    #[must_use]
    pub fn is_normal(self) -> bool {
        (self.0 - DEFAULT_PLAYBACK_RATE).abs() < PLAYBACK_RATE_EPSILON
    }

    /// All presets, fastest first (the order the speed menu lists them).
    pub fn menu_order() -> impl Iterator<Item = Self> {
        PLAYBACK_RATE_PRESETS.iter().rev().map(|&preset| Self(preset))
    }

    /// Menu label: "Normal" for 1x, otherwise e.g. "6x" or "0.1x".
    #[must_use]
    pub fn label(self) -> String {
        if self.is_normal() {
            "Normal".to_string()
        } else {
            format!("{}x", self.0)
        }
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}
