// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the player screen. Constants are organized by category.
//!
//! # Categories
//!
//! - **Overlay**: Transport controls auto-hide delay
//! - **Skip**: Forward/backward skip step
//! - **Playback Rate**: Closed set of speeds offered by the speed menu
//! - **Thumbnails**: Scrub preview sampling
//! - **Diagnostics**: Transition diagnostics buffer

// ==========================================================================
// Overlay Defaults
// ==========================================================================

/// Default auto-hide delay for the transport controls (in seconds).
pub const DEFAULT_AUTO_HIDE_DELAY_SECS: u32 = 5;

/// Minimum auto-hide delay (in seconds).
pub const MIN_AUTO_HIDE_DELAY_SECS: u32 = 1;

/// Maximum auto-hide delay (in seconds).
pub const MAX_AUTO_HIDE_DELAY_SECS: u32 = 30;

/// Opacity applied to the video layer while the controls are shown.
pub const DIMMED_PLAYER_OPACITY: f32 = 0.5;

// ==========================================================================
// Skip Defaults
// ==========================================================================

/// Default skip step for the forward/backward buttons (in seconds).
pub const DEFAULT_SKIP_STEP_SECS: f64 = 10.0;

/// Minimum skip step (in seconds).
pub const MIN_SKIP_STEP_SECS: f64 = 1.0;

/// Maximum skip step (in seconds).
pub const MAX_SKIP_STEP_SECS: f64 = 60.0;

// ==========================================================================
// Playback Rate Defaults
// ==========================================================================

/// Speeds offered by the speed menu, ascending.
pub const PLAYBACK_RATE_PRESETS: &[f64] = &[0.1, 1.0, 2.0, 4.0, 6.0];

/// Normal playback speed.
pub const DEFAULT_PLAYBACK_RATE: f64 = 1.0;

/// Tolerance used when matching a requested rate against the presets.
pub const PLAYBACK_RATE_EPSILON: f64 = 0.001;

// ==========================================================================
// Thumbnail Defaults
// ==========================================================================

/// Number of preview frames sampled across an asset (1% granularity).
pub const THUMBNAIL_SAMPLE_COUNT: u32 = 99;

/// Maximum number of frame requests in flight during population.
pub const THUMBNAIL_REQUEST_CONCURRENCY: usize = 4;

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

/// Number of diagnostic events retained by a screen.
pub const DEFAULT_DIAGNOSTICS_CAPACITY: usize = 256;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Overlay validation
    assert!(MIN_AUTO_HIDE_DELAY_SECS > 0);
    assert!(MAX_AUTO_HIDE_DELAY_SECS >= MIN_AUTO_HIDE_DELAY_SECS);
    assert!(DEFAULT_AUTO_HIDE_DELAY_SECS >= MIN_AUTO_HIDE_DELAY_SECS);
    assert!(DEFAULT_AUTO_HIDE_DELAY_SECS <= MAX_AUTO_HIDE_DELAY_SECS);
    assert!(DIMMED_PLAYER_OPACITY > 0.0);
    assert!(DIMMED_PLAYER_OPACITY < 1.0);

    // Skip validation
    assert!(MIN_SKIP_STEP_SECS > 0.0);
    assert!(MAX_SKIP_STEP_SECS >= MIN_SKIP_STEP_SECS);
    assert!(DEFAULT_SKIP_STEP_SECS >= MIN_SKIP_STEP_SECS);
    assert!(DEFAULT_SKIP_STEP_SECS <= MAX_SKIP_STEP_SECS);

    // Thumbnail validation
    assert!(THUMBNAIL_SAMPLE_COUNT > 0);
    assert!(THUMBNAIL_REQUEST_CONCURRENCY > 0);

    // Diagnostics validation
    assert!(DEFAULT_DIAGNOSTICS_CAPACITY > 0);
};
