// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and other common test helpers.
//!
//! This module re-exports the `approx` crate's assertion macro for float comparison,
//! which properly handles floating-point precision issues that `assert_eq!` cannot.

pub use approx::assert_abs_diff_eq;

/// Default epsilon for f32 comparisons.
pub const F32_EPSILON: f32 = 1e-6;

/// Shorthand for a `std::time::Instant` offset from a fixed origin.
pub fn at(origin: std::time::Instant, secs: f64) -> std::time::Instant {
    origin + std::time::Duration::from_secs_f64(secs)
}
