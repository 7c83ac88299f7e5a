// SPDX-License-Identifier: MPL-2.0
//! Time unit conversion and clock formatting.
//!
//! Provides conversion functions between seconds and microseconds for:
//! - Thumbnail cache indexing (i64 keys)
//! - Position/duration labels shown by the transport controls

/// Microseconds per second as f64 for calculations.
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Label shown while the duration is unknown.
pub const UNKNOWN_CLOCK: &str = "--:--";

/// Converts seconds to microseconds (i64 for cache indexing).
///
/// # Examples
///
/// ```
/// use playscreen::domain::time_units::secs_to_micros;
///
/// assert_eq!(secs_to_micros(1.0), 1_000_000);
/// assert_eq!(secs_to_micros(0.5), 500_000);
/// ```
#[inline]
#[must_use]
pub fn secs_to_micros(secs: f64) -> i64 {
    (secs * MICROS_PER_SECOND).round() as i64
}

/// Converts microseconds back to seconds.
///
/// # Examples
///
/// ```
/// use playscreen::domain::time_units::micros_to_secs;
///
/// assert_eq!(micros_to_secs(1_000_000), 1.0);
/// ```
#[inline]
#[must_use]
pub fn micros_to_secs(micros: i64) -> f64 {
    micros as f64 / MICROS_PER_SECOND
}

/// Formats seconds as `MM:SS`, or `H:MM:SS` from one hour on.
///
/// Fractions are truncated; negative and non-finite input renders as zero.
///
/// # Examples
///
/// ```
/// use playscreen::domain::time_units::format_clock;
///
/// assert_eq!(format_clock(30.0), "00:30");
/// assert_eq!(format_clock(3725.0), "1:02:05");
/// ```
#[must_use]
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Formats a duration, rendering [`UNKNOWN_CLOCK`] when it is not known yet.
#[must_use]
pub fn format_duration(duration_secs: f64) -> String {
    if duration_secs.is_finite() && duration_secs > 0.0 {
        format_clock(duration_secs)
    } else {
        UNKNOWN_CLOCK.to_string()
    }
}
