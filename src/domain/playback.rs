// SPDX-License-Identifier: MPL-2.0
//! Playback domain types.
//!
//! This module defines the playback record shown on screen, the coarse
//! phase of the playback state machine, and the policies that drive it.

use serde::{Deserialize, Serialize};

/// Coarse phase of the playback state machine.
///
/// Buffering is orthogonal to the phase and lives on [`PlaybackState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// Nothing loaded (initial state and after teardown).
    #[default]
    Idle,
    /// Load issued, waiting for the engine to start producing time updates.
    Loading,
    /// Playing at a non-zero rate.
    Playing,
    /// Paused at the current position.
    Paused,
    /// Asset played to the end.
    Finished,
    /// The engine could not load the asset.
    Failed,
}

impl PlaybackPhase {
    /// Returns true if an asset is attached to the engine.
    #[must_use]
    pub fn has_asset(self) -> bool {
        matches!(
            self,
            Self::Loading | Self::Playing | Self::Paused | Self::Finished
        )
    }
}

/// Playback record rendered by the screen.
///
/// Replaced wholesale by each load, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    /// Current position in seconds.
    pub position_secs: f64,
    /// Asset duration in seconds; 0 while unknown.
    pub duration_secs: f64,
    /// 0 while paused, otherwise the speed playback runs at.
    pub rate: f64,
    /// Whether the engine is stalled waiting for data.
    pub is_buffering: bool,
    /// Whether the asset is a live broadcast.
    pub is_live: bool,
}

impl PlaybackState {
    /// State right after a load request.
    #[must_use]
    pub fn loading(is_live: bool) -> Self {
        Self {
            is_buffering: true,
            is_live,
            ..Self::default()
        }
    }

    /// Returns true once the engine reported a duration.
    #[must_use]
    pub fn is_duration_known(&self) -> bool {
        !self.is_live && self.duration_secs > 0.0
    }

    /// Clamps a target position into the seekable range.
    ///
    /// Unknown durations (and live streams) only clamp at zero; a
    /// non-finite target there has no end to clamp to and lands on zero.
    #[must_use]
    pub fn clamp_position(&self, target_secs: f64) -> f64 {
        if target_secs.is_nan() {
            return 0.0;
        }
        if self.is_duration_known() {
            target_secs.clamp(0.0, self.duration_secs)
        } else if target_secs.is_finite() {
            target_secs.max(0.0)
        } else {
            0.0
        }
    }

    /// Position as a fraction of the duration, 0 when unknown.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        if self.is_duration_known() {
            (self.position_secs / self.duration_secs).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Returns true when playback is intended to run.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.rate > 0.0
    }
}

/// Identifies one load of an asset.
///
/// Bumped on every load and on teardown; callbacks tagged with an older
/// generation are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadGeneration(u64);

impl LoadGeneration {
    /// Returns the following generation.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns the raw counter.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A request to load an asset into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Opaque media URL; `None` mirrors a missing bundled resource.
    pub url: Option<String>,
    /// Whether the asset is a live broadcast.
    pub is_live: bool,
    /// Start playback as soon as the load is issued.
    pub autoplay: bool,
}

impl LoadRequest {
    /// Request for an on-demand asset that starts playing immediately.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            is_live: false,
            autoplay: true,
        }
    }

    /// Request for a live broadcast that starts playing immediately.
    #[must_use]
    pub fn live(url: impl Into<String>) -> Self {
        Self {
            is_live: true,
            ..Self::new(url)
        }
    }

    /// Returns the URL when it is present and not blank.
    #[must_use]
    pub fn usable_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// What the screen does when an asset plays to the end.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinishPolicy {
    /// Reload the configured primary asset.
    #[default]
    ReplayPrimary,
    /// Load a specific follow-up asset.
    Load {
        url: String,
        #[serde(default)]
        is_live: bool,
    },
    /// Stay on the finished asset, paused.
    Stop,
}
