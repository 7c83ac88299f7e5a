// SPDX-License-Identifier: MPL-2.0
//! Render snapshot: everything the view needs to draw one frame.
//!
//! A snapshot is derived from the sub-component records after every update
//! and never stores state of its own.

use super::{layout, menu, overlay, playback, scrub};
use crate::domain::time_units::{format_clock, format_duration};
use crate::domain::{
    DeviceOrientation, EmbeddedOrientation, LayoutMode, PlaybackPhase, RotationAngle,
};
use crate::engine::ImageHandle;
use crate::error::LoadFailure;
use std::ops::BitOr;

/// Set of transport controls the view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ControlSet(u16);

impl ControlSet {
    pub const EMPTY: Self = Self(0);
    pub const PLAY_PAUSE: Self = Self(1 << 0);
    pub const FULL_SCREEN: Self = Self(1 << 1);
    pub const SETTINGS: Self = Self(1 << 2);
    pub const SLIDER: Self = Self(1 << 3);
    pub const POSITION_LABEL: Self = Self(1 << 4);
    pub const DURATION_LABEL: Self = Self(1 << 5);
    pub const SKIP_FORWARD: Self = Self(1 << 6);
    pub const SKIP_BACKWARD: Self = Self(1 << 7);
    pub const LIVE_INDICATOR: Self = Self(1 << 8);
    pub const LIVE_PROGRESS: Self = Self(1 << 9);
    pub const MINI_PLAYER: Self = Self(1 << 10);

    /// Controls shown for every visible overlay.
    pub const COMMON: Self = Self(Self::PLAY_PAUSE.0 | Self::FULL_SCREEN.0 | Self::SETTINGS.0);
    /// Controls that only make sense with a known timeline.
    pub const TIMELINE: Self = Self(
        Self::SLIDER.0
            | Self::POSITION_LABEL.0
            | Self::DURATION_LABEL.0
            | Self::SKIP_FORWARD.0
            | Self::SKIP_BACKWARD.0,
    );
    /// Controls replacing the timeline on live streams.
    pub const LIVE: Self = Self(Self::LIVE_INDICATOR.0 | Self::LIVE_PROGRESS.0);

    /// Returns true if every control of `other` is in `self`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if any control of `other` is in `self`.
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Controls for a visible overlay in `mode`.
    #[must_use]
    pub fn visible_in(mode: LayoutMode, is_live: bool) -> Self {
        if mode.is_mini() {
            return Self::EMPTY;
        }
        let mut set = Self::COMMON | if is_live { Self::LIVE } else { Self::TIMELINE };
        if mode == LayoutMode::Embedded(EmbeddedOrientation::Portrait) {
            set = set | Self::MINI_PLAYER;
        }
        set
    }
}

impl BitOr for ControlSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Which glyph the play/pause button shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPauseIcon {
    /// Playback is paused; tapping plays.
    Play,
    /// Playback is running; tapping pauses.
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderModel {
    pub value: f64,
    /// 0 while the duration is unknown.
    pub max: f64,
    pub fraction: f64,
}

/// Layout the view must realize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutIntent {
    pub mode: LayoutMode,
    pub device_orientation: DeviceOrientation,
    pub rotation: RotationAngle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrubPreview {
    pub visible: bool,
    /// Nearest cached frame; the chrome stays up without one.
    pub image: Option<ImageHandle>,
    pub fraction: f64,
}

/// Everything the view renders for one update.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub phase: PlaybackPhase,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub position_text: String,
    pub duration_text: String,
    pub slider: SliderModel,
    pub play_pause_icon: PlayPauseIcon,
    pub show_spinner: bool,
    pub layout: LayoutIntent,
    pub controls: ControlSet,
    pub controls_visible: bool,
    pub mini_controls_visible: bool,
    pub is_live: bool,
    pub scrub_preview: ScrubPreview,
    pub error: Option<String>,
    /// The failure is worth a retry button.
    pub retry_available: bool,
    /// Label of the quality preset picked from the settings menu.
    pub quality_label: Option<String>,
    pub player_opacity: f32,
    pub back_navigation_visible: bool,
    pub player_visible: bool,
}

impl RenderSnapshot {
    /// Derives the snapshot from the sub-component records.
    #[must_use]
    pub fn compose(
        playback: &playback::State,
        layout: &layout::State,
        overlay: &overlay::State,
        scrub: &scrub::State,
        menu: &menu::State,
    ) -> Self {
        let record = playback.record();
        let phase = playback.phase();
        let mode = layout.mode();
        let controls_visible = overlay.controls_visible() && !mode.is_mini();
        let controls = if controls_visible {
            ControlSet::visible_in(mode, record.is_live)
        } else {
            ControlSet::EMPTY
        };
        let max = if record.is_duration_known() {
            record.duration_secs
        } else {
            0.0
        };

        Self {
            phase,
            position_secs: record.position_secs,
            duration_secs: record.duration_secs,
            position_text: format_clock(record.position_secs),
            duration_text: format_duration(max),
            slider: SliderModel {
                value: record.position_secs,
                max,
                fraction: record.progress_fraction(),
            },
            play_pause_icon: if record.is_playing() {
                PlayPauseIcon::Pause
            } else {
                PlayPauseIcon::Play
            },
            show_spinner: record.is_buffering && phase.has_asset(),
            layout: LayoutIntent {
                mode,
                device_orientation: layout.device_orientation(),
                rotation: layout.rotation(),
            },
            controls,
            controls_visible,
            mini_controls_visible: mode.is_mini(),
            is_live: record.is_live,
            scrub_preview: ScrubPreview {
                visible: scrub.is_active(),
                image: scrub.preview_image().cloned(),
                fraction: scrub.session().map_or(0.0, |session| session.last_fraction),
            },
            error: playback.error().map(ToString::to_string),
            retry_available: playback.error().is_some_and(LoadFailure::is_retryable),
            quality_label: menu.selected_preset().map(|preset| preset.label.clone()),
            player_opacity: if mode.is_mini() {
                1.0
            } else {
                overlay.player_opacity()
            },
            back_navigation_visible: matches!(
                mode,
                LayoutMode::Embedded(EmbeddedOrientation::Portrait) | LayoutMode::Mini
            ),
            player_visible: !layout.is_dismissed(),
        }
    }

    /// Returns true while the video layer is dimmed behind the controls.
    #[must_use]
    pub fn player_dimmed(&self) -> bool {
        self.player_opacity < 1.0
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl Default for RenderSnapshot {
    fn default() -> Self {
        Self::compose(
            &playback::State::default(),
            &layout::State::default(),
            &overlay::State::default(),
            &scrub::State::default(),
            &menu::State::default(),
        )
    }
}
