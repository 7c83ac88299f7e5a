// SPDX-License-Identifier: MPL-2.0
//! Domain value types shared by the screen controllers.
//!
//! Everything here is plain data: no I/O, no async, no engine handles.

pub mod layout;
pub mod newtypes;
pub mod playback;
pub mod quality;
pub mod time_units;

pub use layout::{DeviceOrientation, EmbeddedOrientation, LayoutMode, RotationAngle};
pub use newtypes::{AutoHideDelay, PlaybackRate, SkipStep};
pub use playback::{FinishPolicy, LoadGeneration, LoadRequest, PlaybackPhase, PlaybackState};
pub use quality::QualityPreset;
