// SPDX-License-Identifier: MPL-2.0
//! The player screen: sub-components and the coordinator that owns them.
//!
//! Each sub-component exposes a `State`, a `Message` enum, an `Effect` enum
//! and a `handle` method. Only [`PlayerScreen`] sees more than one of them.

pub mod coordinator;
pub mod diagnostics;
pub mod layout;
pub mod menu;
pub mod overlay;
pub mod playback;
pub mod scrub;
pub mod snapshot;
pub mod thumbnails;

pub use coordinator::{
    Command, Lifecycle, Message, PlayerScreen, PreviewAnimation, ScreenConfig, Update,
};
pub use diagnostics::{CallbackSource, DiagnosticEvent, Diagnostics};
pub use menu::MenuRequestId;
pub use overlay::TimerToken;
pub use snapshot::{ControlSet, PlayPauseIcon, RenderSnapshot};
