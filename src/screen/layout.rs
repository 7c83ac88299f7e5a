// SPDX-License-Identifier: MPL-2.0
//! Layout mode transitions.
//!
//! Only explicit user actions move the player into or out of the
//! mini-player; rotation only switches between the embedded orientations.
//! Transitions that are not legal from the current mode leave the state
//! untouched and come back as [`Effect::Rejected`].

use crate::domain::{DeviceOrientation, EmbeddedOrientation, LayoutMode, RotationAngle};

/// Layout sub-component state.
#[derive(Debug, Clone, Default)]
pub struct State {
    mode: LayoutMode,
    device_orientation: DeviceOrientation,
    /// Set by closing the mini-player until the next load or expand.
    dismissed: bool,
}

/// Messages for the layout sub-component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    OrientationChanged(DeviceOrientation),
    ToggleFullScreen,
    EnterMini,
    ExitMini,
    CloseMini,
    /// Screen (re)appeared holding the device in this orientation.
    Adopt(DeviceOrientation),
    /// Show the player again after a dismissal.
    Reveal,
}

/// Effects produced by layout changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// No effect.
    None,
    /// The layout mode changed.
    ModeChanged { from: LayoutMode, to: LayoutMode },
    /// The device was upside down; the view must force portrait.
    ForcePortrait { from: LayoutMode },
    /// The mini-player was closed; playback must pause.
    MiniClosed,
    /// Illegal transition, state unchanged.
    Rejected {
        mode: LayoutMode,
        action: &'static str,
    },
}

fn embedded_for(orientation: DeviceOrientation) -> LayoutMode {
    if orientation.is_landscape() {
        LayoutMode::Embedded(EmbeddedOrientation::Landscape)
    } else {
        LayoutMode::Embedded(EmbeddedOrientation::Portrait)
    }
}

impl State {
    /// Handle a layout message.
    pub fn handle(&mut self, msg: Message) -> Effect {
        let from = self.mode;
        match msg {
            Message::OrientationChanged(orientation) => {
                if !orientation.is_meaningful() {
                    return Effect::None;
                }
                self.device_orientation = orientation;
                match from {
                    LayoutMode::Mini | LayoutMode::FullScreen => Effect::None,
                    LayoutMode::Embedded(_) => {
                        if orientation == DeviceOrientation::PortraitUpsideDown {
                            self.device_orientation = DeviceOrientation::Portrait;
                            self.mode = LayoutMode::INITIAL;
                            return Effect::ForcePortrait { from };
                        }
                        self.transition(embedded_for(orientation))
                    }
                }
            }
            Message::ToggleFullScreen => match from {
                LayoutMode::Embedded(_) | LayoutMode::Mini => {
                    self.dismissed = false;
                    self.transition(LayoutMode::FullScreen)
                }
                LayoutMode::FullScreen => self.transition(embedded_for(self.device_orientation)),
            },
            Message::EnterMini => match from {
                LayoutMode::Embedded(_) => self.transition(LayoutMode::Mini),
                _ => Effect::Rejected {
                    mode: from,
                    action: "enter-mini",
                },
            },
            Message::ExitMini => match from {
                LayoutMode::Mini => self.transition(LayoutMode::INITIAL),
                _ => Effect::Rejected {
                    mode: from,
                    action: "exit-mini",
                },
            },
            Message::CloseMini => match from {
                LayoutMode::Mini => {
                    self.mode = LayoutMode::INITIAL;
                    self.dismissed = true;
                    tracing::debug!("mini-player closed");
                    Effect::MiniClosed
                }
                _ => Effect::Rejected {
                    mode: from,
                    action: "close-mini",
                },
            },
            Message::Adopt(orientation) => {
                if orientation.is_meaningful() {
                    self.device_orientation = orientation;
                }
                if self.device_orientation == DeviceOrientation::PortraitUpsideDown {
                    self.device_orientation = DeviceOrientation::Portrait;
                }
                self.dismissed = false;
                self.transition(embedded_for(self.device_orientation))
            }
            Message::Reveal => {
                self.dismissed = false;
                Effect::None
            }
        }
    }

    fn transition(&mut self, to: LayoutMode) -> Effect {
        let from = self.mode;
        if from == to {
            return Effect::None;
        }
        self.mode = to;
        tracing::debug!(from = from.name(), to = to.name(), "layout changed");
        Effect::ModeChanged { from, to }
    }

    #[must_use]
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    #[must_use]
    pub fn device_orientation(&self) -> DeviceOrientation {
        self.device_orientation
    }

    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Content rotation the view applies on top of the layout.
    #[must_use]
    pub fn rotation(&self) -> RotationAngle {
        if self.mode.is_full_screen() && self.device_orientation.is_portrait() {
            RotationAngle::QUARTER
        } else {
            RotationAngle::ZERO
        }
    }
}
