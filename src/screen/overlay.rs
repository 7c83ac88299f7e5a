// SPDX-License-Identifier: MPL-2.0
//! Transport controls visibility with token-guarded auto-hide.
//!
//! Every scheduled hide carries a fresh [`TimerToken`]. Only the token of
//! the most recently scheduled timer can hide the controls, so a timer that
//! fires after being superseded changes nothing.

use crate::config::DIMMED_PLAYER_OPACITY;
use crate::domain::AutoHideDelay;
use std::time::{Duration, Instant};

/// Identifies one scheduled auto-hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Overlay visibility state.
#[derive(Debug, Clone)]
pub struct State {
    controls_visible: bool,
    auto_hide_deadline: Option<Instant>,
    pending: Option<TimerToken>,
    next_token: u64,
    delay: AutoHideDelay,
    /// Set while the mini-player owns the screen.
    suppressed: bool,
}

/// Messages for the overlay sub-component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    /// The user touched the player or a control.
    UserInteraction(Instant),
    /// Hide immediately (e.g. tap while visible).
    HideNow,
    /// An auto-hide timer expired.
    TimerFired(TimerToken),
    /// Keep the controls up with no timer (scrubbing).
    HoldOpen,
    /// Hide and ignore interactions until restored (mini-player).
    Suppress,
    /// Leave the suppressed state and re-arm auto-hide.
    Restore(Instant),
    /// Back to the initial hidden state.
    Reset,
}

/// Effects produced by overlay visibility changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// No effect.
    None,
    /// Start a timer that reports back with `token` after `delay`.
    Schedule { token: TimerToken, delay: Duration },
    /// Drop the pending timer.
    Cancel,
    /// The pending timer fired and hid the controls.
    Hidden,
    /// A superseded timer fired; nothing changed.
    Stale(TimerToken),
}

impl Default for State {
    fn default() -> Self {
        Self::new(AutoHideDelay::default())
    }
}

impl State {
    #[must_use]
    pub fn new(delay: AutoHideDelay) -> Self {
        Self {
            controls_visible: false,
            auto_hide_deadline: None,
            pending: None,
            next_token: 0,
            delay,
            suppressed: false,
        }
    }

    /// Handle an overlay message.
    pub fn handle(&mut self, msg: Message) -> Effect {
        match msg {
            Message::UserInteraction(now) => {
                if self.suppressed {
                    return Effect::None;
                }
                self.arm(now)
            }
            Message::HideNow => self.hide(),
            Message::TimerFired(token) => {
                if self.pending != Some(token) {
                    return Effect::Stale(token);
                }
                self.controls_visible = false;
                self.auto_hide_deadline = None;
                self.pending = None;
                Effect::Hidden
            }
            Message::HoldOpen => {
                if self.suppressed {
                    return Effect::None;
                }
                self.controls_visible = true;
                self.auto_hide_deadline = None;
                if self.pending.take().is_some() {
                    Effect::Cancel
                } else {
                    Effect::None
                }
            }
            Message::Suppress => {
                self.suppressed = true;
                self.hide()
            }
            Message::Restore(now) => {
                self.suppressed = false;
                self.arm(now)
            }
            Message::Reset => {
                self.suppressed = false;
                self.hide()
            }
        }
    }

    fn arm(&mut self, now: Instant) -> Effect {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let delay = self.delay.as_duration();
        self.controls_visible = true;
        self.auto_hide_deadline = Some(now + delay);
        self.pending = Some(token);
        Effect::Schedule { token, delay }
    }

    fn hide(&mut self) -> Effect {
        self.controls_visible = false;
        self.auto_hide_deadline = None;
        if self.pending.take().is_some() {
            Effect::Cancel
        } else {
            Effect::None
        }
    }

    #[must_use]
    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    #[must_use]
    pub fn auto_hide_deadline(&self) -> Option<Instant> {
        self.auto_hide_deadline
    }

    /// Token of the timer that may still hide the controls.
    #[must_use]
    pub fn pending_token(&self) -> Option<TimerToken> {
        self.pending
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    #[must_use]
    pub fn delay(&self) -> AutoHideDelay {
        self.delay
    }

    /// Opacity of the video layer: dimmed while the controls are up.
    #[must_use]
    pub fn player_opacity(&self) -> f32 {
        if self.controls_visible {
            DIMMED_PLAYER_OPACITY
        } else {
            1.0
        }
    }
}
