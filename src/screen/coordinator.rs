// SPDX-License-Identifier: MPL-2.0
//! Player screen coordinator.
//!
//! [`PlayerScreen`] is the single entry point for everything that happens to
//! the screen: user input, engine callbacks, rotation, app lifecycle, timer
//! fires and thumbnail completions. It dispatches each message to the
//! sub-components, turns their effects into [`Command`]s for the runtime,
//! reconciles cross-cutting invariants and returns one [`RenderSnapshot`].
//!
//! The coordinator performs no I/O and never reads the clock: the caller
//! passes `now` with every message.

use super::diagnostics::{CallbackSource, DiagnosticEvent, Diagnostics};
use super::menu::{self, MenuChoice, MenuRequestId};
use super::overlay::{self, TimerToken};
use super::playback::{self, SkipDirection};
use super::snapshot::RenderSnapshot;
use super::{layout, scrub};
use crate::config::Config;
use crate::domain::{
    AutoHideDelay, DeviceOrientation, FinishPolicy, LayoutMode, LoadGeneration, LoadRequest,
    QualityPreset, SkipStep,
};
use crate::engine::{EngineCommand, EngineEvent, ImageHandle};
use std::time::{Duration, Instant};

/// Settings the screen is built with.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    pub auto_hide_delay: AutoHideDelay,
    pub skip_step: SkipStep,
    /// Asset loaded when the screen appears.
    pub primary: Option<LoadRequest>,
    pub finish_policy: FinishPolicy,
    pub quality_presets: Vec<QualityPreset>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ScreenConfig {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            auto_hide_delay: AutoHideDelay::new(config.auto_hide_delay_secs),
            skip_step: SkipStep::new(config.skip_step_secs),
            primary: config.primary_url.as_ref().map(|url| LoadRequest {
                url: Some(url.clone()),
                is_live: config.primary_is_live,
                autoplay: true,
            }),
            finish_policy: config.finish_policy.clone(),
            quality_presets: config.quality_presets.clone(),
        }
    }
}

/// Where the screen is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Created, not shown yet.
    #[default]
    Detached,
    Visible,
    /// The app is in the background.
    Background,
    /// The screen went away; only a new appearance or load revives it.
    TornDown,
}

/// Preview chrome animation requested from the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewAnimation {
    Show,
    Hide,
}

/// Everything that can happen to the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Lifecycle
    ScreenDidAppear(DeviceOrientation),
    ScreenWillDisappear,
    AppDidEnterBackground,
    AppDidBecomeActive,
    OrientationChanged(DeviceOrientation),

    // Loading
    Load(LoadRequest),
    RetryLoad,

    // Transport
    TapPlayer,
    PlayPauseTapped,
    Play,
    Pause,
    SkipForward,
    SkipBackward,
    Seek(f64),
    SetRate(f64),

    // Layout
    ToggleFullScreen,
    EnterMini,
    ExitMini,
    CloseMini,

    // Scrubbing
    ScrubBegan,
    ScrubMoved(f64),
    ScrubEnded,

    // Settings
    OpenSettings,
    MenuAnswered {
        request: MenuRequestId,
        choice: MenuChoice,
    },

    // Callbacks
    AutoHideFired(TimerToken),
    Engine {
        generation: LoadGeneration,
        event: EngineEvent,
    },
    ThumbnailReady {
        generation: LoadGeneration,
        time_secs: f64,
        image: ImageHandle,
    },
    ThumbnailFailed {
        generation: LoadGeneration,
        time_secs: f64,
    },
}

/// Side effects the runtime must carry out, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Engine(EngineCommand),
    /// Replace any pending auto-hide timer with this one.
    ScheduleAutoHide {
        token: TimerToken,
        delay: Duration,
    },
    CancelAutoHide,
    RequestThumbnails {
        generation: LoadGeneration,
        timestamps: Vec<f64>,
    },
    CancelThumbnails,
    PresentMenu {
        request: MenuRequestId,
        title: &'static str,
        options: Vec<String>,
    },
    ForceDeviceOrientation(DeviceOrientation),
    PreviewAnimation(PreviewAnimation),
    /// Stop listening to every source; the engine is released.
    Unsubscribe,
}

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub effects: Vec<Command>,
    pub snapshot: RenderSnapshot,
}

/// The player screen state machine.
#[derive(Debug, Clone)]
pub struct PlayerScreen {
    config: ScreenConfig,
    lifecycle: Lifecycle,
    playback: playback::State,
    layout: layout::State,
    overlay: overlay::State,
    scrub: scrub::State,
    menu: menu::State,
    diagnostics: Diagnostics,
}

impl Default for PlayerScreen {
    fn default() -> Self {
        Self::new(ScreenConfig::default())
    }
}

impl PlayerScreen {
    #[must_use]
    pub fn new(config: ScreenConfig) -> Self {
        Self {
            playback: playback::State::new(config.skip_step),
            layout: layout::State::default(),
            overlay: overlay::State::new(config.auto_hide_delay),
            scrub: scrub::State::default(),
            menu: menu::State::new(config.quality_presets.clone()),
            diagnostics: Diagnostics::default(),
            lifecycle: Lifecycle::Detached,
            config,
        }
    }

    /// Handles one message and returns the commands to run plus the new
    /// snapshot.
    pub fn handle(&mut self, message: Message, now: Instant) -> Update {
        let mut commands = Vec::new();

        if self.lifecycle == Lifecycle::TornDown && !Self::revives(&message) {
            if message != Message::ScreenWillDisappear {
                self.record_after_teardown(&message);
            }
            return self.update(commands);
        }

        self.dispatch(message, now, &mut commands);
        self.reconcile(&mut commands);
        self.update(commands)
    }

    fn revives(message: &Message) -> bool {
        matches!(message, Message::ScreenDidAppear(_) | Message::Load(_))
    }

    fn update(&self, commands: Vec<Command>) -> Update {
        Update {
            effects: commands,
            snapshot: self.snapshot(),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn dispatch(&mut self, message: Message, now: Instant, commands: &mut Vec<Command>) {
        match message {
            Message::ScreenDidAppear(orientation) => {
                self.lifecycle = Lifecycle::Visible;
                self.layout.handle(layout::Message::Adopt(orientation));
                self.apply_overlay(overlay::Message::Reset, commands);
                if !self.playback.phase().has_asset() {
                    if let Some(primary) = self.config.primary.clone() {
                        self.load(primary, commands);
                    }
                }
            }
            Message::ScreenWillDisappear => self.tear_down(commands),
            Message::AppDidEnterBackground => {
                if self.lifecycle == Lifecycle::Visible {
                    self.lifecycle = Lifecycle::Background;
                }
            }
            Message::AppDidBecomeActive => {
                if self.lifecycle == Lifecycle::Background {
                    self.lifecycle = Lifecycle::Visible;
                    tracing::debug!("returned from background, pausing");
                    self.apply_playback(playback::Message::ForcePause, now, commands);
                }
            }
            Message::OrientationChanged(orientation) => {
                self.apply_layout(layout::Message::OrientationChanged(orientation), now, commands);
            }
            Message::Load(request) => {
                self.lifecycle = Lifecycle::Visible;
                self.load(request, commands);
            }
            Message::RetryLoad => {
                self.apply_playback(playback::Message::Retry, now, commands);
            }
            Message::TapPlayer => {
                if self.layout.mode().is_mini() {
                    self.apply_layout(layout::Message::ExitMini, now, commands);
                } else if self.overlay.controls_visible() && !self.scrub.is_active() {
                    self.apply_overlay(overlay::Message::HideNow, commands);
                } else {
                    self.interact(now, commands);
                }
            }
            Message::PlayPauseTapped => {
                self.apply_playback(playback::Message::Toggle, now, commands);
                self.interact(now, commands);
            }
            Message::Play => self.apply_playback(playback::Message::Play, now, commands),
            Message::Pause => self.apply_playback(playback::Message::Pause, now, commands),
            Message::SkipForward => {
                self.apply_playback(playback::Message::Skip(SkipDirection::Forward), now, commands);
                self.interact(now, commands);
            }
            Message::SkipBackward => {
                self.apply_playback(
                    playback::Message::Skip(SkipDirection::Backward),
                    now,
                    commands,
                );
                self.interact(now, commands);
            }
            Message::Seek(target) => {
                self.apply_playback(playback::Message::Seek(target), now, commands);
            }
            Message::SetRate(rate) => {
                self.apply_playback(playback::Message::SetRate(rate), now, commands);
            }
            Message::ToggleFullScreen => {
                self.apply_layout(layout::Message::ToggleFullScreen, now, commands);
            }
            Message::EnterMini => self.apply_layout(layout::Message::EnterMini, now, commands),
            Message::ExitMini => self.apply_layout(layout::Message::ExitMini, now, commands),
            Message::CloseMini => self.apply_layout(layout::Message::CloseMini, now, commands),
            Message::ScrubBegan => {
                if self.layout.mode().is_mini() || self.playback.record().is_live {
                    return;
                }
                if self.scrub.handle(scrub::Message::Begin) == scrub::Effect::ShowPreview {
                    commands.push(Command::PreviewAnimation(PreviewAnimation::Show));
                    self.apply_overlay(overlay::Message::HoldOpen, commands);
                }
            }
            Message::ScrubMoved(fraction) => {
                if let scrub::Effect::SeekTo(target) = self.scrub.handle(scrub::Message::Drag(fraction)) {
                    self.apply_playback(playback::Message::Seek(target), now, commands);
                }
            }
            Message::ScrubEnded => {
                if self.scrub.handle(scrub::Message::End) == scrub::Effect::HidePreview {
                    commands.push(Command::PreviewAnimation(PreviewAnimation::Hide));
                    self.interact(now, commands);
                }
            }
            Message::OpenSettings => {
                let is_live = self.playback.record().is_live;
                let effect = self.menu.handle(menu::Message::Open { is_live });
                self.apply_menu_effect(effect, now, commands);
            }
            Message::MenuAnswered { request, choice } => {
                let effect = self.menu.handle(menu::Message::Answered { request, choice });
                self.apply_menu_effect(effect, now, commands);
            }
            Message::AutoHideFired(token) => {
                if let overlay::Effect::Stale(token) =
                    self.overlay.handle(overlay::Message::TimerFired(token))
                {
                    tracing::trace!(token = token.value(), "superseded auto-hide timer fired");
                    self.diagnostics.record(DiagnosticEvent::StaleCallback {
                        source: CallbackSource::AutoHideTimer,
                        generation: None,
                    });
                }
            }
            Message::Engine { generation, event } => {
                self.apply_playback(playback::Message::Engine { generation, event }, now, commands);
            }
            Message::ThumbnailReady {
                generation,
                time_secs,
                image,
            } => {
                let effect = self.scrub.handle(scrub::Message::ThumbnailReady {
                    generation,
                    time_secs,
                    image,
                });
                if let scrub::Effect::Stale { generation } = effect {
                    self.diagnostics.record(DiagnosticEvent::StaleCallback {
                        source: CallbackSource::Thumbnail,
                        generation: Some(generation),
                    });
                }
            }
            Message::ThumbnailFailed {
                generation,
                time_secs,
            } => {
                if generation == self.playback.generation() {
                    self.diagnostics
                        .record(DiagnosticEvent::ThumbnailDropped { time_secs });
                }
            }
        }
    }

    fn load(&mut self, request: LoadRequest, commands: &mut Vec<Command>) {
        let effect = self.playback.handle(playback::Message::Load(request));
        self.apply_load_effect(effect, commands);
    }

    fn apply_load_effect(&mut self, effect: playback::Effect, commands: &mut Vec<Command>) {
        match effect {
            playback::Effect::LoadStarted {
                generation,
                commands: engine,
            } => {
                self.layout.handle(layout::Message::Reveal);
                self.menu.handle(menu::Message::Dismiss);
                commands.push(Command::CancelThumbnails);
                if let scrub::Effect::Abandoned {
                    preview_was_visible: true,
                } = self.scrub.handle(scrub::Message::Reset(generation))
                {
                    commands.push(Command::PreviewAnimation(PreviewAnimation::Hide));
                }
                commands.extend(engine.into_iter().map(Command::Engine));
            }
            playback::Effect::LoadRejected(failure) => {
                self.diagnostics.record(DiagnosticEvent::LoadRejected(failure));
            }
            _ => {}
        }
    }

    fn apply_playback(&mut self, msg: playback::Message, now: Instant, commands: &mut Vec<Command>) {
        let effect = self.playback.handle(msg);
        match effect {
            playback::Effect::None => {}
            playback::Effect::Engine(engine) | playback::Effect::Cleared(engine) => {
                commands.extend(engine.into_iter().map(Command::Engine));
            }
            playback::Effect::LoadStarted { .. } | playback::Effect::LoadRejected(_) => {
                self.apply_load_effect(effect, commands);
            }
            playback::Effect::DurationKnown {
                generation,
                duration_secs,
            } => {
                let effect = self.scrub.handle(scrub::Message::AssetLoaded {
                    generation,
                    duration_secs,
                });
                if let scrub::Effect::Populate {
                    generation,
                    timestamps,
                } = effect
                {
                    commands.push(Command::RequestThumbnails {
                        generation,
                        timestamps,
                    });
                }
            }
            playback::Effect::BufferingEnded => {
                if !self.layout.mode().is_mini() && !self.scrub.is_active() {
                    self.interact(now, commands);
                }
            }
            playback::Effect::Finished => self.apply_finish_policy(commands),
            playback::Effect::LoadFailed(failure) => {
                tracing::warn!(error = %failure, "asset failed to load");
            }
            playback::Effect::RateRejected { rate, is_live } => {
                self.diagnostics
                    .record(DiagnosticEvent::RateRejected { rate, is_live });
            }
            playback::Effect::Stale { generation } => {
                self.diagnostics.record(DiagnosticEvent::StaleCallback {
                    source: CallbackSource::Engine,
                    generation: Some(generation),
                });
            }
        }
    }

    fn apply_finish_policy(&mut self, commands: &mut Vec<Command>) {
        let next = match &self.config.finish_policy {
            FinishPolicy::ReplayPrimary => self.config.primary.clone(),
            FinishPolicy::Load { url, is_live } => Some(LoadRequest {
                url: Some(url.clone()),
                is_live: *is_live,
                autoplay: true,
            }),
            FinishPolicy::Stop => None,
        };
        if let Some(request) = next {
            tracing::info!("applying finish policy");
            self.load(request, commands);
        }
    }

    fn apply_layout(&mut self, msg: layout::Message, now: Instant, commands: &mut Vec<Command>) {
        match self.layout.handle(msg) {
            layout::Effect::None => {}
            layout::Effect::ModeChanged { from, to } => {
                if to.is_mini() {
                    if self.scrub.handle(scrub::Message::End) == scrub::Effect::HidePreview {
                        commands.push(Command::PreviewAnimation(PreviewAnimation::Hide));
                    }
                    self.menu.handle(menu::Message::Dismiss);
                    self.apply_overlay(overlay::Message::Suppress, commands);
                } else if from.is_mini() {
                    self.apply_overlay(overlay::Message::Restore(now), commands);
                } else if from.is_embedded() != to.is_embedded() {
                    self.interact(now, commands);
                }
            }
            layout::Effect::ForcePortrait { .. } => {
                commands.push(Command::ForceDeviceOrientation(DeviceOrientation::Portrait));
            }
            layout::Effect::MiniClosed => {
                self.apply_playback(playback::Message::Pause, now, commands);
                self.apply_overlay(overlay::Message::Reset, commands);
            }
            layout::Effect::Rejected { mode, action } => {
                self.diagnostics
                    .record(DiagnosticEvent::IllegalTransition { mode, action });
            }
        }
    }

    fn apply_overlay(&mut self, msg: overlay::Message, commands: &mut Vec<Command>) {
        match self.overlay.handle(msg) {
            overlay::Effect::Schedule { token, delay } => {
                commands.push(Command::ScheduleAutoHide { token, delay });
            }
            overlay::Effect::Cancel => commands.push(Command::CancelAutoHide),
            overlay::Effect::None | overlay::Effect::Hidden | overlay::Effect::Stale(_) => {}
        }
    }

    fn apply_menu_effect(&mut self, effect: menu::Effect, now: Instant, commands: &mut Vec<Command>) {
        match effect {
            menu::Effect::None => {}
            menu::Effect::Present {
                request,
                title,
                options,
            } => commands.push(Command::PresentMenu {
                request,
                title,
                options,
            }),
            menu::Effect::SetRate(rate) => {
                self.apply_playback(playback::Message::SetRate(rate.value()), now, commands);
            }
            menu::Effect::SetQuality(preset) => {
                tracing::debug!(label = %preset.label, "quality preset selected");
                commands.push(Command::Engine(EngineCommand::SetPreferredPeakBitRate(
                    preset.peak_bit_rate,
                )));
            }
            menu::Effect::Stale(_) => {
                self.diagnostics.record(DiagnosticEvent::StaleCallback {
                    source: CallbackSource::Menu,
                    generation: None,
                });
            }
        }
    }

    /// User touched the player: show controls and restart auto-hide.
    fn interact(&mut self, now: Instant, commands: &mut Vec<Command>) {
        if self.scrub.is_active() {
            return;
        }
        self.apply_overlay(overlay::Message::UserInteraction(now), commands);
    }

    fn tear_down(&mut self, commands: &mut Vec<Command>) {
        let effect = self.playback.handle(playback::Message::Clear);
        if let playback::Effect::Cleared(engine) = effect {
            commands.extend(engine.into_iter().map(Command::Engine));
        }
        self.apply_overlay(overlay::Message::Reset, commands);
        commands.push(Command::CancelAutoHide);
        if let scrub::Effect::Abandoned {
            preview_was_visible: true,
        } = self
            .scrub
            .handle(scrub::Message::Reset(self.playback.generation()))
        {
            commands.push(Command::PreviewAnimation(PreviewAnimation::Hide));
        }
        commands.push(Command::CancelThumbnails);
        self.menu.handle(menu::Message::Dismiss);
        commands.push(Command::Unsubscribe);
        commands.dedup();
        self.lifecycle = Lifecycle::TornDown;
        tracing::info!("player screen torn down");
    }

    /// Restores invariants that span sub-components.
    fn reconcile(&mut self, commands: &mut Vec<Command>) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        let mini = self.layout.mode().is_mini();
        if mini && !self.overlay.is_suppressed() {
            self.apply_overlay(overlay::Message::Suppress, commands);
        }
    }

    fn record_after_teardown(&mut self, message: &Message) {
        let (source, generation) = match message {
            Message::Engine { generation, .. } => (CallbackSource::Engine, Some(*generation)),
            Message::ThumbnailReady { generation, .. }
            | Message::ThumbnailFailed { generation, .. } => {
                (CallbackSource::Thumbnail, Some(*generation))
            }
            Message::AutoHideFired(_) => (CallbackSource::AutoHideTimer, None),
            Message::MenuAnswered { .. } => (CallbackSource::Menu, None),
            _ => (CallbackSource::AfterTeardown, None),
        };
        self.diagnostics
            .record(DiagnosticEvent::StaleCallback { source, generation });
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::compose(
            &self.playback,
            &self.layout,
            &self.overlay,
            &self.scrub,
            &self.menu,
        )
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn layout_mode(&self) -> LayoutMode {
        self.layout.mode()
    }

    #[must_use]
    pub fn playback(&self) -> &playback::State {
        &self.playback
    }

    #[must_use]
    pub fn overlay(&self) -> &overlay::State {
        &self.overlay
    }

    #[must_use]
    pub fn scrub(&self) -> &scrub::State {
        &self.scrub
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }
}
