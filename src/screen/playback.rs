// SPDX-License-Identifier: MPL-2.0
//! Playback state machine.
//!
//! Owns the [`PlaybackState`] record and its [`PlaybackPhase`]. Every user
//! command updates the record optimistically and returns the engine
//! commands to issue; engine events reconcile the record afterwards.
//!
//! ```text
//! Idle -> Loading -> Playing <-> Paused
//!                 \-> Failed -> Loading (retry)
//! Playing -> Finished -> Loading (replay) | Idle (teardown)
//! ```

use crate::domain::{
    LoadGeneration, LoadRequest, PlaybackPhase, PlaybackRate, PlaybackState, SkipStep,
};
use crate::engine::{EngineCommand, EngineEvent};
use crate::error::LoadFailure;

/// Playback sub-component state.
#[derive(Debug, Clone, Default)]
pub struct State {
    record: PlaybackState,
    phase: PlaybackPhase,
    generation: LoadGeneration,
    /// Speed resumed by `Play`; reset by every load.
    preferred_rate: PlaybackRate,
    /// Last speed handed to the engine, which keeps it across loads.
    engine_rate: PlaybackRate,
    skip_step: SkipStep,
    last_load: Option<LoadRequest>,
    error: Option<LoadFailure>,
}

/// Direction of a skip button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDirection {
    Forward,
    Backward,
}

/// Messages for the playback sub-component.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Replace the current asset.
    Load(LoadRequest),
    Play,
    Pause,
    /// Single play/pause button.
    Toggle,
    /// Seek to an absolute position in seconds.
    Seek(f64),
    /// Skip by the configured step.
    Skip(SkipDirection),
    /// Pick a speed from the speed menu.
    SetRate(f64),
    /// Re-issue the last load.
    Retry,
    /// Pause imposed by the system (app returned from background).
    ForcePause,
    /// Drop the asset (screen teardown).
    Clear,
    /// Callback from the engine, tagged with its load.
    Engine {
        generation: LoadGeneration,
        event: EngineEvent,
    },
}

/// Effects produced by playback changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// No effect.
    None,
    /// Engine commands to issue, in order.
    Engine(Vec<EngineCommand>),
    /// A new asset replaced the previous one.
    LoadStarted {
        generation: LoadGeneration,
        commands: Vec<EngineCommand>,
    },
    /// The load request was unusable; nothing changed.
    LoadRejected(LoadFailure),
    /// The duration of the current asset is known.
    DurationKnown {
        generation: LoadGeneration,
        duration_secs: f64,
    },
    /// Buffering stopped.
    BufferingEnded,
    /// The asset played to its end.
    Finished,
    /// The engine could not load the asset.
    LoadFailed(LoadFailure),
    /// The requested speed is not allowed.
    RateRejected { rate: f64, is_live: bool },
    /// Engine callback from a replaced load.
    Stale { generation: LoadGeneration },
    /// The asset was dropped.
    Cleared(Vec<EngineCommand>),
}

impl State {
    #[must_use]
    pub fn new(skip_step: SkipStep) -> Self {
        Self {
            skip_step,
            ..Self::default()
        }
    }

    /// Handle a playback message.
    pub fn handle(&mut self, msg: Message) -> Effect {
        match msg {
            Message::Load(request) => self.load(request),
            Message::Play => self.play(),
            Message::Pause => self.pause(),
            Message::Toggle => {
                if self.record.is_playing() {
                    self.pause()
                } else {
                    self.play()
                }
            }
            Message::Seek(target) => self.seek(target),
            Message::Skip(direction) => {
                if self.record.is_live {
                    tracing::debug!("skip ignored on live stream");
                    return Effect::None;
                }
                let step = self.skip_step.value();
                let target = match direction {
                    SkipDirection::Forward => self.record.position_secs + step,
                    SkipDirection::Backward => self.record.position_secs - step,
                };
                self.seek(target)
            }
            Message::SetRate(rate) => self.set_rate(rate),
            Message::Retry => match self.last_load.clone() {
                Some(request) => {
                    tracing::info!("retrying last load");
                    self.load(request)
                }
                None => Effect::None,
            },
            Message::ForcePause => {
                let had_asset = self.phase.has_asset();
                self.record.rate = 0.0;
                if self.phase == PlaybackPhase::Playing {
                    self.phase = PlaybackPhase::Paused;
                }
                if had_asset {
                    Effect::Engine(vec![EngineCommand::Pause])
                } else {
                    Effect::None
                }
            }
            Message::Clear => self.clear(),
            Message::Engine { generation, event } => {
                if generation != self.generation || self.phase == PlaybackPhase::Idle {
                    return Effect::Stale { generation };
                }
                self.on_engine_event(event)
            }
        }
    }

    fn load(&mut self, request: LoadRequest) -> Effect {
        let Some(url) = request.usable_url().map(str::to_owned) else {
            tracing::warn!("load requested without a usable URL");
            return Effect::LoadRejected(LoadFailure::MissingUrl);
        };

        self.generation = self.generation.next();
        self.record = PlaybackState::loading(request.is_live);
        self.phase = PlaybackPhase::Loading;
        self.preferred_rate = PlaybackRate::NORMAL;
        self.error = None;

        let mut commands = vec![EngineCommand::Load {
            url: url.clone(),
            generation: self.generation,
        }];
        if request.autoplay {
            self.record.rate = self.preferred_rate.value();
            commands.push(EngineCommand::Play);
            if self.engine_rate != self.preferred_rate {
                self.engine_rate = self.preferred_rate;
                commands.push(EngineCommand::SetRate(self.preferred_rate.value()));
            }
        }
        tracing::info!(
            url = %url,
            is_live = request.is_live,
            generation = self.generation.value(),
            "loading asset"
        );
        self.last_load = Some(request);

        Effect::LoadStarted {
            generation: self.generation,
            commands,
        }
    }

    fn play(&mut self) -> Effect {
        if !self.phase.has_asset() {
            return Effect::None;
        }
        let mut commands = Vec::with_capacity(3);
        if self.phase == PlaybackPhase::Finished {
            self.record.position_secs = 0.0;
            commands.push(EngineCommand::Seek(0.0));
        }
        let rate = self.preferred_rate;
        self.record.rate = rate.value();
        if self.phase != PlaybackPhase::Loading {
            self.phase = PlaybackPhase::Playing;
        }
        commands.push(EngineCommand::Play);
        if !rate.is_normal() || self.engine_rate != rate {
            self.engine_rate = rate;
            commands.push(EngineCommand::SetRate(rate.value()));
        }
        Effect::Engine(commands)
    }

    fn pause(&mut self) -> Effect {
        if !self.phase.has_asset() {
            return Effect::None;
        }
        self.record.rate = 0.0;
        if matches!(self.phase, PlaybackPhase::Playing | PlaybackPhase::Loading) {
            self.phase = PlaybackPhase::Paused;
        }
        Effect::Engine(vec![EngineCommand::Pause])
    }

    fn seek(&mut self, target: f64) -> Effect {
        if !self.phase.has_asset() {
            return Effect::None;
        }
        let clamped = self.record.clamp_position(target);
        self.record.position_secs = clamped;
        if self.phase == PlaybackPhase::Finished {
            self.phase = PlaybackPhase::Paused;
        }
        Effect::Engine(vec![EngineCommand::Seek(clamped)])
    }

    fn set_rate(&mut self, rate: f64) -> Effect {
        let is_live = self.record.is_live;
        let accepted = PlaybackRate::from_value(rate).filter(|_| !is_live);
        let Some(accepted) = accepted else {
            tracing::debug!(rate, is_live, "playback rate rejected");
            return Effect::RateRejected { rate, is_live };
        };
        if !self.phase.has_asset() {
            return Effect::None;
        }
        self.preferred_rate = accepted;
        self.engine_rate = accepted;
        self.record.rate = accepted.value();
        if matches!(self.phase, PlaybackPhase::Paused | PlaybackPhase::Finished) {
            self.phase = PlaybackPhase::Playing;
        }
        Effect::Engine(vec![
            EngineCommand::Play,
            EngineCommand::SetRate(accepted.value()),
        ])
    }

    fn clear(&mut self) -> Effect {
        if self.phase == PlaybackPhase::Idle && self.error.is_none() && self.last_load.is_none() {
            return Effect::None;
        }
        let commands = if self.phase.has_asset() {
            vec![EngineCommand::Pause, EngineCommand::CancelPendingOperations]
        } else {
            vec![EngineCommand::CancelPendingOperations]
        };
        self.generation = self.generation.next();
        self.record = PlaybackState::default();
        self.phase = PlaybackPhase::Idle;
        self.preferred_rate = PlaybackRate::NORMAL;
        self.last_load = None;
        self.error = None;
        tracing::debug!(generation = self.generation.value(), "playback cleared");
        Effect::Cleared(commands)
    }

    fn on_engine_event(&mut self, event: EngineEvent) -> Effect {
        match event {
            EngineEvent::TimeUpdate(time) => {
                if self.record.is_buffering
                    || matches!(self.phase, PlaybackPhase::Finished | PlaybackPhase::Failed)
                {
                    return Effect::None;
                }
                self.record.position_secs = self.record.clamp_position(time);
                if self.phase == PlaybackPhase::Loading {
                    self.phase = if self.record.is_playing() {
                        PlaybackPhase::Playing
                    } else {
                        PlaybackPhase::Paused
                    };
                }
                Effect::None
            }
            EngineEvent::BufferingChanged(buffering) => {
                let was_buffering = self.record.is_buffering;
                self.record.is_buffering = buffering;
                if was_buffering && !buffering {
                    Effect::BufferingEnded
                } else {
                    Effect::None
                }
            }
            EngineEvent::DurationKnown(duration) => {
                if self.record.is_live || !duration.is_finite() || duration <= 0.0 {
                    return Effect::None;
                }
                self.record.duration_secs = duration;
                self.record.position_secs = self.record.clamp_position(self.record.position_secs);
                Effect::DurationKnown {
                    generation: self.generation,
                    duration_secs: duration,
                }
            }
            EngineEvent::DidFinishPlaying => {
                self.phase = PlaybackPhase::Finished;
                self.record.rate = 0.0;
                self.record.is_buffering = false;
                if self.record.is_duration_known() {
                    self.record.position_secs = self.record.duration_secs;
                }
                tracing::info!("playback finished");
                Effect::Finished
            }
            EngineEvent::LoadFailed(reason) => {
                tracing::warn!(reason = %reason, "engine failed to load asset");
                let failure = LoadFailure::Engine(reason);
                self.phase = PlaybackPhase::Failed;
                self.record.rate = 0.0;
                self.record.is_buffering = false;
                self.error = Some(failure.clone());
                Effect::LoadFailed(failure)
            }
        }
    }

    #[must_use]
    pub fn record(&self) -> &PlaybackState {
        &self.record
    }

    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    #[must_use]
    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    #[must_use]
    pub fn preferred_rate(&self) -> PlaybackRate {
        self.preferred_rate
    }

    #[must_use]
    pub fn error(&self) -> Option<&LoadFailure> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn last_load(&self) -> Option<&LoadRequest> {
        self.last_load.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    fn loaded(request: LoadRequest) -> State {
        let mut state = State::default();
        state.handle(Message::Load(request));
        state
    }

    fn event(state: &mut State, event: EngineEvent) -> Effect {
        let generation = state.generation();
        state.handle(Message::Engine { generation, event })
    }

    fn playing_vod(duration: f64) -> State {
        let mut state = loaded(LoadRequest::new("https://example.com/a.m3u8"));
        event(&mut state, EngineEvent::BufferingChanged(false));
        event(&mut state, EngineEvent::DurationKnown(duration));
        event(&mut state, EngineEvent::TimeUpdate(0.0));
        state
    }

    #[test]
    fn load_resets_record_and_issues_commands() {
        let mut state = State::default();
        let effect = state.handle(Message::Load(LoadRequest::live("https://example.com/live")));

        let generation = state.generation();
        assert_eq!(
            effect,
            Effect::LoadStarted {
                generation,
                commands: vec![
                    EngineCommand::Load {
                        url: "https://example.com/live".into(),
                        generation
                    },
                    EngineCommand::Play
                ]
            }
        );
        assert_eq!(state.phase(), PlaybackPhase::Loading);
        assert!(state.record().is_buffering);
        assert!(state.record().is_live);
        assert_abs_diff_eq!(state.record().position_secs, 0.0);
    }

    #[test]
    fn load_without_autoplay_only_loads() {
        let mut state = State::default();
        let request = LoadRequest {
            autoplay: false,
            ..LoadRequest::new("https://example.com/a")
        };
        let Effect::LoadStarted { commands, .. } = state.handle(Message::Load(request)) else {
            panic!("expected LoadStarted");
        };
        assert_eq!(commands.len(), 1);
        assert_abs_diff_eq!(state.record().rate, 0.0);
    }

    #[test]
    fn blank_url_changes_nothing() {
        let mut state = State::default();
        let effect = state.handle(Message::Load(LoadRequest::new("  ")));
        assert_eq!(effect, Effect::LoadRejected(LoadFailure::MissingUrl));
        assert_eq!(state.phase(), PlaybackPhase::Idle);
        assert_eq!(state.generation(), LoadGeneration::default());
    }

    #[test]
    fn ticks_while_buffering_keep_position() {
        let mut state = loaded(LoadRequest::new("https://example.com/a"));
        event(&mut state, EngineEvent::TimeUpdate(12.0));
        assert_abs_diff_eq!(state.record().position_secs, 0.0);
        assert_eq!(state.phase(), PlaybackPhase::Loading);
    }

    #[test]
    fn first_tick_moves_loading_to_playing() {
        let state = playing_vod(120.0);
        assert_eq!(state.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn ticks_are_clamped_into_duration() {
        let mut state = playing_vod(120.0);
        event(&mut state, EngineEvent::TimeUpdate(130.0));
        assert_abs_diff_eq!(state.record().position_secs, 120.0);
    }

    #[test]
    fn buffering_end_is_signalled_once() {
        let mut state = loaded(LoadRequest::new("https://example.com/a"));
        assert_eq!(
            event(&mut state, EngineEvent::BufferingChanged(false)),
            Effect::BufferingEnded
        );
        assert_eq!(
            event(&mut state, EngineEvent::BufferingChanged(false)),
            Effect::None
        );
    }

    #[test]
    fn toggle_flips_between_play_and_pause() {
        let mut state = playing_vod(60.0);
        assert_eq!(
            state.handle(Message::Toggle),
            Effect::Engine(vec![EngineCommand::Pause])
        );
        assert_eq!(state.phase(), PlaybackPhase::Paused);
        assert_eq!(
            state.handle(Message::Toggle),
            Effect::Engine(vec![EngineCommand::Play])
        );
        assert_eq!(state.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn seek_clamps_into_range() {
        let mut state = playing_vod(120.0);
        assert_eq!(
            state.handle(Message::Seek(500.0)),
            Effect::Engine(vec![EngineCommand::Seek(120.0)])
        );
        state.handle(Message::Seek(-4.0));
        assert_abs_diff_eq!(state.record().position_secs, 0.0);
    }

    #[test]
    fn seek_without_duration_is_open_ended() {
        let mut state = loaded(LoadRequest::new("https://example.com/a"));
        state.handle(Message::Seek(42.0));
        assert_abs_diff_eq!(state.record().position_secs, 42.0);
    }

    #[test]
    fn skip_moves_by_step_and_is_ignored_on_live() {
        let mut state = playing_vod(120.0);
        state.handle(Message::Skip(SkipDirection::Forward));
        assert_abs_diff_eq!(state.record().position_secs, 10.0);
        state.handle(Message::Skip(SkipDirection::Backward));
        state.handle(Message::Skip(SkipDirection::Backward));
        assert_abs_diff_eq!(state.record().position_secs, 0.0);

        let mut live = loaded(LoadRequest::live("https://example.com/live"));
        assert_eq!(live.handle(Message::Skip(SkipDirection::Forward)), Effect::None);
    }

    #[test]
    fn custom_skip_step_is_used() {
        let mut state = State::new(SkipStep::new(15.0));
        state.handle(Message::Load(LoadRequest::new("https://example.com/a")));
        state.handle(Message::Skip(SkipDirection::Forward));
        assert_abs_diff_eq!(state.record().position_secs, 15.0);
    }

    #[test]
    fn set_rate_accepts_presets_and_resumes() {
        let mut state = playing_vod(60.0);
        state.handle(Message::Pause);
        assert_eq!(
            state.handle(Message::SetRate(2.0)),
            Effect::Engine(vec![EngineCommand::Play, EngineCommand::SetRate(2.0)])
        );
        assert_eq!(state.phase(), PlaybackPhase::Playing);
        assert_abs_diff_eq!(state.record().rate, 2.0);

        state.handle(Message::Pause);
        assert_eq!(
            state.handle(Message::Play),
            Effect::Engine(vec![EngineCommand::Play, EngineCommand::SetRate(2.0)])
        );
    }

    #[test]
    fn set_rate_rejects_live_and_unknown_speeds() {
        let mut live = loaded(LoadRequest::live("https://example.com/live"));
        assert_eq!(
            live.handle(Message::SetRate(2.0)),
            Effect::RateRejected {
                rate: 2.0,
                is_live: true
            }
        );
        assert_abs_diff_eq!(live.record().rate, 1.0);

        let mut vod = playing_vod(60.0);
        assert!(matches!(
            vod.handle(Message::SetRate(3.0)),
            Effect::RateRejected { is_live: false, .. }
        ));
    }

    #[test]
    fn new_load_resets_preferred_rate() {
        let mut state = playing_vod(60.0);
        state.handle(Message::SetRate(4.0));
        state.handle(Message::Load(LoadRequest::new("https://example.com/b")));
        assert!(state.preferred_rate().is_normal());
    }

    #[test]
    fn load_after_fast_speed_restores_engine_rate() {
        let mut state = playing_vod(60.0);
        state.handle(Message::SetRate(2.0));
        let effect = state.handle(Message::Load(LoadRequest::new("https://example.com/b")));
        let Effect::LoadStarted { commands, .. } = effect else {
            panic!("expected LoadStarted, got {effect:?}");
        };
        assert_eq!(commands[1..], [EngineCommand::Play, EngineCommand::SetRate(1.0)]);
        assert_abs_diff_eq!(state.record().rate, 1.0);

        let effect = state.handle(Message::Load(LoadRequest::new("https://example.com/c")));
        let Effect::LoadStarted { commands, .. } = effect else {
            panic!("expected LoadStarted, got {effect:?}");
        };
        assert_eq!(commands[1..], [EngineCommand::Play]);
    }

    #[test]
    fn paused_load_defers_rate_reset_to_play() {
        let mut state = playing_vod(60.0);
        state.handle(Message::SetRate(4.0));
        let mut request = LoadRequest::new("https://example.com/b");
        request.autoplay = false;
        state.handle(Message::Load(request));
        assert_eq!(
            state.handle(Message::Play),
            Effect::Engine(vec![EngineCommand::Play, EngineCommand::SetRate(1.0)])
        );
    }

    #[test]
    fn duration_is_ignored_for_live() {
        let mut live = loaded(LoadRequest::live("https://example.com/live"));
        assert_eq!(event(&mut live, EngineEvent::DurationKnown(90.0)), Effect::None);
        assert_abs_diff_eq!(live.record().duration_secs, 0.0);
    }

    #[test]
    fn finish_then_play_restarts_from_zero() {
        let mut state = playing_vod(60.0);
        assert_eq!(event(&mut state, EngineEvent::DidFinishPlaying), Effect::Finished);
        assert_eq!(state.phase(), PlaybackPhase::Finished);
        assert_abs_diff_eq!(state.record().position_secs, 60.0);

        assert_eq!(
            state.handle(Message::Play),
            Effect::Engine(vec![EngineCommand::Seek(0.0), EngineCommand::Play])
        );
        assert_eq!(state.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn load_failure_then_retry() {
        let mut state = loaded(LoadRequest::new("https://example.com/a"));
        let effect = event(&mut state, EngineEvent::LoadFailed("404".into()));
        assert_eq!(effect, Effect::LoadFailed(LoadFailure::Engine("404".into())));
        assert_eq!(state.phase(), PlaybackPhase::Failed);
        assert!(state.error().is_some());

        let before = state.generation();
        assert!(matches!(
            state.handle(Message::Retry),
            Effect::LoadStarted { .. }
        ));
        assert!(state.generation() > before);
        assert!(state.error().is_none());
    }

    #[test]
    fn retry_without_previous_load_is_noop() {
        let mut state = State::default();
        assert_eq!(state.handle(Message::Retry), Effect::None);
    }

    #[test]
    fn stale_events_are_dropped() {
        let mut state = playing_vod(60.0);
        let old = state.generation();
        state.handle(Message::Load(LoadRequest::new("https://example.com/b")));
        let effect = state.handle(Message::Engine {
            generation: old,
            event: EngineEvent::DidFinishPlaying,
        });
        assert_eq!(effect, Effect::Stale { generation: old });
        assert_eq!(state.phase(), PlaybackPhase::Loading);
    }

    #[test]
    fn force_pause_zeroes_rate() {
        let mut state = playing_vod(60.0);
        assert_eq!(
            state.handle(Message::ForcePause),
            Effect::Engine(vec![EngineCommand::Pause])
        );
        assert_abs_diff_eq!(state.record().rate, 0.0);
        assert_eq!(state.phase(), PlaybackPhase::Paused);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut state = playing_vod(60.0);
        assert_eq!(
            state.handle(Message::Clear),
            Effect::Cleared(vec![
                EngineCommand::Pause,
                EngineCommand::CancelPendingOperations
            ])
        );
        let generation = state.generation();
        assert_eq!(state.handle(Message::Clear), Effect::None);
        assert_eq!(state.generation(), generation);
        assert_eq!(state.phase(), PlaybackPhase::Idle);
        assert_eq!(*state.record(), PlaybackState::default());
    }

    #[test]
    fn commands_without_asset_are_ignored() {
        let mut state = State::default();
        assert_eq!(state.handle(Message::Play), Effect::None);
        assert_eq!(state.handle(Message::Seek(3.0)), Effect::None);
        assert_eq!(state.handle(Message::ForcePause), Effect::None);
    }
}
