// SPDX-License-Identifier: MPL-2.0
//! In-process stand-ins for the external collaborators.
//!
//! [`SimulatedEngine`] plays a virtual asset on the tokio clock and powers
//! the demo binary. The other types record or script their side of the
//! boundary for tests.

use super::{
    EngineCommand, EngineEvent, EngineEventSink, ImageHandle, MenuChoice, MenuPresenter,
    PlaybackEngine, ThumbnailSource,
};
use crate::domain::time_units::secs_to_micros;
use crate::domain::LoadGeneration;
use crate::error::ThumbnailError;
use futures_util::future::{self, BoxFuture, FutureExt};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Locks a mutex, recovering the data if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// SimulatedEngine
// =============================================================================

/// Virtual asset played by [`SimulatedEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedAsset {
    /// Reported duration; ignored for live assets.
    pub duration_secs: f64,
    /// Live assets never finish and never report a duration.
    pub is_live: bool,
    /// Initial stall before the first time update.
    pub startup_delay: Duration,
    /// Interval between time updates.
    pub tick: Duration,
}

impl Default for SimulatedAsset {
    fn default() -> Self {
        Self {
            duration_secs: 30.0,
            is_live: false,
            startup_delay: Duration::from_millis(400),
            tick: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Default)]
struct Transport {
    position_secs: f64,
    rate: f64,
    playing: bool,
}

/// Engine that advances a virtual clock in a tokio task.
///
/// Must be driven from inside a tokio runtime.
#[derive(Debug)]
pub struct SimulatedEngine {
    asset: SimulatedAsset,
    transport: Arc<Mutex<Transport>>,
    task: Option<JoinHandle<()>>,
}

impl SimulatedEngine {
    #[must_use]
    pub fn new(asset: SimulatedAsset) -> Self {
        Self {
            asset,
            transport: Arc::new(Mutex::new(Transport {
                rate: 1.0,
                ..Transport::default()
            })),
            task: None,
        }
    }

    fn stop_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_asset(asset: SimulatedAsset, transport: Arc<Mutex<Transport>>, sink: EngineEventSink) {
    if !sink.emit(EngineEvent::BufferingChanged(true)) {
        return;
    }
    tokio::time::sleep(asset.startup_delay).await;
    if !asset.is_live && !sink.emit(EngineEvent::DurationKnown(asset.duration_secs)) {
        return;
    }
    if !sink.emit(EngineEvent::BufferingChanged(false)) {
        return;
    }

    let mut ticker = tokio::time::interval(asset.tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let (position, finished) = {
            let mut transport = lock(&transport);
            if transport.playing {
                transport.position_secs += asset.tick.as_secs_f64() * transport.rate;
            }
            let finished = !asset.is_live && transport.position_secs >= asset.duration_secs;
            if finished {
                transport.position_secs = asset.duration_secs;
                transport.playing = false;
            }
            (transport.position_secs, finished)
        };
        if !sink.emit(EngineEvent::TimeUpdate(position)) {
            return;
        }
        if finished {
            sink.emit(EngineEvent::DidFinishPlaying);
            return;
        }
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn load(&mut self, url: &str, events: EngineEventSink) {
        self.stop_task();
        {
            let mut transport = lock(&self.transport);
            transport.position_secs = 0.0;
            transport.playing = false;
        }
        tracing::debug!(url, generation = events.generation().value(), "simulated load");
        let asset = self.asset;
        let transport = Arc::clone(&self.transport);
        self.task = Some(tokio::spawn(run_asset(asset, transport, events)));
    }

    fn play(&mut self) {
        lock(&self.transport).playing = true;
    }

    fn pause(&mut self) {
        lock(&self.transport).playing = false;
    }

    fn seek(&mut self, position_secs: f64) {
        let mut transport = lock(&self.transport);
        transport.position_secs = if self.asset.is_live {
            position_secs.max(0.0)
        } else {
            position_secs.clamp(0.0, self.asset.duration_secs)
        };
    }

    fn set_rate(&mut self, rate: f64) {
        let mut transport = lock(&self.transport);
        if rate > 0.0 {
            transport.rate = rate;
            transport.playing = true;
        } else {
            transport.playing = false;
        }
    }

    fn set_preferred_peak_bit_rate(&mut self, bits_per_second: Option<u64>) {
        tracing::debug!(?bits_per_second, "simulated bit rate cap");
    }

    fn cancel_pending_operations(&mut self) {}

    fn detach(&mut self) {
        self.stop_task();
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.stop_task();
    }
}

// =============================================================================
// RecordingEngine
// =============================================================================

#[derive(Debug, Default)]
struct Recording {
    commands: Vec<EngineCommand>,
    sink: Option<EngineEventSink>,
    detached: bool,
}

/// Engine that only records what it is told.
///
/// The paired [`EngineProbe`] inspects the recording and emits events
/// through the sink of the most recent load.
#[derive(Debug)]
pub struct RecordingEngine {
    recording: Arc<Mutex<Recording>>,
}

/// Test-side handle of a [`RecordingEngine`].
#[derive(Debug, Clone)]
pub struct EngineProbe {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingEngine {
    #[must_use]
    pub fn new() -> (Self, EngineProbe) {
        let recording = Arc::new(Mutex::new(Recording::default()));
        (
            Self {
                recording: Arc::clone(&recording),
            },
            EngineProbe { recording },
        )
    }

    fn record(&self, command: EngineCommand) {
        lock(&self.recording).commands.push(command);
    }
}

impl PlaybackEngine for RecordingEngine {
    fn load(&mut self, url: &str, events: EngineEventSink) {
        let mut recording = lock(&self.recording);
        recording.commands.push(EngineCommand::Load {
            url: url.to_string(),
            generation: events.generation(),
        });
        recording.sink = Some(events);
        recording.detached = false;
    }

    fn play(&mut self) {
        self.record(EngineCommand::Play);
    }

    fn pause(&mut self) {
        self.record(EngineCommand::Pause);
    }

    fn seek(&mut self, position_secs: f64) {
        self.record(EngineCommand::Seek(position_secs));
    }

    fn set_rate(&mut self, rate: f64) {
        self.record(EngineCommand::SetRate(rate));
    }

    fn set_preferred_peak_bit_rate(&mut self, bits_per_second: Option<u64>) {
        self.record(EngineCommand::SetPreferredPeakBitRate(bits_per_second));
    }

    fn cancel_pending_operations(&mut self) {
        self.record(EngineCommand::CancelPendingOperations);
    }

    fn detach(&mut self) {
        lock(&self.recording).detached = true;
    }
}

impl EngineProbe {
    /// Every command received so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<EngineCommand> {
        lock(&self.recording).commands.clone()
    }

    /// Removes and returns the recorded commands.
    pub fn take_commands(&self) -> Vec<EngineCommand> {
        std::mem::take(&mut lock(&self.recording).commands)
    }

    /// Generation of the most recent load.
    #[must_use]
    pub fn generation(&self) -> Option<LoadGeneration> {
        lock(&self.recording).sink.as_ref().map(EngineEventSink::generation)
    }

    /// Emits through the most recent load's sink, even after detach.
    ///
    /// Returns `false` when nothing was loaded or the receiver is gone.
    pub fn emit(&self, event: EngineEvent) -> bool {
        let sink = lock(&self.recording).sink.clone();
        sink.is_some_and(|sink| sink.emit(event))
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        lock(&self.recording).detached
    }
}

// =============================================================================
// StaticThumbnails
// =============================================================================

/// Thumbnail source that answers immediately with a solid frame.
///
/// Selected timestamps can be made to fail.
#[derive(Debug, Default)]
pub struct StaticThumbnails {
    failing: HashSet<i64>,
    requested: Mutex<Vec<f64>>,
}

impl StaticThumbnails {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes requests at `secs` fail with [`ThumbnailError::NoFrame`].
    #[must_use]
    pub fn failing_at(mut self, secs: f64) -> Self {
        self.failing.insert(secs_to_micros(secs));
        self
    }

    /// Timestamps requested so far.
    #[must_use]
    pub fn requested(&self) -> Vec<f64> {
        lock(&self.requested).clone()
    }

    /// The frame produced for `secs`.
    #[must_use]
    pub fn frame_for(secs: f64) -> ImageHandle {
        let shade = (secs.max(0.0) as u64 % 256) as u8;
        ImageHandle::solid(2, 2, [shade, shade, shade, 255])
    }
}

impl ThumbnailSource for StaticThumbnails {
    fn request_frame(&self, near_secs: f64) -> BoxFuture<'static, Result<ImageHandle, ThumbnailError>> {
        lock(&self.requested).push(near_secs);
        let result = if self.failing.contains(&secs_to_micros(near_secs)) {
            Err(ThumbnailError::NoFrame(near_secs))
        } else {
            Ok(Self::frame_for(near_secs))
        };
        future::ready(result).boxed()
    }
}

// =============================================================================
// ScriptedMenu
// =============================================================================

/// Menu presenter that answers from a script, then cancels.
#[derive(Debug, Default)]
pub struct ScriptedMenu {
    answers: Mutex<VecDeque<MenuChoice>>,
    presented: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedMenu {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = MenuChoice>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            presented: Mutex::new(Vec::new()),
        }
    }

    /// Titles and options of every presented menu.
    #[must_use]
    pub fn presented(&self) -> Vec<(String, Vec<String>)> {
        lock(&self.presented).clone()
    }
}

impl MenuPresenter for ScriptedMenu {
    fn present_choice(&self, title: &str, options: &[String]) -> BoxFuture<'static, MenuChoice> {
        lock(&self.presented).push((title.to_string(), options.to_vec()));
        let answer = lock(&self.answers)
            .pop_front()
            .unwrap_or(MenuChoice::Cancelled);
        future::ready(answer).boxed()
    }
}
