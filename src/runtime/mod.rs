// SPDX-License-Identifier: MPL-2.0
//! Async shell around [`PlayerScreen`].
//!
//! One task owns the screen and drains a single mailbox. Engine events,
//! timer fires, thumbnail completions, menu answers and view input all
//! arrive there as [`Message`]s and are applied in arrival order. The loop
//! executes the returned [`Command`]s and publishes each snapshot on a
//! `watch` channel.
//!
//! Background tasks only hold weak senders: once every [`ScreenHandle`] is
//! dropped the loop ends, detaches the engine and returns the screen.

use crate::config::THUMBNAIL_REQUEST_CONCURRENCY;
use crate::domain::{DeviceOrientation, LoadGeneration};
use crate::engine::{
    EngineCommand, EngineEventSink, MenuPresenter, PlaybackEngine, ThumbnailSource,
};
use crate::error::{Error, Result};
use crate::screen::{Command, Message, PlayerScreen, PreviewAnimation, RenderSnapshot, Update};
use futures_util::{future, stream, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle};

/// Requests the runtime forwards to the host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewIntent {
    ForceDeviceOrientation(DeviceOrientation),
    PreviewAnimation(PreviewAnimation),
}

#[derive(Debug)]
enum Envelope {
    Screen(Message),
    Shutdown,
}

type Mailbox = mpsc::WeakUnboundedSender<Envelope>;

fn deliver(mailbox: &Mailbox, message: Message) -> bool {
    mailbox
        .upgrade()
        .is_some_and(|tx| tx.send(Envelope::Screen(message)).is_ok())
}

/// Cloneable handle used by the view and the host app.
#[derive(Debug, Clone)]
pub struct ScreenHandle {
    tx: mpsc::UnboundedSender<Envelope>,
    snapshots: watch::Receiver<RenderSnapshot>,
}

impl ScreenHandle {
    /// Queues a message for the screen.
    pub fn send(&self, message: Message) -> Result<()> {
        self.tx
            .send(Envelope::Screen(message))
            .map_err(|_| Error::Runtime("player screen loop has stopped".to_string()))
    }

    /// Stops the loop after the messages already queued.
    pub fn shutdown(&self) -> Result<()> {
        self.tx
            .send(Envelope::Shutdown)
            .map_err(|_| Error::Runtime("player screen loop has stopped".to_string()))
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<RenderSnapshot> {
        self.snapshots.clone()
    }
}

/// Owns a [`PlayerScreen`] and its collaborators.
pub struct ScreenRuntime<E: PlaybackEngine> {
    screen: PlayerScreen,
    engine: E,
    thumbnails: Arc<dyn ThumbnailSource>,
    menus: Arc<dyn MenuPresenter>,
    mailbox: Mailbox,
    rx: mpsc::UnboundedReceiver<Envelope>,
    snapshots: watch::Sender<RenderSnapshot>,
    intents: mpsc::UnboundedSender<ViewIntent>,
    auto_hide: Option<AbortHandle>,
    population: Option<AbortHandle>,
}

impl<E: PlaybackEngine> std::fmt::Debug for ScreenRuntime<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenRuntime")
            .field("engine_type", &std::any::type_name::<E>())
            .field("lifecycle", &self.screen.lifecycle())
            .field("auto_hide_pending", &self.auto_hide.is_some())
            .field("population_running", &self.population.is_some())
            .finish_non_exhaustive()
    }
}

impl<E: PlaybackEngine + 'static> ScreenRuntime<E> {
    /// Builds the runtime, the handle to drive it and the receiver of view
    /// intents.
    pub fn new(
        screen: PlayerScreen,
        engine: E,
        thumbnails: Arc<dyn ThumbnailSource>,
        menus: Arc<dyn MenuPresenter>,
    ) -> (Self, ScreenHandle, mpsc::UnboundedReceiver<ViewIntent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(screen.snapshot());
        let (intents, intent_rx) = mpsc::unbounded_channel();
        let runtime = Self {
            screen,
            engine,
            thumbnails,
            menus,
            mailbox: tx.downgrade(),
            rx,
            snapshots,
            intents,
            auto_hide: None,
            population: None,
        };
        let handle = ScreenHandle {
            tx,
            snapshots: snapshot_rx,
        };
        (runtime, handle, intent_rx)
    }

    /// Runs the loop on a new task.
    pub fn spawn(self) -> JoinHandle<PlayerScreen> {
        tokio::spawn(self.run())
    }

    /// Drains the mailbox until shutdown or until every handle is gone.
    pub async fn run(mut self) -> PlayerScreen {
        tracing::debug!("player screen loop started");
        while let Some(envelope) = self.rx.recv().await {
            match envelope {
                Envelope::Screen(message) => self.step(message),
                Envelope::Shutdown => break,
            }
        }
        self.release();
        tracing::debug!("player screen loop stopped");
        self.screen
    }

    fn step(&mut self, message: Message) {
        let now = tokio::time::Instant::now().into_std();
        let Update { effects, snapshot } = self.screen.handle(message, now);
        for command in effects {
            self.execute(command);
        }
        self.snapshots.send_replace(snapshot);
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Engine(EngineCommand::Load { url, generation }) => {
                let sink = self.engine_sink(generation);
                self.engine.load(&url, sink);
            }
            Command::Engine(command) => self.engine.apply(&command),
            Command::ScheduleAutoHide { token, delay } => {
                self.cancel_auto_hide();
                let mailbox = self.mailbox.clone();
                let task = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    deliver(&mailbox, Message::AutoHideFired(token));
                });
                self.auto_hide = Some(task.abort_handle());
            }
            Command::CancelAutoHide => self.cancel_auto_hide(),
            Command::RequestThumbnails {
                generation,
                timestamps,
            } => {
                self.cancel_population();
                let task = tokio::spawn(populate(
                    Arc::clone(&self.thumbnails),
                    self.mailbox.clone(),
                    generation,
                    timestamps,
                ));
                self.population = Some(task.abort_handle());
            }
            Command::CancelThumbnails => self.cancel_population(),
            Command::PresentMenu {
                request,
                title,
                options,
            } => {
                let answer = self.menus.present_choice(title, &options);
                let mailbox = self.mailbox.clone();
                tokio::spawn(async move {
                    let choice = answer.await;
                    deliver(&mailbox, Message::MenuAnswered { request, choice });
                });
            }
            Command::ForceDeviceOrientation(orientation) => {
                self.notify_view(ViewIntent::ForceDeviceOrientation(orientation));
            }
            Command::PreviewAnimation(animation) => {
                self.notify_view(ViewIntent::PreviewAnimation(animation));
            }
            Command::Unsubscribe => self.release(),
        }
    }

    fn engine_sink(&self, generation: LoadGeneration) -> EngineEventSink {
        let mailbox = self.mailbox.clone();
        EngineEventSink::new(generation, move |generation, event| {
            deliver(&mailbox, Message::Engine { generation, event })
        })
    }

    fn notify_view(&self, intent: ViewIntent) {
        if self.intents.send(intent).is_err() {
            tracing::trace!(?intent, "view intent dropped, no receiver");
        }
    }

    fn cancel_auto_hide(&mut self) {
        if let Some(task) = self.auto_hide.take() {
            task.abort();
        }
    }

    fn cancel_population(&mut self) {
        if let Some(task) = self.population.take() {
            task.abort();
        }
    }

    fn release(&mut self) {
        self.cancel_auto_hide();
        self.cancel_population();
        self.engine.detach();
    }
}

/// Decodes every sampled frame, a few at a time, and reports each result.
async fn populate(
    source: Arc<dyn ThumbnailSource>,
    mailbox: Mailbox,
    generation: LoadGeneration,
    timestamps: Vec<f64>,
) {
    stream::iter(timestamps)
        .map(|time_secs| {
            let frame = source.request_frame(time_secs);
            async move { (time_secs, frame.await) }
        })
        .buffer_unordered(THUMBNAIL_REQUEST_CONCURRENCY)
        .for_each(|(time_secs, result)| {
            let message = match result {
                Ok(image) => Message::ThumbnailReady {
                    generation,
                    time_secs,
                    image,
                },
                Err(err) => {
                    tracing::debug!(error = %err, "thumbnail dropped");
                    Message::ThumbnailFailed {
                        generation,
                        time_secs,
                    }
                }
            };
            deliver(&mailbox, message);
            future::ready(())
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoadRequest;
    use crate::engine::simulated::{RecordingEngine, ScriptedMenu, StaticThumbnails};
    use crate::engine::{EngineEvent, MenuChoice};
    use crate::screen::ScreenConfig;
    use std::time::Duration;

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn start(
        menu: ScriptedMenu,
    ) -> (
        ScreenHandle,
        crate::engine::simulated::EngineProbe,
        JoinHandle<PlayerScreen>,
        mpsc::UnboundedReceiver<ViewIntent>,
    ) {
        let (engine, probe) = RecordingEngine::new();
        let (runtime, handle, intents) = ScreenRuntime::new(
            PlayerScreen::new(ScreenConfig::default()),
            engine,
            Arc::new(StaticThumbnails::new()),
            Arc::new(menu),
        );
        (handle, probe, runtime.spawn(), intents)
    }

    #[tokio::test(start_paused = true)]
    async fn auto_hide_is_timed_from_last_interaction() {
        let (handle, _probe, task, _intents) = start(ScriptedMenu::default());
        let origin = tokio::time::Instant::now();

        handle.send(Message::TapPlayer).unwrap();
        tokio::time::sleep_until(origin + Duration::from_secs(3)).await;
        handle.send(Message::PlayPauseTapped).unwrap();

        tokio::time::sleep_until(origin + Duration::from_millis(7_900)).await;
        assert!(handle.snapshot().controls_visible);
        tokio::time::sleep_until(origin + Duration::from_millis(8_100)).await;
        assert!(!handle.snapshot().controls_visible);

        drop(handle);
        let screen = task.await.unwrap();
        assert_eq!(screen.diagnostics().counters().stale_callbacks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn engine_events_flow_back_into_snapshots() {
        let (handle, probe, _task, _intents) = start(ScriptedMenu::default());
        handle
            .send(Message::Load(LoadRequest::new("https://example.com/a.m3u8")))
            .unwrap();
        settle().await;
        assert!(probe.emit(EngineEvent::BufferingChanged(false)));
        assert!(probe.emit(EngineEvent::DurationKnown(120.0)));
        assert!(probe.emit(EngineEvent::TimeUpdate(30.0)));
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.position_text, "00:30");
        assert_eq!(snapshot.duration_text, "02:00");
        assert!(snapshot.controls_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_detaches_engine_and_ignores_late_events() {
        let (handle, probe, task, _intents) = start(ScriptedMenu::default());
        handle
            .send(Message::Load(LoadRequest::new("https://example.com/a.m3u8")))
            .unwrap();
        settle().await;
        handle.send(Message::ScreenWillDisappear).unwrap();
        settle().await;
        assert!(probe.is_detached());
        let frozen = handle.snapshot();

        probe.emit(EngineEvent::TimeUpdate(42.0));
        settle().await;
        assert_eq!(handle.snapshot(), frozen);

        handle.shutdown().unwrap();
        let screen = task.await.unwrap();
        assert_eq!(screen.diagnostics().counters().stale_callbacks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_menu_answers_reach_the_engine() {
        let menu = ScriptedMenu::new([MenuChoice::Selected(0), MenuChoice::Selected(2)]);
        let (handle, probe, _task, _intents) = start(menu);
        handle
            .send(Message::Load(LoadRequest::new("https://example.com/a.m3u8")))
            .unwrap();
        handle.send(Message::OpenSettings).unwrap();
        settle().await;

        let commands = probe.commands();
        assert!(commands.ends_with(&[EngineCommand::Play, EngineCommand::SetRate(2.0)]));
    }

    #[tokio::test(start_paused = true)]
    async fn upside_down_is_forwarded_to_the_view() {
        let (handle, _probe, _task, mut intents) = start(ScriptedMenu::default());
        handle
            .send(Message::OrientationChanged(DeviceOrientation::PortraitUpsideDown))
            .unwrap();
        assert_eq!(
            intents.recv().await,
            Some(ViewIntent::ForceDeviceOrientation(DeviceOrientation::Portrait))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn send_fails_once_the_loop_stopped() {
        let (handle, _probe, task, _intents) = start(ScriptedMenu::default());
        handle.shutdown().unwrap();
        task.await.unwrap();
        assert!(matches!(handle.send(Message::Play), Err(Error::Runtime(_))));
    }
}
