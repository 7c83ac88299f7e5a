// SPDX-License-Identifier: MPL-2.0
use playscreen::domain::{DeviceOrientation, FinishPolicy, LoadRequest, PlaybackPhase};
use playscreen::engine::simulated::{
    RecordingEngine, ScriptedMenu, SimulatedAsset, SimulatedEngine, StaticThumbnails,
};
use playscreen::engine::{EngineCommand, EngineEvent, MenuChoice};
use playscreen::runtime::{ScreenHandle, ScreenRuntime, ViewIntent};
use playscreen::screen::{
    Lifecycle, Message, PlayPauseIcon, PlayerScreen, PreviewAnimation, ScreenConfig,
};
use std::sync::Arc;
use std::time::Duration;

const VOD: &str = "https://example.com/vod/master.m3u8";

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn vod_config(finish_policy: FinishPolicy) -> ScreenConfig {
    ScreenConfig {
        primary: Some(LoadRequest::new(VOD)),
        finish_policy,
        ..ScreenConfig::default()
    }
}

async fn wait_for_phase(handle: &ScreenHandle, phase: PlaybackPhase) {
    let mut snapshots = handle.snapshots();
    while snapshots.borrow_and_update().phase != phase {
        snapshots
            .changed()
            .await
            .expect("screen loop stopped early");
    }
}

#[tokio::test(start_paused = true)]
async fn simulated_asset_plays_to_the_end() {
    let thumbnails = Arc::new(StaticThumbnails::new().failing_at(1.0));
    let engine = SimulatedEngine::new(SimulatedAsset {
        duration_secs: 2.0,
        ..SimulatedAsset::default()
    });
    let (runtime, handle, _intents) = ScreenRuntime::new(
        PlayerScreen::new(vod_config(FinishPolicy::Stop)),
        engine,
        thumbnails.clone(),
        Arc::new(ScriptedMenu::default()),
    );
    let task = runtime.spawn();

    handle
        .send(Message::ScreenDidAppear(DeviceOrientation::Portrait))
        .unwrap();
    wait_for_phase(&handle, PlaybackPhase::Finished).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.position_text, "00:02");
    assert_eq!(snapshot.duration_text, "00:02");

    handle.send(Message::ScreenWillDisappear).unwrap();
    handle.shutdown().unwrap();
    let screen = task.await.unwrap();

    assert_eq!(screen.lifecycle(), Lifecycle::TornDown);
    assert_eq!(thumbnails.requested().len(), 99);
    assert_eq!(screen.diagnostics().counters().dropped_thumbnails, 1);
}

#[tokio::test(start_paused = true)]
async fn thumbnails_fill_the_cache_for_scrubbing() {
    let (engine, probe) = RecordingEngine::new();
    let (runtime, handle, mut intents) = ScreenRuntime::new(
        PlayerScreen::new(vod_config(FinishPolicy::Stop)),
        engine,
        Arc::new(StaticThumbnails::new()),
        Arc::new(ScriptedMenu::default()),
    );
    let task = runtime.spawn();

    handle
        .send(Message::ScreenDidAppear(DeviceOrientation::Portrait))
        .unwrap();
    settle().await;
    probe.emit(EngineEvent::BufferingChanged(false));
    probe.emit(EngineEvent::DurationKnown(100.0));
    settle().await;

    handle.send(Message::ScrubBegan).unwrap();
    handle.send(Message::ScrubMoved(0.5)).unwrap();
    settle().await;

    let snapshot = handle.snapshot();
    assert!(snapshot.scrub_preview.visible);
    assert_eq!(
        snapshot.scrub_preview.image,
        Some(StaticThumbnails::frame_for(50.0))
    );
    assert_eq!(
        intents.recv().await,
        Some(ViewIntent::PreviewAnimation(PreviewAnimation::Show))
    );
    assert!(probe.commands().ends_with(&[EngineCommand::Seek(50.0)]));

    handle.send(Message::ScrubEnded).unwrap();
    settle().await;
    assert!(!handle.snapshot().scrub_preview.visible);

    drop(handle);
    let screen = task.await.unwrap();
    assert_eq!(screen.scrub().cache().len(), 99);
}

#[tokio::test(start_paused = true)]
async fn quality_choice_caps_the_engine_bit_rate() {
    let (engine, probe) = RecordingEngine::new();
    let menu = ScriptedMenu::new([MenuChoice::Selected(1), MenuChoice::Selected(3)]);
    let (runtime, handle, _intents) = ScreenRuntime::new(
        PlayerScreen::new(vod_config(FinishPolicy::Stop)),
        engine,
        Arc::new(StaticThumbnails::new()),
        Arc::new(menu),
    );
    let _task = runtime.spawn();

    handle
        .send(Message::ScreenDidAppear(DeviceOrientation::Portrait))
        .unwrap();
    handle.send(Message::OpenSettings).unwrap();
    settle().await;

    assert_eq!(
        probe.commands().last(),
        Some(&EngineCommand::SetPreferredPeakBitRate(Some(2_500_000)))
    );
}

#[tokio::test(start_paused = true)]
async fn returning_from_background_pauses_the_engine() {
    let (engine, probe) = RecordingEngine::new();
    let (runtime, handle, _intents) = ScreenRuntime::new(
        PlayerScreen::new(vod_config(FinishPolicy::Stop)),
        engine,
        Arc::new(StaticThumbnails::new()),
        Arc::new(ScriptedMenu::default()),
    );
    let _task = runtime.spawn();

    handle
        .send(Message::ScreenDidAppear(DeviceOrientation::Portrait))
        .unwrap();
    settle().await;
    probe.take_commands();

    handle.send(Message::AppDidEnterBackground).unwrap();
    handle.send(Message::AppDidBecomeActive).unwrap();
    settle().await;

    assert_eq!(probe.commands(), vec![EngineCommand::Pause]);
    assert_eq!(handle.snapshot().play_pause_icon, PlayPauseIcon::Play);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_the_loop() {
    let (engine, probe) = RecordingEngine::new();
    let (runtime, handle, _intents) = ScreenRuntime::new(
        PlayerScreen::new(vod_config(FinishPolicy::Stop)),
        engine,
        Arc::new(StaticThumbnails::new()),
        Arc::new(ScriptedMenu::default()),
    );
    let task = runtime.spawn();
    handle
        .send(Message::ScreenDidAppear(DeviceOrientation::Portrait))
        .unwrap();
    settle().await;

    drop(handle);
    let screen = task.await.unwrap();
    assert!(probe.is_detached());
    assert!(!probe.emit(EngineEvent::TimeUpdate(1.0)));
    assert_eq!(screen.lifecycle(), Lifecycle::Visible);
}

#[tokio::test(start_paused = true)]
async fn new_load_plays_at_normal_speed_after_fast_forward() {
    let engine = SimulatedEngine::new(SimulatedAsset {
        duration_secs: 100.0,
        ..SimulatedAsset::default()
    });
    let (runtime, handle, _intents) = ScreenRuntime::new(
        PlayerScreen::new(vod_config(FinishPolicy::Stop)),
        engine,
        Arc::new(StaticThumbnails::new()),
        Arc::new(ScriptedMenu::default()),
    );
    let _task = runtime.spawn();

    handle
        .send(Message::ScreenDidAppear(DeviceOrientation::Portrait))
        .unwrap();
    wait_for_phase(&handle, PlaybackPhase::Playing).await;
    handle.send(Message::SetRate(2.0)).unwrap();
    settle().await;

    handle
        .send(Message::Load(LoadRequest::new("sim://second")))
        .unwrap();
    settle().await;
    wait_for_phase(&handle, PlaybackPhase::Playing).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.play_pause_icon, PlayPauseIcon::Pause);
    assert!(
        snapshot.position_secs <= 2.5,
        "second asset advanced at {}s after 2s",
        snapshot.position_secs
    );
}
