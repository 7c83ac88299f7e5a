// SPDX-License-Identifier: MPL-2.0
use playscreen::config;
use playscreen::domain::{DeviceOrientation, FinishPolicy, PlaybackPhase};
use playscreen::engine::simulated::{ScriptedMenu, SimulatedAsset, SimulatedEngine, StaticThumbnails};
use playscreen::error::{Error, Result};
use playscreen::runtime::ScreenRuntime;
use playscreen::screen::{Message, PlayerScreen, ScreenConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DEMO_DURATION_SECS: f64 = 12.0;
const DEMO_URL: &str = "sim://demo";

fn cli_error(err: pico_args::Error) -> Error {
    Error::Config(err.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = pico_args::Arguments::from_env();
    let live = args.contains("--live");
    let config_path: Option<PathBuf> = args.opt_value_from_str("--config").map_err(cli_error)?;
    let duration_secs: f64 = args
        .opt_value_from_str("--duration")
        .map_err(cli_error)?
        .unwrap_or(DEFAULT_DEMO_DURATION_SECS);
    let url = args
        .finish()
        .into_iter()
        .next()
        .and_then(|s| s.into_string().ok());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,playscreen=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match config_path {
        Some(path) => config::load_from_path(&path)?,
        None => config::load()?,
    };
    if url.is_some() || config.primary_url.is_none() {
        config.primary_url = Some(url.unwrap_or_else(|| DEMO_URL.to_string()));
        config.primary_is_live = live;
    }
    // A replay would never let the demo reach its end.
    config.finish_policy = FinishPolicy::Stop;

    let engine = SimulatedEngine::new(SimulatedAsset {
        duration_secs,
        is_live: config.primary_is_live,
        ..SimulatedAsset::default()
    });
    let (runtime, handle, mut intents) = ScreenRuntime::new(
        PlayerScreen::new(ScreenConfig::from_config(&config)),
        engine,
        Arc::new(StaticThumbnails::new()),
        Arc::new(ScriptedMenu::default()),
    );
    let task = runtime.spawn();
    tokio::spawn(async move {
        while let Some(intent) = intents.recv().await {
            info!(?intent, "view intent");
        }
    });

    handle.send(Message::ScreenDidAppear(DeviceOrientation::Portrait))?;

    let mut snapshots = handle.snapshots();
    let deadline = tokio::time::sleep(Duration::from_secs_f64(duration_secs.max(0.0) + 5.0));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                info!(
                    phase = ?snapshot.phase,
                    time = %format!("{} / {}", snapshot.position_text, snapshot.duration_text),
                    controls = snapshot.controls_visible,
                    spinner = snapshot.show_spinner,
                    live = snapshot.is_live,
                    "snapshot"
                );
                if snapshot.phase == PlaybackPhase::Finished {
                    break;
                }
            }
            () = &mut deadline => {
                info!("demo time elapsed");
                break;
            }
        }
    }

    handle.send(Message::ScreenWillDisappear)?;
    handle.shutdown()?;
    let screen = task.await.map_err(|err| Error::Runtime(err.to_string()))?;
    info!(counters = ?screen.diagnostics().counters(), "demo finished");
    Ok(())
}
