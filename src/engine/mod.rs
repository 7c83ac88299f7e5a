// SPDX-License-Identifier: MPL-2.0
//! Boundaries to the collaborators the screen drives but does not own.
//!
//! - [`PlaybackEngine`]: the media engine (fire-and-forget commands, events
//!   pushed back through an [`EngineEventSink`])
//! - [`ThumbnailSource`]: decodes a preview frame near a timestamp
//! - [`MenuPresenter`]: shows a list of choices and reports the pick
//!
//! Every event an engine emits is tagged with the load generation its sink
//! was created for, so callbacks from a replaced asset can be told apart.

pub mod simulated;

use crate::domain::LoadGeneration;
use crate::error::ThumbnailError;
use futures_util::future::BoxFuture;
use std::sync::Arc;

/// Commands issued to the media engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// Replace the current asset.
    Load {
        url: String,
        generation: LoadGeneration,
    },
    Play,
    Pause,
    /// Seek to an absolute position in seconds.
    Seek(f64),
    /// Set the playback speed.
    SetRate(f64),
    /// Cap the adaptive streaming bit rate; `None` removes the cap.
    SetPreferredPeakBitRate(Option<u64>),
    /// Drop in-flight seeks and loads.
    CancelPendingOperations,
}

/// Events pushed by the media engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Periodic position report, in seconds.
    TimeUpdate(f64),
    /// Playback stalled (`true`) or resumed (`false`).
    BufferingChanged(bool),
    /// The asset played to its end.
    DidFinishPlaying,
    /// The asset's duration became known, in seconds.
    DurationKnown(f64),
    /// The asset could not be loaded.
    LoadFailed(String),
}

type Deliver = dyn Fn(LoadGeneration, EngineEvent) -> bool + Send + Sync;

/// Where an engine pushes the events of one load.
///
/// Cheap to clone. `emit` returns `false` once nobody listens anymore,
/// which engines use to stop their background work.
#[derive(Clone)]
pub struct EngineEventSink {
    generation: LoadGeneration,
    deliver: Arc<Deliver>,
}

impl EngineEventSink {
    pub fn new(
        generation: LoadGeneration,
        deliver: impl Fn(LoadGeneration, EngineEvent) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            generation,
            deliver: Arc::new(deliver),
        }
    }

    /// Generation this sink tags its events with.
    #[must_use]
    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    /// Pushes an event; returns `false` if the receiver is gone.
    pub fn emit(&self, event: EngineEvent) -> bool {
        (self.deliver)(self.generation, event)
    }
}

impl std::fmt::Debug for EngineEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineEventSink")
            .field("generation", &self.generation)
            .finish()
    }
}

/// The media engine.
///
/// Calls must not block: each one only forwards a command. State changes
/// come back asynchronously through the sink handed to [`load`].
///
/// [`load`]: PlaybackEngine::load
pub trait PlaybackEngine: Send {
    fn load(&mut self, url: &str, events: EngineEventSink);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position_secs: f64);
    fn set_rate(&mut self, rate: f64);
    fn set_preferred_peak_bit_rate(&mut self, bits_per_second: Option<u64>);
    fn cancel_pending_operations(&mut self);

    /// Stops emitting events and releases the current asset.
    fn detach(&mut self) {}

    /// Routes a command to the matching method.
    ///
    /// `Load` needs a sink and is therefore not handled here.
    fn apply(&mut self, command: &EngineCommand) {
        match command {
            EngineCommand::Load { .. } => {
                tracing::warn!("load must go through PlaybackEngine::load");
            }
            EngineCommand::Play => self.play(),
            EngineCommand::Pause => self.pause(),
            EngineCommand::Seek(position) => self.seek(*position),
            EngineCommand::SetRate(rate) => self.set_rate(*rate),
            EngineCommand::SetPreferredPeakBitRate(bps) => self.set_preferred_peak_bit_rate(*bps),
            EngineCommand::CancelPendingOperations => self.cancel_pending_operations(),
        }
    }
}

/// Decoded preview frame.
///
/// The pixel buffer is shared; cloning a handle never copies pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// RGBA pixel data.
    pub rgba: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
}

impl ImageHandle {
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            rgba: Arc::new(rgba),
            width,
            height,
        }
    }

    /// A single-color frame.
    #[must_use]
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self::from_rgba(width, height, color.repeat(pixels))
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Produces preview frames for the scrub bar.
pub trait ThumbnailSource: Send + Sync {
    /// Decodes the frame closest to `near_secs`.
    fn request_frame(&self, near_secs: f64) -> BoxFuture<'static, Result<ImageHandle, ThumbnailError>>;
}

/// Outcome of a presented menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Index into the presented options.
    Selected(usize),
    Cancelled,
}

/// Presents action sheets.
pub trait MenuPresenter: Send + Sync {
    fn present_choice(&self, title: &str, options: &[String]) -> BoxFuture<'static, MenuChoice>;
}
