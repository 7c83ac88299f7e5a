// SPDX-License-Identifier: MPL-2.0
//! Scrub preview: thumbnail population and slider-drag previews.

use super::thumbnails::{sample_times, ThumbnailCache};
use crate::domain::LoadGeneration;
use crate::engine::ImageHandle;

/// An active slider drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubSession {
    /// Last previewed slider fraction.
    pub last_fraction: f64,
}

/// Scrub preview sub-component state.
#[derive(Debug, Clone, Default)]
pub struct State {
    cache: ThumbnailCache,
    session: Option<ScrubSession>,
    preview_image: Option<ImageHandle>,
    /// Generation whose frames the cache currently holds.
    generation: LoadGeneration,
    duration_secs: f64,
}

/// Messages for the scrub sub-component.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// The duration of the asset loaded under `generation` is known.
    AssetLoaded {
        generation: LoadGeneration,
        duration_secs: f64,
    },
    /// Slider touch-down.
    Begin,
    /// Slider moved to `fraction` of the track.
    Drag(f64),
    /// Slider touch-up or cancel.
    End,
    /// A preview frame finished decoding.
    ThumbnailReady {
        generation: LoadGeneration,
        time_secs: f64,
        image: ImageHandle,
    },
    /// A new asset is loading under `generation`.
    Reset(LoadGeneration),
}

/// Effects produced by scrub changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// No effect.
    None,
    /// Decode frames at these timestamps.
    Populate {
        generation: LoadGeneration,
        timestamps: Vec<f64>,
    },
    /// Show the preview chrome.
    ShowPreview,
    /// Hide the preview chrome.
    HidePreview,
    /// Seek the engine while dragging.
    SeekTo(f64),
    /// A frame arrived for a replaced asset.
    Stale { generation: LoadGeneration },
    /// The asset was replaced: abandon in-flight population.
    Abandoned { preview_was_visible: bool },
}

impl State {
    /// Handle a scrub message.
    pub fn handle(&mut self, msg: Message) -> Effect {
        match msg {
            Message::AssetLoaded {
                generation,
                duration_secs,
            } => {
                self.cache.clear();
                self.generation = generation;
                self.duration_secs = duration_secs;
                let timestamps = sample_times(duration_secs);
                if timestamps.is_empty() {
                    return Effect::None;
                }
                tracing::debug!(count = timestamps.len(), "populating thumbnails");
                Effect::Populate {
                    generation,
                    timestamps,
                }
            }
            Message::Begin => {
                if self.session.is_some() {
                    return Effect::None;
                }
                if self.duration_secs <= 0.0 {
                    tracing::debug!("scrub ignored until the duration is known");
                    return Effect::None;
                }
                self.session = Some(ScrubSession { last_fraction: 0.0 });
                Effect::ShowPreview
            }
            Message::Drag(fraction) => {
                let Some(session) = self.session.as_mut() else {
                    return Effect::None;
                };
                let fraction = if fraction.is_nan() {
                    0.0
                } else {
                    fraction.clamp(0.0, 1.0)
                };
                session.last_fraction = fraction;
                let target = fraction * self.duration_secs;
                self.preview_image = self.cache.nearest(target).cloned();
                Effect::SeekTo(target)
            }
            Message::End => {
                if self.session.take().is_none() {
                    return Effect::None;
                }
                self.preview_image = None;
                Effect::HidePreview
            }
            Message::ThumbnailReady {
                generation,
                time_secs,
                image,
            } => {
                if generation != self.generation {
                    return Effect::Stale { generation };
                }
                self.cache.insert(time_secs, image);
                Effect::None
            }
            Message::Reset(generation) => {
                let preview_was_visible = self.session.is_some();
                self.reset_for(generation);
                self.duration_secs = 0.0;
                Effect::Abandoned {
                    preview_was_visible,
                }
            }
        }
    }

    fn reset_for(&mut self, generation: LoadGeneration) {
        self.cache.clear();
        self.session = None;
        self.preview_image = None;
        self.generation = generation;
    }

    #[must_use]
    pub fn session(&self) -> Option<&ScrubSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn preview_image(&self) -> Option<&ImageHandle> {
        self.preview_image.as_ref()
    }

    #[must_use]
    pub fn cache(&self) -> &ThumbnailCache {
        &self.cache
    }
}
