// SPDX-License-Identifier: MPL-2.0
//! Settings menu flow: a top-level sheet leading to the speed and quality
//! sheets.
//!
//! Each presented sheet gets a [`MenuRequestId`]; an answer carrying any
//! other id belongs to a sheet that was superseded and is ignored.

use crate::domain::{PlaybackRate, QualityPreset};
pub use crate::engine::MenuChoice;

/// Identifies one presented sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuRequestId(u64);

impl MenuRequestId {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Speed,
    Quality,
    Rate(PlaybackRate),
    Preset(usize),
}

impl Entry {
    fn label(&self, presets: &[QualityPreset]) -> String {
        match self {
            Entry::Speed => "Speed".to_string(),
            Entry::Quality => "Quality".to_string(),
            Entry::Rate(rate) => rate.label(),
            Entry::Preset(index) => presets
                .get(*index)
                .map(|preset| preset.label.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    id: MenuRequestId,
    entries: Vec<Entry>,
}

/// Menu sub-component state.
#[derive(Debug, Clone, Default)]
pub struct State {
    next_id: u64,
    pending: Option<Pending>,
    presets: Vec<QualityPreset>,
    selected_preset: Option<usize>,
}

/// Messages for the menu sub-component.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Settings button tapped.
    Open { is_live: bool },
    /// The presenter reported the user's pick.
    Answered {
        request: MenuRequestId,
        choice: MenuChoice,
    },
    /// Drop any open sheet.
    Dismiss,
}

/// Effects produced by the menu flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// No effect.
    None,
    /// Show a sheet.
    Present {
        request: MenuRequestId,
        title: &'static str,
        options: Vec<String>,
    },
    /// A speed was picked.
    SetRate(PlaybackRate),
    /// A quality preset was picked.
    SetQuality(QualityPreset),
    /// Answer for a superseded sheet.
    Stale(MenuRequestId),
}

impl State {
    #[must_use]
    pub fn new(presets: Vec<QualityPreset>) -> Self {
        Self {
            presets,
            ..Self::default()
        }
    }

    /// Handle a menu message.
    pub fn handle(&mut self, msg: Message) -> Effect {
        match msg {
            Message::Open { is_live } => {
                let mut entries = Vec::with_capacity(2);
                if !is_live {
                    entries.push(Entry::Speed);
                }
                if !self.presets.is_empty() {
                    entries.push(Entry::Quality);
                }
                if entries.is_empty() {
                    return Effect::None;
                }
                self.present("Settings", entries)
            }
            Message::Answered { request, choice } => {
                let Some(pending) = self.pending.take_if(|pending| pending.id == request) else {
                    return Effect::Stale(request);
                };
                let MenuChoice::Selected(index) = choice else {
                    return Effect::None;
                };
                match pending.entries.get(index) {
                    Some(Entry::Speed) => {
                        let entries = PlaybackRate::menu_order().map(Entry::Rate).collect();
                        self.present("Playback Speed", entries)
                    }
                    Some(Entry::Quality) => {
                        let entries = (0..self.presets.len()).map(Entry::Preset).collect();
                        self.present("Quality", entries)
                    }
                    Some(Entry::Rate(rate)) => Effect::SetRate(*rate),
                    Some(Entry::Preset(preset)) => match self.presets.get(*preset) {
                        Some(chosen) => {
                            self.selected_preset = Some(*preset);
                            Effect::SetQuality(chosen.clone())
                        }
                        None => Effect::None,
                    },
                    None => {
                        tracing::debug!(index, "menu answer out of range");
                        Effect::None
                    }
                }
            }
            Message::Dismiss => {
                self.pending = None;
                Effect::None
            }
        }
    }

    fn present(&mut self, title: &'static str, entries: Vec<Entry>) -> Effect {
        self.next_id += 1;
        let request = MenuRequestId(self.next_id);
        let options = entries
            .iter()
            .map(|entry| entry.label(&self.presets))
            .collect();
        self.pending = Some(Pending {
            id: request,
            entries,
        });
        Effect::Present {
            request,
            title,
            options,
        }
    }

    /// Sheet awaiting an answer, if any.
    #[must_use]
    pub fn pending_request(&self) -> Option<MenuRequestId> {
        self.pending.as_ref().map(|pending| pending.id)
    }

    /// Preset picked last, if any.
    #[must_use]
    pub fn selected_preset(&self) -> Option<&QualityPreset> {
        self.selected_preset.and_then(|index| self.presets.get(index))
    }
}
