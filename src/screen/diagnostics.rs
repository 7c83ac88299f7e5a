// SPDX-License-Identifier: MPL-2.0
//! Transition diagnostics.
//!
//! Illegal transitions and dropped callbacks are not errors: the screen
//! records them here so tests and debug tooling can see what was ignored.
//! The log is memory-bounded and evicts the oldest entries first.

use crate::config::DEFAULT_DIAGNOSTICS_CAPACITY;
use crate::domain::{LayoutMode, LoadGeneration};
use crate::error::LoadFailure;
use std::collections::VecDeque;

/// Where a dropped callback came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackSource {
    Engine,
    AutoHideTimer,
    Thumbnail,
    Menu,
    /// Any message that arrived after teardown.
    AfterTeardown,
}

/// Something the screen deliberately ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// A layout action not legal from the current mode.
    IllegalTransition {
        mode: LayoutMode,
        action: &'static str,
    },
    /// A callback tagged for a superseded load, timer or sheet.
    StaleCallback {
        source: CallbackSource,
        generation: Option<LoadGeneration>,
    },
    /// A speed outside the offered set, or any speed on a live stream.
    RateRejected { rate: f64, is_live: bool },
    /// A load without a usable URL.
    LoadRejected(LoadFailure),
    /// A preview frame failed to decode.
    ThumbnailDropped { time_secs: f64 },
}

/// Per-kind totals, kept even after the log evicts entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticCounters {
    pub illegal_transitions: u64,
    pub stale_callbacks: u64,
    pub rejected_rates: u64,
    pub rejected_loads: u64,
    pub dropped_thumbnails: u64,
}

/// Event storage that drops the oldest entry once `limit` is reached.
#[derive(Debug, Clone)]
struct EventLog {
    entries: VecDeque<DiagnosticEvent>,
    limit: usize,
}

impl EventLog {
    fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    fn push(&mut self, event: DiagnosticEvent) {
        if self.entries.len() == self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    fn back(&self) -> Option<&DiagnosticEvent> {
        self.entries.back()
    }
}

/// Bounded log of [`DiagnosticEvent`]s.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    events: EventLog,
    counters: DiagnosticCounters,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DIAGNOSTICS_CAPACITY)
    }
}

impl Diagnostics {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: EventLog::new(capacity),
            counters: DiagnosticCounters::default(),
        }
    }

    pub fn record(&mut self, event: DiagnosticEvent) {
        tracing::debug!(?event, "diagnostic");
        match &event {
            DiagnosticEvent::IllegalTransition { .. } => self.counters.illegal_transitions += 1,
            DiagnosticEvent::StaleCallback { .. } => self.counters.stale_callbacks += 1,
            DiagnosticEvent::RateRejected { .. } => self.counters.rejected_rates += 1,
            DiagnosticEvent::LoadRejected(_) => self.counters.rejected_loads += 1,
            DiagnosticEvent::ThumbnailDropped { .. } => self.counters.dropped_thumbnails += 1,
        }
        self.events.push(event);
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &DiagnosticEvent> {
        self.events.entries.iter()
    }

    #[must_use]
    pub fn counters(&self) -> DiagnosticCounters {
        self.counters
    }

    /// Most recent event, if any.
    #[must_use]
    pub fn last(&self) -> Option<&DiagnosticEvent> {
        self.events.back()
    }
}
