// SPDX-License-Identifier: MPL-2.0
//! `playscreen` is the platform-independent core of a mobile video player
//! screen.
//!
//! It models playback, layout modes (embedded, full-screen, mini-player),
//! auto-hiding transport controls and scrub previews as plain state
//! machines, and derives one render snapshot per update. A host view feeds
//! it input and draws the snapshots; a [`runtime::ScreenRuntime`] wires it to
//! a media engine on tokio.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod runtime;
pub mod screen;

#[cfg(test)]
mod test_utils;
