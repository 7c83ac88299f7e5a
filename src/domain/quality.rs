// SPDX-License-Identifier: MPL-2.0
//! Streaming quality presets offered by the quality menu.

use serde::{Deserialize, Serialize};

/// One entry of the quality menu.
///
/// `peak_bit_rate` is forwarded to the engine as its preferred peak bit
/// rate; `None` lets the engine adapt freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityPreset {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_bit_rate: Option<u64>,
}

impl QualityPreset {
    #[must_use]
    pub fn new(label: impl Into<String>, peak_bit_rate: Option<u64>) -> Self {
        Self {
            label: label.into(),
            peak_bit_rate,
        }
    }

    /// Presets used when the settings file does not list any.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Auto", None),
            Self::new("1080p", Some(8_000_000)),
            Self::new("720p", Some(5_000_000)),
            Self::new("480p", Some(2_500_000)),
            Self::new("360p", Some(1_000_000)),
        ]
    }
}
