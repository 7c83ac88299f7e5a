// SPDX-License-Identifier: MPL-2.0
//! This module handles the player screen's configuration, including loading and
//! saving user preferences to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use playscreen::config::{self, Config};
//! use std::path::PathBuf;
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.auto_hide_delay_secs = 8;
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//!
//! // To load/save from a specific path (e.g., for testing)
//! let temp_dir = PathBuf::from("./temp_config_dir");
//! std::fs::create_dir_all(&temp_dir).unwrap();
//! let temp_file = temp_dir.join("test_settings.toml");
//! config::save_to_path(&config, &temp_file).expect("Failed to save to path");
//! let loaded_config = config::load_from_path(&temp_file).expect("Failed to load from path");
//! assert_eq!(loaded_config.auto_hide_delay_secs, 8);
//! std::fs::remove_dir_all(&temp_dir).unwrap();
//! ```

mod defaults;

pub use defaults::*;

use crate::domain::{FinishPolicy, QualityPreset};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "Playscreen";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "PLAYSCREEN_CONFIG_DIR";

/// Persisted player screen preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds of inactivity before the transport controls hide.
    pub auto_hide_delay_secs: u32,
    /// Seconds skipped by the forward/backward buttons.
    pub skip_step_secs: f64,
    /// Asset loaded when the screen appears.
    pub primary_url: Option<String>,
    /// Whether the primary asset is a live stream.
    pub primary_is_live: bool,
    /// What happens when an asset plays to the end.
    pub finish_policy: FinishPolicy,
    /// Entries of the quality menu.
    pub quality_presets: Vec<QualityPreset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_hide_delay_secs: DEFAULT_AUTO_HIDE_DELAY_SECS,
            skip_step_secs: DEFAULT_SKIP_STEP_SECS,
            primary_url: None,
            primary_is_live: false,
            finish_policy: FinishPolicy::default(),
            quality_presets: QualityPreset::defaults(),
        }
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir).join(CONFIG_FILE));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Loads a configuration file, falling back to defaults when it does not parse.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring invalid settings file");
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_preferences() {
        let config = Config {
            auto_hide_delay_secs: 8,
            skip_step_secs: 15.0,
            primary_url: Some("https://example.com/live.m3u8".to_string()),
            primary_is_live: true,
            finish_policy: FinishPolicy::Stop,
            quality_presets: vec![QualityPreset::new("Auto", None)],
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_returns_default_on_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "auto_hide_delay_secs = 3\n").expect("failed to write toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert_eq!(loaded.auto_hide_delay_secs, 3);
        assert_eq!(loaded.finish_policy, FinishPolicy::ReplayPrimary);
        assert_eq!(loaded.quality_presets, QualityPreset::defaults());
    }

    #[test]
    fn finish_policy_load_variant_parses() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(
            &config_path,
            "[finish_policy]\nkind = \"load\"\nurl = \"https://example.com/next.m3u8\"\n",
        )
        .expect("failed to write toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert_eq!(
            loaded.finish_policy,
            FinishPolicy::Load {
                url: "https://example.com/next.m3u8".to_string(),
                is_live: false,
            }
        );
    }

    #[test]
    fn save_to_path_creates_parent_directories() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let nested_dir = temp_dir.path().join("deep").join("path");
        let config_path = nested_dir.join("settings.toml");

        save_to_path(&Config::default(), &config_path).expect("save should create directories");
        assert!(config_path.exists());
    }

    #[test]
    fn default_config_has_no_primary_asset() {
        let config = Config::default();
        assert!(config.primary_url.is_none());
        assert_eq!(config.auto_hide_delay_secs, DEFAULT_AUTO_HIDE_DELAY_SECS);
    }
}
