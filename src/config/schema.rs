//! Configuration schema types for `dotsmith.toml`
//!
//! Defines the structure and validation rules for editor configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::DEFAULT_FRAME_DURATION_MS;
use crate::persist::DEFAULT_STORAGE_KEY;
use crate::playback::{MAX_SPEED, MIN_SPEED};
use crate::validate::DurationRange;

/// Where the editor keeps its snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `<key>.json` snapshot files
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    /// Snapshot key
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { dir: default_storage_dir(), key: default_storage_key() }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".dotsmith")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// Editing defaults and input limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Duration given to new frames, in milliseconds
    #[serde(default = "default_frame_duration")]
    pub default_frame_duration: u32,
    /// Shortest frame duration accepted from the user
    #[serde(default = "default_min_duration")]
    pub min_frame_duration: u32,
    /// Longest frame duration accepted from the user
    #[serde(default = "default_max_duration")]
    pub max_frame_duration: u32,
    /// Frame durations must be a multiple of this
    #[serde(default = "default_duration_step")]
    pub duration_step: u32,
    /// Screen pixels per grid cell, used for pointer mapping and PNG scale
    #[serde(default = "default_cell_scale")]
    pub cell_scale: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_frame_duration: default_frame_duration(),
            min_frame_duration: default_min_duration(),
            max_frame_duration: default_max_duration(),
            duration_step: default_duration_step(),
            cell_scale: default_cell_scale(),
        }
    }
}

impl EditorConfig {
    /// Frame duration limits as a validator
    pub fn duration_range(&self) -> DurationRange {
        DurationRange {
            min: self.min_frame_duration,
            max: self.max_frame_duration,
            step: self.duration_step,
        }
    }
}

fn default_frame_duration() -> u32 {
    DEFAULT_FRAME_DURATION_MS
}

fn default_min_duration() -> u32 {
    10
}

fn default_max_duration() -> u32 {
    1000
}

fn default_duration_step() -> u32 {
    10
}

fn default_cell_scale() -> u32 {
    20
}

/// Animation preview settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Speed multiplier used when none is given
    #[serde(default = "default_speed")]
    pub default_speed: f64,
    /// Interval between simulated display refreshes, in milliseconds
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { default_speed: default_speed(), refresh_ms: default_refresh_ms() }
    }
}

fn default_speed() -> f64 {
    1.0
}

fn default_refresh_ms() -> u32 {
    16
}

/// Local error collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Append swallowed failures to a JSONL log
    #[serde(default)]
    pub collect_errors: bool,
    /// Log file location
    #[serde(default = "default_error_log")]
    pub path: PathBuf,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { collect_errors: false, path: default_error_log() }
    }
}

fn default_error_log() -> PathBuf {
    PathBuf::from(".dotsmith/errors.jsonl")
}

/// Complete dotsmith.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DotsConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "editor.cell_scale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: &str, message: &str) -> Self {
        Self { field: field.to_string(), message: message.to_string() }
    }
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dotsmith.toml: '{}' {}", self.field, self.message)
    }
}

impl DotsConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.storage.key.trim().is_empty() {
            errors.push(ConfigValidationError::new("storage.key", "must be a non-empty string"));
        }

        let editor = &self.editor;
        if editor.min_frame_duration == 0 {
            errors.push(ConfigValidationError::new("editor.min_frame_duration", "must be a positive integer"));
        }
        if editor.min_frame_duration > editor.max_frame_duration {
            errors.push(ConfigValidationError::new(
                "editor.max_frame_duration",
                "must not be less than editor.min_frame_duration",
            ));
        }
        if editor.duration_step == 0 {
            errors.push(ConfigValidationError::new("editor.duration_step", "must be a positive integer"));
        }
        if editor.min_frame_duration <= editor.max_frame_duration
            && editor.duration_step > 0
            && editor.duration_range().check(editor.default_frame_duration).is_err()
        {
            errors.push(ConfigValidationError::new(
                "editor.default_frame_duration",
                "must lie in the frame duration range",
            ));
        }
        if editor.cell_scale == 0 {
            errors.push(ConfigValidationError::new("editor.cell_scale", "must be a positive integer"));
        }

        if !(MIN_SPEED..=MAX_SPEED).contains(&self.playback.default_speed) {
            errors.push(ConfigValidationError::new("playback.default_speed", "must be between 0.1 and 3.0"));
        }
        if self.playback.refresh_ms == 0 {
            errors.push(ConfigValidationError::new("playback.refresh_ms", "must be a positive integer"));
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: DotsConfig = toml::from_str("").unwrap();
        assert_eq!(config, DotsConfig::default());
        assert_eq!(config.storage.key, "pixelArtAppData");
        assert_eq!(config.editor.default_frame_duration, 100);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[storage]
dir = "data"
key = "sprites"

[editor]
default_frame_duration = 200
min_frame_duration = 20
max_frame_duration = 500
duration_step = 20
cell_scale = 8

[playback]
default_speed = 2.0
refresh_ms = 33

[telemetry]
collect_errors = true
path = "logs/errors.jsonl"
"#;
        let config: DotsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.dir, PathBuf::from("data"));
        assert_eq!(config.storage.key, "sprites");
        assert_eq!(config.editor.duration_range(), DurationRange { min: 20, max: 500, step: 20 });
        assert_eq!(config.editor.cell_scale, 8);
        assert_eq!(config.playback.default_speed, 2.0);
        assert_eq!(config.playback.refresh_ms, 33);
        assert!(config.telemetry.collect_errors);
        assert!(config.is_valid());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: DotsConfig = toml::from_str("[editor]\ncell_scale = 4").unwrap();
        assert_eq!(config.editor.cell_scale, 4);
        assert_eq!(config.editor.max_frame_duration, 1000);
        assert_eq!(config.playback, PlaybackConfig::default());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = DotsConfig::default();
        config.storage.key = " ".into();
        config.editor.cell_scale = 0;
        config.playback.default_speed = 5.0;
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["storage.key", "editor.cell_scale", "playback.default_speed"]);
    }

    #[test]
    fn test_validation_duration_range() {
        let mut config = DotsConfig::default();
        config.editor.min_frame_duration = 500;
        config.editor.max_frame_duration = 100;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "editor.max_frame_duration");

        let mut config = DotsConfig::default();
        config.editor.default_frame_duration = 105;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("default_frame_duration"));
    }
}
