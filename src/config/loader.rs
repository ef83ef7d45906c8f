//! Configuration loading and discovery for `dotsmith.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::DotsConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery
pub const CONFIG_FILE: &str = "dotsmith.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse dotsmith.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override snapshot directory
    pub storage_dir: Option<PathBuf>,
    /// Override snapshot key
    pub key: Option<String>,
    /// Override playback speed
    pub speed: Option<f64>,
    /// Enable error collection
    pub collect_errors: Option<bool>,
}

/// Find dotsmith.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for dotsmith.toml
/// 2. Check XDG_CONFIG_HOME/dotsmith/dotsmith.toml (or ~/.config/dotsmith/dotsmith.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find dotsmith.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("dotsmith").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find dotsmith.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a dotsmith.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// Relative paths inside a loaded file are resolved against the directory
/// holding it.
pub fn load_config(path: Option<&Path>) -> Result<DotsConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            let mut config = load_config_file(&p)?;
            if let Some(root) = project_root(&p) {
                config.storage.dir = resolve_path(root, &config.storage.dir);
                config.telemetry.path = resolve_path(root, &config.telemetry.path);
            }
            Ok(config)
        }
        None => Ok(DotsConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<DotsConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: DotsConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut DotsConfig, overrides: &CliOverrides) {
    if let Some(ref dir) = overrides.storage_dir {
        config.storage.dir = dir.clone();
    }

    if let Some(ref key) = overrides.key {
        config.storage.key = key.clone();
    }

    if let Some(speed) = overrides.speed {
        config.playback.default_speed = speed;
    }

    if let Some(collect_errors) = overrides.collect_errors {
        config.telemetry.collect_errors = collect_errors;
    }
}

/// Get the project root directory from a config file path.
///
/// Returns the parent directory of the dotsmith.toml file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// Contents written by `dots init`.
pub fn starter_config() -> String {
    r#"# dotsmith editor configuration

[storage]
dir = ".dotsmith"
key = "pixelArtAppData"

[editor]
default_frame_duration = 100
min_frame_duration = 10
max_frame_duration = 1000
duration_step = 10
cell_scale = 20

[playback]
default_speed = 1.0
refresh_ms = 16

[telemetry]
collect_errors = false
path = ".dotsmith/errors.jsonl"
"#
    .to_string()
}
