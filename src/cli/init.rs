//! Init command implementation
//!
//! Writes a starter `dotsmith.toml` and seeds the snapshot directory with the
//! starter document, so the first `dots` command in the project finds both.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::config::{load_config, starter_config, CONFIG_FILE};
use crate::models::{Document, Session};
use crate::persist::{FileStorage, Gateway};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the init command
pub fn run_init(path: &Path, force: bool) -> ExitCode {
    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() && !force {
        eprintln!("Error: '{}' already exists (use --force to overwrite)", config_path.display());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    if let Err(e) = fs::create_dir_all(path).and_then(|()| fs::write(&config_path, starter_config())) {
        eprintln!("Error: Failed to write '{}': {}", config_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }
    println!("Wrote: {}", config_path.display());

    let config = match load_config(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut gateway = Gateway::with_key(FileStorage::new(&config.storage.dir), config.storage.key.clone());
    match gateway.try_load() {
        Ok(Some(_)) => {
            println!("Keeping existing snapshot in {}", config.storage.dir.display());
            return ExitCode::from(EXIT_SUCCESS);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "existing snapshot is unreadable, replacing it"),
    }

    let session = Session { playback_speed: config.playback.default_speed, ..Session::default() };
    if let Err(e) = gateway.try_save(&Document::default(), &session) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    println!("Created snapshot in {}", config.storage.dir.display());
    ExitCode::from(EXIT_SUCCESS)
}
