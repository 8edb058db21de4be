//! Settings storage
//!
//! Manages persistence of the console configuration.

use crate::storage::{get_data_dir, StorageError};
use crate::types::ConsoleConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the settings file path
pub fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("settings.json"))
}

/// Load settings from disk
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> ConsoleConfig {
    let loaded = get_settings_path().and_then(|path| load_settings_from(&path));
    match loaded {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            ConsoleConfig::default()
        }
    }
}

/// Load and validate settings from a specific file
pub fn load_settings_from(path: &Path) -> Result<ConsoleConfig, StorageError> {
    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(ConsoleConfig::default());
    }

    let json = fs::read_to_string(path)?;
    let mut settings: ConsoleConfig = serde_json::from_str(&json)?;
    settings.validate();

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Save settings to the per-user data directory
pub fn save_settings(settings: &ConsoleConfig) -> Result<PathBuf, StorageError> {
    let path = get_settings_path()?;
    save_settings_to(settings, &path)?;
    Ok(path)
}

/// Save settings to a specific file, creating parent directories
pub fn save_settings_to(settings: &ConsoleConfig, path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;

    tracing::debug!("Saved settings to {}", path.display());
    Ok(())
}
