//! Persistent storage
//!
//! Console settings live in the per-user data directory.

pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing local files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No data directory available for this user")]
    NoDataDir,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-user data directory
///
/// Linux: ~/.local/share/llm-manager, macOS: ~/Library/Application Support/com.LlmManager.llm-manager
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    directories::ProjectDirs::from("com", "LlmManager", "llm-manager")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StorageError::NoDataDir)
}
