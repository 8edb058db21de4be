//! Shared type definitions
//!
//! This module contains all shared data types used across the console.

pub mod config;
pub mod message;
pub mod model;
pub mod preset;

pub use config::ConsoleConfig;
pub use message::{Message, Role};
pub use model::{ModelRecord, NewModel};
pub use preset::{NewPreset, PresetRecord};
