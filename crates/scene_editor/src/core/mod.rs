//! # Core Editor Module
//!
//! Shared configuration for the editor subsystems.

pub mod config;

pub use crate::config::{Config, ConfigError, ConfigFormat};
pub use config::{EditorConfig, HistoryConfig, OutlineConfig, TerrainConfig};
