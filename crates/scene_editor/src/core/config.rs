//! # Editor Configuration
//!
//! All tunables of the editor core in one serializable tree. Every section
//! has defaults, so a config file only needs to name what it changes.
//!
//! ## Configuration Categories
//!
//! - **History**: undo depth and which structural edits are recorded
//! - **Outline**: presentation tree labels and update strategy
//! - **Terrain**: parameters for entities created by "Add terrain"

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

/// # Command History Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of commands kept; the oldest is dropped beyond this
    pub capacity: usize,
    /// Record add, duplicate and reparent as undoable commands too.
    ///
    /// Off by default: only deletes are undoable.
    pub record_all_edits: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            record_all_edits: false,
        }
    }
}

/// # Outline Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Append the entity id to row labels, e.g. `Lamp [12]`
    pub show_ids: bool,
    /// Patch single inserts/removals instead of rebuilding the whole tree
    pub incremental_patching: bool,
    /// Name given to entities created by "Add Empty"
    pub default_entity_name: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            show_ids: false,
            incremental_patching: false,
            default_entity_name: "Game Object".to_string(),
        }
    }
}

/// # Terrain Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Vertices per terrain edge
    pub vertex_resolution: u32,
    /// Edge length in world units
    pub size: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            vertex_resolution: 180,
            size: 1200,
        }
    }
}

/// # Complete Editor Configuration
///
/// Top-level configuration that encompasses all editor subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_level: String,
    /// Command history settings
    pub history: HistoryConfig,
    /// Outline settings
    pub outline: OutlineConfig,
    /// Terrain creation settings
    pub terrain: TerrainConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            history: HistoryConfig::default(),
            outline: OutlineConfig::default(),
            terrain: TerrainConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Set log level
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Record every structural edit in the history, not only deletes
    #[must_use]
    pub fn with_full_history(mut self, enabled: bool) -> Self {
        self.history.record_all_edits = enabled;
        self
    }

    /// Set history capacity
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history.capacity = capacity;
        self
    }

    /// Enable incremental outline patching
    #[must_use]
    pub fn with_incremental_outline(mut self, enabled: bool) -> Self {
        self.outline.incremental_patching = enabled;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.capacity == 0 {
            return Err(ConfigError::Invalid("history capacity must be at least 1".to_string()));
        }
        if self.outline.default_entity_name.trim().is_empty() {
            return Err(ConfigError::Invalid("default entity name cannot be empty".to_string()));
        }
        if self.terrain.vertex_resolution == 0 || self.terrain.size == 0 {
            return Err(ConfigError::Invalid(format!(
                "terrain resolution and size must be positive (got {} / {})",
                self.terrain.vertex_resolution, self.terrain.size
            )));
        }
        Ok(())
    }
}

impl Config for EditorConfig {}
