//! Editor Configuration
//!
//! Grid dimensions, history depth and the stud-to-world scale used when
//! handing cell positions to a renderer.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::DesignError;

/// Number of cells along each grid axis for a fresh design.
pub const DEFAULT_GRID_SIZE: u32 = 16;

/// Largest grid edge a session or a saved design may ask for.
pub const MAX_GRID_SIZE: u32 = 128;

/// Maximum number of commands kept by the undo history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// World size of one cell: one stud wide/deep, one brick tall.
pub const DEFAULT_CELL_SIZE: Vec3 = Vec3::new(4.0, 3.5, 4.0);

/// Central configuration for an editing session.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Cells per axis of the build grid
    pub grid_size: u32,
    /// Undo history cap; the oldest command is dropped beyond this
    pub history_limit: usize,
    /// World-space extent of a single cell
    pub cell_size: Vec3,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, DesignError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a config file from disk.
    pub fn load(path: &Path) -> Result<Self, DesignError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Same config with a different grid size.
    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.grid_size, 16);
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.cell_size, Vec3::new(4.0, 3.5, 4.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json_str(r#"{ "gridSize": 8 }"#).unwrap();
        assert_eq!(config.grid_size, 8);
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.cell_size, DEFAULT_CELL_SIZE);
    }

    #[test]
    fn test_cell_size_from_json() {
        let config =
            EditorConfig::from_json_str(r#"{ "cellSize": [1.0, 1.0, 1.0], "historyLimit": 5 }"#)
                .unwrap();
        assert_eq!(config.cell_size, Vec3::ONE);
        assert_eq!(config.history_limit, 5);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(EditorConfig::from_json_str("{ gridSize: }").is_err());
    }
}
