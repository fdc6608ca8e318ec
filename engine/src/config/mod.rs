//! Config Module
//!
//! Session-wide editor settings.

pub mod editor_config;

pub use editor_config::{
    DEFAULT_CELL_SIZE, DEFAULT_GRID_SIZE, DEFAULT_HISTORY_LIMIT, EditorConfig, MAX_GRID_SIZE,
};
