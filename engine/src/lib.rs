//! Nanobrick Engine Library
//!
//! Grid occupancy and build-order engine for voxel brick models. Bricks are
//! placed on a cubic grid, validated against a footing rule, edited through
//! reversible commands, and finally sequenced into printable build levels.
//!
//! # Modules
//!
//! - [`world`] - Grid of cells and the cell <-> world mapping
//! - [`bricks`] - Brick types, colors, saved designs and occupancy under rotation/pivot
//! - [`editor`] - Editing session: placement, grouping and gravity, commands, undo/redo
//! - [`instructions`] - Build-order resolver and parts list
//! - [`config`] - Session configuration
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```ignore
//! use nanobrick_engine::bricks::{BrickCatalog, BrickPalette};
//! use nanobrick_engine::config::EditorConfig;
//! use nanobrick_engine::editor::{Editor, EditorTool};
//! use nanobrick_engine::instructions::resolve_build_order;
//!
//! let mut editor = Editor::from_config(&EditorConfig::default(), catalog, palette);
//! editor.set_current_brick(type_id, color_id)?;
//! let cell = editor.state().grid().cell_by_index(0, 0, 0).unwrap();
//! editor.select(cell)?;
//! editor.undo()?;
//! editor.redo()?;
//!
//! let order = resolve_build_order(&editor.to_design(), editor.state().catalog());
//! ```

pub mod bricks;
pub mod config;
pub mod editor;
pub mod error;
pub mod instructions;
pub mod world;

pub use bricks::{Brick, BrickCatalog, BrickColor, BrickObjectId, BrickPalette, BrickType, Design, Rotation};
pub use config::EditorConfig;
pub use editor::{Command, CommandHistory, Editor, EditorState, EditorTool};
pub use error::{DesignError, EditorError, PlaceError};
pub use instructions::{BuildOrder, parts_list, resolve_build_order};
pub use world::{Cell, Grid};
