//! Error Types
//!
//! Typed failures for placement, editing and design persistence.
//!
//! Out-of-bounds grid lookups are not errors; they surface as `None`
//! from [`crate::world::Grid::cell_by_index`] and only become a
//! [`PlaceError::OutOfBounds`] once a placement is actually rejected.

use crate::bricks::BrickObjectId;

/// Why a candidate placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    /// At least one footprint cell falls outside the grid.
    #[error("brick does not fit inside the grid")]
    OutOfBounds,
    /// A footprint cell is already claimed by another built brick.
    #[error("cell already occupied")]
    Occupied,
    /// The brick is above the floor and touches nothing above or below it.
    #[error("brick needs support from below or above")]
    NeedsSupport,
}

/// Editing failures.
///
/// Apart from [`EditorError::Placement`], these indicate a caller bug
/// (stale ids, undo with nothing recorded) rather than user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("placement rejected: {0}")]
    Placement(#[from] PlaceError),

    #[error("unknown brick object {0:?}")]
    UnknownObject(BrickObjectId),

    #[error("brick object {0:?} is already built")]
    AlreadyBuilt(BrickObjectId),

    #[error("brick object {0:?} is not built")]
    NotBuilt(BrickObjectId),

    #[error("unknown brick type {0}")]
    UnknownBrickType(u32),

    #[error("unknown brick color {0}")]
    UnknownBrickColor(u32),

    #[error("unsupported rotation of {0} degrees")]
    InvalidRotation(i32),

    #[error("cell ({x}, {y}, {z}) is claimed twice")]
    CellConflict { x: i32, y: i32, z: i32 },

    #[error("brick pivot ({x}, {z}) is not a solid footprint cell")]
    InvalidPivot { x: i32, z: i32 },

    #[error("grid size {size} exceeds the maximum of {max}")]
    GridTooLarge { size: u32, max: u32 },

    #[error("no brick selected for the build tool")]
    NoCurrentBrick,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

/// Errors loading or saving designs, catalogs and configs.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("brick type {id} arrangement has {actual} cells, expected {expected}")]
    ArrangementSize {
        id: u32,
        expected: usize,
        actual: usize,
    },

    #[error("brick type {0} has a zero dimension")]
    EmptyBrickType(u32),

    #[error("brick type {0} is too large")]
    OversizedBrickType(u32),
}
