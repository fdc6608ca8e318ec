//! Bricks Module
//!
//! Brick shapes, persisted records, runtime objects and the occupancy
//! calculation that ties them to grid cells.

pub mod catalog;
pub mod models;
pub mod object;
pub mod occupancy;

pub use catalog::{BrickCatalog, BrickType};
pub use models::{Brick, BrickColor, BrickPalette, Design};
pub use object::{BrickObject, BrickObjectId, VisualHandle};
pub use occupancy::{BrickPose, Rotation, footprint_offsets, occupied_cells};
