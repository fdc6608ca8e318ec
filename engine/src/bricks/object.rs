//! Brick Objects
//!
//! Runtime instances of bricks. A brick object wraps its persisted [`Brick`]
//! record, the type and color it was created with, the host's visual handle,
//! and a cache of the cells it currently covers.

use super::catalog::BrickType;
use super::models::{Brick, BrickColor};
use super::occupancy::{BrickPose, Rotation, occupied_cells};
use crate::error::{EditorError, PlaceError};
use crate::world::{Cell, Grid};

/// Stable handle of a brick object within one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BrickObjectId(pub u32);

/// Opaque token owned by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

#[derive(Debug, Clone)]
pub struct BrickObject {
    id: BrickObjectId,
    brick: Brick,
    brick_type: BrickType,
    color: BrickColor,
    rotation: Rotation,
    /// Set by the host once it has created a visual for this brick.
    pub visual: Option<VisualHandle>,
    cell: Option<Cell>,
    /// `None` when unanchored or when the footprint leaves the grid.
    occupied: Option<Vec<Cell>>,
}

impl BrickObject {
    /// Fresh, unanchored object.
    pub fn new(id: BrickObjectId, brick_id: u32, brick_type: BrickType, color: BrickColor) -> Self {
        let brick = Brick {
            id: brick_id,
            type_id: brick_type.id,
            color_id: color.id,
            ..Brick::default()
        };
        Self {
            id,
            brick,
            brick_type,
            color,
            rotation: Rotation::R0,
            visual: None,
            cell: None,
            occupied: None,
        }
    }

    /// Rebuild a built runtime object from a saved brick.
    ///
    /// The anchor must be a resting cell and the pivot a solid cell of the
    /// footprint; the whole footprint must fit the grid.
    pub fn from_brick(
        id: BrickObjectId,
        brick: Brick,
        brick_type: BrickType,
        color: BrickColor,
        grid: &Grid,
    ) -> Result<Self, EditorError> {
        let rotation =
            Rotation::from_degrees(brick.rotation_y).ok_or(EditorError::InvalidRotation(brick.rotation_y))?;
        if !brick_type.is_solid(brick.pivot_x, brick.pivot_z) {
            return Err(EditorError::InvalidPivot {
                x: brick.pivot_x,
                z: brick.pivot_z,
            });
        }
        let anchor = grid
            .cell_at(brick.anchor())
            .filter(|cell| !cell.is_below_floor())
            .ok_or(PlaceError::OutOfBounds)?;
        let mut object = Self {
            id,
            brick,
            brick_type,
            color,
            rotation,
            visual: None,
            cell: Some(anchor),
            occupied: None,
        };
        object.refresh(grid);
        if object.occupied.is_none() {
            return Err(PlaceError::OutOfBounds.into());
        }
        Ok(object)
    }

    pub fn id(&self) -> BrickObjectId {
        self.id
    }

    pub fn brick_type(&self) -> &BrickType {
        &self.brick_type
    }

    pub fn color(&self) -> &BrickColor {
        &self.color
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn pose(&self) -> BrickPose {
        BrickPose::new(self.brick.pivot_x, self.brick.pivot_z, self.rotation)
    }

    /// Anchor cell, once placed.
    pub fn cell(&self) -> Option<Cell> {
        self.cell
    }

    /// Cached cells at the current anchor.
    pub fn occupied_cells(&self) -> Option<&[Cell]> {
        self.occupied.as_deref()
    }

    /// Cells this object would cover if anchored at `cell`.
    pub fn occupied_cells_at(&self, grid: &Grid, cell: Cell) -> Option<Vec<Cell>> {
        occupied_cells(grid, &self.brick_type, self.pose(), cell)
    }

    /// Persisted record reflecting the current anchor, pose and color.
    pub fn brick(&self) -> &Brick {
        &self.brick
    }

    pub(crate) fn set_cell(&mut self, grid: &Grid, cell: Cell) {
        self.cell = Some(cell);
        self.brick.set_anchor(cell.as_ivec3());
        self.refresh(grid);
    }

    pub(crate) fn set_color(&mut self, color: BrickColor) -> BrickColor {
        self.brick.color_id = color.id;
        std::mem::replace(&mut self.color, color)
    }

    pub(crate) fn set_rotation(&mut self, grid: &Grid, rotation: Rotation) {
        self.rotation = rotation;
        self.brick.rotation_y = rotation.degrees();
        self.refresh(grid);
    }

    /// Move the pivot onto footprint position `(pivot_x, pivot_z)`.
    ///
    /// Rejected (returns `false`, nothing changes) outside the footprint
    /// bounds or on an empty footprint cell.
    pub(crate) fn set_pivot(&mut self, grid: &Grid, pivot_x: i32, pivot_z: i32) -> bool {
        if !self.brick_type.is_solid(pivot_x, pivot_z) {
            return false;
        }
        self.brick.pivot_x = pivot_x;
        self.brick.pivot_z = pivot_z;
        self.refresh(grid);
        true
    }

    /// Recompute the occupied-cell cache from anchor, pivot and rotation.
    pub(crate) fn refresh(&mut self, grid: &Grid) {
        self.occupied = self
            .cell
            .and_then(|cell| occupied_cells(grid, &self.brick_type, self.pose(), cell));
    }
}
