//! Placement Validation
//!
//! Decides whether a brick may occupy a candidate anchor: the footprint must
//! fit the grid, must not overlap another built brick, and above the floor it
//! must touch a built brick directly below *or* directly above one of its
//! cells. Suspended bricks are deliberately allowed.

use glam::IVec3;

use super::state::EditorState;
use crate::bricks::{BrickObject, BrickObjectId};
use crate::error::{EditorError, PlaceError};
use crate::world::Cell;

/// Vertical footing rule shared by the editor and the build-order resolver.
///
/// Floor-level anchors always pass. Otherwise some cell needs a built cell
/// right below or right above it.
pub fn has_footing(anchor_y: i32, cells: &[Cell], is_built: impl Fn(IVec3) -> bool) -> bool {
    if anchor_y <= 0 {
        return true;
    }
    cells.iter().any(|cell| {
        let v = cell.as_ivec3();
        is_built(v - IVec3::Y) || is_built(v + IVec3::Y)
    })
}

impl EditorState {
    fn owned_by_other(&self, v: IVec3, id: BrickObjectId) -> bool {
        self.cell_owners
            .get(&Cell::from_ivec3(v))
            .is_some_and(|&owner| owner != id)
    }

    /// Why `object` may not be anchored at `cell`, if it may not.
    pub fn placement_error(&self, object: &BrickObject, cell: Cell) -> Result<(), PlaceError> {
        let cells = object
            .occupied_cells_at(&self.grid, cell)
            .ok_or(PlaceError::OutOfBounds)?;

        if cells
            .iter()
            .any(|c| self.owned_by_other(c.as_ivec3(), object.id()))
        {
            return Err(PlaceError::Occupied);
        }

        if !has_footing(cell.y(), &cells, |v| self.owned_by_other(v, object.id())) {
            return Err(PlaceError::NeedsSupport);
        }
        Ok(())
    }

    pub fn validate_placement(&self, id: BrickObjectId, cell: Cell) -> Result<(), EditorError> {
        let object = self.object_ref(id)?;
        Ok(self.placement_error(object, cell)?)
    }

    /// Boolean form of [`EditorState::validate_placement`].
    pub fn check_cell_buildable(&self, id: BrickObjectId, cell: Cell) -> bool {
        self.validate_placement(id, cell).is_ok()
    }

    /// First buildable cell at or above `cell` in the same column.
    ///
    /// Gives up at the top of the grid; never searches sideways.
    pub fn valid_cell(&self, id: BrickObjectId, cell: Cell) -> Option<Cell> {
        let mut candidate = Some(cell);
        while let Some(current) = candidate {
            if self.check_cell_buildable(id, current) {
                return Some(current);
            }
            candidate = self.grid.offset(current, IVec3::Y);
        }
        None
    }
}
