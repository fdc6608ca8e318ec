//! Editor Tools
//!
//! Tool selection for the editor. Pointing a tool at a cell turns into at
//! most one recorded [`Command`].

use super::Editor;
use super::command::Command;
use crate::bricks::BrickObjectId;
use crate::error::{EditorError, PlaceError};
use crate::world::Cell;

/// Active pointer tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTool {
    /// Place the current brick
    #[default]
    Build,
    /// Remove the brick under the pointer
    Erase,
    /// Repaint the brick under the pointer with the current color
    Paint,
    /// Pick a brick without changing anything
    Select,
}

impl EditorTool {
    pub const ALL: [EditorTool; 4] = [
        EditorTool::Build,
        EditorTool::Erase,
        EditorTool::Paint,
        EditorTool::Select,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EditorTool::Build => "build",
            EditorTool::Erase => "erase",
            EditorTool::Paint => "paint",
            EditorTool::Select => "select",
        }
    }
}

/// What pointing a tool at a cell did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Built(BrickObjectId),
    Removed(BrickObjectId),
    Painted(BrickObjectId),
    Selected(Option<BrickObjectId>),
    /// Erase or paint pointed at an empty cell.
    Nothing,
}

impl Editor {
    /// Apply the active tool to `cell`.
    ///
    /// Build climbs the column to the first valid cell, then hands the
    /// session a fresh current brick with the same type, color and pose.
    pub fn select(&mut self, cell: Cell) -> Result<ToolOutcome, EditorError> {
        match self.tool {
            EditorTool::Build => {
                let current = self.current.ok_or(EditorError::NoCurrentBrick)?;
                let Some(target) = self.state.valid_cell(current, cell) else {
                    return Err(self
                        .state
                        .validate_placement(current, cell)
                        .err()
                        .unwrap_or(EditorError::Placement(PlaceError::OutOfBounds)));
                };
                self.execute_command(Command::build(current, target))?;
                self.spawn_next_brick(current)?;
                Ok(ToolOutcome::Built(current))
            }
            EditorTool::Erase => {
                let Some(id) = self.state.brick_object_at(cell) else {
                    return Ok(ToolOutcome::Nothing);
                };
                self.execute_command(Command::remove(id))?;
                Ok(ToolOutcome::Removed(id))
            }
            EditorTool::Paint => {
                let color_id = self.current_color()?;
                let Some(id) = self.state.brick_object_at(cell) else {
                    return Ok(ToolOutcome::Nothing);
                };
                self.execute_command(Command::paint(id, color_id))?;
                Ok(ToolOutcome::Painted(id))
            }
            EditorTool::Select => {
                self.selected = self.state.brick_object_at(cell);
                Ok(ToolOutcome::Selected(self.selected))
            }
        }
    }

    /// Cells to highlight while the pointer rests on `cell`.
    ///
    /// Build previews the current brick where it would land; the other tools
    /// outline the brick under the pointer.
    pub fn highlight(&self, cell: Cell) -> Option<Vec<Cell>> {
        match self.tool {
            EditorTool::Build => {
                let current = self.current?;
                let target = self.state.valid_cell(current, cell)?;
                self.state.object(current)?.occupied_cells_at(self.state.grid(), target)
            }
            EditorTool::Erase | EditorTool::Paint | EditorTool::Select => {
                let id = self.state.brick_object_at(cell)?;
                self.state.occupied_cells(id).map(<[Cell]>::to_vec)
            }
        }
    }

    fn spawn_next_brick(&mut self, template: BrickObjectId) -> Result<(), EditorError> {
        let (type_id, color_id, rotation, pose) = {
            let object = self.state.object_ref(template)?;
            (
                object.brick_type().id,
                object.color().id,
                object.rotation(),
                object.pose(),
            )
        };
        let next = self.state.create_brick_object(type_id, color_id)?;
        self.state.rotate_brick_object(next, rotation.degrees() / 90)?;
        self.state
            .set_brick_object_pivot(next, pose.pivot_x, pose.pivot_z)?;
        self.replace_current(next);
        Ok(())
    }
}
