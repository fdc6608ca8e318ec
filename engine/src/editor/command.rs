//! Reversible edit commands.
//!
//! Every mutating editor operation is wrapped in a [`Command`] before it is
//! recorded in the history. A command that can move *other* bricks (through
//! below-floor insertion or gravity) takes a snapshot of every built anchor
//! before acting, and undo replays only the anchors that actually changed.

use super::state::{CellSnapshot, EditorState};
use crate::bricks::BrickObjectId;
use crate::error::EditorError;
use crate::world::Cell;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Build `object` at `cell`. Undo destroys it and puts back anything it shifted.
    Build {
        object: BrickObjectId,
        cell: Cell,
        snapshot: Option<CellSnapshot>,
    },
    /// Destroy `object` and settle the model. Undo rebuilds it where it stood.
    Remove {
        object: BrickObjectId,
        cell: Option<Cell>,
        snapshot: Option<CellSnapshot>,
    },
    /// Swap the color of `object`.
    Paint {
        object: BrickObjectId,
        color_id: u32,
        previous: Option<u32>,
    },
    /// Re-anchor a built `object` at `to` and settle the model.
    Move {
        object: BrickObjectId,
        to: Cell,
        snapshot: Option<CellSnapshot>,
    },
    /// Ordered composite; undone in reverse order.
    Chain(Vec<Command>),
}

impl Command {
    pub fn build(object: BrickObjectId, cell: Cell) -> Self {
        Command::Build {
            object,
            cell,
            snapshot: None,
        }
    }

    pub fn remove(object: BrickObjectId) -> Self {
        Command::Remove {
            object,
            cell: None,
            snapshot: None,
        }
    }

    pub fn paint(object: BrickObjectId, color_id: u32) -> Self {
        Command::Paint {
            object,
            color_id,
            previous: None,
        }
    }

    pub fn move_to(object: BrickObjectId, to: Cell) -> Self {
        Command::Move {
            object,
            to,
            snapshot: None,
        }
    }

    pub fn chain(commands: impl IntoIterator<Item = Command>) -> Self {
        Command::Chain(commands.into_iter().collect())
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Build { .. } => "build",
            Command::Remove { .. } => "remove",
            Command::Paint { .. } => "paint",
            Command::Move { .. } => "move",
            Command::Chain(_) => "chain",
        }
    }

    /// Object this command acts on; `None` for chains.
    pub fn object(&self) -> Option<BrickObjectId> {
        match self {
            Command::Build { object, .. }
            | Command::Remove { object, .. }
            | Command::Paint { object, .. }
            | Command::Move { object, .. } => Some(*object),
            Command::Chain(_) => None,
        }
    }

    /// True if this command, or any step of a chain, acts on `id`.
    pub fn touches(&self, id: BrickObjectId) -> bool {
        match self {
            Command::Chain(steps) => steps.iter().any(|step| step.touches(id)),
            _ => self.object() == Some(id),
        }
    }

    /// Perform the edit, recording whatever undo needs.
    ///
    /// A failing chain rolls back the steps it already applied, so an error
    /// always leaves the state as it was.
    pub fn apply(&mut self, state: &mut EditorState) -> Result<(), EditorError> {
        match self {
            Command::Build {
                object,
                cell,
                snapshot,
            } => {
                let before = state.snapshot_cells();
                state.build_brick_object(*object, *cell)?;
                *snapshot = Some(before);
            }
            Command::Remove {
                object,
                cell,
                snapshot,
            } => {
                let anchor = state.object_ref(*object)?.cell();
                let before = state.snapshot_cells();
                state.remove_brick_object(*object)?;
                *cell = anchor;
                *snapshot = Some(before);
            }
            Command::Paint {
                object,
                color_id,
                previous,
            } => {
                *previous = Some(state.paint_brick_object(*object, *color_id)?);
            }
            Command::Move {
                object,
                to,
                snapshot,
            } => {
                let before = state.snapshot_cells();
                state.move_brick_object(*object, *to)?;
                *snapshot = Some(before);
            }
            Command::Chain(commands) => {
                for applied in 0..commands.len() {
                    if let Err(err) = commands[applied].apply(state) {
                        for done in commands[..applied].iter_mut().rev() {
                            if let Err(rollback) = done.revert(state) {
                                tracing::warn!(%rollback, kind = done.kind(), "chain rollback failed");
                            }
                        }
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    /// Reverse a previously applied edit.
    pub fn revert(&mut self, state: &mut EditorState) -> Result<(), EditorError> {
        match self {
            Command::Build {
                object, snapshot, ..
            } => {
                state.destroy_brick_object(*object)?;
                if let Some(before) = snapshot {
                    state.restore_snapshot(before)?;
                }
            }
            Command::Remove {
                object,
                cell,
                snapshot,
            } => {
                if let Some(before) = snapshot {
                    state.restore_snapshot(before)?;
                }
                let cell = cell.ok_or(EditorError::NotBuilt(*object))?;
                state.restore_brick_object(*object, cell)?;
            }
            Command::Paint {
                object, previous, ..
            } => {
                if let Some(previous) = previous {
                    state.paint_brick_object(*object, *previous)?;
                }
            }
            Command::Move { snapshot, .. } => {
                if let Some(before) = snapshot {
                    state.restore_snapshot(before)?;
                }
            }
            Command::Chain(commands) => {
                for command in commands.iter_mut().rev() {
                    command.revert(state)?;
                }
            }
        }
        Ok(())
    }
}
