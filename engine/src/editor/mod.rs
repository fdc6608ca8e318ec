//! Editor Module
//!
//! The brick editing session: occupancy state, placement validation,
//! grouping and gravity, reversible commands and their bounded history.

pub mod command;
pub mod connectivity;
pub mod placement;
pub mod state;
pub mod tools;
pub mod undo;

pub use command::Command;
pub use connectivity::{are_adjacent, collect_group, connected_components, is_face_adjacent, neighbors6};
pub use placement::has_footing;
pub use state::{CellSnapshot, EditorState};
pub use tools::{EditorTool, ToolOutcome};
pub use undo::CommandHistory;

use crate::bricks::{BrickCatalog, BrickObjectId, BrickPalette, Design, Rotation};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::world::Cell;

/// One editing session: state, history, and the pointer tool's context.
#[derive(Debug, Clone)]
pub struct Editor {
    state: EditorState,
    history: CommandHistory,
    tool: EditorTool,
    /// Unbuilt brick the build tool places next.
    current: Option<BrickObjectId>,
    selected: Option<BrickObjectId>,
}

impl Editor {
    pub fn new(state: EditorState, history: CommandHistory) -> Self {
        Self {
            state,
            history,
            tool: EditorTool::default(),
            current: None,
            selected: None,
        }
    }

    pub fn from_config(config: &EditorConfig, catalog: BrickCatalog, palette: BrickPalette) -> Self {
        Self::new(
            EditorState::from_config(config, catalog, palette),
            CommandHistory::with_limit(config.history_limit),
        )
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn tool(&self) -> EditorTool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: EditorTool) {
        self.tool = tool;
    }

    pub fn current_brick(&self) -> Option<BrickObjectId> {
        self.current
    }

    pub fn selected(&self) -> Option<BrickObjectId> {
        self.selected
    }

    /// Run a command and record it for undo.
    pub fn execute_command(&mut self, command: Command) -> Result<(), EditorError> {
        self.history.execute(&mut self.state, command)
    }

    pub fn undo(&mut self) -> Result<(), EditorError> {
        self.history.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        self.history.redo(&mut self.state)
    }

    /// Create an unbuilt object outside the history, ready to be built.
    pub fn create_brick_object(&mut self, type_id: u32, color_id: u32) -> Result<BrickObjectId, EditorError> {
        self.state.create_brick_object(type_id, color_id)
    }

    pub fn build_brick_object(&mut self, id: BrickObjectId, cell: Cell) -> Result<(), EditorError> {
        self.execute_command(Command::build(id, cell))
    }

    pub fn remove_brick_object(&mut self, id: BrickObjectId) -> Result<(), EditorError> {
        self.execute_command(Command::remove(id))
    }

    pub fn paint_brick_object(&mut self, id: BrickObjectId, color_id: u32) -> Result<(), EditorError> {
        self.execute_command(Command::paint(id, color_id))
    }

    pub fn move_brick_object(&mut self, id: BrickObjectId, cell: Cell) -> Result<(), EditorError> {
        self.execute_command(Command::move_to(id, cell))
    }

    /// Pick the brick the build tool places next.
    ///
    /// An unbuilt current brick that no recorded command refers to is
    /// discarded.
    pub fn set_current_brick(&mut self, type_id: u32, color_id: u32) -> Result<BrickObjectId, EditorError> {
        let id = self.state.create_brick_object(type_id, color_id)?;
        self.replace_current(id);
        Ok(id)
    }

    pub(crate) fn replace_current(&mut self, next: BrickObjectId) {
        if let Some(previous) = self.current.replace(next)
            && previous != next
            && !self.state.is_built(previous)
            && !self.history.references(previous)
        {
            if let Err(err) = self.state.discard_brick_object(previous) {
                tracing::warn!(object = ?previous, error = %err, "stale current brick kept");
            }
            if self.selected == Some(previous) {
                self.selected = None;
            }
        }
    }

    fn current_id(&self) -> Result<BrickObjectId, EditorError> {
        self.current.ok_or(EditorError::NoCurrentBrick)
    }

    /// Color used by the build and paint tools.
    pub fn current_color(&self) -> Result<u32, EditorError> {
        Ok(self.state.object_ref(self.current_id()?)?.color().id)
    }

    /// Recolor the current brick; not recorded since it is not built.
    pub fn set_current_color(&mut self, color_id: u32) -> Result<(), EditorError> {
        let id = self.current_id()?;
        self.state.paint_brick_object(id, color_id)?;
        Ok(())
    }

    pub fn rotate_current(&mut self, quarter_turns: i32) -> Result<Rotation, EditorError> {
        let id = self.current_id()?;
        self.state.rotate_brick_object(id, quarter_turns)
    }

    pub fn set_current_pivot(&mut self, pivot_x: i32, pivot_z: i32) -> Result<bool, EditorError> {
        let id = self.current_id()?;
        self.state.set_brick_object_pivot(id, pivot_x, pivot_z)
    }

    /// Replace the session with a saved design. History starts over.
    pub fn load_design(&mut self, design: &Design) -> Result<Vec<BrickObjectId>, EditorError> {
        let ids = self.state.load_design(design)?;
        self.history.clear();
        self.current = None;
        self.selected = None;
        Ok(ids)
    }

    pub fn to_design(&self) -> Design {
        self.state.to_design()
    }
}
