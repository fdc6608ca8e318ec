//! Undo/Redo History for the Brick Editor
//!
//! A bounded, linear history of applied [`Command`]s with a cursor that
//! tracks the current position. Executing a new command after undoing
//! discards the redo branch.

use super::command::Command;
use super::state::EditorState;
use crate::bricks::BrickObjectId;
use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::error::EditorError;

// ============================================================================
// COMMAND HISTORY
// ============================================================================

#[derive(Debug, Clone)]
pub struct CommandHistory {
    /// Commands at `[0..cursor]` are undoable, `[cursor..len]` are redoable.
    commands: Vec<Command>,
    cursor: usize,
    max_size: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    /// Empty history holding up to [`DEFAULT_HISTORY_LIMIT`] commands.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(max_size: usize) -> Self {
        Self {
            commands: Vec::new(),
            cursor: 0,
            max_size: max_size.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.max_size
    }

    /// Apply `command` and record it.
    ///
    /// A rejected command is not recorded and the redo branch survives.
    /// Otherwise the redo branch is pruned and, past the limit, the oldest
    /// entry is dropped.
    pub fn execute(&mut self, state: &mut EditorState, mut command: Command) -> Result<(), EditorError> {
        command.apply(state)?;
        tracing::debug!(kind = command.kind(), object = ?command.object(), "command executed");

        self.commands.truncate(self.cursor);
        self.commands.push(command);

        if self.commands.len() > self.max_size {
            let excess = self.commands.len() - self.max_size;
            self.commands.drain(0..excess);
        }
        self.cursor = self.commands.len();
        Ok(())
    }

    /// True if any recorded command, undone or not, acts on `id`.
    pub fn references(&self, id: BrickObjectId) -> bool {
        self.commands.iter().any(|command| command.touches(id))
    }

    /// Revert the most recent command.
    pub fn undo(&mut self, state: &mut EditorState) -> Result<(), EditorError> {
        if self.cursor == 0 {
            return Err(EditorError::NothingToUndo);
        }
        let command = &mut self.commands[self.cursor - 1];
        command.revert(state)?;
        tracing::debug!(kind = command.kind(), object = ?command.object(), "command undone");
        self.cursor -= 1;
        Ok(())
    }

    /// Re-apply the next undone command.
    pub fn redo(&mut self, state: &mut EditorState) -> Result<(), EditorError> {
        if self.cursor >= self.commands.len() {
            return Err(EditorError::NothingToRedo);
        }
        let command = &mut self.commands[self.cursor];
        command.apply(state)?;
        tracing::debug!(kind = command.kind(), object = ?command.object(), "command redone");
        self.cursor += 1;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    pub fn redo_count(&self) -> usize {
        self.commands.len() - self.cursor
    }

    /// Forget all history. The editor state is left as it is.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
    }
}

// ============================================================================
// TESTS
// ============================================================================
