//! Undo stack: a list of applied commands with a cursor.
//!
//! Commands below the cursor are applied; commands at or above it have been
//! undone and can be redone until the next push truncates them.

use crate::commands::{Command, Composite, Reversible};
use eddy_core::{ChangeSet, Diagram};

#[derive(Debug)]
pub struct CommandStack {
    commands: Vec<Command>,
    /// Number of applied commands.
    cursor: usize,
    /// Cursor position the document was last saved at.
    clean: Option<usize>,
    /// Maximum number of kept commands (0 = unlimited).
    limit: usize,
    /// Macro being recorded, if any.
    recording: Option<Composite>,
}

impl CommandStack {
    pub fn new(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            cursor: 0,
            clean: Some(0),
            limit,
            recording: None,
        }
    }

    /// Apply a command and make it the newest undo step.
    ///
    /// While a macro is being recorded the command is applied and buffered
    /// into the macro instead.
    pub fn push(&mut self, diagram: &mut Diagram, command: impl Into<Command>) -> ChangeSet {
        let command = command.into();
        let changes = command.redo(diagram);

        if let Some(recording) = self.recording.as_mut() {
            log::trace!("macro '{}' += {}", recording.name(), command.name());
            recording.push(command);
            return changes;
        }

        self.append(command);
        changes
    }

    fn append(&mut self, command: Command) {
        log::debug!("push: {}", command.name());
        self.commands.truncate(self.cursor);
        if self.clean.is_some_and(|clean| clean > self.cursor) {
            self.clean = None;
        }
        self.commands.push(command);
        self.cursor = self.commands.len();

        if self.limit > 0 && self.commands.len() > self.limit {
            let evicted = self.commands.remove(0);
            log::debug!("evict: {}", evicted.name());
            self.cursor -= 1;
            self.clean = self.clean.and_then(|clean| clean.checked_sub(1));
        }
    }

    /// Undo the last applied command. Returns `None` when nothing is left.
    pub fn undo(&mut self, diagram: &mut Diagram) -> Option<ChangeSet> {
        assert!(self.recording.is_none(), "undo while recording a macro");
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        let command = &self.commands[self.cursor];
        log::debug!("undo: {}", command.name());
        Some(command.undo(diagram))
    }

    /// Redo the next undone command. Returns `None` when nothing is left.
    pub fn redo(&mut self, diagram: &mut Diagram) -> Option<ChangeSet> {
        assert!(self.recording.is_none(), "redo while recording a macro");
        let command = self.commands.get(self.cursor)?;
        log::debug!("redo: {}", command.name());
        let changes = command.redo(diagram);
        self.cursor += 1;
        Some(changes)
    }

    /// Start grouping subsequent pushes into a single undo step.
    pub fn begin_macro(&mut self, name: &str) {
        assert!(self.recording.is_none(), "nested macro '{name}'");
        log::debug!("begin macro: {name}");
        self.recording = Some(Composite::new(name, Vec::new()));
    }

    /// Commit the recorded macro. Its children were already applied as they
    /// were pushed, so it is stored without being replayed. An empty macro
    /// leaves no undo entry.
    pub fn end_macro(&mut self) {
        let Some(recording) = self.recording.take() else {
            log::warn!("end_macro without begin_macro");
            return;
        };
        if recording.is_empty() {
            log::debug!("drop empty macro: {}", recording.name());
            return;
        }
        self.append(recording.into());
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    // ─── Clean state ─────────────────────────────────────────────────────

    /// Mark the current position as the saved state.
    pub fn set_clean(&mut self) {
        self.clean = Some(self.cursor);
    }

    pub fn is_clean(&self) -> bool {
        self.clean == Some(self.cursor)
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Name of the command the next undo would revert.
    pub fn undo_text(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(|c| c.name())
    }

    /// Name of the command the next redo would apply.
    pub fn redo_text(&self) -> Option<&str> {
        self.commands.get(self.cursor).map(|c| c.name())
    }

    pub fn index(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}
