//! A diagram together with its own undo stack and listeners.

use crate::clipboard::Clipboard;
use crate::commands::{Command, SnapToGrid};
use crate::config::EditorConfig;
use crate::stack::CommandStack;
use eddy_core::{ChangeSet, Diagram, DiagramError, DiagramEvent, ItemId, NodeId, Point};
use std::fmt;

/// What listeners are told after a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    ItemAdded(ItemId),
    ItemRemoved(ItemId),
    NodeIdentified(NodeId),
    Updated,
    /// The document moved onto (`true`) or off (`false`) its saved state.
    CleanChanged(bool),
}

impl From<DiagramEvent> for Notification {
    fn from(event: DiagramEvent) -> Self {
        match event {
            DiagramEvent::ItemAdded(item) => Notification::ItemAdded(item),
            DiagramEvent::ItemRemoved(item) => Notification::ItemRemoved(item),
            DiagramEvent::NodeIdentified(node) => Notification::NodeIdentified(node),
            DiagramEvent::Updated => Notification::Updated,
        }
    }
}

type Listener = Box<dyn FnMut(&Diagram, &Notification)>;

pub struct Document {
    diagram: Diagram,
    stack: CommandStack,
    listeners: Vec<Listener>,
    config: EditorConfig,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("diagram", &self.diagram.name)
            .field("stack", &self.stack)
            .field("listeners", &self.listeners.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Document {
    pub fn new(diagram: Diagram, config: EditorConfig) -> Self {
        let mut diagram = diagram;
        diagram.paste_offset = config.paste_offset;
        Self {
            stack: CommandStack::new(config.undo_limit),
            diagram,
            listeners: Vec::new(),
            config,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Direct access for building commands that need to allocate items.
    /// Mutations made here bypass the undo stack.
    pub fn diagram_mut(&mut self) -> &mut Diagram {
        &mut self.diagram
    }

    pub fn stack(&self) -> &CommandStack {
        &self.stack
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Diagram, &Notification) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ─── Commands ────────────────────────────────────────────────────────

    pub fn push(&mut self, command: impl Into<Command>) {
        let was_clean = self.stack.is_clean();
        let changes = self.stack.push(&mut self.diagram, command);
        self.notify(changes, was_clean);
    }

    /// Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let was_clean = self.stack.is_clean();
        match self.stack.undo(&mut self.diagram) {
            Some(changes) => {
                self.notify(changes, was_clean);
                true
            }
            None => false,
        }
    }

    /// Returns false when there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let was_clean = self.stack.is_clean();
        match self.stack.redo(&mut self.diagram) {
            Some(changes) => {
                self.notify(changes, was_clean);
                true
            }
            None => false,
        }
    }

    pub fn begin_macro(&mut self, name: &str) {
        self.stack.begin_macro(name);
    }

    pub fn end_macro(&mut self) {
        let was_clean = self.stack.is_clean();
        self.stack.end_macro();
        self.notify(ChangeSet::new(), was_clean);
    }

    pub fn set_clean(&mut self) {
        let was_clean = self.stack.is_clean();
        self.stack.set_clean();
        self.notify(ChangeSet::new(), was_clean);
    }

    pub fn is_clean(&self) -> bool {
        self.stack.is_clean()
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Paste the clipboard as one undo step. With no `pos` the copy is
    /// offset from the previous paste.
    pub fn paste(&mut self, clipboard: &Clipboard, pos: Option<Point>) -> Result<(), DiagramError> {
        let command = clipboard.paste(&mut self.diagram, pos, self.config.paste_offset)?;
        self.push(command);
        Ok(())
    }

    /// Snap the selection (or the whole diagram when nothing is selected) to
    /// the configured grid. Returns false when everything was already on it.
    pub fn snap_to_grid(&mut self) -> Result<bool, DiagramError> {
        let grid = self.config.grid_size;
        let selection = self.diagram.selected_items();
        let command = if selection.is_empty() {
            SnapToGrid::all(&self.diagram, grid)
        } else {
            SnapToGrid::new(&self.diagram, &selection, grid)?
        };
        if command.is_empty() {
            return Ok(false);
        }
        self.push(command);
        Ok(true)
    }

    fn notify(&mut self, changes: ChangeSet, was_clean: bool) {
        let clean = self.stack.is_clean();
        for event in changes.events {
            let notification = Notification::from(event);
            for listener in &mut self.listeners {
                listener(&self.diagram, &notification);
            }
        }
        if clean != was_clean {
            log::debug!("{}: clean = {clean}", self.diagram.name);
            let notification = Notification::CleanChanged(clean);
            for listener in &mut self.listeners {
                listener(&self.diagram, &notification);
            }
        }
    }
}
