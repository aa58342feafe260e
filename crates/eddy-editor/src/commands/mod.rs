//! Reversible diagram commands.
//!
//! A command is plain data captured when it is built: everything either
//! direction needs is computed up front, before the first redo runs, so
//! applying it never has to guess what the diagram looked like before.
//! Both directions go through one [`Reversible::apply`] entry point and
//! report what they touched as a [`ChangeSet`].

mod common;
mod edges;
mod labels;
mod nodes;

pub use common::{AddItems, AddNode, ComposeAxiom, RemoveItems, SnapToGrid, TranslateItems};
pub use edges::{
    AddEdge, AnchorMove, BreakpointAdd, BreakpointMove, BreakpointRemove, SwapEdges,
    SwitchEdgeKind, ToggleEdgeFlag,
};
pub use labels::{LabelChange, SetMeta};
pub use nodes::{
    ChangeInputsOrder, MoveNodes, NodeProperty, ResizeNode, SetProperty, SwitchNode,
};

use eddy_core::{ChangeSet, Diagram, EdgeId, EdgeList, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// A value captured for both directions of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<T> {
    pub undo: T,
    pub redo: T,
}

impl<T> Transition<T> {
    pub fn new(undo: T, redo: T) -> Self {
        Self { undo, redo }
    }

    pub fn get(&self, direction: Direction) -> &T {
        match direction {
            Direction::Undo => &self.undo,
            Direction::Redo => &self.redo,
        }
    }
}

/// Input orders to restore per ordered-input node, in application order.
pub type InputLists = Vec<(NodeId, Transition<EdgeList>)>;

/// Write the captured input order of every node and reroute its edges.
pub(crate) fn apply_inputs(diagram: &mut Diagram, lists: &InputLists, direction: Direction) {
    for (node, lists) in lists {
        diagram.set_inputs(*node, lists.get(direction));
        diagram.update_edges_of(*node);
    }
}

/// Input orders of ordered-input nodes once `edges` get attached.
///
/// Undo keeps the current list; redo appends every listed input edge
/// targeting the node that is not in the list yet, in the given order.
pub(crate) fn inputs_after_attach(
    diagram: &Diagram,
    nodes: &[NodeId],
    edges: &[EdgeId],
) -> InputLists {
    let mut affected: Vec<NodeId> = nodes.to_vec();
    for edge in edges.iter().filter_map(|e| diagram.edge(*e)) {
        if edge.kind == eddy_core::EdgeKind::Input && !affected.contains(&edge.target) {
            affected.push(edge.target);
        }
    }
    affected
        .into_iter()
        .filter_map(|id| diagram.node(id))
        .filter(|n| n.kind.has_ordered_inputs())
        .map(|node| {
            let mut redo = node.inputs.clone();
            for edge in edges.iter().filter_map(|e| diagram.edge(*e)) {
                if edge.kind == eddy_core::EdgeKind::Input
                    && edge.target == node.id
                    && !redo.contains(&edge.id)
                {
                    redo.push(edge.id);
                }
            }
            (node.id, Transition::new(node.inputs.clone(), redo))
        })
        .collect()
}

/// `1 item`, `3 items`.
pub(crate) fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Something that can be applied to a diagram in either direction.
pub trait Reversible {
    /// Readable name shown in undo/redo menus.
    fn name(&self) -> &str;

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet;

    fn redo(&self, diagram: &mut Diagram) -> ChangeSet {
        self.apply(diagram, Direction::Redo)
    }

    fn undo(&self, diagram: &mut Diagram) -> ChangeSet {
        self.apply(diagram, Direction::Undo)
    }
}

macro_rules! commands {
    ($($variant:ident),* $(,)?) => {
        /// Every command the editor can put on an undo stack.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Command {
            $($variant($variant),)*
        }

        impl Reversible for Command {
            fn name(&self) -> &str {
                match self {
                    $(Command::$variant(c) => c.name(),)*
                }
            }

            fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
                match self {
                    $(Command::$variant(c) => c.apply(diagram, direction),)*
                }
            }
        }

        $(
            impl From<$variant> for Command {
                fn from(command: $variant) -> Self {
                    Command::$variant(command)
                }
            }
        )*
    };
}

commands! {
    AddNode,
    AddItems,
    RemoveItems,
    TranslateItems,
    SnapToGrid,
    ComposeAxiom,
    MoveNodes,
    AddEdge,
    BreakpointAdd,
    BreakpointRemove,
    BreakpointMove,
    AnchorMove,
    SwapEdges,
    ToggleEdgeFlag,
    SwitchEdgeKind,
    ChangeInputsOrder,
    SetProperty,
    ResizeNode,
    SwitchNode,
    LabelChange,
    SetMeta,
    Composite,
}

// ─── Composite ───────────────────────────────────────────────────────────

/// Ordered group of commands applied as one step: children run in order on
/// redo and in reverse order on undo.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    name: String,
    children: Vec<Command>,
}

impl Composite {
    pub fn new(name: &str, children: Vec<Command>) -> Self {
        Self {
            name: name.to_string(),
            children,
        }
    }

    pub fn push(&mut self, command: impl Into<Command>) {
        self.children.push(command.into());
    }

    pub fn children(&self) -> &[Command] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }
}

impl Reversible for Composite {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let mut changes = ChangeSet::new();
        match direction {
            Direction::Redo => {
                for child in &self.children {
                    changes.extend(child.apply(diagram, direction));
                }
            }
            Direction::Undo => {
                for child in self.children.iter().rev() {
                    changes.extend(child.apply(diagram, direction));
                }
            }
        }
        changes.updated();
        changes
    }
}

/// Rename every node sharing the predicate `(kind, old)` to `new`, as a
/// single undo step.
pub fn refactor(diagram: &Diagram, kind: NodeKind, old: &str, new: &str) -> Composite {
    let children = diagram
        .predicate_nodes(kind, old)
        .into_iter()
        .filter_map(|node| LabelChange::refactoring(diagram, node, new).ok())
        .map(Command::from)
        .collect();
    Composite::new(&format!("refactor {kind} '{old}' to '{new}'"), children)
}
