//! Node commands: drag moves, input order, scalar properties, resize,
//! operator switch.

use super::common::{Placement, apply_layout};
use super::{Direction, Reversible, Transition, count};
use eddy_core::{
    ChangeSet, Color, Diagram, DiagramError, EdgeId, EdgeList, Identity, Node, NodeId, NodeKind,
    Point, Size,
};
use std::collections::HashMap;

// ─── MoveNodes ───────────────────────────────────────────────────────────

/// Drag nodes to new positions.
///
/// Nodes carry their anchors along, and edges running between two moved
/// nodes carry their breakpoints. Both layouts are stored as absolute
/// coordinates, so undo lands exactly where the drag started.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveNodes {
    name: String,
    nodes: Vec<(NodeId, Transition<Placement>)>,
    edges: Vec<(EdgeId, Transition<Vec<Point>>)>,
}

impl MoveNodes {
    pub fn new(diagram: &Diagram, nodes: &[NodeId], delta: Point) -> Result<Self, DiagramError> {
        let mut moved: Vec<(NodeId, Transition<Placement>)> = Vec::new();
        for id in nodes {
            let node = diagram.node(*id).ok_or(DiagramError::UnknownNode(*id))?;
            if moved.iter().any(|(n, _)| n == id) {
                continue;
            }
            let before = Placement {
                pos: node.pos,
                anchors: node.anchors.clone(),
            };
            let after = before.shifted(delta);
            moved.push((*id, Transition::new(before, after)));
        }

        let mut edges: Vec<(EdgeId, Transition<Vec<Point>>)> = Vec::new();
        for (id, _) in &moved {
            let Some(node) = diagram.node(*id) else { continue };
            for edge in node.edges.iter().filter_map(|e| diagram.edge(*e)) {
                let carried = moved.iter().any(|(n, _)| *n == edge.source)
                    && moved.iter().any(|(n, _)| *n == edge.target);
                if carried && !edge.breakpoints.is_empty() && !edges.iter().any(|(e, _)| *e == edge.id) {
                    let shifted = edge.breakpoints.iter().map(|p| *p + delta).collect();
                    edges.push((edge.id, Transition::new(edge.breakpoints.clone(), shifted)));
                }
            }
        }

        let name = match moved.as_slice() {
            [(one, _)] => format!(
                "move {}",
                diagram.node(*one).map(|n| n.name()).unwrap_or_default()
            ),
            _ => format!("move {}", count(moved.len(), "node")),
        };
        Ok(Self {
            name,
            nodes: moved,
            edges,
        })
    }
}

impl Reversible for MoveNodes {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        apply_layout(diagram, &self.nodes, &self.edges, direction);
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

// ─── ChangeInputsOrder ───────────────────────────────────────────────────

/// Reorder the inputs of a role chain or property assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeInputsOrder {
    name: String,
    node: NodeId,
    inputs: Transition<EdgeList>,
}

impl ChangeInputsOrder {
    /// Fails unless `order` is a permutation of the node's current inputs.
    pub fn new(diagram: &Diagram, node: NodeId, order: &[EdgeId]) -> Result<Self, DiagramError> {
        let n = diagram.node(node).ok_or(DiagramError::UnknownNode(node))?;
        let mut current = n.inputs.to_vec();
        let mut wanted = order.to_vec();
        current.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        wanted.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        if current != wanted {
            return Err(DiagramError::InputsMismatch { node });
        }
        Ok(Self {
            name: format!("change {} inputs order", n.name()),
            node,
            inputs: Transition::new(n.inputs.clone(), order.iter().copied().collect()),
        })
    }
}

impl Reversible for ChangeInputsOrder {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        diagram.set_inputs(self.node, self.inputs.get(direction));
        diagram.update_edges_of(self.node);
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

// ─── SetProperty ─────────────────────────────────────────────────────────

/// A scalar node attribute with no effect on topology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeProperty {
    Brush(Color),
    /// Z value.
    Depth(f64),
    FontSize(u32),
    /// Custom label position, `None` for the default placement.
    LabelPos(Option<Point>),
}

impl NodeProperty {
    /// Current value on `node` of the same property as `self`.
    fn read(&self, node: &Node) -> NodeProperty {
        match self {
            NodeProperty::Brush(_) => NodeProperty::Brush(node.brush),
            NodeProperty::Depth(_) => NodeProperty::Depth(node.z),
            NodeProperty::FontSize(_) => NodeProperty::FontSize(node.font_size),
            NodeProperty::LabelPos(_) => NodeProperty::LabelPos(node.text_pos),
        }
    }

    fn write(&self, node: &mut Node) {
        match *self {
            NodeProperty::Brush(color) => node.brush = color,
            NodeProperty::Depth(z) => node.z = z,
            NodeProperty::FontSize(size) => node.font_size = size,
            NodeProperty::LabelPos(pos) => node.text_pos = pos,
        }
    }
}

/// Set one property on a batch of nodes, remembering each node's old value.
#[derive(Debug, Clone, PartialEq)]
pub struct SetProperty {
    name: String,
    values: Vec<(NodeId, Transition<NodeProperty>)>,
}

impl SetProperty {
    pub fn new(diagram: &Diagram, nodes: &[NodeId], value: NodeProperty, name: &str) -> Result<Self, DiagramError> {
        let mut values: Vec<(NodeId, Transition<NodeProperty>)> = Vec::new();
        for id in nodes {
            let node = diagram.node(*id).ok_or(DiagramError::UnknownNode(*id))?;
            if !values.iter().any(|(n, _)| n == id) {
                values.push((*id, Transition::new(value.read(node), value)));
            }
        }
        Ok(Self {
            name: name.to_string(),
            values,
        })
    }

    pub fn brush(diagram: &Diagram, nodes: &[NodeId], color: Color) -> Result<Self, DiagramError> {
        let name = format!("set {} brush on {}", color.to_hex(), count(nodes.len(), "node"));
        Self::new(diagram, nodes, NodeProperty::Brush(color), &name)
    }

    pub fn depth(diagram: &Diagram, node: NodeId, z: f64) -> Result<Self, DiagramError> {
        let n = diagram.node(node).ok_or(DiagramError::UnknownNode(node))?;
        let name = format!("change {} depth", n.name());
        Self::new(diagram, &[node], NodeProperty::Depth(z), &name)
    }

    pub fn font_size(diagram: &Diagram, nodes: &[NodeId], size: u32) -> Result<Self, DiagramError> {
        let name = format!("set {size} font size on {}", count(nodes.len(), "node"));
        Self::new(diagram, nodes, NodeProperty::FontSize(size), &name)
    }

    pub fn label_pos(diagram: &Diagram, node: NodeId, pos: Option<Point>) -> Result<Self, DiagramError> {
        let n = diagram.node(node).ok_or(DiagramError::UnknownNode(node))?;
        let name = format!("move {} label", n.name());
        Self::new(diagram, &[node], NodeProperty::LabelPos(pos), &name)
    }
}

impl Reversible for SetProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        for (id, value) in &self.values {
            let value = value.get(direction);
            if let Some(node) = diagram.node_mut(*id) {
                value.write(node);
            }
            if matches!(value, NodeProperty::Depth(_)) {
                diagram.update_edges_of(*id);
            }
        }
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

// ─── ResizeNode ──────────────────────────────────────────────────────────

/// Change a node's size. Anchors scale with the box around the node centre.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeNode {
    name: String,
    node: NodeId,
    sizes: Transition<Size>,
    anchors: Transition<HashMap<EdgeId, Point>>,
}

impl ResizeNode {
    pub fn new(diagram: &Diagram, node: NodeId, size: Size) -> Result<Self, DiagramError> {
        let n = diagram.node(node).ok_or(DiagramError::UnknownNode(node))?;
        let scale = |new: f64, old: f64| if old == 0.0 { 1.0 } else { new / old };
        let (sx, sy) = (scale(size.width, n.size.width), scale(size.height, n.size.height));
        let scaled = n
            .anchors
            .iter()
            .map(|(edge, p)| {
                let offset = *p - n.pos;
                (*edge, n.pos + Point::new(offset.x * sx, offset.y * sy))
            })
            .collect();
        Ok(Self {
            name: format!("resize {}", n.name()),
            node,
            sizes: Transition::new(n.size, size),
            anchors: Transition::new(n.anchors.clone(), scaled),
        })
    }
}

impl Reversible for ResizeNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        if let Some(node) = diagram.node_mut(self.node) {
            node.size = *self.sizes.get(direction);
            node.anchors = self.anchors.get(direction).clone();
        }
        diagram.update_edges_of(self.node);
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

// ─── SwitchNode ──────────────────────────────────────────────────────────

/// Replace an operator node with another one (e.g. union → intersection).
///
/// The replacement takes over every anchor, edge and input of the original,
/// which is left fully detached. Exactly one of the two is live at any time.
/// Redo identifies the replacement; undo writes back the identities both
/// nodes and their weak neighbours had when the command was built.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchNode {
    name: String,
    nodes: Transition<NodeId>,
    identities: Vec<(NodeId, Identity)>,
}

impl SwitchNode {
    pub fn new(diagram: &Diagram, from: NodeId, to: NodeId) -> Result<Self, DiagramError> {
        let old = diagram.node(from).ok_or(DiagramError::UnknownNode(from))?;
        let new = diagram.node(to).ok_or(DiagramError::UnknownNode(to))?;
        if !diagram.contains_node(from) {
            return Err(DiagramError::NotLive(from.into()));
        }
        if diagram.contains_node(to) {
            return Err(DiagramError::AlreadyLive(to.into()));
        }
        Ok(Self {
            name: format!("switch {} to {}", old.name(), new.name()),
            nodes: Transition::new(from, to),
            identities: diagram.identities_near(&[from, to]),
        })
    }

    /// Create the detached node that will replace `from`, placed like it.
    pub fn replacement(diagram: &mut Diagram, from: NodeId, kind: NodeKind) -> Result<NodeId, DiagramError> {
        let old = diagram.node(from).ok_or(DiagramError::UnknownNode(from))?;
        let (pos, z) = (old.pos, old.z);
        let id = diagram.create_node(kind, pos);
        if let Some(node) = diagram.node_mut(id) {
            node.z = z;
        }
        Ok(id)
    }
}

impl Reversible for SwitchNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let (old, new) = match direction {
            Direction::Redo => (self.nodes.undo, self.nodes.redo),
            Direction::Undo => (self.nodes.redo, self.nodes.undo),
        };
        assert!(
            diagram.contains_node(old) && !diagram.contains_node(new),
            "switching {old} to {new}: exactly the first must be in the diagram"
        );
        let mut changes = ChangeSet::new();

        diagram.add_node(new);
        changes.added(new);

        let (anchors, edges, inputs) = match diagram.node_mut(old) {
            Some(node) => (
                std::mem::take(&mut node.anchors),
                std::mem::take(&mut node.edges),
                std::mem::take(&mut node.inputs),
            ),
            None => Default::default(),
        };
        if let Some(node) = diagram.node_mut(new) {
            node.anchors.extend(anchors);
            node.inputs = inputs;
        }
        for &id in &edges {
            if let Some(edge) = diagram.edge_mut(id) {
                if edge.source == old {
                    edge.source = new;
                }
                if edge.target == old {
                    edge.target = new;
                }
                edge.anchors.clear();
            }
            if let Some(node) = diagram.node_mut(new) {
                node.add_edge(id);
            }
            diagram.update_edge(id);
        }

        match direction {
            Direction::Redo => {
                diagram.identify(new);
            }
            Direction::Undo => diagram.restore_identities(&self.identities),
        }
        changes.identified(new);

        diagram.remove_node(old);
        changes.removed(old);
        changes.updated();
        changes
    }
}
