//! Edge commands: creation, routing points, endpoint swaps and flags.

use super::{Direction, InputLists, Reversible, Transition, apply_inputs, count};
use eddy_core::{
    ChangeSet, Diagram, DiagramError, EdgeFlag, EdgeId, EdgeKind, EdgeList, Identity, NodeId,
    Point,
};

fn edge_name(diagram: &Diagram, edge: EdgeId) -> Result<String, DiagramError> {
    diagram
        .edge(edge)
        .map(|e| e.name())
        .ok_or(DiagramError::UnknownEdge(edge))
}

// ─── AddEdge ─────────────────────────────────────────────────────────────

/// Put a detached edge into the scene.
///
/// Building the command registers the edge with both endpoints and routes
/// it right away: an ordered-input target must already list the edge so
/// the resulting input order can be captured.
#[derive(Debug, Clone, PartialEq)]
pub struct AddEdge {
    name: String,
    edge: EdgeId,
    target: NodeId,
    inputs: Option<Transition<EdgeList>>,
}

impl AddEdge {
    pub fn new(diagram: &mut Diagram, edge: EdgeId) -> Result<Self, DiagramError> {
        let name = format!("add {}", edge_name(diagram, edge)?);
        diagram.attach_edge(edge);
        diagram.update_edge(edge);

        let (kind, target) = match diagram.edge(edge) {
            Some(e) => (e.kind, e.target),
            None => return Err(DiagramError::UnknownEdge(edge)),
        };
        let inputs = diagram
            .node(target)
            .filter(|n| kind == EdgeKind::Input && n.kind.has_ordered_inputs())
            .map(|n| {
                let redo = n.inputs.clone();
                let undo: EdgeList = redo.iter().copied().filter(|e| *e != edge).collect();
                Transition::new(undo, redo)
            });
        Ok(Self {
            name,
            edge,
            target,
            inputs,
        })
    }

    pub fn edge(&self) -> EdgeId {
        self.edge
    }
}

impl Reversible for AddEdge {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let mut changes = ChangeSet::new();
        match direction {
            Direction::Redo => {
                diagram.attach_edge(self.edge);
                if let Some(inputs) = &self.inputs {
                    diagram.set_inputs(self.target, &inputs.redo);
                }
                diagram.add_edge(self.edge);
                diagram.update_edges_of(self.target);
                diagram.update_edge(self.edge);
                changes.added(self.edge);
            }
            Direction::Undo => {
                diagram.detach_edge(self.edge);
                if let Some(inputs) = &self.inputs {
                    diagram.set_inputs(self.target, &inputs.undo);
                }
                diagram.remove_edge(self.edge);
                diagram.update_edges_of(self.target);
                changes.removed(self.edge);
            }
        }
        changes.updated();
        changes
    }
}

// ─── Breakpoints ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointAdd {
    name: String,
    edge: EdgeId,
    index: usize,
    point: Point,
}

impl BreakpointAdd {
    pub fn new(diagram: &Diagram, edge: EdgeId, index: usize, point: Point) -> Result<Self, DiagramError> {
        let e = diagram.edge(edge).ok_or(DiagramError::UnknownEdge(edge))?;
        let len = e.breakpoints.len();
        if index > len {
            return Err(DiagramError::BreakpointOutOfRange { edge, index, len });
        }
        Ok(Self {
            name: format!("add {} breakpoint", e.name()),
            edge,
            index,
            point,
        })
    }
}

impl Reversible for BreakpointAdd {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        if let Some(edge) = diagram.edge_mut(self.edge) {
            match direction {
                Direction::Redo if self.index <= edge.breakpoints.len() => {
                    edge.breakpoints.insert(self.index, self.point);
                }
                Direction::Undo if self.index < edge.breakpoints.len() => {
                    edge.breakpoints.remove(self.index);
                }
                _ => log::warn!("breakpoint {} out of range on {}", self.index, self.edge),
            }
        }
        diagram.update_edge(self.edge);
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointRemove {
    name: String,
    edge: EdgeId,
    index: usize,
    point: Point,
}

impl BreakpointRemove {
    /// Captures the removed point so undo can put it back.
    pub fn new(diagram: &Diagram, edge: EdgeId, index: usize) -> Result<Self, DiagramError> {
        let e = diagram.edge(edge).ok_or(DiagramError::UnknownEdge(edge))?;
        let point = *e.breakpoints.get(index).ok_or(DiagramError::BreakpointOutOfRange {
            edge,
            index,
            len: e.breakpoints.len(),
        })?;
        Ok(Self {
            name: format!("remove {} breakpoint", e.name()),
            edge,
            index,
            point,
        })
    }
}

impl Reversible for BreakpointRemove {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        if let Some(edge) = diagram.edge_mut(self.edge) {
            match direction {
                Direction::Redo if self.index < edge.breakpoints.len() => {
                    edge.breakpoints.remove(self.index);
                }
                Direction::Undo if self.index <= edge.breakpoints.len() => {
                    edge.breakpoints.insert(self.index, self.point);
                }
                _ => log::warn!("breakpoint {} out of range on {}", self.index, self.edge),
            }
        }
        diagram.update_edge(self.edge);
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointMove {
    name: String,
    edge: EdgeId,
    index: usize,
    points: Transition<Point>,
}

impl BreakpointMove {
    pub fn new(diagram: &Diagram, edge: EdgeId, index: usize, to: Point) -> Result<Self, DiagramError> {
        let e = diagram.edge(edge).ok_or(DiagramError::UnknownEdge(edge))?;
        let from = *e.breakpoints.get(index).ok_or(DiagramError::BreakpointOutOfRange {
            edge,
            index,
            len: e.breakpoints.len(),
        })?;
        Ok(Self {
            name: format!("move {} breakpoint", e.name()),
            edge,
            index,
            points: Transition::new(from, to),
        })
    }
}

impl Reversible for BreakpointMove {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        if let Some(point) = diagram
            .edge_mut(self.edge)
            .and_then(|e| e.breakpoints.get_mut(self.index))
        {
            *point = *self.points.get(direction);
        }
        diagram.update_edge(self.edge);
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

// ─── AnchorMove ──────────────────────────────────────────────────────────

/// Move the point where an edge attaches to one of its endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorMove {
    name: String,
    edge: EdgeId,
    node: NodeId,
    /// `None` means the node had no explicit anchor for the edge.
    points: Transition<Option<Point>>,
}

impl AnchorMove {
    pub fn new(diagram: &Diagram, edge: EdgeId, node: NodeId, to: Point) -> Result<Self, DiagramError> {
        let e = diagram.edge(edge).ok_or(DiagramError::UnknownEdge(edge))?;
        if e.other(node).is_none() {
            return Err(DiagramError::NotAnEndpoint { node, edge });
        }
        let n = diagram.node(node).ok_or(DiagramError::UnknownNode(node))?;
        Ok(Self {
            name: format!("move {} anchor point", e.name()),
            edge,
            node,
            points: Transition::new(n.anchors.get(&edge).copied(), Some(to)),
        })
    }
}

impl Reversible for AnchorMove {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        if let Some(node) = diagram.node_mut(self.node) {
            match self.points.get(direction) {
                Some(point) => {
                    node.anchors.insert(self.edge, *point);
                }
                None => {
                    node.anchors.remove(&self.edge);
                }
            }
        }
        diagram.update_edge(self.edge);
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

// ─── SwapEdges ───────────────────────────────────────────────────────────

/// Reverse a set of edges: endpoints trade places and breakpoints run the
/// other way.
///
/// An input edge pointing into an ordered-input node leaves that node's
/// input list, and one now pointing into such a node joins the end of it.
/// Both lists are computed up front for every node involved.
///
/// Redo re-identifies the endpoints; undo writes back the identities the
/// endpoints and their weak neighbours had when the command was built.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapEdges {
    name: String,
    edges: Vec<EdgeId>,
    inputs: InputLists,
    identities: Vec<(NodeId, Identity)>,
}

impl SwapEdges {
    pub fn new(diagram: &Diagram, edges: &[EdgeId]) -> Result<Self, DiagramError> {
        let mut list: Vec<EdgeId> = Vec::new();
        for id in edges {
            diagram.edge(*id).ok_or(DiagramError::UnknownEdge(*id))?;
            if !list.contains(id) {
                list.push(*id);
            }
        }
        let name = match list.as_slice() {
            [one] => format!("swap {}", edge_name(diagram, *one)?),
            _ => format!("swap {} edges", list.len()),
        };

        let inputs_edges: Vec<_> = list
            .iter()
            .filter_map(|e| diagram.edge(*e))
            .filter(|e| e.kind == EdgeKind::Input)
            .collect();
        let mut inputs: InputLists = Vec::new();
        for edge in &inputs_edges {
            for n in [edge.source, edge.target] {
                let Some(node) = diagram.node(n) else { continue };
                if node.kind.has_ordered_inputs() && !inputs.iter().any(|(id, _)| *id == n) {
                    inputs.push((n, Transition::new(node.inputs.clone(), node.inputs.clone())));
                }
            }
        }
        for edge in &inputs_edges {
            if let Some((_, lists)) = inputs.iter_mut().find(|(id, _)| *id == edge.target) {
                lists.redo.retain(|e| *e != edge.id);
            }
        }
        for edge in &inputs_edges {
            if let Some((_, lists)) = inputs.iter_mut().find(|(id, _)| *id == edge.source) {
                if !lists.redo.contains(&edge.id) {
                    lists.redo.push(edge.id);
                }
            }
        }
        let mut endpoints: Vec<NodeId> = Vec::new();
        for edge in list.iter().filter_map(|e| diagram.edge(*e)) {
            for n in [edge.source, edge.target] {
                if !endpoints.contains(&n) {
                    endpoints.push(n);
                }
            }
        }
        Ok(Self {
            name,
            identities: diagram.identities_near(&endpoints),
            edges: list,
            inputs,
        })
    }
}

impl Reversible for SwapEdges {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let mut endpoints: Vec<NodeId> = Vec::new();
        for &id in &self.edges {
            let Some(edge) = diagram.edge_mut(id) else {
                continue;
            };
            std::mem::swap(&mut edge.source, &mut edge.target);
            edge.breakpoints.reverse();
            for n in [edge.source, edge.target] {
                if !endpoints.contains(&n) {
                    endpoints.push(n);
                }
            }
        }
        apply_inputs(diagram, &self.inputs, direction);
        for &id in &self.edges {
            diagram.update_edge(id);
        }
        let mut changes = ChangeSet::new();
        if direction == Direction::Undo {
            diagram.restore_identities(&self.identities);
        }
        for node in endpoints {
            if direction == Direction::Redo {
                diagram.identify(node);
            }
            changes.identified(node);
        }
        changes.updated();
        changes
    }
}

// ─── ToggleEdgeFlag ──────────────────────────────────────────────────────

/// Set a boolean edge attribute on a batch of edges.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleEdgeFlag {
    name: String,
    flag: EdgeFlag,
    edges: Vec<(EdgeId, Transition<bool>)>,
}

impl ToggleEdgeFlag {
    pub fn new(diagram: &Diagram, edges: &[EdgeId], flag: EdgeFlag, value: bool) -> Result<Self, DiagramError> {
        let mut values: Vec<(EdgeId, Transition<bool>)> = Vec::new();
        for id in edges {
            let edge = diagram.edge(*id).ok_or(DiagramError::UnknownEdge(*id))?;
            if !values.iter().any(|(e, _)| e == id) {
                values.push((*id, Transition::new(edge.flag(flag), value)));
            }
        }
        let name = match values.as_slice() {
            [(one, _)] => format!("toggle {} {}", edge_name(diagram, *one)?, flag.describe()),
            _ => format!("toggle {} for {}", flag.describe(), count(values.len(), "edge")),
        };
        Ok(Self {
            name,
            flag,
            edges: values,
        })
    }
}

impl Reversible for ToggleEdgeFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        for (id, value) in &self.edges {
            if let Some(edge) = diagram.edge_mut(*id) {
                edge.set_flag(self.flag, *value.get(direction));
            }
            diagram.update_edge(*id);
        }
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

// ─── SwitchEdgeKind ──────────────────────────────────────────────────────

/// Replace `same` edges with `different` edges and vice versa.
///
/// Replacements are created once, when the command is built, and trade
/// places with the originals in both directions: registration, anchors,
/// scene membership and selection move across.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchEdgeKind {
    name: String,
    switches: Vec<Transition<EdgeId>>,
}

impl SwitchEdgeKind {
    /// Edges that are neither `same` nor `different` are ignored.
    pub fn new(diagram: &mut Diagram, edges: &[EdgeId]) -> Result<Self, DiagramError> {
        let mut originals = Vec::new();
        for id in edges {
            let edge = diagram.edge(*id).ok_or(DiagramError::UnknownEdge(*id))?;
            let kind = match edge.kind {
                EdgeKind::Same => EdgeKind::Different,
                EdgeKind::Different => EdgeKind::Same,
                _ => continue,
            };
            originals.push((edge.clone(), kind));
        }
        let name = match (edges, originals.as_slice()) {
            ([_], [(one, _)]) => format!("switch {}", one.name()),
            _ => format!("switch {} edges", edges.len()),
        };
        let mut switches = Vec::new();
        for (original, kind) in originals {
            let id = diagram.create_edge(kind, original.source, original.target)?;
            if let Some(edge) = diagram.edge_mut(id) {
                edge.breakpoints = original.breakpoints.clone();
            }
            switches.push(Transition::new(original.id, id));
        }
        Ok(Self { name, switches })
    }

    /// Original and replacement id pairs.
    pub fn replacements(&self) -> impl Iterator<Item = (EdgeId, EdgeId)> + '_ {
        self.switches.iter().map(|t| (t.undo, t.redo))
    }
}

impl Reversible for SwitchEdgeKind {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let mut changes = ChangeSet::new();
        for switch in &self.switches {
            let (from, to) = match direction {
                Direction::Redo => (switch.undo, switch.redo),
                Direction::Undo => (switch.redo, switch.undo),
            };
            let Some((source, target)) = diagram.endpoints(from) else {
                continue;
            };
            for node in [source, target] {
                diagram.unregister_edge(node, from);
                diagram.register_edge(node, to);
                if let Some(n) = diagram.node_mut(node)
                    && let Some(anchor) = n.anchors.remove(&from)
                {
                    n.anchors.insert(to, anchor);
                }
            }
            let selected = diagram.is_selected(from);
            diagram.remove_edge(from);
            changes.removed(from);
            diagram.add_edge(to);
            changes.added(to);
            diagram.update_edge(to);
            if selected {
                diagram.select(to);
            }
        }
        changes.updated();
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::NodeKind;
    use pretty_assertions::assert_eq;

    fn pair(d: &mut Diagram, kind: EdgeKind) -> (NodeId, NodeId, EdgeId) {
        let a = d.create_node(NodeKind::Concept, Point::new(0.0, 0.0));
        let b = d.create_node(NodeKind::Concept, Point::new(100.0, 0.0));
        d.add_node(a);
        d.add_node(b);
        let e = d.create_edge(kind, a, b).unwrap();
        (a, b, e)
    }

    #[test]
    fn add_edge_wires_endpoints_at_construction() {
        let mut d = Diagram::new("test");
        let (a, b, e) = pair(&mut d, EdgeKind::Inclusion);
        let cmd = AddEdge::new(&mut d, e).unwrap();
        assert_eq!(cmd.name(), "add inclusion edge");
        assert!(d.is_attached(e));
        assert!(!d.contains_edge(e));
        cmd.redo(&mut d);
        assert!(d.contains_edge(e));
        cmd.undo(&mut d);
        assert!(d.node(a).unwrap().edges.is_empty());
        assert!(d.node(b).unwrap().edges.is_empty());
    }

    #[test]
    fn breakpoint_indices_are_validated() {
        let mut d = Diagram::new("test");
        let (_, _, e) = pair(&mut d, EdgeKind::Inclusion);
        assert_eq!(
            BreakpointRemove::new(&d, e, 0),
            Err(DiagramError::BreakpointOutOfRange { edge: e, index: 0, len: 0 })
        );
        assert!(BreakpointAdd::new(&d, e, 0, Point::new(1.0, 1.0)).is_ok());
        assert!(BreakpointAdd::new(&d, e, 1, Point::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn breakpoint_remove_restores_the_point() {
        let mut d = Diagram::new("test");
        let (_, _, e) = pair(&mut d, EdgeKind::Inclusion);
        d.edge_mut(e).unwrap().breakpoints = vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        let cmd = BreakpointRemove::new(&d, e, 0).unwrap();
        cmd.redo(&mut d);
        assert_eq!(d.edge(e).unwrap().breakpoints, vec![Point::new(2.0, 2.0)]);
        cmd.undo(&mut d);
        assert_eq!(
            d.edge(e).unwrap().breakpoints,
            vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]
        );
    }

    #[test]
    fn anchor_move_forgets_anchor_that_did_not_exist() {
        let mut d = Diagram::new("test");
        let (a, _, e) = pair(&mut d, EdgeKind::Inclusion);
        let cmd = AnchorMove::new(&d, e, a, Point::new(5.0, 5.0)).unwrap();
        cmd.redo(&mut d);
        assert_eq!(d.node(a).unwrap().anchors.get(&e), Some(&Point::new(5.0, 5.0)));
        assert_eq!(d.edge(e).unwrap().path[0], Point::new(5.0, 5.0));
        cmd.undo(&mut d);
        assert!(d.node(a).unwrap().anchors.is_empty());
    }

    #[test]
    fn anchor_move_rejects_foreign_nodes() {
        let mut d = Diagram::new("test");
        let (_, _, e) = pair(&mut d, EdgeKind::Inclusion);
        let stranger = d.create_node(NodeKind::Role, Point::default());
        assert_eq!(
            AnchorMove::new(&d, e, stranger, Point::default()),
            Err(DiagramError::NotAnEndpoint { node: stranger, edge: e })
        );
    }

    #[test]
    fn toggle_names() {
        let mut d = Diagram::new("test");
        let (_, _, e) = pair(&mut d, EdgeKind::Inclusion);
        let (_, _, f) = pair(&mut d, EdgeKind::Inclusion);
        let one = ToggleEdgeFlag::new(&d, &[e], EdgeFlag::Equivalence, true).unwrap();
        assert_eq!(one.name(), "toggle inclusion edge completeness");
        let two = ToggleEdgeFlag::new(&d, &[e, f], EdgeFlag::Equivalence, true).unwrap();
        assert_eq!(two.name(), "toggle completeness for 2 edges");
    }

    #[test]
    fn switching_same_to_different_moves_registration() {
        let mut d = Diagram::new("test");
        let (a, b, e) = pair(&mut d, EdgeKind::Same);
        d.attach_edge(e);
        d.add_edge(e);
        d.node_mut(a).unwrap().anchors.insert(e, Point::new(3.0, 0.0));

        let cmd = SwitchEdgeKind::new(&mut d, &[e]).unwrap();
        let (_, replacement) = cmd.replacements().next().unwrap();
        cmd.redo(&mut d);
        assert_eq!(d.edge(replacement).unwrap().kind, EdgeKind::Different);
        assert!(d.is_attached(replacement));
        assert!(!d.contains_edge(e));
        assert_eq!(d.node(a).unwrap().anchor(replacement), Point::new(3.0, 0.0));
        assert!(d.node(b).unwrap().edges.contains(&replacement));
        cmd.undo(&mut d);
        assert!(d.is_attached(e));
        assert!(!d.is_attached(replacement));
        assert!(d.integrity_violations().is_empty());
    }
}
