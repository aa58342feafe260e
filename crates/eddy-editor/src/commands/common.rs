//! Commands over arbitrary item sets: add, remove, move, snap, compose.

use super::{Direction, InputLists, Reversible, Transition, apply_inputs, count, inputs_after_attach};
use eddy_core::{
    ChangeSet, Diagram, DiagramError, EdgeId, EdgeKind, ItemId, NodeId, Point,
};
use std::collections::HashMap;

/// Scene state the items handed to a command must be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scene {
    Live,
    Detached,
    Any,
}

impl Scene {
    fn check(self, item: ItemId, live: bool) -> Result<(), DiagramError> {
        match self {
            Scene::Live if !live => Err(DiagramError::NotLive(item)),
            Scene::Detached if live => Err(DiagramError::AlreadyLive(item)),
            _ => Ok(()),
        }
    }
}

/// Split items into node and edge ids, checking that each one exists and
/// sits where `scene` requires.
fn split(
    diagram: &Diagram,
    items: &[ItemId],
    scene: Scene,
) -> Result<(Vec<NodeId>, Vec<EdgeId>), DiagramError> {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for item in items {
        match *item {
            ItemId::Node(id) => {
                diagram.node(id).ok_or(DiagramError::UnknownNode(id))?;
                scene.check(*item, diagram.contains_node(id))?;
                if !nodes.contains(&id) {
                    nodes.push(id);
                }
            }
            ItemId::Edge(id) => {
                diagram.edge(id).ok_or(DiagramError::UnknownEdge(id))?;
                scene.check(*item, diagram.contains_edge(id))?;
                if !edges.contains(&id) {
                    edges.push(id);
                }
            }
        }
    }
    Ok((nodes, edges))
}

fn items_name(diagram: &Diagram, verb: &str, nodes: &[NodeId], edges: &[EdgeId]) -> String {
    match (nodes, edges) {
        ([node], []) => format!("{verb} {}", diagram.item_name(ItemId::Node(*node))),
        ([], [edge]) => format!("{verb} {}", diagram.item_name(ItemId::Edge(*edge))),
        _ => format!("{verb} {} items", nodes.len() + edges.len()),
    }
}

// ─── AddNode ─────────────────────────────────────────────────────────────

/// Put a single detached node into the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct AddNode {
    name: String,
    node: NodeId,
}

impl AddNode {
    pub fn new(diagram: &Diagram, node: NodeId) -> Result<Self, DiagramError> {
        let n = diagram.node(node).ok_or(DiagramError::UnknownNode(node))?;
        Scene::Detached.check(ItemId::Node(node), diagram.contains_node(node))?;
        Ok(Self {
            name: format!("add {}", n.name()),
            node,
        })
    }
}

impl Reversible for AddNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let mut changes = ChangeSet::new();
        match direction {
            Direction::Redo => {
                diagram.add_node(self.node);
                changes.added(self.node);
            }
            Direction::Undo => {
                diagram.remove_node(self.node);
                changes.removed(self.node);
            }
        }
        changes.updated();
        changes
    }
}

// ─── AddItems ────────────────────────────────────────────────────────────

/// Put a set of detached nodes and edges into the scene and select them.
///
/// Edges are registered with their endpoints by the command itself, so the
/// items can be built (e.g. by a paste) without touching any live node.
#[derive(Debug, Clone, PartialEq)]
pub struct AddItems {
    name: String,
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    selection: Vec<ItemId>,
    inputs: InputLists,
}

impl AddItems {
    pub fn new(diagram: &Diagram, items: &[ItemId]) -> Result<Self, DiagramError> {
        let (nodes, edges) = split(diagram, items, Scene::Detached)?;
        Ok(Self {
            name: items_name(diagram, "add", &nodes, &edges),
            inputs: inputs_after_attach(diagram, &nodes, &edges),
            selection: diagram.selected_items(),
            nodes,
            edges,
        })
    }

    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.nodes
            .iter()
            .map(|n| ItemId::Node(*n))
            .chain(self.edges.iter().map(|e| ItemId::Edge(*e)))
    }
}

impl Reversible for AddItems {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let mut changes = ChangeSet::new();
        diagram.clear_selection();
        match direction {
            Direction::Redo => {
                for &node in &self.nodes {
                    diagram.add_node(node);
                    changes.added(node);
                }
                for &edge in &self.edges {
                    diagram.attach_edge(edge);
                    diagram.add_edge(edge);
                    changes.added(edge);
                }
                apply_inputs(diagram, &self.inputs, direction);
                for &edge in &self.edges {
                    diagram.update_edge(edge);
                }
                for item in self.items() {
                    diagram.select(item);
                }
            }
            Direction::Undo => {
                for &edge in self.edges.iter().rev() {
                    diagram.remove_edge(edge);
                    diagram.detach_edge(edge);
                    changes.removed(edge);
                }
                for &node in self.nodes.iter().rev() {
                    diagram.remove_node(node);
                    changes.removed(node);
                }
                apply_inputs(diagram, &self.inputs, direction);
                for &item in &self.selection {
                    diagram.select(item);
                }
            }
        }
        changes.updated();
        changes
    }
}

// ─── RemoveItems ─────────────────────────────────────────────────────────

/// Take a set of items out of the scene.
///
/// Edges still attached to a removed node are removed with it. Ordered-input
/// nodes touched by a removed input edge get both input orders captured up
/// front: the current one for undo, and for redo the same list without the
/// removed edges (ids missing from the list are skipped).
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveItems {
    name: String,
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    selection: Vec<ItemId>,
    inputs: InputLists,
}

impl RemoveItems {
    pub fn new(diagram: &Diagram, items: &[ItemId]) -> Result<Self, DiagramError> {
        let (nodes, mut edges) = split(diagram, items, Scene::Live)?;
        let name = items_name(diagram, "remove", &nodes, &edges);
        for node in nodes.iter().filter_map(|n| diagram.node(*n)) {
            for edge in &node.edges {
                if !edges.contains(edge) {
                    edges.push(*edge);
                }
            }
        }

        let mut affected: Vec<NodeId> = Vec::new();
        for edge in edges.iter().filter_map(|e| diagram.edge(*e)) {
            if edge.kind != EdgeKind::Input {
                continue;
            }
            for n in [edge.source, edge.target] {
                let ordered = diagram.node(n).is_some_and(|n| n.kind.has_ordered_inputs());
                if ordered && !affected.contains(&n) {
                    affected.push(n);
                }
            }
        }
        // Removed nodes too, so undo restores their exact order after the
        // edges are reattached.
        for node in &nodes {
            let ordered = diagram.node(*node).is_some_and(|n| n.kind.has_ordered_inputs());
            if ordered && !affected.contains(node) {
                affected.push(*node);
            }
        }

        let inputs = affected
            .into_iter()
            .filter_map(|id| diagram.node(id))
            .map(|node| {
                let mut redo = node.inputs.clone();
                for edge in node.edges.iter().filter_map(|e| diagram.edge(*e)) {
                    if edge.kind == EdgeKind::Input && edge.target == node.id && edges.contains(&edge.id) {
                        match redo.iter().position(|e| *e == edge.id) {
                            Some(i) => {
                                redo.remove(i);
                            }
                            None => log::trace!("{} not in the inputs of {}", edge.id, node.id),
                        }
                    }
                }
                (node.id, Transition::new(node.inputs.clone(), redo))
            })
            .collect();

        Ok(Self {
            name,
            selection: diagram.selected_items(),
            nodes,
            edges,
            inputs,
        })
    }
}

impl Reversible for RemoveItems {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let mut changes = ChangeSet::new();
        match direction {
            Direction::Redo => {
                for &edge in &self.edges {
                    diagram.detach_edge(edge);
                    diagram.remove_edge(edge);
                    changes.removed(edge);
                }
                for &node in &self.nodes {
                    diagram.remove_node(node);
                    changes.removed(node);
                }
                apply_inputs(diagram, &self.inputs, direction);
            }
            Direction::Undo => {
                for &node in &self.nodes {
                    diagram.add_node(node);
                    changes.added(node);
                }
                for &edge in &self.edges {
                    diagram.attach_edge(edge);
                    diagram.add_edge(edge);
                    changes.added(edge);
                }
                apply_inputs(diagram, &self.inputs, direction);
                for &edge in &self.edges {
                    diagram.update_edge(edge);
                }
                diagram.clear_selection();
                for &item in &self.selection {
                    diagram.select(item);
                }
            }
        }
        changes.updated();
        changes
    }
}

// ─── TranslateItems ──────────────────────────────────────────────────────

/// Move items by a fixed delta: nodes carry their anchors along, edges their
/// breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateItems {
    name: String,
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    delta: Point,
}

impl TranslateItems {
    pub fn new(items: &[ItemId], delta: Point) -> Self {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for item in items {
            match *item {
                ItemId::Node(id) if !nodes.contains(&id) => nodes.push(id),
                ItemId::Edge(id) if !edges.contains(&id) => edges.push(id),
                _ => {}
            }
        }
        Self {
            name: format!("move {}", count(nodes.len() + edges.len(), "item")),
            nodes,
            edges,
            delta,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

impl Reversible for TranslateItems {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let delta = match direction {
            Direction::Redo => self.delta,
            Direction::Undo => -self.delta,
        };
        for &node in &self.nodes {
            diagram.move_node_by(node, delta);
        }
        for &edge in &self.edges {
            diagram.move_edge_by(edge, delta);
        }
        let mut reroute = self.edges.clone();
        for node in self.nodes.iter().filter_map(|n| diagram.node(*n)) {
            for edge in &node.edges {
                if !reroute.contains(edge) {
                    reroute.push(*edge);
                }
            }
        }
        for edge in reroute {
            diagram.update_edge(edge);
        }
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

// ─── SnapToGrid ──────────────────────────────────────────────────────────

/// Position and anchor map of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub pos: Point,
    pub anchors: HashMap<EdgeId, Point>,
}

impl Placement {
    pub(crate) fn shifted(&self, delta: Point) -> Self {
        Self {
            pos: self.pos + delta,
            anchors: self.anchors.iter().map(|(edge, p)| (*edge, *p + delta)).collect(),
        }
    }
}

/// Write absolute node placements and edge breakpoints, then reroute every
/// edge touching them.
pub(crate) fn apply_layout(
    diagram: &mut Diagram,
    nodes: &[(NodeId, Transition<Placement>)],
    edges: &[(EdgeId, Transition<Vec<Point>>)],
    direction: Direction,
) {
    let mut reroute: Vec<EdgeId> = Vec::new();
    for (id, placement) in nodes {
        let placement = placement.get(direction);
        if let Some(node) = diagram.node_mut(*id) {
            node.pos = placement.pos;
            node.anchors = placement.anchors.clone();
            reroute.extend(node.edges.iter().copied());
        }
    }
    for (id, breakpoints) in edges {
        if let Some(edge) = diagram.edge_mut(*id) {
            edge.breakpoints = breakpoints.get(direction).clone();
            reroute.push(*id);
        }
    }
    reroute.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    reroute.dedup();
    for edge in reroute {
        diagram.update_edge(edge);
    }
}

/// Align node centres and edge breakpoints to the grid. Both layouts are
/// computed up front, so undo restores the exact original coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapToGrid {
    name: String,
    nodes: Vec<(NodeId, Transition<Placement>)>,
    edges: Vec<(EdgeId, Transition<Vec<Point>>)>,
}

impl SnapToGrid {
    /// Snap the given items; those already on the grid are left out.
    pub fn new(diagram: &Diagram, items: &[ItemId], grid: f64) -> Result<Self, DiagramError> {
        let (nodes, edges) = split(diagram, items, Scene::Any)?;
        let nodes: Vec<(NodeId, Transition<Placement>)> = nodes
            .into_iter()
            .filter_map(|id| diagram.node(id))
            .filter_map(|node| {
                let pos = node.pos.snapped(grid);
                if pos == node.pos {
                    return None;
                }
                let before = Placement {
                    pos: node.pos,
                    anchors: node.anchors.clone(),
                };
                let after = before.shifted(pos - node.pos);
                Some((node.id, Transition::new(before, after)))
            })
            .collect();
        let edges: Vec<(EdgeId, Transition<Vec<Point>>)> = edges
            .into_iter()
            .filter_map(|id| diagram.edge(id))
            .filter_map(|edge| {
                let snapped: Vec<Point> = edge.breakpoints.iter().map(|p| p.snapped(grid)).collect();
                (snapped != edge.breakpoints)
                    .then(|| (edge.id, Transition::new(edge.breakpoints.clone(), snapped)))
            })
            .collect();
        Ok(Self {
            name: format!("snap {} to the grid", count(nodes.len() + edges.len(), "item")),
            nodes,
            edges,
        })
    }

    /// Snap every live item of the diagram.
    pub fn all(diagram: &Diagram, grid: f64) -> Self {
        let items: Vec<ItemId> = diagram
            .node_ids()
            .into_iter()
            .map(ItemId::Node)
            .chain(diagram.edge_ids().into_iter().map(ItemId::Edge))
            .collect();
        // Every id comes from the diagram itself.
        Self::new(diagram, &items, grid).unwrap_or_else(|_| Self {
            name: "snap 0 items to the grid".into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

impl Reversible for SnapToGrid {
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

// ─── ComposeAxiom ────────────────────────────────────────────────────────

/// Add a group of freshly built nodes and edges forming one axiom pattern.
///
/// Undo detaches every edge from its endpoints before anything leaves the
/// scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeAxiom {
    name: String,
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    inputs: InputLists,
}

impl ComposeAxiom {
    pub fn new(
        diagram: &Diagram,
        name: &str,
        nodes: &[NodeId],
        edges: &[EdgeId],
    ) -> Result<Self, DiagramError> {
        let items: Vec<ItemId> = nodes
            .iter()
            .map(|n| ItemId::Node(*n))
            .chain(edges.iter().map(|e| ItemId::Edge(*e)))
            .collect();
        let (nodes, edges) = split(diagram, &items, Scene::Detached)?;
        Ok(Self {
            name: name.to_string(),
            inputs: inputs_after_attach(diagram, &nodes, &edges),
            nodes,
            edges,
        })
    }
}

impl Reversible for ComposeAxiom {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let mut changes = ChangeSet::new();
        match direction {
            Direction::Redo => {
                for &edge in &self.edges {
                    diagram.attach_edge(edge);
                }
                for &node in &self.nodes {
                    diagram.add_node(node);
                    changes.added(node);
                }
                for &edge in &self.edges {
                    diagram.add_edge(edge);
                    changes.added(edge);
                }
                apply_inputs(diagram, &self.inputs, direction);
                for &edge in &self.edges {
                    diagram.update_edge(edge);
                }
            }
            Direction::Undo => {
                for &edge in &self.edges {
                    diagram.detach_edge(edge);
                }
                for &edge in &self.edges {
                    diagram.remove_edge(edge);
                    changes.removed(edge);
                }
                for &node in &self.nodes {
                    diagram.remove_node(node);
                    changes.removed(node);
                }
                apply_inputs(diagram, &self.inputs, direction);
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

    fn concept(d: &mut Diagram, x: f64) -> NodeId {
        let n = d.create_node(NodeKind::Concept, Point::new(x, 0.0));
        d.add_node(n);
        n
    }

    #[test]
    fn names_follow_item_count() {
        let mut d = Diagram::new("test");
        let a = concept(&mut d, 0.0);
        let b = concept(&mut d, 100.0);
        let one = RemoveItems::new(&d, &[a.into()]).unwrap();
        assert_eq!(one.name(), "remove concept node");
        let two = RemoveItems::new(&d, &[a.into(), b.into()]).unwrap();
        assert_eq!(two.name(), "remove 2 items");
        assert_eq!(TranslateItems::new(&[a.into()], Point::new(1.0, 1.0)).name(), "move 1 item");
        assert_eq!(
            TranslateItems::new(&[a.into(), b.into()], Point::new(1.0, 1.0)).name(),
            "move 2 items"
        );
    }

    #[test]
    fn unknown_items_are_rejected() {
        let d = Diagram::new("test");
        let ghost = NodeId::intern("n404");
        assert_eq!(
            AddItems::new(&d, &[ghost.into()]),
            Err(DiagramError::UnknownNode(ghost))
        );
    }

    #[test]
    fn removal_needs_live_items() {
        let mut d = Diagram::new("test");
        let a = concept(&mut d, 0.0);
        let detached = d.create_node(NodeKind::Concept, Point::default());
        let e = d.create_edge(EdgeKind::Inclusion, a, detached).unwrap();
        assert_eq!(
            RemoveItems::new(&d, &[a.into(), detached.into()]),
            Err(DiagramError::NotLive(detached.into()))
        );
        assert_eq!(RemoveItems::new(&d, &[e.into()]), Err(DiagramError::NotLive(e.into())));
        assert!(d.contains_node(a));
    }

    #[test]
    fn adding_needs_detached_items() {
        let mut d = Diagram::new("test");
        let a = concept(&mut d, 0.0);
        let b = d.create_node(NodeKind::Concept, Point::default());
        assert_eq!(
            AddItems::new(&d, &[b.into(), a.into()]),
            Err(DiagramError::AlreadyLive(a.into()))
        );
        assert_eq!(AddNode::new(&d, a), Err(DiagramError::AlreadyLive(a.into())));
        assert_eq!(
            ComposeAxiom::new(&d, "compose", &[a, b], &[]),
            Err(DiagramError::AlreadyLive(a.into()))
        );
        assert!(AddItems::new(&d, &[b.into()]).is_ok());
    }

    #[test]
    fn removing_a_node_takes_its_edges_along() {
        let mut d = Diagram::new("test");
        let a = concept(&mut d, 0.0);
        let b = concept(&mut d, 100.0);
        let e = d.create_edge(EdgeKind::Inclusion, a, b).unwrap();
        d.attach_edge(e);
        d.add_edge(e);

        let cmd = RemoveItems::new(&d, &[a.into()]).unwrap();
        let changes = cmd.redo(&mut d);
        assert!(!d.contains_edge(e));
        assert!(!d.contains_node(a));
        assert!(d.node(b).unwrap().edges.is_empty());
        assert_eq!(
            changes.removed_items().collect::<Vec<_>>(),
            vec![ItemId::Edge(e), ItemId::Node(a)]
        );
        cmd.undo(&mut d);
        assert!(d.is_attached(e));
        assert!(d.integrity_violations().is_empty());
    }

    #[test]
    fn add_items_selects_and_restores_selection() {
        let mut d = Diagram::new("test");
        let a = concept(&mut d, 0.0);
        d.select(a);
        let b = d.create_node(NodeKind::Role, Point::new(50.0, 50.0));

        let cmd = AddItems::new(&d, &[b.into()]).unwrap();
        cmd.redo(&mut d);
        assert_eq!(d.selected_items(), vec![ItemId::Node(b)]);
        cmd.undo(&mut d);
        assert_eq!(d.selected_items(), vec![ItemId::Node(a)]);
        assert!(!d.contains_node(b));
    }

    #[test]
    fn translate_moves_breakpoints_of_moved_edges_only() {
        let mut d = Diagram::new("test");
        let a = concept(&mut d, 0.0);
        let b = concept(&mut d, 100.0);
        let e = d.create_edge(EdgeKind::Inclusion, a, b).unwrap();
        d.attach_edge(e);
        d.add_edge(e);
        d.edge_mut(e).unwrap().breakpoints.push(Point::new(50.0, 50.0));

        let cmd = TranslateItems::new(&[a.into()], Point::new(10.0, 0.0));
        cmd.redo(&mut d);
        assert_eq!(d.edge(e).unwrap().breakpoints, vec![Point::new(50.0, 50.0)]);
        assert_eq!(d.edge(e).unwrap().path[0], Point::new(10.0, 0.0));

        let cmd = TranslateItems::new(&[a.into(), b.into(), e.into()], Point::new(0.0, 5.0));
        cmd.redo(&mut d);
        assert_eq!(d.edge(e).unwrap().breakpoints, vec![Point::new(50.0, 55.0)]);
    }

    #[test]
    fn snap_skips_items_already_on_the_grid() {
        let mut d = Diagram::new("test");
        let a = concept(&mut d, 0.0);
        let b = concept(&mut d, 103.0);
        let cmd = SnapToGrid::new(&d, &[a.into(), b.into()], 10.0).unwrap();
        assert_eq!(cmd.name(), "snap 1 item to the grid");
        cmd.redo(&mut d);
        assert_eq!(d.node(b).unwrap().pos, Point::new(100.0, 0.0));
        cmd.undo(&mut d);
        assert_eq!(d.node(b).unwrap().pos, Point::new(103.0, 0.0));
    }
}
