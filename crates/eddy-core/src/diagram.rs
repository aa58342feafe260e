//! The diagram: an arena of items plus the live scene.
//!
//! Every node and edge ever created for a document lives in the arena and is
//! addressed by its id. The *scene* is the subset currently part of the
//! diagram. Removing an item from the scene keeps it in the arena so a
//! command can bring it back verbatim on undo.
//!
//! Scene membership and endpoint registration are separate steps: adding an
//! edge to the scene does not register it with its endpoints, and
//! registering it does not add it to the scene. Commands order the two
//! explicitly.

use crate::error::DiagramError;
use crate::id::{EdgeId, Guid, ItemId, NodeId};
use crate::index::{MetaIndex, PredicateIndex};
use crate::model::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct Diagram {
    pub name: String,
    guid: Guid,
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
    live_nodes: HashSet<NodeId>,
    live_edges: HashSet<EdgeId>,
    selection: HashSet<ItemId>,
    predicates: PredicateIndex,
    meta: MetaIndex,
    /// Offset applied by the next keyboard paste.
    pub paste_offset: Point,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new("diagram")
    }
}

impl Diagram {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            guid: Guid::new(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            live_nodes: HashSet::new(),
            live_edges: HashSet::new(),
            selection: HashSet::new(),
            predicates: PredicateIndex::default(),
            meta: MetaIndex::default(),
            paste_offset: Point::new(20.0, 10.0),
        }
    }

    // ─── Arena ───────────────────────────────────────────────────────────

    /// Create a detached node with a fresh id.
    pub fn create_node(&mut self, kind: NodeKind, pos: Point) -> NodeId {
        let id = NodeId::intern(&self.next_free('n'));
        self.nodes.insert(id, Node::new(id, kind, pos));
        log::trace!("created {kind} node {id}");
        id
    }

    /// Create a detached edge with a fresh id between two known nodes.
    pub fn create_edge(
        &mut self,
        kind: EdgeKind,
        source: NodeId,
        target: NodeId,
    ) -> Result<EdgeId, DiagramError> {
        for endpoint in [source, target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(DiagramError::UnknownNode(endpoint));
            }
        }
        let id = EdgeId::intern(&self.next_free('e'));
        self.edges.insert(id, Edge::new(id, kind, source, target));
        log::trace!("created {kind} edge {id}: {source} -> {target}");
        Ok(id)
    }

    /// Adopt a node built elsewhere (loaders, clipboard) into the arena.
    pub fn insert_node(&mut self, node: Node) -> Result<NodeId, DiagramError> {
        let id = node.id;
        if let Some(existing) = self.nodes.get(&id) {
            if *existing == node {
                return Ok(id);
            }
            return Err(DiagramError::DuplicateId(ItemId::Node(id)));
        }
        self.guid.observe(id.as_str());
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Adopt an edge built elsewhere into the arena.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<EdgeId, DiagramError> {
        let id = edge.id;
        if let Some(existing) = self.edges.get(&id) {
            if *existing == edge {
                return Ok(id);
            }
            return Err(DiagramError::DuplicateId(ItemId::Edge(id)));
        }
        for endpoint in [edge.source, edge.target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(DiagramError::UnknownNode(endpoint));
            }
        }
        self.guid.observe(id.as_str());
        self.edges.insert(id, edge);
        Ok(id)
    }

    fn next_free(&mut self, prefix: char) -> String {
        loop {
            let candidate = self.guid.next(prefix);
            let taken = match prefix {
                'n' => self.nodes.contains_key(&NodeId::intern(&candidate)),
                _ => self.edges.contains_key(&EdgeId::intern(&candidate)),
            };
            if !taken {
                return candidate;
            }
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    /// Readable name of any item, e.g. `concept node`.
    pub fn item_name(&self, item: ItemId) -> String {
        match item {
            ItemId::Node(id) => self.node(id).map_or_else(|| id.to_string(), Node::name),
            ItemId::Edge(id) => self.edge(id).map_or_else(|| id.to_string(), Edge::name),
        }
    }

    // ─── Scene ───────────────────────────────────────────────────────────

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.live_nodes.contains(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.live_edges.contains(&id)
    }

    pub fn contains(&self, item: ItemId) -> bool {
        match item {
            ItemId::Node(id) => self.contains_node(id),
            ItemId::Edge(id) => self.contains_edge(id),
        }
    }

    /// Live node ids, sorted.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.live_nodes.iter().copied().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    /// Live edge ids, sorted.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.live_edges.iter().copied().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.live_nodes.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.live_edges.iter().filter_map(|id| self.edges.get(id))
    }

    pub fn is_empty(&self) -> bool {
        self.live_nodes.is_empty() && self.live_edges.is_empty()
    }

    /// Put a node in the scene. Returns false if it was already there.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            log::warn!("add_node: {id} is not in the arena");
            return false;
        };
        if !self.live_nodes.insert(id) {
            return false;
        }
        if node.kind.is_predicate() {
            self.predicates.insert(node.kind, &node.text, id);
        }
        true
    }

    /// Take a node out of the scene.
    ///
    /// # Panics
    /// If the node still has registered edges: callers must detach them first.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        assert!(
            node.edges.is_empty(),
            "node {id} removed while edges {:?} are still attached",
            node.edges
        );
        if !self.live_nodes.remove(&id) {
            return false;
        }
        if node.kind.is_predicate() {
            self.predicates.remove(node.kind, &node.text, id);
        }
        self.selection.remove(&ItemId::Node(id));
        true
    }

    /// Put an edge in the scene without touching its endpoints.
    pub fn add_edge(&mut self, id: EdgeId) -> bool {
        if !self.edges.contains_key(&id) {
            log::warn!("add_edge: {id} is not in the arena");
            return false;
        }
        self.live_edges.insert(id)
    }

    /// Take an edge out of the scene without touching its endpoints.
    ///
    /// An edge outside the scene has no route: its routing cache is dropped
    /// and rebuilt by [`Diagram::update_edge`] when it comes back.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        self.selection.remove(&ItemId::Edge(id));
        if !self.live_edges.remove(&id) {
            return false;
        }
        if let Some(edge) = self.edges.get_mut(&id) {
            edge.anchors.clear();
            edge.path.clear();
            edge.label = None;
        }
        true
    }

    // ─── Endpoint registration ───────────────────────────────────────────

    /// Register `edge` on one endpoint.
    ///
    /// An input edge registered on its ordered-input target is appended to
    /// the target's input list if not already present.
    pub fn register_edge(&mut self, node: NodeId, edge: EdgeId) {
        let Some(e) = self.edges.get(&edge) else {
            log::warn!("register_edge: unknown edge {edge}");
            return;
        };
        let feeds_inputs = e.kind == EdgeKind::Input && e.target == node;
        if let Some(n) = self.nodes.get_mut(&node) {
            n.add_edge(edge);
            if feeds_inputs && n.kind.has_ordered_inputs() && !n.inputs.contains(&edge) {
                n.inputs.push(edge);
            }
        }
    }

    /// Unregister `edge` from one endpoint, stripping it from the input list.
    pub fn unregister_edge(&mut self, node: NodeId, edge: EdgeId) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.remove_edge(edge);
            n.inputs.retain(|e| *e != edge);
        }
    }

    /// Register an edge on both its endpoints.
    pub fn attach_edge(&mut self, edge: EdgeId) {
        if let Some((source, target)) = self.endpoints(edge) {
            self.register_edge(source, edge);
            self.register_edge(target, edge);
        }
    }

    /// Unregister an edge from both its endpoints.
    pub fn detach_edge(&mut self, edge: EdgeId) {
        if let Some((source, target)) = self.endpoints(edge) {
            self.unregister_edge(source, edge);
            self.unregister_edge(target, edge);
        }
    }

    /// True iff both endpoints know about the edge.
    pub fn is_attached(&self, edge: EdgeId) -> bool {
        let Some((source, target)) = self.endpoints(edge) else {
            return false;
        };
        let knows = |n: NodeId| self.nodes.get(&n).is_some_and(|n| n.edges.contains(&edge));
        knows(source) && knows(target)
    }

    pub fn endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edges.get(&edge).map(|e| (e.source, e.target))
    }

    /// Registered edges of `node` with the given kind pointing into it,
    /// paired with their sources.
    pub fn incoming(&self, node: NodeId, kind: EdgeKind) -> Vec<(EdgeId, NodeId)> {
        let Some(n) = self.nodes.get(&node) else {
            return Vec::new();
        };
        n.edges
            .iter()
            .filter_map(|id| self.edges.get(id))
            .filter(|e| e.kind == kind && e.target == node)
            .map(|e| (e.id, e.source))
            .collect()
    }

    /// Registered edges of `node` with the given kind leaving it, paired
    /// with their targets.
    pub fn outgoing(&self, node: NodeId, kind: EdgeKind) -> Vec<(EdgeId, NodeId)> {
        let Some(n) = self.nodes.get(&node) else {
            return Vec::new();
        };
        n.edges
            .iter()
            .filter_map(|id| self.edges.get(id))
            .filter(|e| e.kind == kind && e.source == node)
            .map(|e| (e.id, e.target))
            .collect()
    }

    // ─── Mutation helpers ────────────────────────────────────────────────

    /// Replace the input order of a node.
    pub fn set_inputs(&mut self, node: NodeId, inputs: &[EdgeId]) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.inputs = inputs.iter().copied().collect();
        }
    }

    /// Change a node's label keeping the predicate index in sync.
    ///
    /// The node leaves the index under its old key *before* the text
    /// changes and re-enters under the new key afterwards.
    pub fn set_label(&mut self, id: NodeId, text: &str) {
        let live = self.live_nodes.contains(&id);
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let indexed = live && node.kind.is_predicate();
        if indexed {
            self.predicates.remove(node.kind, &node.text, id);
        }
        node.text = text.to_string();
        if node.kind == NodeKind::Individual {
            node.identity = individual_identity(text);
        }
        if indexed {
            self.predicates.insert(node.kind, &node.text, id);
        }
    }

    /// Translate a node together with its anchor points.
    pub fn move_node_by(&mut self, id: NodeId, delta: Point) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.pos = node.pos + delta;
            for anchor in node.anchors.values_mut() {
                *anchor = *anchor + delta;
            }
        }
    }

    /// Translate an edge's breakpoints.
    pub fn move_edge_by(&mut self, id: EdgeId, delta: Point) {
        if let Some(edge) = self.edges.get_mut(&id) {
            for point in &mut edge.breakpoints {
                *point = *point + delta;
            }
        }
    }

    /// Recompute an edge's routing from its endpoints' anchors, its
    /// breakpoints and, for inputs of ordered nodes, its input position.
    pub fn update_edge(&mut self, id: EdgeId) {
        let Some(edge) = self.edges.get(&id) else {
            return;
        };
        let (source, target) = (edge.source, edge.target);
        let start = self.nodes.get(&source).map(|n| n.anchor(id));
        let end = self.nodes.get(&target).map(|n| n.anchor(id));
        let label = match edge.kind {
            EdgeKind::Input => self
                .nodes
                .get(&target)
                .filter(|n| n.kind.has_ordered_inputs())
                .and_then(|n| n.inputs.iter().position(|e| *e == id))
                .map(|i| (i + 1).to_string()),
            _ => None,
        };
        let Some(edge) = self.edges.get_mut(&id) else {
            return;
        };
        edge.anchors.clear();
        edge.path.clear();
        if let Some(p) = start {
            edge.anchors.insert(source, p);
            edge.path.push(p);
        }
        edge.path.extend(edge.breakpoints.iter().copied());
        if let Some(p) = end {
            edge.anchors.insert(target, p);
            edge.path.push(p);
        }
        edge.label = label;
    }

    /// Reroute every edge registered on a node.
    pub fn update_edges_of(&mut self, node: NodeId) {
        let edges: Vec<EdgeId> = self
            .nodes
            .get(&node)
            .map(|n| n.edges.to_vec())
            .unwrap_or_default();
        for edge in edges {
            self.update_edge(edge);
        }
    }

    /// Highest z value among live nodes (0 for an empty diagram).
    pub fn max_z(&self) -> f64 {
        self.nodes().map(|n| n.z).fold(0.0, f64::max)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, item: impl Into<ItemId>) {
        let item = item.into();
        if self.contains(item) {
            self.selection.insert(item);
        }
    }

    pub fn deselect(&mut self, item: impl Into<ItemId>) {
        self.selection.remove(&item.into());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, item: impl Into<ItemId>) -> bool {
        self.selection.contains(&item.into())
    }

    /// Selected items, sorted by id.
    pub fn selected_items(&self) -> Vec<ItemId> {
        let mut items: Vec<ItemId> = self.selection.iter().copied().collect();
        items.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        items
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.selected_items()
            .into_iter()
            .filter_map(ItemId::as_node)
            .collect()
    }

    // ─── Predicates ──────────────────────────────────────────────────────

    pub fn predicates(&self) -> &PredicateIndex {
        &self.predicates
    }

    /// Live nodes sharing the given predicate.
    pub fn predicate_nodes(&self, kind: NodeKind, text: &str) -> Vec<NodeId> {
        self.predicates.nodes(kind, text)
    }

    pub fn meta(&self, kind: NodeKind, text: &str) -> Option<&PredicateMeta> {
        self.meta.get(kind, text)
    }

    pub fn set_meta(&mut self, kind: NodeKind, text: &str, meta: Option<PredicateMeta>) {
        match meta {
            Some(meta) => self.meta.set(kind, text, meta),
            None => {
                self.meta.unset(kind, text);
            }
        }
    }

    pub fn rename_meta(&mut self, kind: NodeKind, from: &str, to: &str) {
        self.meta.rename(kind, from, to);
    }

    // ─── Inspection ──────────────────────────────────────────────────────

    /// Describe every broken structural invariant. Empty means consistent.
    ///
    /// Checked: live edges are registered on both endpoints, edges outside
    /// the scene are registered on neither, node registrations point at
    /// edges ending on the node, and the input list of every live
    /// ordered-input node holds exactly its registered incoming input edges
    /// without duplicates.
    pub fn integrity_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (id, edge) in &self.edges {
            let on = |n: NodeId| self.nodes.get(&n).is_some_and(|n| n.edges.contains(id));
            let (s, t) = (on(edge.source), on(edge.target));
            if self.live_edges.contains(id) {
                if !(s && t) {
                    problems.push(format!("live edge {id} is not registered on both endpoints"));
                }
            } else if s || t {
                problems.push(format!("edge {id} is outside the scene but still registered"));
            }
        }
        for (id, node) in &self.nodes {
            for edge in &node.edges {
                match self.edges.get(edge) {
                    Some(e) if e.source == *id || e.target == *id => {}
                    _ => problems.push(format!("node {id} registers foreign edge {edge}")),
                }
            }
            if self.live_nodes.contains(id) && node.kind.has_ordered_inputs() {
                let mut expected: Vec<EdgeId> = self
                    .incoming(*id, EdgeKind::Input)
                    .into_iter()
                    .map(|(e, _)| e)
                    .collect();
                let mut actual = node.inputs.to_vec();
                let len = actual.len();
                expected.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                actual.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                actual.dedup();
                if actual.len() != len {
                    problems.push(format!("node {id} has duplicate inputs"));
                }
                if actual != expected {
                    problems.push(format!(
                        "node {id} inputs {:?} do not match incoming input edges {:?}",
                        node.inputs, expected
                    ));
                }
            }
        }
        problems
    }

    /// Structural state of the whole diagram, for equality checks.
    ///
    /// Registration order on a node carries no meaning, so node edge lists
    /// are sorted. Input lists keep their order.
    pub fn snapshot(&self) -> DiagramSnapshot {
        let sorted = |mut v: Vec<String>| {
            v.sort();
            v
        };
        let mut predicates: Vec<(NodeKind, String, Vec<String>)> = self
            .predicates
            .entries()
            .map(|((kind, text), nodes)| {
                (
                    *kind,
                    text.clone(),
                    sorted(nodes.iter().map(|n| n.to_string()).collect()),
                )
            })
            .collect();
        predicates.sort_by(|a, b| (a.0.short_name(), &a.1).cmp(&(b.0.short_name(), &b.1)));
        let mut meta: Vec<(NodeKind, String, PredicateMeta)> = self
            .meta
            .entries()
            .map(|((kind, text), meta)| (*kind, text.clone(), meta.clone()))
            .collect();
        meta.sort_by(|a, b| (a.0.short_name(), &a.1).cmp(&(b.0.short_name(), &b.1)));

        DiagramSnapshot {
            nodes: self
                .nodes
                .iter()
                .map(|(id, n)| {
                    let mut n = n.clone();
                    n.edges.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                    (id.to_string(), n)
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|(id, e)| (id.to_string(), e.clone()))
                .collect(),
            live_nodes: sorted(self.live_nodes.iter().map(|n| n.to_string()).collect()),
            live_edges: sorted(self.live_edges.iter().map(|e| e.to_string()).collect()),
            selection: sorted(self.selection.iter().map(|i| i.to_string()).collect()),
            predicates,
            meta,
        }
    }
}

/// Point-in-time copy of a diagram's structural state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramSnapshot {
    pub nodes: BTreeMap<String, Node>,
    pub edges: BTreeMap<String, Edge>,
    pub live_nodes: Vec<String>,
    pub live_edges: Vec<String>,
    pub selection: Vec<String>,
    pub predicates: Vec<(NodeKind, String, Vec<String>)>,
    pub meta: Vec<(NodeKind, String, PredicateMeta)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_concepts() -> (Diagram, NodeId, NodeId) {
        let mut d = Diagram::new("test");
        let a = d.create_node(NodeKind::Concept, Point::new(0.0, 0.0));
        let b = d.create_node(NodeKind::Concept, Point::new(100.0, 0.0));
        d.add_node(a);
        d.add_node(b);
        (d, a, b)
    }

    #[test]
    fn add_node_is_idempotent() {
        let (mut d, a, _) = two_concepts();
        assert!(!d.add_node(a));
        assert_eq!(d.predicate_nodes(NodeKind::Concept, "concept").len(), 2);
    }

    #[test]
    fn insert_rejects_a_different_node_with_the_same_id() {
        let mut d = Diagram::new("test");
        let node = Node::new(NodeId::intern("n5"), NodeKind::Role, Point::default());
        assert_eq!(d.insert_node(node.clone()), Ok(NodeId::intern("n5")));
        assert_eq!(d.insert_node(node.clone()), Ok(NodeId::intern("n5")));
        let other = Node::new(NodeId::intern("n5"), NodeKind::Concept, Point::default());
        assert_eq!(
            d.insert_node(other),
            Err(DiagramError::DuplicateId(ItemId::Node(NodeId::intern("n5"))))
        );
        // The generator moves past adopted ids.
        assert_eq!(d.create_node(NodeKind::Role, Point::default()).as_str(), "n6");
    }

    #[test]
    fn scene_and_registration_are_independent() {
        let (mut d, a, b) = two_concepts();
        let e = d.create_edge(EdgeKind::Inclusion, a, b).unwrap();
        d.add_edge(e);
        assert!(!d.is_attached(e));
        d.attach_edge(e);
        assert!(d.is_attached(e));
        d.remove_edge(e);
        assert!(d.is_attached(e));
        d.detach_edge(e);
        assert!(d.node(a).unwrap().edges.is_empty());
        assert!(d.node(b).unwrap().edges.is_empty());
    }

    #[test]
    #[should_panic(expected = "still attached")]
    fn removing_a_node_with_edges_panics() {
        let (mut d, a, b) = two_concepts();
        let e = d.create_edge(EdgeKind::Inclusion, a, b).unwrap();
        d.attach_edge(e);
        d.remove_node(a);
    }

    #[test]
    fn registering_inputs_keeps_order_distinct() {
        let mut d = Diagram::new("test");
        let chain = d.create_node(NodeKind::RoleChain, Point::default());
        let r1 = d.create_node(NodeKind::Role, Point::default());
        let r2 = d.create_node(NodeKind::Role, Point::default());
        let e1 = d.create_edge(EdgeKind::Input, r1, chain).unwrap();
        let e2 = d.create_edge(EdgeKind::Input, r2, chain).unwrap();
        d.attach_edge(e1);
        d.attach_edge(e2);
        d.attach_edge(e1);
        assert_eq!(d.node(chain).unwrap().inputs.as_slice(), &[e1, e2]);
        d.detach_edge(e1);
        assert_eq!(d.node(chain).unwrap().inputs.as_slice(), &[e2]);
    }

    #[test]
    fn set_label_reindexes() {
        let (mut d, a, _) = two_concepts();
        d.set_label(a, "Person");
        assert_eq!(d.predicate_nodes(NodeKind::Concept, "Person"), vec![a]);
        assert_eq!(d.predicate_nodes(NodeKind::Concept, "concept").len(), 1);
    }

    #[test]
    fn routing_follows_anchors_and_breakpoints() {
        let (mut d, a, b) = two_concepts();
        let e = d.create_edge(EdgeKind::Inclusion, a, b).unwrap();
        d.edge_mut(e).unwrap().breakpoints.push(Point::new(50.0, 40.0));
        d.node_mut(b).unwrap().anchors.insert(e, Point::new(90.0, 5.0));
        d.update_edge(e);
        let edge = d.edge(e).unwrap();
        assert_eq!(
            edge.path,
            vec![Point::new(0.0, 0.0), Point::new(50.0, 40.0), Point::new(90.0, 5.0)]
        );
        assert_eq!(edge.anchors.get(&a), Some(&Point::new(0.0, 0.0)));
    }

    #[test]
    fn moving_a_node_moves_its_anchors() {
        let (mut d, a, b) = two_concepts();
        let e = d.create_edge(EdgeKind::Inclusion, a, b).unwrap();
        d.node_mut(a).unwrap().anchors.insert(e, Point::new(10.0, 0.0));
        d.move_node_by(a, Point::new(5.0, 5.0));
        let node = d.node(a).unwrap();
        assert_eq!(node.pos, Point::new(5.0, 5.0));
        assert_eq!(node.anchor(e), Point::new(15.0, 5.0));
    }

    #[test]
    fn integrity_reports_half_registered_edges() {
        let (mut d, a, b) = two_concepts();
        let e = d.create_edge(EdgeKind::Inclusion, a, b).unwrap();
        d.add_edge(e);
        d.register_edge(a, e);
        assert_eq!(d.integrity_violations().len(), 1);
        d.register_edge(b, e);
        assert!(d.integrity_violations().is_empty());
    }
}
