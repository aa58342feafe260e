//! Copy and paste of diagram fragments.

use crate::commands::AddItems;
use eddy_core::{Diagram, DiagramError, Edge, EdgeId, EdgeList, ItemId, Node, NodeId, Point};
use std::collections::HashMap;

/// Copied nodes and the edges running between them.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current selection. Edges come along only when both their
    /// endpoints are selected too. An empty selection leaves the clipboard
    /// untouched.
    pub fn update(&mut self, diagram: &Diagram) {
        let selected = diagram.selected_items();
        if selected.is_empty() {
            return;
        }
        let nodes: Vec<Node> = selected
            .iter()
            .filter_map(|item| item.as_node())
            .filter_map(|id| diagram.node(id))
            .cloned()
            .collect();
        let edges: Vec<Edge> = selected
            .iter()
            .filter_map(|item| item.as_edge())
            .filter_map(|id| diagram.edge(id))
            .filter(|e| diagram.is_selected(e.source) && diagram.is_selected(e.target))
            .cloned()
            .collect();
        log::debug!("copied {} nodes, {} edges", nodes.len(), edges.len());
        self.nodes = nodes;
        self.edges = edges;
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    /// Build a command pasting a fresh copy of the clipboard.
    ///
    /// With `pos` the topmost copied node lands with its top-left corner at
    /// `pos`; without it the copy is shifted by the diagram's running paste
    /// offset. Either way the running offset then advances by `step`, so
    /// repeated pastes cascade. Copies stack above every node in the scene.
    ///
    /// The copies are allocated in the diagram's arena right away, detached
    /// from the scene, and the running offset has already moved. Dropping
    /// the command instead of pushing it leaves those unreachable entries
    /// behind; the scene itself is untouched.
    pub fn paste(
        &self,
        diagram: &mut Diagram,
        pos: Option<Point>,
        step: Point,
    ) -> Result<AddItems, DiagramError> {
        if self.is_empty() {
            return Err(DiagramError::EmptyClipboard);
        }

        let offset = match (pos, self.topmost()) {
            (Some(pos), Some(top)) => {
                let corner = Point::new(
                    top.pos.x - top.size.width / 2.0,
                    top.pos.y - top.size.height / 2.0,
                );
                pos - corner
            }
            _ => diagram.paste_offset,
        };
        diagram.paste_offset = offset + step;

        let mut node_map: HashMap<NodeId, NodeId> = HashMap::new();
        for node in &self.nodes {
            node_map.insert(node.id, diagram.create_node(node.kind, node.pos));
        }

        let mut edge_map: HashMap<EdgeId, EdgeId> = HashMap::new();
        let mut items = Vec::with_capacity(self.len());
        for node in &self.nodes {
            items.push(ItemId::Node(node_map[&node.id]));
        }
        for edge in &self.edges {
            let (Some(&source), Some(&target)) =
                (node_map.get(&edge.source), node_map.get(&edge.target))
            else {
                log::trace!("skip edge {}: endpoint not copied", edge.id);
                continue;
            };
            let id = diagram.create_edge(edge.kind, source, target)?;
            if let Some(copy) = diagram.edge_mut(id) {
                copy.breakpoints = edge.breakpoints.iter().map(|p| *p + offset).collect();
                copy.equivalence = edge.equivalence;
                copy.functional = edge.functional;
            }
            edge_map.insert(edge.id, id);
            items.push(ItemId::Edge(id));
        }

        let mut z = diagram.max_z();
        for node in &self.nodes {
            let id = node_map[&node.id];
            z += 0.1;
            let Some(copy) = diagram.node_mut(id) else {
                continue;
            };
            copy.pos = node.pos + offset;
            copy.size = node.size;
            copy.brush = node.brush;
            copy.z = z;
            copy.font_size = node.font_size;
            copy.text = node.text.clone();
            copy.text_pos = node.text_pos.map(|p| p + offset);
            copy.identity = node.identity;
            copy.anchors = node
                .anchors
                .iter()
                .filter_map(|(edge, point)| edge_map.get(edge).map(|e| (*e, *point + offset)))
                .collect();
            copy.inputs = node
                .inputs
                .iter()
                .filter_map(|edge| edge_map.get(edge).copied())
                .collect::<EdgeList>();
        }

        log::debug!("paste {} items at offset {:?}", items.len(), offset);
        AddItems::new(diagram, &items)
    }

    fn topmost(&self) -> Option<&Node> {
        self.nodes.iter().min_by(|a, b| a.top().total_cmp(&b.top()))
    }
}
