//! Connectivity view of the diagram and node identification.
//!
//! Constructors such as union or complement carry no identity of their own:
//! they inherit it from whatever they are connected to through inclusion and
//! input edges. Identification walks that neighbourhood and settles every
//! such node on one shared identity.

use crate::diagram::Diagram;
use crate::id::{EdgeId, NodeId};
use crate::model::{Edge, EdgeKind, Identity, NodeKind};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use std::collections::{HashMap, HashSet, VecDeque};

/// Undirected graph over the diagram's nodes, restricted to attached edges
/// accepted by a filter.
pub struct Connectivity {
    graph: StableUnGraph<NodeId, EdgeId>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Connectivity {
    pub fn build(diagram: &Diagram, keep: impl Fn(&Edge) -> bool) -> Self {
        let mut graph = StableUnGraph::default();
        let mut index = HashMap::new();
        for id in diagram.node_ids() {
            index.insert(id, graph.add_node(id));
        }
        for id in diagram.edge_ids() {
            let Some(edge) = diagram.edge(id) else {
                continue;
            };
            if !keep(edge) || !diagram.is_attached(id) {
                continue;
            }
            if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
                graph.add_edge(a, b, id);
            }
        }
        Self { graph, index }
    }

    /// Breadth-first visit from `source`, returning nodes in visit order.
    ///
    /// Every reached node is reported, but only nodes accepted by `expand`
    /// have their own neighbours queued.
    pub fn bfs(&self, source: NodeId, expand: impl Fn(NodeId) -> bool) -> Vec<NodeId> {
        let Some(&start) = self.index.get(&source) else {
            return Vec::new();
        };
        let mut order = Vec::new();
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(ix) = queue.pop_front() {
            let id = self.graph[ix];
            order.push(id);
            if !expand(id) {
                continue;
            }
            for next in self.graph.neighbors(ix) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        order
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Collapse a list of identities: none → neutral, all equal → that one,
/// anything else → unknown.
fn collapse(identities: impl IntoIterator<Item = Identity>) -> Identity {
    let mut iter = identities.into_iter();
    let Some(first) = iter.next() else {
        return Identity::Neutral;
    };
    if iter.all(|i| i == first) {
        first
    } else {
        Identity::Unknown
    }
}

impl Diagram {
    /// Recompute the identity of every weak node reachable from `source`.
    ///
    /// Returns the weak nodes that were visited, in visit order.
    pub fn identify(&mut self, source: NodeId) -> Vec<NodeId> {
        if self.node(source).is_none() {
            return Vec::new();
        }
        let view = Connectivity::build(self, |e| {
            matches!(e.kind, EdgeKind::Inclusion | EdgeKind::Input)
        });
        let is_weak = |d: &Diagram, n: NodeId| d.node(n).is_some_and(|n| n.kind.is_weak());
        let visited = view.bfs(source, |n| is_weak(self, n));
        let (weak, strong): (Vec<NodeId>, Vec<NodeId>) =
            visited.into_iter().partition(|n| is_weak(self, *n));
        let mut strong: HashSet<NodeId> = strong.into_iter().collect();
        let mut settled = HashSet::new();

        for &id in &weak {
            let Some(kind) = self.node(id).map(|n| n.kind) else {
                continue;
            };
            let computed = match kind {
                // Members decide: individuals make a concept, values a datatype.
                NodeKind::Enumeration => {
                    let members: Vec<NodeId> = self
                        .incoming(id, EdgeKind::Input)
                        .into_iter()
                        .map(|(_, n)| n)
                        .filter(|n| {
                            self.node(*n).is_some_and(|n| n.kind == NodeKind::Individual)
                        })
                        .collect();
                    let identity = match collapse(members.iter().filter_map(|n| {
                        self.node(*n).map(|n| n.identity)
                    })) {
                        Identity::Individual => Identity::Concept,
                        Identity::Value => Identity::ValueDomain,
                        other => other,
                    };
                    Some((identity, members))
                }
                // Roles restrict to a concept, attributes to a datatype.
                NodeKind::RangeRestriction => {
                    let sources: Vec<NodeId> = self
                        .incoming(id, EdgeKind::Input)
                        .into_iter()
                        .map(|(_, n)| n)
                        .filter(|n| {
                            self.node(*n).is_some_and(|n| {
                                !n.kind.is_weak()
                                    && matches!(n.identity, Identity::Role | Identity::Attribute)
                            })
                        })
                        .collect();
                    let identity = match collapse(sources.iter().filter_map(|n| {
                        self.node(*n).map(|n| n.identity)
                    })) {
                        Identity::Role => Identity::Concept,
                        Identity::Attribute => Identity::ValueDomain,
                        other => other,
                    };
                    Some((identity, sources))
                }
                _ => None,
            };
            if let Some((identity, used)) = computed {
                if let Some(node) = self.node_mut(id) {
                    node.identity = identity;
                }
                if identity != Identity::Neutral {
                    strong.insert(id);
                    settled.insert(id);
                }
                for n in used {
                    strong.remove(&n);
                }
            }
        }

        let mut strong: Vec<NodeId> = strong.into_iter().collect();
        strong.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        let shared = collapse(
            strong
                .iter()
                .filter_map(|n| self.node(*n).map(|n| n.identity))
                .filter(|i| *i != Identity::Neutral),
        );
        for id in &weak {
            if settled.contains(id) {
                continue;
            }
            if let Some(node) = self.node_mut(*id) {
                node.identity = shared;
            }
        }
        log::trace!("identified {} weak node(s) from {source} as {shared:?}", weak.len());
        weak
    }

    /// Current identity of every node that identification starting from any
    /// of `sources` could rewrite: the sources themselves and each weak node
    /// in their connected components.
    pub fn identities_near(&self, sources: &[NodeId]) -> Vec<(NodeId, Identity)> {
        let view = Connectivity::build(self, |e| {
            matches!(e.kind, EdgeKind::Inclusion | EdgeKind::Input)
        });
        let mut nodes: Vec<NodeId> = Vec::new();
        for &source in sources {
            if !nodes.contains(&source) {
                nodes.push(source);
            }
            for id in view.bfs(source, |_| true) {
                let weak = self.node(id).is_some_and(|n| n.kind.is_weak());
                if weak && !nodes.contains(&id) {
                    nodes.push(id);
                }
            }
        }
        nodes
            .into_iter()
            .filter_map(|id| self.node(id).map(|n| (id, n.identity)))
            .collect()
    }

    /// Write back identities captured by [`Diagram::identities_near`].
    pub fn restore_identities(&mut self, identities: &[(NodeId, Identity)]) {
        for &(id, identity) in identities {
            if let Some(node) = self.node_mut(id) {
                node.identity = identity;
            }
        }
    }
}
