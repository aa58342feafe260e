//! Label and predicate metadata commands.

use super::{Direction, Reversible, Transition};
use eddy_core::{
    ChangeSet, Diagram, DiagramError, EdgeKind, Identity, NodeId, NodeKind, PredicateMeta,
};

/// Enumerations fed by `node`, whose identity depends on its label.
fn enumerations_fed_by(diagram: &Diagram, node: NodeId) -> Vec<NodeId> {
    diagram
        .outgoing(node, EdgeKind::Input)
        .into_iter()
        .map(|(_, target)| target)
        .filter(|t| diagram.node(*t).is_some_and(|n| n.kind == NodeKind::Enumeration))
        .collect()
}

/// Rename a node.
///
/// Whether the predicate's metadata follows the rename is decided when the
/// command is built: it does when metadata exists for the old label, none
/// exists for the new one, and either the rename is part of a refactor or
/// the node is the only one carrying the old label.
///
/// Renaming an individual re-identifies the enumerations it feeds on redo;
/// undo writes back the identities captured when the command was built.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelChange {
    name: String,
    node: NodeId,
    kind: NodeKind,
    text: Transition<String>,
    moves_meta: bool,
    identities: Vec<(NodeId, Identity)>,
}

impl LabelChange {
    pub fn new(diagram: &Diagram, node: NodeId, text: &str) -> Result<Self, DiagramError> {
        Self::build(diagram, node, text, false)
    }

    /// A rename issued for every node sharing a predicate.
    pub fn refactoring(diagram: &Diagram, node: NodeId, text: &str) -> Result<Self, DiagramError> {
        Self::build(diagram, node, text, true)
    }

    fn build(diagram: &Diagram, node: NodeId, text: &str, refactor: bool) -> Result<Self, DiagramError> {
        let n = diagram.node(node).ok_or(DiagramError::UnknownNode(node))?;
        let old = n.text.as_str();
        let sole_holder = diagram.predicate_nodes(n.kind, old) == [node];
        let moves_meta = n.kind.is_predicate()
            && old != text
            && diagram.meta(n.kind, old).is_some()
            && diagram.meta(n.kind, text).is_none()
            && (refactor || sole_holder);
        let identities = if n.kind == NodeKind::Individual {
            let mut sources = vec![node];
            sources.extend(enumerations_fed_by(diagram, node));
            diagram.identities_near(&sources)
        } else {
            Vec::new()
        };
        Ok(Self {
            name: format!("edit {} label", n.name()),
            node,
            kind: n.kind,
            text: Transition::new(n.text.clone(), text.to_string()),
            moves_meta,
            identities,
        })
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

impl Reversible for LabelChange {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        let (from, to) = match direction {
            Direction::Redo => (&self.text.undo, &self.text.redo),
            Direction::Undo => (&self.text.redo, &self.text.undo),
        };
        if self.moves_meta {
            diagram.rename_meta(self.kind, from, to);
        }
        diagram.set_label(self.node, to);

        let mut changes = ChangeSet::new();
        if self.kind == NodeKind::Individual {
            if direction == Direction::Undo {
                diagram.restore_identities(&self.identities);
            }
            for target in enumerations_fed_by(diagram, self.node) {
                if direction == Direction::Redo {
                    diagram.identify(target);
                }
                changes.identified(target);
            }
        }
        changes.updated();
        changes
    }
}

/// Attach, replace or drop the metadata of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct SetMeta {
    name: String,
    kind: NodeKind,
    text: String,
    meta: Transition<Option<PredicateMeta>>,
}

impl SetMeta {
    pub fn new(diagram: &Diagram, kind: NodeKind, text: &str, meta: Option<PredicateMeta>) -> Self {
        Self {
            name: format!("set {kind} '{text}' meta"),
            kind,
            text: text.to_string(),
            meta: Transition::new(diagram.meta(kind, text).cloned(), meta),
        }
    }
}

impl Reversible for SetMeta {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, diagram: &mut Diagram, direction: Direction) -> ChangeSet {
        diagram.set_meta(self.kind, &self.text, self.meta.get(direction).clone());
        let mut changes = ChangeSet::new();
        changes.updated();
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::{Identity, Point};
    use pretty_assertions::assert_eq;

    fn meta(description: &str) -> PredicateMeta {
        PredicateMeta {
            description: description.into(),
            url: String::new(),
        }
    }

    fn concept(d: &mut Diagram, text: &str) -> NodeId {
        let n = d.create_node(NodeKind::Concept, Point::default());
        d.add_node(n);
        d.set_label(n, text);
        n
    }

    #[test]
    fn sole_holder_takes_metadata_along() {
        let mut d = Diagram::new("test");
        let a = concept(&mut d, "Person");
        d.set_meta(NodeKind::Concept, "Person", Some(meta("a human")));

        let cmd = LabelChange::new(&d, a, "Human").unwrap();
        cmd.redo(&mut d);
        assert!(d.meta(NodeKind::Concept, "Person").is_none());
        assert_eq!(d.meta(NodeKind::Concept, "Human"), Some(&meta("a human")));
        cmd.undo(&mut d);
        assert_eq!(d.meta(NodeKind::Concept, "Person"), Some(&meta("a human")));
        assert!(d.meta(NodeKind::Concept, "Human").is_none());
    }

    #[test]
    fn shared_label_keeps_metadata_in_place() {
        let mut d = Diagram::new("test");
        let a = concept(&mut d, "Person");
        concept(&mut d, "Person");
        d.set_meta(NodeKind::Concept, "Person", Some(meta("a human")));

        let cmd = LabelChange::new(&d, a, "Human").unwrap();
        cmd.redo(&mut d);
        assert!(d.meta(NodeKind::Concept, "Person").is_some());
        assert!(d.meta(NodeKind::Concept, "Human").is_none());
        assert_eq!(d.predicate_nodes(NodeKind::Concept, "Person").len(), 1);
    }

    #[test]
    fn renaming_an_individual_reidentifies_its_enumerations() {
        let mut d = Diagram::new("test");
        let i = d.create_node(NodeKind::Individual, Point::default());
        let en = d.create_node(NodeKind::Enumeration, Point::default());
        d.add_node(i);
        d.add_node(en);
        let e = d.create_edge(EdgeKind::Input, i, en).unwrap();
        d.attach_edge(e);
        d.add_edge(e);
        d.identify(en);
        assert_eq!(d.node(en).unwrap().identity, Identity::Concept);

        let cmd = LabelChange::new(&d, i, "\"42\"^^xsd:int").unwrap();
        let changes = cmd.redo(&mut d);
        assert_eq!(d.node(en).unwrap().identity, Identity::ValueDomain);
        assert!(changes.iter().any(|e| *e == eddy_core::DiagramEvent::NodeIdentified(en)));
        cmd.undo(&mut d);
        assert_eq!(d.node(en).unwrap().identity, Identity::Concept);
    }

    #[test]
    fn set_meta_restores_previous_entry() {
        let mut d = Diagram::new("test");
        let cmd = SetMeta::new(&d, NodeKind::Role, "hasName", Some(meta("name")));
        assert_eq!(cmd.name(), "set role 'hasName' meta");
        cmd.redo(&mut d);
        assert_eq!(d.meta(NodeKind::Role, "hasName"), Some(&meta("name")));
        cmd.undo(&mut d);
        assert!(d.meta(NodeKind::Role, "hasName").is_none());
    }
}
