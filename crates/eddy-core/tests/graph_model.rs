//! Integration tests: graph model bookkeeping (eddy-core).
//!
//! Exercises the arena, scene membership, endpoint registration and the
//! derived input-order lists through the public API only.

use eddy_core::*;
use pretty_assertions::assert_eq;

fn node(d: &mut Diagram, kind: NodeKind, x: f64, y: f64) -> NodeId {
    let id = d.create_node(kind, Point::new(x, y));
    d.add_node(id);
    id
}

fn edge(d: &mut Diagram, kind: EdgeKind, source: NodeId, target: NodeId) -> EdgeId {
    let id = d.create_edge(kind, source, target).unwrap();
    d.attach_edge(id);
    d.add_edge(id);
    d.update_edge(id);
    id
}

// ─── Arena ──────────────────────────────────────────────────────────────

#[test]
fn factory_ids_skip_inserted_ones() {
    let mut d = Diagram::new("test");
    d.insert_node(Node::new(NodeId::intern("n0"), NodeKind::Concept, Point::default()))
        .unwrap();
    let fresh = d.create_node(NodeKind::Role, Point::default());
    assert_ne!(fresh, NodeId::intern("n0"));
}

#[test]
fn inserting_a_different_object_under_a_taken_id_fails() {
    let mut d = Diagram::new("test");
    let id = d.create_node(NodeKind::Concept, Point::default());
    let same = d.node(id).unwrap().clone();
    assert_eq!(d.insert_node(same), Ok(id));

    let other = Node::new(id, NodeKind::Role, Point::default());
    assert_eq!(d.insert_node(other), Err(DiagramError::DuplicateId(ItemId::Node(id))));
}

#[test]
fn edges_need_known_endpoints() {
    let mut d = Diagram::new("test");
    let a = node(&mut d, NodeKind::Concept, 0.0, 0.0);
    let ghost = NodeId::intern("ghost");
    assert_eq!(
        d.create_edge(EdgeKind::Inclusion, a, ghost),
        Err(DiagramError::UnknownNode(ghost))
    );
}

// ─── Registration ───────────────────────────────────────────────────────

#[test]
fn scene_membership_does_not_register() {
    let mut d = Diagram::new("test");
    let a = node(&mut d, NodeKind::Concept, 0.0, 0.0);
    let b = node(&mut d, NodeKind::Concept, 100.0, 0.0);
    let e = d.create_edge(EdgeKind::Inclusion, a, b).unwrap();

    d.add_edge(e);
    assert!(d.contains_edge(e));
    assert!(!d.is_attached(e));
    assert!(!d.integrity_violations().is_empty());

    d.attach_edge(e);
    assert!(d.integrity_violations().is_empty());
    assert_eq!(d.node(a).unwrap().edges.as_slice(), &[e]);
    assert_eq!(d.node(b).unwrap().edges.as_slice(), &[e]);
}

#[test]
fn ordered_inputs_follow_registration() {
    let mut d = Diagram::new("test");
    let chain = node(&mut d, NodeKind::RoleChain, 200.0, 0.0);
    let p = node(&mut d, NodeKind::Role, 0.0, 0.0);
    let q = node(&mut d, NodeKind::Role, 0.0, 100.0);
    let e1 = edge(&mut d, EdgeKind::Input, p, chain);
    let e2 = edge(&mut d, EdgeKind::Input, q, chain);

    assert_eq!(d.node(chain).unwrap().inputs.as_slice(), &[e1, e2]);
    d.update_edges_of(chain);
    assert_eq!(d.edge(e2).unwrap().label.as_deref(), Some("2"));

    d.detach_edge(e1);
    d.remove_edge(e1);
    assert_eq!(d.node(chain).unwrap().inputs.as_slice(), &[e2]);
    assert!(d.integrity_violations().is_empty());
}

#[test]
fn registering_twice_keeps_lists_distinct() {
    let mut d = Diagram::new("test");
    let chain = node(&mut d, NodeKind::PropertyAssertion, 200.0, 0.0);
    let i = node(&mut d, NodeKind::Individual, 0.0, 0.0);
    let e = edge(&mut d, EdgeKind::Input, i, chain);
    d.attach_edge(e);
    d.register_edge(chain, e);

    let n = d.node(chain).unwrap();
    assert_eq!(n.edges.len(), 1);
    assert_eq!(n.inputs.as_slice(), &[e]);
}

#[test]
#[should_panic(expected = "still attached")]
fn removing_an_attached_node_panics() {
    let mut d = Diagram::new("test");
    let a = node(&mut d, NodeKind::Concept, 0.0, 0.0);
    let b = node(&mut d, NodeKind::Concept, 100.0, 0.0);
    edge(&mut d, EdgeKind::Inclusion, a, b);
    d.remove_node(a);
}

// ─── Labels and routing ─────────────────────────────────────────────────

#[test]
fn relabel_moves_predicate_index_entry() {
    let mut d = Diagram::new("test");
    let a = node(&mut d, NodeKind::Concept, 0.0, 0.0);
    d.set_label(a, "Person");
    assert_eq!(d.predicate_nodes(NodeKind::Concept, "Person"), vec![a]);

    d.set_label(a, "Human");
    assert!(d.predicate_nodes(NodeKind::Concept, "Person").is_empty());
    assert_eq!(d.predicate_nodes(NodeKind::Concept, "Human"), vec![a]);
}

#[test]
fn moving_a_node_carries_its_anchors() {
    let mut d = Diagram::new("test");
    let a = node(&mut d, NodeKind::Concept, 0.0, 0.0);
    let b = node(&mut d, NodeKind::Concept, 100.0, 0.0);
    let e = edge(&mut d, EdgeKind::Inclusion, a, b);
    d.node_mut(a).unwrap().anchors.insert(e, Point::new(10.0, 0.0));

    d.move_node_by(a, Point::new(0.0, 20.0));
    d.update_edge(e);
    let routed = d.edge(e).unwrap();
    assert_eq!(routed.path.first(), Some(&Point::new(10.0, 20.0)));
    assert_eq!(routed.path.last(), Some(&Point::new(100.0, 0.0)));
}

#[test]
fn path_runs_through_breakpoints() {
    let mut d = Diagram::new("test");
    let a = node(&mut d, NodeKind::Concept, 0.0, 0.0);
    let b = node(&mut d, NodeKind::Concept, 100.0, 0.0);
    let e = edge(&mut d, EdgeKind::Inclusion, a, b);
    d.edge_mut(e).unwrap().breakpoints.push(Point::new(50.0, 50.0));
    d.update_edge(e);
    assert_eq!(
        d.edge(e).unwrap().path,
        vec![Point::new(0.0, 0.0), Point::new(50.0, 50.0), Point::new(100.0, 0.0)]
    );
}

// ─── Snapshots ──────────────────────────────────────────────────────────

#[test]
fn snapshot_ignores_registration_order() {
    let build = |swap: bool| {
        let mut d = Diagram::new("test");
        let a = node(&mut d, NodeKind::Concept, 0.0, 0.0);
        let b = node(&mut d, NodeKind::Concept, 100.0, 0.0);
        let e1 = d.create_edge(EdgeKind::Inclusion, a, b).unwrap();
        let e2 = d.create_edge(EdgeKind::Equivalence, a, b).unwrap();
        let order = if swap { [e2, e1] } else { [e1, e2] };
        for e in order {
            d.attach_edge(e);
            d.add_edge(e);
        }
        d.snapshot()
    };
    assert_eq!(build(false), build(true));
}

#[test]
fn snapshot_serializes() {
    let mut d = Diagram::new("test");
    let a = node(&mut d, NodeKind::Concept, 0.0, 0.0);
    d.set_label(a, "Person");
    let json = serde_json::to_string(&d.snapshot()).unwrap();
    assert!(json.contains("Person"));
}
