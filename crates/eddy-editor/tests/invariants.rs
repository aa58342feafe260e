//! Property-based invariant tests for the undo stack and input bookkeeping.
//!
//! 1. The cursor never leaves `0..=len` and tracks a reference model
//! 2. Pushing after undo discards exactly the undone tail
//! 3. Ordered-input lists and endpoint registration stay consistent under
//!    arbitrary add/remove/swap/reorder/undo/redo sequences
//! 4. Undoing everything restores the original scene

use eddy_core::*;
use eddy_editor::CommandStack;
use eddy_editor::commands::*;
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum StackOp {
    Push(i32),
    Undo,
    Redo,
}

fn stack_op() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        (-50i32..50).prop_map(StackOp::Push),
        Just(StackOp::Undo),
        Just(StackOp::Redo),
    ]
}

#[derive(Debug, Clone)]
enum EditOp {
    /// New input edge from role `n % roles` into the chain.
    AddInput(usize),
    /// Remove live edge `n % live`.
    Remove(usize),
    /// Swap live edge `n % live`.
    Swap(usize),
    /// Reverse the chain's input order.
    Reverse,
    Undo,
    Redo,
}

fn edit_op() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        3 => (0usize..8).prop_map(EditOp::AddInput),
        2 => (0usize..8).prop_map(EditOp::Remove),
        2 => (0usize..8).prop_map(EditOp::Swap),
        1 => Just(EditOp::Reverse),
        2 => Just(EditOp::Undo),
        2 => Just(EditOp::Redo),
    ]
}

const ROLES: usize = 3;

fn scene() -> (Diagram, NodeId, Vec<NodeId>) {
    let mut d = Diagram::new("proptest");
    let chain = d.create_node(NodeKind::RoleChain, Point::new(200.0, 0.0));
    d.add_node(chain);
    let roles = (0..ROLES)
        .map(|i| {
            let r = d.create_node(NodeKind::Role, Point::new(0.0, 100.0 * i as f64));
            d.add_node(r);
            r
        })
        .collect();
    (d, chain, roles)
}

fn apply(d: &mut Diagram, stack: &mut CommandStack, chain: NodeId, roles: &[NodeId], op: &EditOp) {
    let live = d.edge_ids();
    match *op {
        EditOp::AddInput(n) => {
            let Ok(e) = d.create_edge(EdgeKind::Input, roles[n % roles.len()], chain) else {
                return;
            };
            if let Ok(cmd) = AddEdge::new(d, e) {
                stack.push(d, cmd);
            }
        }
        EditOp::Remove(n) if !live.is_empty() => {
            if let Ok(cmd) = RemoveItems::new(d, &[live[n % live.len()].into()]) {
                stack.push(d, cmd);
            }
        }
        EditOp::Swap(n) if !live.is_empty() => {
            if let Ok(cmd) = SwapEdges::new(d, &[live[n % live.len()]]) {
                stack.push(d, cmd);
            }
        }
        EditOp::Reverse => {
            let mut order: Vec<EdgeId> = d.node(chain).map(|n| n.inputs.to_vec()).unwrap_or_default();
            order.reverse();
            if let Ok(cmd) = ChangeInputsOrder::new(d, chain, &order) {
                stack.push(d, cmd);
            }
        }
        EditOp::Undo => {
            stack.undo(d);
        }
        EditOp::Redo => {
            stack.redo(d);
        }
        _ => {}
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1–2. Stack cursor
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cursor_tracks_reference_model(ops in prop::collection::vec(stack_op(), 0..60)) {
        let mut d = Diagram::new("proptest");
        let n = d.create_node(NodeKind::Concept, Point::default());
        d.add_node(n);
        let mut stack = CommandStack::new(0);
        let mut model: Vec<i32> = Vec::new();
        let mut cursor = 0usize;

        for op in &ops {
            match op {
                StackOp::Push(dx) => {
                    stack.push(&mut d, TranslateItems::new(&[n.into()], Point::new(f64::from(*dx), 0.0)));
                    model.truncate(cursor);
                    model.push(*dx);
                    cursor = model.len();
                }
                StackOp::Undo => {
                    let undone = stack.undo(&mut d).is_some();
                    prop_assert_eq!(undone, cursor > 0);
                    cursor = cursor.saturating_sub(1);
                }
                StackOp::Redo => {
                    let redone = stack.redo(&mut d).is_some();
                    prop_assert_eq!(redone, cursor < model.len());
                    if redone {
                        cursor += 1;
                    }
                }
            }
            prop_assert!(stack.index() <= stack.len());
            prop_assert_eq!(stack.index(), cursor);
            prop_assert_eq!(stack.len(), model.len());
            let expected: i32 = model[..cursor].iter().sum();
            prop_assert_eq!(d.node(n).unwrap().pos.x, f64::from(expected));
        }
    }

    #[test]
    fn limited_stack_never_exceeds_limit(
        limit in 1usize..8,
        ops in prop::collection::vec(stack_op(), 0..60),
    ) {
        let mut d = Diagram::new("proptest");
        let n = d.create_node(NodeKind::Concept, Point::default());
        d.add_node(n);
        let mut stack = CommandStack::new(limit);
        for op in &ops {
            match op {
                StackOp::Push(dx) => {
                    stack.push(&mut d, TranslateItems::new(&[n.into()], Point::new(f64::from(*dx), 0.0)));
                }
                StackOp::Undo => {
                    stack.undo(&mut d);
                }
                StackOp::Redo => {
                    stack.redo(&mut d);
                }
            }
            prop_assert!(stack.len() <= limit);
            prop_assert!(stack.index() <= stack.len());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3–4. Input lists and registration
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn inputs_stay_consistent(ops in prop::collection::vec(edit_op(), 0..40)) {
        let (mut d, chain, roles) = scene();
        let mut stack = CommandStack::new(0);

        for op in &ops {
            apply(&mut d, &mut stack, chain, &roles, op);
            prop_assert_eq!(d.integrity_violations(), Vec::<String>::new(), "after {:?}", op);
        }
    }

    #[test]
    fn undo_all_restores_the_scene(ops in prop::collection::vec(edit_op(), 0..40)) {
        let (mut d, chain, roles) = scene();
        let initial_nodes = d.node_ids();
        let mut stack = CommandStack::new(0);

        for op in &ops {
            apply(&mut d, &mut stack, chain, &roles, op);
        }
        while stack.undo(&mut d).is_some() {}

        prop_assert_eq!(d.node_ids(), initial_nodes);
        prop_assert!(d.edge_ids().is_empty());
        prop_assert!(d.node(chain).unwrap().inputs.is_empty());
        for role in &roles {
            prop_assert!(d.node(*role).unwrap().edges.is_empty());
        }
    }
}
