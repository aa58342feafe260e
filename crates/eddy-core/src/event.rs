//! Change descriptions produced by diagram mutations.
//!
//! Commands never call observers directly. Each `redo`/`undo` returns a
//! [`ChangeSet`] listing what happened, in order, and whoever drives the
//! command stack forwards it to any interested party.

use crate::id::{ItemId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramEvent {
    /// An item entered the scene.
    ItemAdded(ItemId),
    /// An item left the scene.
    ItemRemoved(ItemId),
    /// A node's identity was recomputed.
    NodeIdentified(NodeId),
    /// The diagram changed in some way; fired once at the end of every apply.
    Updated,
}

/// Ordered list of events emitted by one command application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub events: Vec<DiagramEvent>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn added(&mut self, item: impl Into<ItemId>) {
        self.events.push(DiagramEvent::ItemAdded(item.into()));
    }

    pub fn removed(&mut self, item: impl Into<ItemId>) {
        self.events.push(DiagramEvent::ItemRemoved(item.into()));
    }

    pub fn identified(&mut self, node: NodeId) {
        self.events.push(DiagramEvent::NodeIdentified(node));
    }

    /// Mark the end of a mutation. Consecutive `Updated` events collapse,
    /// so composites report a single trailing update per child at most.
    pub fn updated(&mut self) {
        if self.events.last() != Some(&DiagramEvent::Updated) {
            self.events.push(DiagramEvent::Updated);
        }
    }

    pub fn extend(&mut self, other: ChangeSet) {
        for event in other.events {
            match event {
                DiagramEvent::Updated => self.updated(),
                other => self.events.push(other),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagramEvent> {
        self.events.iter()
    }

    pub fn added_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.events.iter().filter_map(|e| match e {
            DiagramEvent::ItemAdded(item) => Some(*item),
            _ => None,
        })
    }

    pub fn removed_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.events.iter().filter_map(|e| match e {
            DiagramEvent::ItemRemoved(item) => Some(*item),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EdgeId;

    #[test]
    fn consecutive_updates_collapse() {
        let mut changes = ChangeSet::new();
        changes.updated();
        changes.updated();
        changes.added(EdgeId::intern("e0"));
        changes.updated();
        assert_eq!(changes.events.len(), 3);
    }

    #[test]
    fn extend_keeps_order() {
        let mut a = ChangeSet::new();
        a.added(NodeId::intern("n0"));
        a.updated();
        let mut b = ChangeSet::new();
        b.removed(NodeId::intern("n1"));
        b.updated();
        a.extend(b);
        assert_eq!(
            a.events,
            vec![
                DiagramEvent::ItemAdded(ItemId::Node(NodeId::intern("n0"))),
                DiagramEvent::Updated,
                DiagramEvent::ItemRemoved(ItemId::Node(NodeId::intern("n1"))),
                DiagramEvent::Updated,
            ]
        );
    }
}
