//! Lookups keyed by predicate (node kind + label text).
//!
//! The key of a node depends on its *current* label, so anything renaming a
//! node must take it out of the index before touching the text and put it
//! back afterwards. [`crate::Diagram::set_label`] does exactly that.

use crate::id::NodeId;
use crate::model::{NodeKind, PredicateMeta};
use std::collections::{HashMap, HashSet};

/// A predicate is identified by node kind and label text.
pub type PredicateKey = (NodeKind, String);

/// (kind, text) → live nodes carrying that label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateIndex {
    map: HashMap<PredicateKey, HashSet<NodeId>>,
}

impl PredicateIndex {
    pub fn insert(&mut self, kind: NodeKind, text: &str, node: NodeId) {
        self.map
            .entry((kind, text.to_string()))
            .or_default()
            .insert(node);
    }

    /// Remove a node from the given key, dropping the key once empty.
    pub fn remove(&mut self, kind: NodeKind, text: &str, node: NodeId) -> bool {
        let key = (kind, text.to_string());
        let Some(nodes) = self.map.get_mut(&key) else {
            return false;
        };
        let removed = nodes.remove(&node);
        if nodes.is_empty() {
            self.map.remove(&key);
        }
        removed
    }

    /// Nodes sharing the given predicate, sorted by id.
    pub fn nodes(&self, kind: NodeKind, text: &str) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .map
            .get(&(kind, text.to_string()))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        nodes.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        nodes
    }

    pub fn count(&self, kind: NodeKind, text: &str) -> usize {
        self.map
            .get(&(kind, text.to_string()))
            .map_or(0, HashSet::len)
    }

    pub fn contains(&self, kind: NodeKind, text: &str, node: NodeId) -> bool {
        self.map
            .get(&(kind, text.to_string()))
            .is_some_and(|set| set.contains(&node))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PredicateKey, &HashSet<NodeId>)> {
        self.map.iter()
    }
}

/// (kind, text) → descriptive metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaIndex {
    map: HashMap<PredicateKey, PredicateMeta>,
}

impl MetaIndex {
    pub fn get(&self, kind: NodeKind, text: &str) -> Option<&PredicateMeta> {
        self.map.get(&(kind, text.to_string()))
    }

    pub fn set(&mut self, kind: NodeKind, text: &str, meta: PredicateMeta) {
        self.map.insert((kind, text.to_string()), meta);
    }

    pub fn unset(&mut self, kind: NodeKind, text: &str) -> Option<PredicateMeta> {
        self.map.remove(&(kind, text.to_string()))
    }

    /// Move an entry to a new label. No-op if the old label has none.
    pub fn rename(&mut self, kind: NodeKind, from: &str, to: &str) {
        if let Some(meta) = self.unset(kind, from) {
            self.set(kind, to, meta);
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PredicateKey, &PredicateMeta)> {
        self.map.iter()
    }
}
