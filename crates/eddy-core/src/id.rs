use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for item IDs — fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a new string as an ID, or return the existing one.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::intern(&s))
            }
        }
    };
}

interned_id! {
    /// Identifier of a diagram node (`n0`, `n1`, ...). 4 bytes, `Copy`.
    NodeId
}

interned_id! {
    /// Identifier of a diagram edge (`e0`, `e1`, ...). 4 bytes, `Copy`.
    EdgeId
}

/// Either kind of diagram item.
///
/// Replaces runtime probing of "is this a node or an edge" with a closed
/// discriminator that callers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemId {
    Node(NodeId),
    Edge(EdgeId),
}

impl ItemId {
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            ItemId::Node(id) => Some(id),
            ItemId::Edge(_) => None,
        }
    }

    pub fn as_edge(self) -> Option<EdgeId> {
        match self {
            ItemId::Edge(id) => Some(id),
            ItemId::Node(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemId::Node(id) => id.as_str(),
            ItemId::Edge(id) => id.as_str(),
        }
    }
}

impl From<NodeId> for ItemId {
    fn from(id: NodeId) -> Self {
        ItemId::Node(id)
    }
}

impl From<EdgeId> for ItemId {
    fn from(id: EdgeId) -> Self {
        ItemId::Edge(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-diagram id generator.
///
/// Issues `<prefix><n>` ids with an independent counter per prefix and
/// skips past any id it is told about, so ids loaded from elsewhere are
/// never handed out twice.
#[derive(Debug, Clone, Default)]
pub struct Guid {
    counters: HashMap<char, u64>,
}

impl Guid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next free id for the given prefix.
    pub fn next(&mut self, prefix: char) -> String {
        let counter = self.counters.entry(prefix).or_insert(0);
        let id = format!("{prefix}{counter}");
        *counter += 1;
        id
    }

    /// Record an externally supplied id so it is never generated again.
    pub fn observe(&mut self, id: &str) {
        let mut chars = id.chars();
        let Some(prefix) = chars.next() else {
            return;
        };
        if let Ok(n) = chars.as_str().parse::<u64>() {
            let counter = self.counters.entry(prefix).or_insert(0);
            if *counter <= n {
                *counter = n + 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("n42");
        let b = NodeId::intern("n42");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "n42");
    }

    #[test]
    fn item_id_discriminates() {
        let item = ItemId::from(EdgeId::intern("e1"));
        assert_eq!(item.as_edge(), Some(EdgeId::intern("e1")));
        assert_eq!(item.as_node(), None);
    }

    #[test]
    fn guid_counts_per_prefix() {
        let mut guid = Guid::new();
        assert_eq!(guid.next('n'), "n0");
        assert_eq!(guid.next('n'), "n1");
        assert_eq!(guid.next('e'), "e0");
    }

    #[test]
    fn guid_skips_observed_ids() {
        let mut guid = Guid::new();
        guid.observe("n7");
        guid.observe("n3");
        guid.observe("label");
        assert_eq!(guid.next('n'), "n8");
    }
}
