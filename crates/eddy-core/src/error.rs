use crate::id::{EdgeId, ItemId, NodeId};
use thiserror::Error;

/// Errors raised while building commands or inserting items.
///
/// These are all caller mistakes detected before any state is touched;
/// broken invariants found *during* a mutation are panics instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("item {0} already exists in the diagram")]
    DuplicateId(ItemId),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),

    #[error("{0} is not in the diagram")]
    NotLive(ItemId),

    #[error("{0} is already in the diagram")]
    AlreadyLive(ItemId),

    #[error("breakpoint {index} out of range for edge {edge} ({len} breakpoints)")]
    BreakpointOutOfRange { edge: EdgeId, index: usize, len: usize },

    #[error("input order for {node} must be a permutation of its current inputs")]
    InputsMismatch { node: NodeId },

    #[error("node {node} is not an endpoint of edge {edge}")]
    NotAnEndpoint { node: NodeId, edge: EdgeId },

    #[error("nothing to paste")]
    EmptyClipboard,
}
