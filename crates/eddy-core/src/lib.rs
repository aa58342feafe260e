pub mod diagram;
pub mod error;
pub mod event;
pub mod graph;
pub mod id;
pub mod index;
pub mod model;

pub use diagram::{Diagram, DiagramSnapshot};
pub use error::DiagramError;
pub use event::{ChangeSet, DiagramEvent};
pub use graph::Connectivity;
pub use id::{EdgeId, Guid, ItemId, NodeId};
pub use index::{MetaIndex, PredicateIndex, PredicateKey};
pub use model::*;
