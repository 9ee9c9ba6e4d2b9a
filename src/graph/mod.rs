//! Property graph construction.
//!
//! A graph has one `Document` node, one node per distinct value of each
//! classified metadata field and one `Chunk` node per text chunk.

mod builder;
mod classify;
mod model;

pub use builder::{GraphBuilder, CHUNK_LABEL, CONTAINS_RELATION, DOCUMENT_LABEL};
pub use classify::{label_for, relation_for, FieldClass, FieldClassifier};
pub use model::{Edge, Graph, Node, RESERVED_EDGE_KEYS, RESERVED_NODE_KEYS};
