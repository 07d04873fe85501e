//! Index-addressed storage for nodes and edges.
pub mod registry;
pub mod types;

pub use registry::Registry;
pub use types::{EdgeId, EdgeRecord, NodeId, NodeKind, NodeRecord, Role, EDGE_TAG};
