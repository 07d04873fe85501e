//! Error types shared by the graph mutation API and the build pipeline.
use crate::store::{EdgeId, NodeId, NodeKind};
use thiserror::Error;

/// Every structural error aborts the operation before the graph is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("name '{name}' is already used in container '{container}'")]
    DuplicateName { container: String, name: String },

    #[error("'{name}' is already present in container '{container}'")]
    DuplicateMember { container: String, name: String },

    #[error("edge '{edge}' endpoint '{endpoint}' is not a member of container '{container}'")]
    DanglingEdge {
        container: String,
        edge: String,
        endpoint: String,
    },

    #[error("'{target}' not found in container '{container}'")]
    NotFound { container: String, target: String },

    #[error("no free name for '{name}' in container '{container}' after {attempts} attempts")]
    MergeExhaustion {
        container: String,
        name: String,
        attempts: usize,
    },

    #[error("'{container}' is a terminal node and cannot hold members")]
    TerminalContainer { container: String },

    #[error("adding '{member}' to '{container}' would make the containment hierarchy cyclic")]
    ContainmentCycle { container: String, member: String },

    #[error("kind {kind:?} is a container and cannot carry its own unit count")]
    NotTerminal { kind: NodeKind },

    #[error("unknown node handle {0:?}")]
    UnknownNode(NodeId),

    #[error("unknown edge handle {0:?}")]
    UnknownEdge(EdgeId),

    #[error("backend failed to build '{target}': {message}")]
    Backend { target: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
