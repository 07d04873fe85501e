//! Hierarchical assembly graphs and their build scheduling.
//!
//! An [`AssemblyGraph`] holds nodes (containers and terminal units) and
//! directed edges in an arena addressed by [`NodeId`] / [`EdgeId`]. Containers
//! own an ordered set of named members and edges; a node may be shared by
//! several containers. [`AssemblyGraph::plan`] linearizes a container into a
//! [`BuildPlan`], breaking cycles with delayed edges, and
//! [`AssemblyGraph::build`] replays that plan against a [`Backend`].

pub mod analysis;
pub mod compute;
pub mod config;
pub mod error;
pub mod graph;
pub mod store;

pub use compute::{
    Backend, BackendError, BuildMode, BuildPlan, BuildStep, BuildTarget, BuildWarning,
    RecordingBackend,
};
pub use config::GraphConfig;
pub use error::{GraphError, Result};
pub use graph::{AssemblyBuilder, AssemblyGraph, EdgeRef, MemberRef};
pub use store::{EdgeId, EdgeRecord, NodeId, NodeKind, NodeRecord, Role};
