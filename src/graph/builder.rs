//! Explicit construction helper: members and edges are handed to the builder
//! by name through ordinary method calls.

use super::AssemblyGraph;
use crate::error::{GraphError, Result};
use crate::store::{NodeId, NodeKind};

/// Fills one container step by step.
///
/// ```
/// use assembly_core::{AssemblyGraph, NodeKind};
///
/// let mut graph = AssemblyGraph::new();
/// let net = graph
///     .builder("net", NodeKind::Network)
///     .leaf("input", NodeKind::Encoder, 10)?
///     .leaf("hidden", NodeKind::NeuronGroup, 100)?
///     .connect("w1", "input", "hidden")?
///     .finish();
/// assert_eq!(graph.node(net)?.num, 110);
/// # Ok::<(), assembly_core::GraphError>(())
/// ```
pub struct AssemblyBuilder<'g> {
    graph: &'g mut AssemblyGraph,
    container: NodeId,
}

impl AssemblyGraph {
    /// Starts a new container of `kind`.
    pub fn builder(&mut self, name: impl Into<String>, kind: NodeKind) -> AssemblyBuilder<'_> {
        let container = self.create_node(name, kind);
        AssemblyBuilder { graph: self, container }
    }

    /// Continues filling an existing container.
    pub fn extend(&mut self, container: NodeId) -> Result<AssemblyBuilder<'_>> {
        self.store.node(container)?;
        Ok(AssemblyBuilder { graph: self, container })
    }
}

impl<'g> AssemblyBuilder<'g> {
    pub fn container(&self) -> NodeId { self.container }

    /// Adds an existing node under `name`.
    pub fn member(self, name: impl Into<String>, node: NodeId) -> Result<Self> {
        self.graph.add_member(self.container, name, node)?;
        Ok(self)
    }

    /// Creates a terminal node and adds it under `name`.
    pub fn leaf(self, name: impl Into<String>, kind: NodeKind, units: usize) -> Result<Self> {
        let name = name.into();
        let node = self.graph.create_leaf(name.clone(), kind, units)?;
        self.member(name, node)
    }

    /// Links two members, addressed by their names, with a new edge.
    pub fn connect(self, name: impl Into<String>, pre: &str, post: &str) -> Result<Self> {
        let record = self.graph.store.node(self.container)?;
        let lookup = |key: &str| {
            record.members.get(key).copied().ok_or_else(|| GraphError::NotFound {
                container: record.name.clone(),
                target: key.to_string(),
            })
        };
        let (pre, post) = (lookup(pre)?, lookup(post)?);
        let edge = self.graph.create_edge(pre, post)?;
        self.graph.add_edge(self.container, name, edge)?;
        Ok(self)
    }

    pub fn finish(self) -> NodeId { self.container }
}
