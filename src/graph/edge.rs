//! Defines `EdgeRef` and the endpoint rewiring operation of an edge.

use super::AssemblyGraph;
use crate::error::{GraphError, Result};
use crate::store::{EdgeId, NodeId, NodeRecord};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeRef {
    Name(String),
    Edge(EdgeId),
}

impl EdgeRef {
    pub(crate) fn resolve(&self, container: &NodeRecord) -> Option<(String, EdgeId)> {
        match self {
            EdgeRef::Name(name) => container.edges.get(name).map(|&e| (name.clone(), e)),
            EdgeRef::Edge(edge) => container.edge_key(*edge).map(|k| (k.to_string(), *edge)),
        }
    }
}

impl From<&str> for EdgeRef {
    fn from(name: &str) -> Self { EdgeRef::Name(name.to_string()) }
}

impl From<String> for EdgeRef {
    fn from(name: String) -> Self { EdgeRef::Name(name) }
}

impl From<EdgeId> for EdgeRef {
    fn from(edge: EdgeId) -> Self { EdgeRef::Edge(edge) }
}

impl AssemblyGraph {
    /// Points the endpoint(s) of `edge` that equal `old` at `new`.
    ///
    /// `new` must already be a member of every container owning the edge.
    pub fn replace_endpoint(&mut self, edge: EdgeId, old: NodeId, new: NodeId) -> Result<()> {
        let record = self.store.edge(edge)?;
        self.store.node(old)?;
        self.store.node(new)?;
        if !record.links(old) {
            return Err(GraphError::NotFound {
                container: record.name.clone(),
                target: self.store.name_of(old),
            });
        }
        for &owner in &record.owners {
            if !self.store.n(owner).has_member(new) {
                return Err(GraphError::DanglingEdge {
                    container: self.store.name_of(owner),
                    edge: record.name.clone(),
                    endpoint: self.store.name_of(new),
                });
            }
        }
        self.rewire(edge, old, new);
        self.mark_stale();
        Ok(())
    }

    /// Unchecked rewiring: moves the back-references along with the endpoint.
    pub(crate) fn rewire(&mut self, edge: EdgeId, old: NodeId, new: NodeId) {
        let registered = !self.store.e(edge).owners.is_empty();
        if registered {
            self.store.unregister_edge(edge);
        }
        self.store.edges[edge.index()].replace_endpoint(old, new);
        if registered {
            self.store.register_edge(edge);
        }
    }
}
