use super::types::*;
use crate::error::{GraphError, Result};
use std::collections::HashSet;

/// Arena holding every node and edge ever created. Handles are indices and
/// are never reused, so they stay valid after a node is detached.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }
    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    pub fn push_node(&mut self, record: NodeRecord) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(record);
        id
    }

    pub fn push_edge(&mut self, record: EdgeRecord) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(record);
        id
    }

    pub fn node(&self, id: NodeId) -> Result<&NodeRecord> {
        self.nodes.get(id.index()).ok_or(GraphError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord> {
        self.nodes.get_mut(id.index()).ok_or(GraphError::UnknownNode(id))
    }

    pub fn edge(&self, id: EdgeId) -> Result<&EdgeRecord> {
        self.edges.get(id.index()).ok_or(GraphError::UnknownEdge(id))
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeRecord> {
        self.edges.get_mut(id.index()).ok_or(GraphError::UnknownEdge(id))
    }

    #[inline(always)]
    pub(crate) fn n(&self, id: NodeId) -> &NodeRecord { &self.nodes[id.index()] }

    #[inline(always)]
    pub(crate) fn e(&self, id: EdgeId) -> &EdgeRecord { &self.edges[id.index()] }

    pub fn name_of(&self, id: NodeId) -> String {
        self.nodes
            .get(id.index())
            .map(|n| n.name.clone())
            .unwrap_or_else(|| format!("{:?}", id))
    }

    pub fn edge_name_of(&self, id: EdgeId) -> String {
        self.edges
            .get(id.index())
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("{:?}", id))
    }

    /// Whether `node` sits somewhere below `ancestor` in the containment hierarchy.
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = self.n(node).supers.to_vec();
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.n(current).supers.iter().copied());
            }
        }
        false
    }

    /// Adds `delta` to the unit count of `node` and every container above it.
    /// A container reached along several paths receives the delta once per
    /// path, matching the sum over its members.
    pub fn adjust_num(&mut self, node: NodeId, delta: isize) {
        if delta == 0 {
            return;
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let record = &mut self.nodes[current.index()];
            record.num = record.num.saturating_add_signed(delta);
            stack.extend(record.supers.iter().copied());
        }
    }

    /// Records `edge` in the back-reference lists of its endpoints. A
    /// composite endpoint also hands the edge to its direct members.
    pub fn register_edge(&mut self, edge: EdgeId) {
        let (pre, post) = {
            let e = self.e(edge);
            (e.pre, e.post)
        };

        let pre_members: Vec<NodeId> = self.n(pre).members.values().copied().collect();
        for node in pre_members.into_iter().chain(std::iter::once(pre)) {
            let outbound = &mut self.nodes[node.index()].outbound;
            if !outbound.contains(&edge) {
                outbound.push(edge);
            }
        }

        let post_members: Vec<NodeId> = self.n(post).members.values().copied().collect();
        for node in post_members.into_iter().chain(std::iter::once(post)) {
            let inbound = &mut self.nodes[node.index()].inbound;
            if !inbound.contains(&edge) {
                inbound.push(edge);
            }
        }
    }

    /// Drops `edge` from every back-reference list in the arena.
    pub fn unregister_edge(&mut self, edge: EdgeId) {
        for record in &mut self.nodes {
            record.inbound.retain(|e| *e != edge);
            record.outbound.retain(|e| *e != edge);
        }
    }

    /// Hands `node`, newly a member of `container`, the edges registered
    /// directly on `container`, as `register_edge` does for existing members.
    pub fn adopt_container_edges(&mut self, container: NodeId, node: NodeId) {
        let record = self.n(container);
        let inbound: Vec<EdgeId> =
            record.inbound.iter().copied().filter(|&e| self.e(e).post == container).collect();
        let outbound: Vec<EdgeId> =
            record.outbound.iter().copied().filter(|&e| self.e(e).pre == container).collect();

        let target = &mut self.nodes[node.index()];
        for edge in inbound {
            if !target.inbound.contains(&edge) {
                target.inbound.push(edge);
            }
        }
        for edge in outbound {
            if !target.outbound.contains(&edge) {
                target.outbound.push(edge);
            }
        }
    }

    /// Removes from `node` the edges it only carried as a member of `container`.
    pub fn release_container_edges(&mut self, container: NodeId, node: NodeId) {
        if node == container {
            return;
        }
        let edges = &self.edges;
        let record = &mut self.nodes[node.index()];
        record.inbound.retain(|e| edges[e.index()].post != container);
        record.outbound.retain(|e| edges[e.index()].pre != container);
    }
}
