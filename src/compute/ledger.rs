use crate::store::{EdgeId, NodeId};

/// Built/unbuilt state of every node and edge for the duration of one
/// build. Shared by all nested containers so a node held by several parents
/// is built once.
#[derive(Debug, Clone, Default)]
pub struct BuildLedger {
    nodes: Vec<bool>,
    edges: Vec<bool>,
    built: usize,
}

impl BuildLedger {
    pub fn new(node_count: usize, edge_count: usize) -> Self {
        Self { nodes: vec![false; node_count], edges: vec![false; edge_count], built: 0 }
    }

    #[inline(always)]
    pub fn node_built(&self, node: NodeId) -> bool {
        self.nodes.get(node.index()).copied().unwrap_or(false)
    }

    #[inline(always)]
    pub fn edge_built(&self, edge: EdgeId) -> bool {
        self.edges.get(edge.index()).copied().unwrap_or(false)
    }

    /// Marks `node` built. Returns false if it already was.
    pub fn mark_node(&mut self, node: NodeId) -> bool {
        let idx = node.index();
        if idx >= self.nodes.len() {
            self.nodes.resize(idx + 1, false);
        }
        let fresh = !std::mem::replace(&mut self.nodes[idx], true);
        self.built += fresh as usize;
        fresh
    }

    /// Marks `edge` built. Returns false if it already was.
    pub fn mark_edge(&mut self, edge: EdgeId) -> bool {
        let idx = edge.index();
        if idx >= self.edges.len() {
            self.edges.resize(idx + 1, false);
        }
        let fresh = !std::mem::replace(&mut self.edges[idx], true);
        self.built += fresh as usize;
        fresh
    }

    /// Nodes and edges marked so far.
    pub fn built_count(&self) -> usize { self.built }
}
