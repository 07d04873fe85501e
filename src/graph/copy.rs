//! Structural copy: a fresh subtree mirroring the members and edges of a
//! source node without any of its relational back-references.

use std::collections::HashMap;

use super::AssemblyGraph;
use crate::error::Result;
use crate::store::{EdgeId, EdgeRecord, NodeId, NodeRecord};

impl AssemblyGraph {
    /// Copies `source` and everything below it into new nodes and edges.
    ///
    /// The copy starts parent-less and edge-less. Members are copied
    /// recursively; a node shared inside the subtree is copied once and keeps
    /// all of its (copied) parents. Edges are recreated between the copies.
    pub fn structure_copy(&mut self, source: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.store.node(source)?;

        // Pre-order walk of the subtree, each node once.
        let mut order = Vec::new();
        let mut node_map: HashMap<NodeId, NodeId> = HashMap::new();
        let mut stack = vec![source];
        while let Some(current) = stack.pop() {
            if node_map.contains_key(&current) {
                continue;
            }
            let original = self.store.n(current);
            let mut fresh = NodeRecord::new(original.name.clone(), original.kind, 0);
            fresh.labels = original.labels.clone();
            fresh.hidden = original.hidden;
            if original.members.is_empty() {
                fresh.num = original.num;
            }
            stack.extend(original.members.values().rev().copied());
            let copy = self.store.push_node(fresh);
            node_map.insert(current, copy);
            order.push(current);
        }
        self.store.nodes[node_map[&source].index()].name = name.into();

        for &original in &order {
            let members: Vec<(String, NodeId)> = self
                .store
                .n(original)
                .members
                .iter()
                .map(|(k, &m)| (k.clone(), m))
                .collect();
            let copy = node_map[&original];
            for (key, member) in members {
                self.attach_member(copy, key, node_map[&member], false);
            }
        }

        let mut edge_map: HashMap<EdgeId, EdgeId> = HashMap::new();
        for &original in &order {
            let edges: Vec<(String, EdgeId)> = self
                .store
                .n(original)
                .edges
                .iter()
                .map(|(k, &e)| (k.clone(), e))
                .collect();
            let copy = node_map[&original];
            for (key, edge) in edges {
                let fresh_edge = match edge_map.get(&edge) {
                    Some(&e) => e,
                    None => {
                        let record = self.store.e(edge);
                        let (pre, post) = (node_map[&record.pre], node_map[&record.post]);
                        let mut fresh = EdgeRecord::new(record.name.clone(), pre, post);
                        fresh.hidden = record.hidden;
                        let e = self.store.push_edge(fresh);
                        edge_map.insert(edge, e);
                        e
                    }
                };
                self.attach_edge(copy, key, fresh_edge, false);
            }
        }

        Ok(node_map[&source])
    }
}
