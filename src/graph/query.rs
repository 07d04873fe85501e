//! Read-only introspection over the containment hierarchy.

use std::collections::HashSet;

use super::AssemblyGraph;
use crate::error::Result;
use crate::store::{EdgeId, NodeId};

impl AssemblyGraph {
    /// Direct members in insertion order, or every node below `node` in
    /// depth-first pre-order when `recursive` is set. Shared nodes appear once.
    pub fn members(&self, node: NodeId, recursive: bool) -> Result<Vec<NodeId>> {
        let record = self.store.node(node)?;
        if !recursive {
            return Ok(record.members.values().copied().collect());
        }
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeId> = record.members.values().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.store.n(current).members.values().rev().copied());
        }
        Ok(out)
    }

    /// The terminal end of every branch below `node`. A node without members
    /// is its own leaf.
    pub fn leaf_members(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.store.node(node)?;
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let record = self.store.n(current);
            if record.members.is_empty() {
                if seen.insert(current) {
                    out.push(current);
                }
            } else {
                stack.extend(record.members.values().rev().copied());
            }
        }
        Ok(out)
    }

    /// `node` itself plus every container below it that holds members
    /// (down to direct members only unless `recursive`).
    pub fn assemblies(&self, node: NodeId, recursive: bool) -> Result<Vec<NodeId>> {
        let record = self.store.node(node)?;
        if record.members.is_empty() {
            return Ok(Vec::new());
        }
        if !recursive {
            return Ok(vec![node]);
        }
        let mut out = vec![node];
        out.extend(
            self.members(node, true)?
                .into_iter()
                .filter(|&m| !self.store.n(m).members.is_empty()),
        );
        Ok(out)
    }

    /// Edges owned by `node`, then (if `recursive`) those owned by every
    /// container below it.
    pub fn edges(&self, node: NodeId, recursive: bool) -> Result<Vec<EdgeId>> {
        let record = self.store.node(node)?;
        let mut out: Vec<EdgeId> = record.edges.values().copied().collect();
        if recursive {
            for member in self.members(node, true)? {
                for &edge in self.store.n(member).edges.values() {
                    if !out.contains(&edge) {
                        out.push(edge);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Breadth layering of the hierarchy: `[[node], [members], [members of members], ...]`.
    /// A node reached along two paths is listed once per path.
    pub fn leveled_members(&self, node: NodeId) -> Result<Vec<Vec<NodeId>>> {
        self.store.node(node)?;
        let mut levels = vec![vec![node]];
        loop {
            let next: Vec<NodeId> = levels[levels.len() - 1]
                .iter()
                .filter(|&&n| !self.store.n(n).kind.is_terminal())
                .flat_map(|&n| self.store.n(n).members.values().copied())
                .collect();
            if next.is_empty() {
                break;
            }
            levels.push(next);
        }
        Ok(levels)
    }

    /// Containers from the direct parent of `target` up to the outermost one,
    /// following the first recorded parent at each step. Empty for a node
    /// without a parent.
    pub fn ancestor_chain(&self, target: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut current = self.store.node(target)?.supers.first().copied();
        while let Some(parent) = current {
            // Containment is acyclic; the guard only stops a corrupted arena.
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = self.store.n(parent).supers.first().copied();
        }
        Ok(chain)
    }

    /// Like `ancestor_chain`, but bounded by `root`: the first path from
    /// `root` down to `target` in member order. Empty if `root` does not own `target`.
    pub fn ancestor_chain_within(&self, root: NodeId, target: NodeId) -> Result<Vec<NodeId>> {
        self.store.node(root)?;
        self.store.node(target)?;

        // Depth-first search with an explicit path; each frame remembers the
        // next member to visit.
        let mut path: Vec<(NodeId, usize)> = vec![(root, 0)];
        let mut visited = HashSet::new();
        while let Some(&(current, next)) = path.last() {
            let record = self.store.n(current);
            if next == 0 && record.has_member(target) {
                return Ok(path.iter().rev().map(|&(n, _)| n).collect());
            }
            match record.members.get_index(next) {
                Some((_, &child)) => {
                    if let Some(frame) = path.last_mut() {
                        frame.1 += 1;
                    }
                    if visited.insert(child) {
                        path.push((child, 0));
                    }
                }
                None => {
                    path.pop();
                }
            }
        }
        Ok(Vec::new())
    }

    /// Whether `node` is `container` or sits anywhere below it.
    pub fn contains(&self, container: NodeId, node: NodeId) -> Result<bool> {
        self.store.node(container)?;
        self.store.node(node)?;
        Ok(node == container || self.store.is_descendant(node, container))
    }

    /// The key under which `container` holds `node`, if it does.
    pub fn member_key(&self, container: NodeId, node: NodeId) -> Result<Option<&str>> {
        Ok(self.store.node(container)?.member_key(node))
    }
}
