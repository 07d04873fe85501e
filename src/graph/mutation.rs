//! Structural mutations on a container. Each operation validates first and
//! only then touches the store, so a failed call leaves the graph unchanged.

use std::collections::HashSet;
use tracing::debug;

use super::edge::EdgeRef;
use super::node::MemberRef;
use super::AssemblyGraph;
use crate::error::{GraphError, Result};
use crate::store::{EdgeId, NodeId, NodeKind};

impl AssemblyGraph {
    // ─── Members ────────────────────────────────────────────────

    /// Registers `node` as a member of `container` under `name`.
    ///
    /// The node adopts `name`, gains `container` as a parent, and its unit
    /// count is added to `container` and every container above it.
    pub fn add_member(
        &mut self,
        container: NodeId,
        name: impl Into<String>,
        node: NodeId,
    ) -> Result<NodeId> {
        let name = name.into();
        self.store.node(node)?;
        let c = self.store.node(container)?;
        if c.kind.is_terminal() {
            return Err(GraphError::TerminalContainer { container: c.name.clone() });
        }
        if c.has_member(node) {
            return Err(GraphError::DuplicateMember { container: c.name.clone(), name });
        }
        if c.members.contains_key(&name) {
            return Err(GraphError::DuplicateName { container: c.name.clone(), name });
        }
        self.check_containment(container, node)?;

        self.attach_member(container, name, node, true);
        self.mark_stale();
        Ok(node)
    }

    /// Detaches a member (by name or handle) together with every edge of
    /// `container` that touches it.
    pub fn remove_member(
        &mut self,
        container: NodeId,
        target: impl Into<MemberRef>,
    ) -> Result<NodeId> {
        let target = target.into();
        let (key, node) = self.resolve_member(container, &target)?;

        let touching: Vec<String> = self
            .store
            .n(container)
            .edges
            .iter()
            .filter(|(_, &e)| self.store.e(e).links(node))
            .map(|(k, _)| k.clone())
            .collect();
        for edge_key in touching {
            self.detach_edge(container, &edge_key);
        }

        self.store.nodes[container.index()].members.shift_remove(&key);
        let supers = &mut self.store.nodes[node.index()].supers;
        if let Some(pos) = supers.iter().position(|&s| s == container) {
            supers.remove(pos);
        }
        self.store.release_container_edges(container, node);
        let num = self.store.n(node).num as isize;
        self.store.adjust_num(container, -num);

        debug!(container = %self.store.n(container).name, member = %key, "removed member");
        self.mark_stale();
        Ok(node)
    }

    /// Swaps `old` for `new` in place and rewires the container's edges that
    /// touched `old` onto `new`.
    pub fn replace_member(
        &mut self,
        container: NodeId,
        old: impl Into<MemberRef>,
        new: NodeId,
    ) -> Result<()> {
        let old = old.into();
        self.store.node(new)?;
        let (key, old_node) = self.resolve_member(container, &old)?;
        if old_node == new {
            return Ok(());
        }
        let c = self.store.n(container);
        if c.has_member(new) {
            return Err(GraphError::DuplicateMember {
                container: c.name.clone(),
                name: self.store.name_of(new),
            });
        }
        self.check_containment(container, new)?;

        // Rewired edges must stay resolvable in every other container holding them.
        let touching: Vec<EdgeId> = c
            .edges
            .values()
            .copied()
            .filter(|&e| self.store.e(e).links(old_node))
            .collect();
        for &edge in &touching {
            let record = self.store.e(edge);
            for &owner in record.owners.iter().filter(|&&o| o != container) {
                if !self.store.n(owner).has_member(new) {
                    return Err(GraphError::DanglingEdge {
                        container: self.store.name_of(owner),
                        edge: record.name.clone(),
                        endpoint: self.store.name_of(new),
                    });
                }
            }
        }

        if let Some(slot) = self.store.nodes[container.index()].members.get_mut(&key) {
            *slot = new;
        }
        let supers = &mut self.store.nodes[old_node.index()].supers;
        if let Some(pos) = supers.iter().position(|&s| s == container) {
            supers.remove(pos);
        }
        self.store.nodes[new.index()].supers.push(container);
        self.store.release_container_edges(container, old_node);
        self.store.adopt_container_edges(container, new);
        let delta = self.store.n(new).num as isize - self.store.n(old_node).num as isize;
        self.store.adjust_num(container, delta);

        for edge in touching {
            self.rewire(edge, old_node, new);
        }

        debug!(container = %self.store.n(container).name, member = %key, "replaced member");
        self.mark_stale();
        Ok(())
    }

    // ─── Edges ──────────────────────────────────────────────────

    /// Adopts `edge` into `container` under `name`. Both endpoints must
    /// already be members of `container`.
    pub fn add_edge(
        &mut self,
        container: NodeId,
        name: impl Into<String>,
        edge: EdgeId,
    ) -> Result<EdgeId> {
        let name = name.into();
        let record = self.store.edge(edge)?;
        let c = self.store.node(container)?;
        for endpoint in [record.pre, record.post] {
            if !c.has_member(endpoint) {
                return Err(GraphError::DanglingEdge {
                    container: c.name.clone(),
                    edge: name,
                    endpoint: self.store.name_of(endpoint),
                });
            }
        }
        match c.edges.get(&name) {
            Some(&existing) if existing == edge => {
                return Err(GraphError::DuplicateMember { container: c.name.clone(), name });
            }
            Some(_) => {
                return Err(GraphError::DuplicateName { container: c.name.clone(), name });
            }
            None => {}
        }
        if c.edge_key(edge).is_some() {
            return Err(GraphError::DuplicateMember { container: c.name.clone(), name });
        }

        self.attach_edge(container, name, edge, true);
        self.mark_stale();
        Ok(edge)
    }

    /// Removes an edge (by name or handle) from `container`.
    pub fn remove_edge(&mut self, container: NodeId, target: impl Into<EdgeRef>) -> Result<EdgeId> {
        let target = target.into();
        let c = self.store.node(container)?;
        let (key, edge) = target.resolve(c).ok_or_else(|| GraphError::NotFound {
            container: c.name.clone(),
            target: match &target {
                EdgeRef::Name(name) => name.clone(),
                EdgeRef::Edge(e) => self.store.edge_name_of(*e),
            },
        })?;
        self.detach_edge(container, &key);
        self.mark_stale();
        Ok(edge)
    }

    // ─── Merge / Select ─────────────────────────────────────────

    /// Pulls every member and edge of `other` that `container` does not yet
    /// hold. Name collisions with a different object are resolved with the
    /// first free `name(1)`, `name(2)`, ... suffix.
    pub fn merge(&mut self, container: NodeId, other: NodeId) -> Result<()> {
        self.store.node(other)?;
        let c = self.store.node(container)?;
        if container == other {
            return Ok(());
        }
        let limit = self.config.merge_suffix_limit;
        let o = self.store.n(other);

        let mut taken: HashSet<String> = c.members.keys().cloned().collect();
        let mut member_plan = Vec::new();
        for (key, &node) in &o.members {
            if c.has_member(node) {
                continue;
            }
            if c.kind.is_terminal() {
                return Err(GraphError::TerminalContainer { container: c.name.clone() });
            }
            self.check_containment(container, node)?;
            let name = free_name(key, &taken, limit).ok_or_else(|| GraphError::MergeExhaustion {
                container: c.name.clone(),
                name: key.clone(),
                attempts: limit,
            })?;
            taken.insert(name.clone());
            member_plan.push((name, node));
        }

        let mut taken: HashSet<String> = c.edges.keys().cloned().collect();
        let mut edge_plan = Vec::new();
        for (key, &edge) in &o.edges {
            if c.edge_key(edge).is_some() {
                continue;
            }
            let name = free_name(key, &taken, limit).ok_or_else(|| GraphError::MergeExhaustion {
                container: c.name.clone(),
                name: key.clone(),
                attempts: limit,
            })?;
            taken.insert(name.clone());
            edge_plan.push((name, edge));
        }

        debug!(
            container = %c.name,
            from = %o.name,
            members = member_plan.len(),
            edges = edge_plan.len(),
            "merging"
        );
        for (name, node) in member_plan {
            self.attach_member(container, name, node, false);
        }
        for (name, edge) in edge_plan {
            self.attach_edge(container, name, edge, false);
        }
        self.mark_stale();
        Ok(())
    }

    /// Forms a new assembly named `name` that references the selected
    /// members of `container`. With `include_edges`, edges of `container`
    /// running between two selected members are referenced too.
    pub fn select(
        &mut self,
        container: NodeId,
        items: &[MemberRef],
        name: impl Into<String>,
        include_edges: bool,
    ) -> Result<NodeId> {
        let mut selected: Vec<(String, NodeId)> = Vec::with_capacity(items.len());
        for item in items {
            let entry = self.resolve_member(container, item)?;
            if !selected.iter().any(|(_, n)| *n == entry.1) {
                selected.push(entry);
            }
        }

        let edges: Vec<(String, EdgeId)> = if include_edges {
            self.store
                .n(container)
                .edges
                .iter()
                .filter(|(_, &e)| {
                    let record = self.store.e(e);
                    selected.iter().any(|(_, n)| *n == record.pre)
                        && selected.iter().any(|(_, n)| *n == record.post)
                })
                .map(|(k, &e)| (k.clone(), e))
                .collect()
        } else {
            Vec::new()
        };

        let new = self.create_node(name, NodeKind::Assembly);
        for (key, node) in selected {
            self.attach_member(new, key, node, false);
        }
        for (key, edge) in edges {
            self.attach_edge(new, key, edge, false);
        }
        self.mark_stale();
        Ok(new)
    }

    /// Deep-copies the structure of `source` and adds the copy to `container`.
    pub fn copy_member(
        &mut self,
        container: NodeId,
        name: impl Into<String>,
        source: NodeId,
    ) -> Result<NodeId> {
        let name = name.into();
        let c = self.store.node(container)?;
        if c.kind.is_terminal() {
            return Err(GraphError::TerminalContainer { container: c.name.clone() });
        }
        if c.members.contains_key(&name) {
            return Err(GraphError::DuplicateName { container: c.name.clone(), name });
        }
        let copy = self.structure_copy(source, name.clone())?;
        self.add_member(container, name, copy)
    }

    // ─── Visibility ─────────────────────────────────────────────

    /// Marks `node`, every node below it and their edges as hidden.
    pub fn hide(&mut self, node: NodeId) -> Result<()> {
        self.set_hidden(node, true)
    }

    /// Clears the hidden flag on `node`, every node below it and their edges.
    pub fn show(&mut self, node: NodeId) -> Result<()> {
        self.set_hidden(node, false)
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) -> Result<()> {
        self.store.node(node)?;
        let mut visited = HashSet::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let record = &mut self.store.nodes[current.index()];
            record.hidden = hidden;
            let edges: Vec<EdgeId> = record.edges.values().copied().collect();
            stack.extend(record.members.values().copied());
            for edge in edges {
                self.store.edges[edge.index()].hidden = hidden;
            }
        }
        self.mark_stale();
        Ok(())
    }

    // ─── Internal Helpers ───────────────────────────────────────

    pub(crate) fn resolve_member(
        &self,
        container: NodeId,
        target: &MemberRef,
    ) -> Result<(String, NodeId)> {
        let c = self.store.node(container)?;
        target.resolve(c).ok_or_else(|| GraphError::NotFound {
            container: c.name.clone(),
            target: target.describe(|n| self.store.name_of(n)),
        })
    }

    /// Rejects `node` as a member of `container` if that would put a
    /// container inside itself.
    fn check_containment(&self, container: NodeId, node: NodeId) -> Result<()> {
        if node == container || self.store.is_descendant(container, node) {
            return Err(GraphError::ContainmentCycle {
                container: self.store.name_of(container),
                member: self.store.name_of(node),
            });
        }
        Ok(())
    }

    pub(crate) fn attach_member(
        &mut self,
        container: NodeId,
        key: String,
        node: NodeId,
        rename: bool,
    ) {
        if rename {
            self.store.nodes[node.index()].name = key.clone();
        }
        self.store.nodes[container.index()].members.insert(key, node);
        self.store.nodes[node.index()].supers.push(container);
        self.store.adopt_container_edges(container, node);
        let num = self.store.n(node).num as isize;
        self.store.adjust_num(container, num);
    }

    pub(crate) fn attach_edge(
        &mut self,
        container: NodeId,
        key: String,
        edge: EdgeId,
        rename: bool,
    ) {
        if rename {
            self.store.edges[edge.index()].name = key.clone();
        }
        self.store.nodes[container.index()].edges.insert(key, edge);
        let record = &mut self.store.edges[edge.index()];
        record.owners.push(container);
        if record.owners.len() == 1 {
            self.store.register_edge(edge);
        }
    }

    /// Drops the edge stored under `key`. An edge no container holds any
    /// more is removed from its endpoints' back-references.
    fn detach_edge(&mut self, container: NodeId, key: &str) {
        let Some(edge) = self.store.nodes[container.index()].edges.shift_remove(key) else {
            return;
        };
        let owners = &mut self.store.edges[edge.index()].owners;
        if let Some(pos) = owners.iter().position(|&o| o == container) {
            owners.remove(pos);
        }
        if owners.is_empty() {
            self.store.unregister_edge(edge);
        }
    }
}

fn free_name(key: &str, taken: &HashSet<String>, limit: usize) -> Option<String> {
    if !taken.contains(key) {
        return Some(key.to_string());
    }
    (1..=limit)
        .map(|n| format!("{}({})", key, n))
        .find(|candidate| !taken.contains(candidate))
}
