//! assembly.rs
//! Wraps the low-level Registry with the handle-based graph API and the
//! compiled-state bookkeeping of the build target.

use crate::compute::{Backend, BuildPlan, Engine, Scheduler};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::store::{EdgeId, EdgeRecord, NodeId, NodeKind, NodeRecord, Registry};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct AssemblyGraph {
    pub(crate) store: Registry,
    pub(crate) config: GraphConfig,
    compiled: bool,
}

impl AssemblyGraph {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(config: GraphConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &GraphConfig { &self.config }

    /// Creates a standalone node: no parents, no members, unit count zero.
    pub fn create_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        self.store.push_node(NodeRecord::new(name.into(), kind, 0))
    }

    /// Creates a standalone terminal node carrying `units` computational units.
    pub fn create_leaf(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        units: usize,
    ) -> Result<NodeId> {
        if !kind.is_terminal() {
            return Err(GraphError::NotTerminal { kind });
        }
        Ok(self.store.push_node(NodeRecord::new(name.into(), kind, units)))
    }

    /// Creates an edge between two nodes. It takes effect once a container
    /// holding both endpoints adopts it through `add_edge`.
    pub fn create_edge(&mut self, pre: NodeId, post: NodeId) -> Result<EdgeId> {
        self.store.node(pre)?;
        self.store.node(post)?;
        let name = format!("{}_{}", self.store.n(pre).name, self.store.n(post).name);
        Ok(self.store.push_edge(EdgeRecord::new(name, pre, post)))
    }

    /// Tags a node with a caller-defined type label.
    pub fn add_label(&mut self, node: NodeId, label: impl Into<String>) -> Result<()> {
        self.store.node_mut(node)?.labels.push(label.into());
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Result<&NodeRecord> { self.store.node(id) }
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeRecord> { self.store.edge(id) }
    /// Read access to the underlying arena.
    pub fn store(&self) -> &Registry { &self.store }
    pub fn node_count(&self) -> usize { self.store.node_count() }
    pub fn edge_count(&self) -> usize { self.store.edge_count() }

    // --- Compiled State ---

    /// False after any structural change until the next successful build.
    pub fn is_compiled(&self) -> bool { self.compiled }

    pub(crate) fn mark_stale(&mut self) {
        if self.compiled {
            debug!("graph structure changed, backend build is stale");
        }
        self.compiled = false;
    }

    // --- Build ---

    /// Linearizes everything below `root` without touching a backend.
    pub fn plan(&self, root: NodeId) -> Result<BuildPlan> {
        Scheduler::new(self).plan(root)
    }

    /// Plans the build below `root` and replays it against `backend`.
    /// Warnings are logged and returned in the plan; they never abort.
    pub fn build<B: Backend + ?Sized>(
        &mut self,
        root: NodeId,
        backend: &mut B,
    ) -> Result<BuildPlan> {
        let plan = self.plan(root)?;
        info!(
            root = %self.store.n(root).name,
            steps = plan.steps.len(),
            warnings = plan.warnings.len(),
            "building assembly graph"
        );
        for warning in &plan.warnings {
            warn!("{}", warning.describe(&self.store));
        }
        Engine::run(&plan, &self.store, backend)?;
        self.compiled = true;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::RecordingBackend;

    #[test]
    fn test_create_leaf_rejects_containers() {
        let mut graph = AssemblyGraph::new();
        let err = graph.create_leaf("x", NodeKind::Assembly, 3).unwrap_err();
        assert_eq!(err, GraphError::NotTerminal { kind: NodeKind::Assembly });
        let leaf = graph.create_leaf("x", NodeKind::NeuronGroup, 3).unwrap();
        assert_eq!(graph.node(leaf).unwrap().num, 3);
    }

    #[test]
    fn test_build_clears_stale_flag_and_mutation_sets_it() {
        let mut graph = AssemblyGraph::new();
        let net = graph.create_node("net", NodeKind::Network);
        let a = graph.create_leaf("a", NodeKind::Encoder, 1).unwrap();
        graph.add_member(net, "a", a).unwrap();
        assert!(!graph.is_compiled());

        let mut backend = RecordingBackend::default();
        graph.build(net, &mut backend).unwrap();
        assert!(graph.is_compiled());

        let b = graph.create_leaf("b", NodeKind::NeuronGroup, 1).unwrap();
        graph.add_member(net, "b", b).unwrap();
        assert!(!graph.is_compiled());
    }

    #[test]
    fn test_create_edge_validates_handles() {
        let mut graph = AssemblyGraph::new();
        let a = graph.create_node("a", NodeKind::Assembly);
        assert_eq!(
            graph.create_edge(a, NodeId(9)).unwrap_err(),
            GraphError::UnknownNode(NodeId(9))
        );
    }
}
