//! Linearizes a container hierarchy into an ordered list of build steps.
//!
//! Each container is scheduled in three phases over its direct members:
//!
//! 1. Forward sweep. Producers (encoders, generators, and members whose
//!    inbound edges are all built) are built and their outbound edges are
//!    followed depth-first. A target is built as soon as all of its inbound
//!    edges are built; otherwise it is parked as pending at the current level.
//! 2. Cycle resolution. Every member still unbuilt (pending first, by level)
//!    is forced: its missing inbound edges are built in delayed mode, then the
//!    node, then everything reachable from it with the same rule. Forced
//!    members on a loop are reported as a cycle, the others as unreached.
//! 3. Sinks. Decoders are built last, each right after its inbound edges.
//!
//! A composite member schedules its own members when it is built. The
//! built/unbuilt state is shared by the whole hierarchy, so a node held by
//! several containers is built once.

use super::backend::{BuildMode, BuildStep, BuildTarget};
use super::ledger::BuildLedger;
use crate::analysis::topology::cycle_components;
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::graph::identity::{edge_id, node_id};
use crate::graph::AssemblyGraph;
use crate::store::{EdgeId, NodeId, Registry, Role};
use tracing::debug;

/// Non-fatal findings collected while scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// A member without any inbound or outbound edge.
    Isolated { container: NodeId, node: NodeId },
    /// Members on a loop that could only be built by breaking a dependency.
    /// `pending` is the order they were forced in; `components` are the loops
    /// among the container's own edges.
    Cycle {
        container: NodeId,
        pending: Vec<NodeId>,
        components: Vec<Vec<NodeId>>,
    },
    /// Members outside any loop that no producer reached, e.g. fed only by a
    /// sink. They were forced in this order.
    Unreached { container: NodeId, nodes: Vec<NodeId> },
}

impl BuildWarning {
    pub fn container(&self) -> NodeId {
        match self {
            BuildWarning::Isolated { container, .. }
            | BuildWarning::Cycle { container, .. }
            | BuildWarning::Unreached { container, .. } => *container,
        }
    }

    pub fn describe(&self, store: &Registry) -> String {
        let names = |nodes: &[NodeId]| {
            nodes.iter().map(|&n| store.name_of(n)).collect::<Vec<_>>().join(", ")
        };
        match self {
            BuildWarning::Isolated { container, node } => format!(
                "isolated node '{}' in '{}' has no inbound or outbound edges",
                store.name_of(*node),
                store.name_of(*container)
            ),
            BuildWarning::Cycle { container, pending, components } => {
                let loops: Vec<String> =
                    components.iter().map(|c| format!("[{}]", names(c))).collect();
                format!(
                    "loop in '{}': forcing [{}] with delayed edges (components: {})",
                    store.name_of(*container),
                    names(pending),
                    loops.join(" ")
                )
            }
            BuildWarning::Unreached { container, nodes } => format!(
                "unreached in '{}': no producer path to [{}], forcing with delayed edges",
                store.name_of(*container),
                names(nodes)
            ),
        }
    }
}

/// The outcome of scheduling: build steps in order plus warnings. Planning
/// never touches a backend; `Engine::run` replays a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    pub steps: Vec<BuildStep>,
    pub warnings: Vec<BuildWarning>,
}

impl BuildPlan {
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Edges built before their producer, in build order.
    pub fn delayed_edges(&self) -> Vec<EdgeId> {
        self.steps
            .iter()
            .filter(|s| s.is_delayed())
            .filter_map(|s| match s.target {
                BuildTarget::Edge(e) => Some(e),
                BuildTarget::Node(_) => None,
            })
            .collect()
    }

    pub fn position(&self, target: BuildTarget) -> Option<usize> {
        self.steps.iter().position(|s| s.target == target)
    }
}

/// Owned outbound edges of one built node, walked in the container's edge order.
struct Frame {
    edges: Vec<EdgeId>,
    next: usize,
    level: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    /// Build a target only once all of its inbound edges are built.
    Strict,
    /// Build a target after building its missing inbound edges in delayed mode.
    Forced,
}

pub struct Scheduler<'a> {
    store: &'a Registry,
    config: &'a GraphConfig,
    ledger: BuildLedger,
    plan: BuildPlan,
}

impl<'a> Scheduler<'a> {
    pub fn new(graph: &'a AssemblyGraph) -> Self {
        Self {
            store: &graph.store,
            config: &graph.config,
            ledger: BuildLedger::new(graph.store.node_count(), graph.store.edge_count()),
            plan: BuildPlan::default(),
        }
    }

    /// Schedules every node and edge below `root`. The root itself emits no step.
    pub fn plan(mut self, root: NodeId) -> Result<BuildPlan> {
        let store = self.store;
        let record = store.node(root)?;
        if record.kind.is_terminal() {
            return Err(GraphError::TerminalContainer { container: record.name.clone() });
        }
        self.ledger.mark_node(root);
        self.schedule(root, 0);
        debug!(
            root = %record.name,
            built = self.ledger.built_count(),
            "build plan complete"
        );
        Ok(self.plan)
    }

    fn schedule(&mut self, container: NodeId, depth: usize) {
        let store = self.store;
        let record = store.n(container);
        let mut sinks = Vec::new();
        let mut pending: Vec<(NodeId, usize)> = Vec::new();

        // Phase A: forward sweep from producers.
        for &member in record.members.values() {
            let m = store.n(member);
            match m.kind.role() {
                Role::Sink => {
                    sinks.push(member);
                    continue;
                }
                Role::Source => {}
                Role::Interior if m.is_isolated() => {
                    if !self.ledger.node_built(member) {
                        if self.config.warn_isolated {
                            let warning = BuildWarning::Isolated { container, node: member };
                            self.plan.warnings.push(warning);
                        }
                        self.build_node(member, depth);
                    }
                    continue;
                }
                Role::Interior => {
                    if !self.ledger.node_built(member) && !self.inbound_built(member) {
                        continue;
                    }
                }
            }
            self.build_node(member, depth);
            self.sweep(container, member, 0, depth, Sweep::Strict, &mut pending);
        }

        // Phase B: force whatever is still unbuilt, shallowest pending first.
        pending.sort_by_key(|&(_, level)| level);
        let mut forced: Vec<NodeId> = Vec::new();
        let never_reached = record
            .members
            .values()
            .copied()
            .filter(|&m| store.n(m).kind.role() != Role::Sink);
        for node in pending.into_iter().map(|(n, _)| n).chain(never_reached) {
            if !self.ledger.node_built(node) && !forced.contains(&node) {
                forced.push(node);
            }
        }
        if !forced.is_empty() {
            let components = cycle_components(store, container);
            let (mut looped, mut unreached) = (Vec::new(), Vec::new());
            for node in forced {
                if self.ledger.node_built(node) {
                    continue;
                }
                if components.iter().any(|c| c.contains(&node)) {
                    looped.push(node);
                } else {
                    unreached.push(node);
                }
                self.build_inbound(container, node, depth);
                self.build_node(node, depth);
                self.sweep(container, node, 0, depth, Sweep::Forced, &mut Vec::new());
            }
            if !looped.is_empty() {
                let warning = BuildWarning::Cycle { container, pending: looped, components };
                self.plan.warnings.push(warning);
            }
            if !unreached.is_empty() {
                self.plan.warnings.push(BuildWarning::Unreached { container, nodes: unreached });
            }
        }

        // Phase C: sinks, preferring one whose producers are all built.
        let mut remaining = sinks;
        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .position(|&sink| {
                    self.owned_inbound(container, sink)
                        .iter()
                        .all(|&e| self.ledger.node_built(store.e(e).pre))
                })
                .unwrap_or(0);
            let sink = remaining.remove(ready);
            self.build_inbound(container, sink, depth);
            self.build_node(sink, depth);
        }

        // Edges no phase reached, e.g. leaving a sink towards an earlier producer.
        for &edge in record.edges.values() {
            self.build_edge(edge, depth);
        }
    }

    /// Depth-first walk over owned outbound edges starting at the built node `start`.
    fn sweep(
        &mut self,
        container: NodeId,
        start: NodeId,
        level: usize,
        depth: usize,
        mode: Sweep,
        pending: &mut Vec<(NodeId, usize)>,
    ) {
        let store = self.store;
        let edges = self.owned_outbound(container, start);
        let mut stack = vec![Frame { edges, next: 0, level }];
        while let Some(frame) = stack.last_mut() {
            if frame.next >= frame.edges.len() {
                stack.pop();
                continue;
            }
            let (edge, level) = (frame.edges[frame.next], frame.level);
            frame.next += 1;

            if self.ledger.edge_built(edge) {
                continue;
            }
            self.build_edge(edge, depth);

            let post = store.e(edge).post;
            if self.ledger.node_built(post) || store.n(post).kind.role() == Role::Sink {
                continue;
            }
            match mode {
                Sweep::Strict => {
                    if !self.inbound_built(post) {
                        pending.push((post, level + 1));
                        continue;
                    }
                }
                Sweep::Forced => self.build_inbound(container, post, depth),
            }
            self.build_node(post, depth);
            let edges = self.owned_outbound(container, post);
            stack.push(Frame { edges, next: 0, level: level + 1 });
        }
    }

    /// Every registered inbound edge is built, whichever container owns it.
    fn inbound_built(&self, node: NodeId) -> bool {
        self.store.n(node).inbound.iter().all(|&e| self.ledger.edge_built(e))
    }

    fn owned_outbound(&self, container: NodeId, node: NodeId) -> Vec<EdgeId> {
        let store = self.store;
        let edges = store.n(container).edges.values().copied();
        edges.filter(|&e| store.e(e).pre == node).collect()
    }

    fn owned_inbound(&self, container: NodeId, node: NodeId) -> Vec<EdgeId> {
        let store = self.store;
        let edges = store.n(container).edges.values().copied();
        edges.filter(|&e| store.e(e).post == node).collect()
    }

    fn build_inbound(&mut self, container: NodeId, node: NodeId, depth: usize) {
        for edge in self.owned_inbound(container, node) {
            self.build_edge(edge, depth);
        }
    }

    fn build_edge(&mut self, edge: EdgeId, depth: usize) {
        if !self.ledger.mark_edge(edge) {
            return;
        }
        let store = self.store;
        let record = store.e(edge);
        let mode = if self.ledger.node_built(record.pre) {
            BuildMode::Immediate
        } else {
            BuildMode::Delayed
        };
        let step = BuildStep {
            target: BuildTarget::Edge(edge),
            id: edge_id(store, edge).to_string(),
            name: record.name.clone(),
            mode,
            hidden: record.hidden,
            depth,
        };
        self.emit(step);
    }

    /// Builds `node` once. A composite also schedules its members one level deeper.
    fn build_node(&mut self, node: NodeId, depth: usize) {
        if !self.ledger.mark_node(node) {
            return;
        }
        let store = self.store;
        let record = store.n(node);
        let composite = !record.kind.is_terminal();
        if !composite || self.config.composite_steps {
            let step = BuildStep {
                target: BuildTarget::Node(node),
                id: node_id(store, node).to_string(),
                name: record.name.clone(),
                mode: BuildMode::Immediate,
                hidden: record.hidden,
                depth,
            };
            self.emit(step);
        }
        if composite {
            self.schedule(node, depth + 1);
        }
    }

    fn emit(&mut self, step: BuildStep) {
        debug!(id = %step.id, mode = ?step.mode, depth = step.depth, "scheduled build step");
        self.plan.steps.push(step);
    }
}
