use super::backend::{Backend, BuildTarget};
use super::scheduler::BuildPlan;
use crate::error::{GraphError, Result};
use crate::store::Registry;
use tracing::debug;

pub struct Engine;

impl Engine {
    /// Replays `plan` against `backend`, one call per step, stopping at the
    /// first failure.
    pub fn run<B: Backend + ?Sized>(
        plan: &BuildPlan,
        store: &Registry,
        backend: &mut B,
    ) -> Result<()> {
        // A plan made against another registry is rejected before the backend sees any step.
        Self::validate_handles(plan, store)?;

        for step in &plan.steps {
            backend.build(step).map_err(|e| GraphError::Backend {
                target: step.id.clone(),
                message: e.message,
            })?;
        }
        debug!(steps = plan.steps.len(), "backend build finished");
        Ok(())
    }

    fn validate_handles(plan: &BuildPlan, store: &Registry) -> Result<()> {
        for step in &plan.steps {
            match step.target {
                BuildTarget::Node(node) => {
                    store.node(node)?;
                }
                BuildTarget::Edge(edge) => {
                    store.edge(edge)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::backend::{BackendError, BuildMode, BuildStep, RecordingBackend};
    use crate::store::{EdgeId, NodeId};

    /// Fails on the step with the given name.
    struct FailOn(&'static str);

    impl Backend for FailOn {
        fn build(&mut self, step: &BuildStep) -> std::result::Result<(), BackendError> {
            if step.name == self.0 {
                return Err(BackendError::new("out of device memory"));
            }
            Ok(())
        }
    }

    fn step(target: BuildTarget, name: &str) -> BuildStep {
        BuildStep {
            target,
            id: format!("{}<neg>", name),
            name: name.into(),
            mode: BuildMode::Immediate,
            hidden: false,
            depth: 0,
        }
    }

    #[test]
    fn test_engine_rejects_foreign_handles() {
        let store = Registry::new();
        let steps = vec![step(BuildTarget::Edge(EdgeId(2)), "c")];
        let plan = BuildPlan { steps, warnings: vec![] };
        let mut backend = RecordingBackend::default();
        let err = Engine::run(&plan, &store, &mut backend).unwrap_err();
        assert_eq!(err, GraphError::UnknownEdge(EdgeId(2)));
        assert!(backend.steps.is_empty());
    }

    #[test]
    fn test_engine_stops_at_backend_failure() {
        let mut graph = crate::graph::AssemblyGraph::new();
        let net = graph.create_node("net", crate::store::NodeKind::Network);
        let a = graph.create_leaf("a", crate::store::NodeKind::NeuronGroup, 1).unwrap();
        graph.add_member(net, "a", a).unwrap();

        let plan = BuildPlan {
            steps: vec![step(BuildTarget::Node(a), "a"), step(BuildTarget::Node(NodeId(0)), "net")],
            warnings: vec![],
        };
        let err = Engine::run(&plan, &graph.store, &mut FailOn("a")).unwrap_err();
        assert_eq!(
            err,
            GraphError::Backend { target: "a<neg>".into(), message: "out of device memory".into() }
        );
    }
}
