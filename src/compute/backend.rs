//! The boundary to the external execution backend. Each scheduled node or
//! edge becomes one `BuildStep`; the backend compiles it into whatever
//! representation it runs.

use crate::store::{EdgeId, NodeId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildTarget {
    Node(NodeId),
    Edge(EdgeId),
}

/// How an edge reads its upstream value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// The producer was built first; the edge carries the current value.
    #[default]
    Immediate,
    /// The producer was not built yet (cycle breaking); the edge carries the
    /// value from the previous step.
    Delayed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub target: BuildTarget,
    /// Hierarchical id of the target.
    pub id: String,
    pub name: String,
    pub mode: BuildMode,
    /// Visibility flag of the target. Carried for the backend, not used for ordering.
    pub hidden: bool,
    /// Nesting depth of the container that scheduled this step; the root's members are at 0.
    pub depth: usize,
}

impl BuildStep {
    pub fn is_delayed(&self) -> bool { self.mode == BuildMode::Delayed }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Receives build steps in scheduled order.
pub trait Backend {
    fn build(&mut self, step: &BuildStep) -> Result<(), BackendError>;
}

/// Backend that only remembers what it was asked to build.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    pub steps: Vec<BuildStep>,
}

impl RecordingBackend {
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Backend for RecordingBackend {
    fn build(&mut self, step: &BuildStep) -> Result<(), BackendError> {
        self.steps.push(step.clone());
        Ok(())
    }
}
