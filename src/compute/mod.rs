//! Build pipeline: the scheduler turns a container hierarchy into a
//! `BuildPlan`, the engine replays the plan against a `Backend`.
pub mod backend;
pub mod engine;
pub mod ledger;
pub mod scheduler;

pub use backend::{Backend, BackendError, BuildMode, BuildStep, BuildTarget, RecordingBackend};
pub use engine::Engine;
pub use ledger::BuildLedger;
pub use scheduler::{BuildPlan, BuildWarning, Scheduler};
