//! Structural diagnostics over container-level edge graphs.
pub mod topology;
