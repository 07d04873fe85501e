//! Tunables for graph mutation and build scheduling.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Graph-wide settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Number of `name(1)`, `name(2)`, ... suffixes tried when a merge collides.
    #[serde(default = "default_merge_suffix_limit")]
    pub merge_suffix_limit: usize,
    /// Whether a composite member emits its own build step before its members.
    #[serde(default = "default_composite_steps")]
    pub composite_steps: bool,
    /// Whether members without any edge are reported as build warnings.
    #[serde(default = "default_warn_isolated")]
    pub warn_isolated: bool,
}

fn default_merge_suffix_limit() -> usize {
    999
}

fn default_composite_steps() -> bool {
    true
}

fn default_warn_isolated() -> bool {
    true
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            merge_suffix_limit: default_merge_suffix_limit(),
            composite_steps: default_composite_steps(),
            warn_isolated: default_warn_isolated(),
        }
    }
}

impl GraphConfig {
    /// Parse a JSON document. Missing fields fall back to their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| GraphError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| GraphError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.merge_suffix_limit == 0 {
            return Err(GraphError::Config(
                "merge_suffix_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
