//! Engine configuration
//!
//! Loads `ghostwriter.yaml` with thresholds for the analysis and
//! optimization stages. A missing or malformed file yields the defaults;
//! configuration loading never fails the process.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    /// Maximum optimizer rounds per request
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Complexity above this triggers a decomposition suggestion
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: f64,

    /// Quality below this triggers a documentation/typing suggestion
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
}

fn default_max_iterations() -> usize {
    1
}

fn default_complexity_threshold() -> f64 {
    10.0
}

fn default_quality_threshold() -> f64 {
    0.7
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            complexity_threshold: default_complexity_threshold(),
            quality_threshold: default_quality_threshold(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file, surfacing failures.
    pub fn try_load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        serde_norway::from_str(&content)
            .map_err(|e| Error::ConfigLoad(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from a YAML file.
    ///
    /// Missing or malformed files fall back to [`EngineConfig::default`];
    /// the failure is logged and never surfaced to the caller.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "config unavailable, using defaults");
                Self::default()
            }
        }
    }
}
