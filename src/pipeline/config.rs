//! Serializable run configuration.

use crate::error::{EstimationError, Result};
use crate::estimate::BootstrapConfig;
use crate::export::FigureSize;
use crate::transform::Transform;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of an estimation run that are independent of the input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// Bootstrap settings.
    pub bootstrap: BootstrapConfig,
    /// Log2-transform values before estimation.
    pub log2: bool,
    /// Explicit condition order; empty means first-appearance order.
    pub condition_order: Vec<String>,
    /// Process entities and comparators on the rayon thread pool.
    pub parallel: bool,
    /// Output figure size in pixels.
    pub figure: FigureSize,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            bootstrap: BootstrapConfig::default(),
            log2: false,
            condition_order: Vec::new(),
            parallel: true,
            figure: FigureSize::default(),
        }
    }
}

impl EstimationConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(EstimationError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(EstimationError::from)
    }

    /// Load from a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Transform implied by the log2 flag.
    pub fn transform(&self) -> Transform {
        Transform::from_log2_flag(self.log2)
    }

    /// Example configuration with every field spelled out.
    pub fn example() -> Self {
        Self {
            log2: true,
            condition_order: vec!["Control".to_string(), "Treatment".to_string()],
            ..Default::default()
        }
    }
}
