//! Prioritizer configuration
//!
//! Every field has a default, so an empty YAML document is a valid configuration:
//!
//! ```yaml
//! solver:
//!   population_size: 20
//!   max_iterations: 50
//!   alpha: 0.5
//!   seed: 7
//! interference:
//!   damping: 0.5
//! fusion:
//!   relevance: 0.7
//!   complexity: 0.3
//! ```

use crate::amplitude::FusionWeights;
use crate::error::{PrioritizerError, PrioritizerResult};
use qiprio_optimization::{InterferenceModel, SolverConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizerConfig {
    pub solver: SolverConfig,
    pub interference: InterferenceModel,
    pub fusion: FusionWeights,
}

impl PrioritizerConfig {
    pub fn from_yaml_str(yaml: &str) -> PrioritizerResult<Self> {
        // serde_yaml rejects an empty document, which should mean "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> PrioritizerResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> PrioritizerResult<()> {
        self.solver.validate()?;
        let damping = self.interference.damping;
        if !damping.is_finite() || damping < 0.0 {
            return Err(PrioritizerError::InvalidConfiguration(format!(
                "interference damping must be a non-negative finite number, got {}",
                damping
            )));
        }
        self.fusion.validate()
    }
}
