//! Per-test risk amplitudes
//!
//! An amplitude is the magnitude/phase risk descriptor of a single test case.
//! The order of an [`AmplitudeSet`] is load-bearing: permutations produced by
//! the optimizer index into it.

pub mod fusion;

pub use fusion::{change_phase, derive_amplitudes, parse_risk_metrics, FusionWeights, RiskMetrics};

use crate::error::{PrioritizerError, PrioritizerResult};
use qiprio_optimization::{OptimizationError, Phasor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Risk amplitude of one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amplitude {
    /// Stable test identifier
    #[serde(rename = "test_id", alias = "id")]
    pub id: String,
    /// Risk severity, nominally in [0, 1]
    pub magnitude: f64,
    /// Risk direction in radians, nominally in [0, 2π)
    pub phase: f64,
    /// Opaque description carried through to reports
    #[serde(rename = "original_semantics", alias = "metadata", default)]
    pub metadata: String,
}

impl Amplitude {
    pub fn new(id: impl Into<String>, magnitude: f64, phase: f64, metadata: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            magnitude,
            phase,
            metadata: metadata.into(),
        }
    }

    pub fn phasor(&self) -> Phasor {
        Phasor::new(self.magnitude, self.phase)
    }

    fn validate(&self) -> PrioritizerResult<()> {
        if self.id.trim().is_empty() {
            return Err(self.invalid("test id is empty"));
        }
        if !self.magnitude.is_finite() {
            return Err(self.invalid(format!("magnitude {} is not finite", self.magnitude)));
        }
        if !self.phase.is_finite() {
            return Err(self.invalid(format!("phase {} is not finite", self.phase)));
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> PrioritizerError {
        PrioritizerError::InvalidAmplitude {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }
}

/// Validated, non-empty, ordered collection of amplitudes
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeSet {
    amplitudes: Vec<Amplitude>,
}

impl AmplitudeSet {
    /// Validate and wrap `amplitudes`, keeping their order.
    pub fn new(amplitudes: Vec<Amplitude>) -> PrioritizerResult<Self> {
        if amplitudes.is_empty() {
            return Err(OptimizationError::EmptyInput.into());
        }

        let mut seen = HashSet::with_capacity(amplitudes.len());
        for amplitude in &amplitudes {
            amplitude.validate()?;
            if !seen.insert(amplitude.id.as_str()) {
                warn!("Duplicate test id {:?}; entries are kept and ordered by index", amplitude.id);
            }
        }

        Ok(Self { amplitudes })
    }

    /// Parse a JSON array of amplitude records.
    pub fn from_json_str(json: &str) -> PrioritizerResult<Self> {
        let amplitudes: Vec<Amplitude> = serde_json::from_str(json)?;
        Self::new(amplitudes)
    }

    /// Load a JSON array of amplitude records from `path`.
    pub fn load(path: impl AsRef<Path>) -> PrioritizerResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let set = Self::from_json_str(&contents)?;
        info!("Loaded {} amplitudes from {:?}", set.len(), path);
        Ok(set)
    }

    /// Write the set as a pretty-printed JSON array.
    pub fn save(&self, path: impl AsRef<Path>) -> PrioritizerResult<()> {
        let json = serde_json::to_string_pretty(&self.amplitudes)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Constructed sets are never empty.
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Amplitude> {
        self.amplitudes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Amplitude> {
        self.amplitudes.iter()
    }

    pub fn as_slice(&self) -> &[Amplitude] {
        &self.amplitudes
    }

    pub fn phasors(&self) -> Vec<Phasor> {
        self.amplitudes.iter().map(Amplitude::phasor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipeline_field_names() {
        let json = r#"[
            {"test_id": "TestTokenizer", "magnitude": 0.71, "phase": 1.2, "original_semantics": "bugfix_parsing"},
            {"test_id": "TestUi", "magnitude": 0.1, "phase": 0.0, "original_semantics": "none"}
        ]"#;
        let set = AmplitudeSet::from_json_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().id, "TestTokenizer");
        assert_eq!(set.get(0).unwrap().metadata, "bugfix_parsing");
        assert_eq!(set.get(1).unwrap().phasor(), Phasor::new(0.1, 0.0));
    }

    #[test]
    fn test_parse_aliases_and_missing_metadata() {
        let json = r#"[{"id": "a", "magnitude": 0.5, "phase": 3.0}]"#;
        let set = AmplitudeSet::from_json_str(json).unwrap();
        assert_eq!(set.get(0).unwrap().id, "a");
        assert_eq!(set.get(0).unwrap().metadata, "");
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let err = AmplitudeSet::from_json_str("[]").unwrap_err();
        assert!(matches!(err, PrioritizerError::Optimization(OptimizationError::EmptyInput)));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let err = AmplitudeSet::new(vec![Amplitude::new("t", f64::NAN, 0.0, "")]).unwrap_err();
        assert!(matches!(err, PrioritizerError::InvalidAmplitude { .. }));

        let err = AmplitudeSet::new(vec![Amplitude::new("t", 0.5, f64::INFINITY, "")]).unwrap_err();
        assert!(matches!(err, PrioritizerError::InvalidAmplitude { .. }));

        let err = AmplitudeSet::new(vec![Amplitude::new(" ", 0.5, 0.0, "")]).unwrap_err();
        assert!(matches!(err, PrioritizerError::InvalidAmplitude { .. }));
    }

    #[test]
    fn test_out_of_range_magnitudes_are_accepted() {
        let set = AmplitudeSet::new(vec![
            Amplitude::new("neg", -0.2, 0.0, ""),
            Amplitude::new("big", 1.7, 7.0, ""),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tca.json");
        let set = AmplitudeSet::new(vec![
            Amplitude::new("a", 0.3, 0.5, "logic_change"),
            Amplitude::new("b", 0.9, 2.5, "refactor_tokenizer"),
        ])
        .unwrap();
        set.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"test_id\""));
        assert!(text.contains("\"original_semantics\""));
        assert_eq!(AmplitudeSet::load(&path).unwrap(), set);
    }
}
