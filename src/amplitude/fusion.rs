//! Amplitude derivation from per-test risk metrics
//!
//! Magnitude fuses relevance (external risk) and complexity (internal risk).
//! Phase is a stable digest of the free-text change label, so tests touched by
//! the same kind of change land at the same angle.

use super::Amplitude;
use crate::error::{PrioritizerError, PrioritizerResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Risk metrics of one test as produced by the upstream assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskMetrics {
    pub relevance: f64,
    pub complexity: f64,
    pub change_nature: Option<String>,
}

/// Weights used to fuse relevance and complexity into a magnitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub relevance: f64,
    pub complexity: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            relevance: 0.7,
            complexity: 0.3,
        }
    }
}

impl FusionWeights {
    pub fn validate(&self) -> PrioritizerResult<()> {
        if !self.relevance.is_finite() || !self.complexity.is_finite() {
            return Err(PrioritizerError::InvalidConfiguration(
                "fusion weights must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn magnitude(&self, metrics: &RiskMetrics) -> f64 {
        metrics.relevance * self.relevance + metrics.complexity * self.complexity
    }
}

/// Parse a JSON object `test_id -> metrics`, keeping key order.
pub fn parse_risk_metrics(json: &str) -> PrioritizerResult<IndexMap<String, RiskMetrics>> {
    Ok(serde_json::from_str(json)?)
}

/// Map a change label to a phase in `[0, 2π)` at whole-degree resolution.
///
/// Empty labels and `"none"` map to 0.
pub fn change_phase(change_nature: &str) -> f64 {
    if change_nature.is_empty() || change_nature.eq_ignore_ascii_case("none") {
        return 0.0;
    }

    let digest = md5::compute(change_nature.as_bytes());
    // 128-bit digest as a big-endian integer, reduced mod 360
    let degrees = digest
        .0
        .iter()
        .fold(0u32, |acc, &byte| (acc * 256 + byte as u32) % 360);

    degrees as f64 * (PI / 180.0)
}

/// Build one amplitude per entry, in map order.
pub fn derive_amplitudes(metrics: &IndexMap<String, RiskMetrics>, weights: &FusionWeights) -> Vec<Amplitude> {
    metrics
        .iter()
        .map(|(test_id, m)| {
            let label = m.change_nature.clone().unwrap_or_default();
            Amplitude::new(
                test_id.clone(),
                round4(weights.magnitude(m)),
                round4(change_phase(&label)),
                label,
            )
        })
        .collect()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_fusion() {
        let weights = FusionWeights::default();
        let metrics = RiskMetrics {
            relevance: 0.8,
            complexity: 0.5,
            change_nature: Some("logic_change".to_string()),
        };
        assert!((weights.magnitude(&metrics) - 0.71).abs() < 1e-12);
    }

    #[test]
    fn test_phase_of_none_is_zero() {
        assert_eq!(change_phase(""), 0.0);
        assert_eq!(change_phase("none"), 0.0);
        assert_eq!(change_phase("None"), 0.0);
    }

    #[test]
    fn test_phase_is_stable_and_in_range() {
        for label in ["refactor_tokenizer", "bugfix_parsing", "ui_update", "logic_change"] {
            let phase = change_phase(label);
            assert_eq!(phase, change_phase(label));
            assert!((0.0..2.0 * PI).contains(&phase));
            let degrees = phase * 180.0 / PI;
            assert!((degrees - degrees.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_phase_matches_md5_digest() {
        // md5("logic_change") mod 360 = 187 degrees, md5("bugfix_parsing") mod 360 = 41
        assert_eq!(round4(change_phase("logic_change")), 3.2638);
        assert_eq!(round4(change_phase("bugfix_parsing")), 0.7156);
        assert_eq!(round4(change_phase("refactor_tokenizer")), 0.0873);
        assert_eq!(round4(change_phase("ui_update")), 5.0265);
        assert!((change_phase("logic_change") - 187f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_derive_keeps_order_and_defaults() {
        let json = r#"{
            "TestTokenizerProperties": { "relevance": 0.8, "complexity": 0.5, "change_nature": "logic_change" },
            "TestDifficultSituations": { "relevance": 0.2, "complexity": 0.9, "change_nature": "none" },
            "TestBare": {}
        }"#;
        let metrics = parse_risk_metrics(json).unwrap();
        let amplitudes = derive_amplitudes(&metrics, &FusionWeights::default());

        let ids: Vec<&str> = amplitudes.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["TestTokenizerProperties", "TestDifficultSituations", "TestBare"]);

        assert_eq!(amplitudes[0].magnitude, 0.71);
        assert_eq!(amplitudes[0].phase, 3.2638);
        assert_eq!(amplitudes[0].metadata, "logic_change");
        assert_eq!(amplitudes[1].magnitude, 0.41);
        assert_eq!(amplitudes[1].phase, 0.0);
        assert_eq!(amplitudes[2].magnitude, 0.0);
        assert_eq!(amplitudes[2].metadata, "");
    }

    #[test]
    fn test_custom_weights() {
        let weights = FusionWeights { relevance: 1.0, complexity: 0.0 };
        let metrics = RiskMetrics { relevance: 0.4, complexity: 1.0, change_nature: None };
        assert_eq!(weights.magnitude(&metrics), 0.4);
        assert!(FusionWeights { relevance: f64::NAN, complexity: 0.0 }.validate().is_err());
    }
}
