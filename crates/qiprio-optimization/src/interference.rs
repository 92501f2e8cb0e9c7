//! Interference-aware fitness for test orderings.
//!
//! Each test carries a phasor: a magnitude (how much risk it covers) and a
//! phase (which kind of risk). Executing tests in order "collapses" their
//! phasors one by one. A later test whose phase lines up with already
//! collapsed phasors loses part of its magnitude, and every test is weighted
//! by how early it runs.

use crate::common::Problem;
use serde::{Deserialize, Serialize};

/// Magnitude and phase of a single test's risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phasor {
    pub magnitude: f64,
    pub phase: f64,
}

impl Phasor {
    pub fn new(magnitude: f64, phase: f64) -> Self {
        Self { magnitude, phase }
    }
}

/// Parameters of the interference penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterferenceModel {
    /// Fraction of the accumulated penalty subtracted from a magnitude.
    pub damping: f64,
}

impl Default for InterferenceModel {
    fn default() -> Self {
        Self { damping: 0.5 }
    }
}

impl InterferenceModel {
    pub fn new(damping: f64) -> Self {
        Self { damping }
    }

    /// Score `permutation` over `phasors`. O(n^2) in the ordering length.
    ///
    /// Indices in `permutation` must be valid for `phasors`.
    pub fn evaluate(&self, permutation: &[usize], phasors: &[Phasor]) -> f64 {
        let n = permutation.len();
        if n == 0 {
            return 0.0;
        }

        let mut collapsed: Vec<Phasor> = Vec::with_capacity(n);
        let mut total = 0.0;

        for (rank, &idx) in permutation.iter().enumerate() {
            let current = phasors[idx];

            let effective = if current.magnitude > 0.0 {
                let penalty = interference_penalty(current.phase, &collapsed);
                self.effective_magnitude(current.magnitude, penalty)
            } else {
                0.0
            };

            let weight = position_weight(rank, n);
            total += effective * weight;

            collapsed.push(current);
        }

        total
    }

    /// Magnitude left after subtracting the damped penalty, floored at zero.
    pub fn effective_magnitude(&self, magnitude: f64, penalty: f64) -> f64 {
        (magnitude - self.damping * penalty).max(0.0)
    }
}

/// Sum over collapsed phasors of `max(0, cos(|phase - other|)) * other.magnitude`.
pub fn interference_penalty(phase: f64, collapsed: &[Phasor]) -> f64 {
    collapsed
        .iter()
        .map(|c| {
            let similarity = (phase - c.phase).abs().cos().max(0.0);
            similarity * c.magnitude
        })
        .sum()
}

/// `(n - rank) / n`: 1.0 for the first slot, `1/n` for the last.
pub fn position_weight(rank: usize, n: usize) -> f64 {
    (n - rank) as f64 / n as f64
}

/// A [`Problem`] scoring orderings of a fixed phasor set.
#[derive(Debug, Clone)]
pub struct InterferenceProblem {
    pub phasors: Vec<Phasor>,
    pub model: InterferenceModel,
}

impl InterferenceProblem {
    pub fn new(phasors: Vec<Phasor>, model: InterferenceModel) -> Self {
        Self { phasors, model }
    }

    /// Sum of positive magnitudes. Bounds every ordering's fitness when no
    /// magnitude is negative; a negative one lowers the penalty on later tests.
    pub fn magnitude_sum(&self) -> f64 {
        self.phasors.iter().map(|p| p.magnitude.max(0.0)).sum()
    }
}

impl Problem for InterferenceProblem {
    fn fitness(&self, permutation: &[usize]) -> f64 {
        self.model.evaluate(permutation, &self.phasors)
    }

    fn dim(&self) -> usize {
        self.phasors.len()
    }
}
