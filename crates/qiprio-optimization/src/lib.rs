//! Permutation search with a quantum-behaved particle swarm.
//!
//! Continuous particle positions are decoded into orderings with the
//! smallest-position-value rule and scored by any [`Problem`]. The
//! [`interference`] module provides the phase-interference objective used for
//! test case prioritization.

pub mod algorithms;
pub mod codec;
pub mod common;
pub mod interference;

/// Re-export common types
pub use common::*;

pub use algorithms::QPSOSolver;
pub use codec::spv_permutation;
pub use interference::{InterferenceModel, InterferenceProblem, Phasor};
