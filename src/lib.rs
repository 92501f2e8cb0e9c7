//! QI-Prio: interference-aware test case prioritization
//!
//! Orders test cases so that high-risk tests run early and tests covering the
//! same kind of risk are spread apart. Each test is described by an
//! [`Amplitude`]: a magnitude (how much risk) and a phase (which risk). The
//! ordering is searched with a quantum-behaved particle swarm from the
//! `qiprio-optimization` crate.
//!
//! ## Example Usage
//!
//! ```rust
//! use qiprio::{Amplitude, AmplitudeSet, Prioritizer, PrioritizerConfig};
//!
//! let tests = AmplitudeSet::new(vec![
//!     Amplitude::new("TestTokenizer", 0.71, 1.05, "logic_change"),
//!     Amplitude::new("TestParser", 0.64, 1.05, "logic_change"),
//!     Amplitude::new("TestUi", 0.35, 4.20, "ui_update"),
//! ]).unwrap();
//!
//! let mut config = PrioritizerConfig::default();
//! config.solver.seed = Some(7);
//!
//! let prioritizer = Prioritizer::new(config).unwrap();
//! let result = prioritizer.prioritize(&tests).unwrap();
//!
//! assert_eq!(result.order.len(), 3);
//! assert!(result.fitness > 0.0);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod amplitude;
pub mod config;
pub mod error;
pub mod prioritizer;
pub mod report;
pub mod similarity;

pub use amplitude::{Amplitude, AmplitudeSet, FusionWeights, RiskMetrics};
pub use config::PrioritizerConfig;
pub use error::{PrioritizerError, PrioritizerResult};
pub use prioritizer::{Prioritization, Prioritizer};
pub use report::{rank, render_json, render_markdown, RankedTest};

pub use qiprio_optimization::{InterferenceModel, OptimizationError, SolverConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
