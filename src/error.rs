//! Error types for test case prioritization

use qiprio_optimization::OptimizationError;
use thiserror::Error;

/// Errors raised while loading amplitudes, configuring or running a prioritization
#[derive(Error, Debug)]
pub enum PrioritizerError {
    /// The optimizer refused to run (empty input or bad solver options)
    #[error("Optimization error: {0}")]
    Optimization(#[from] OptimizationError),

    /// An amplitude record violates the input contract
    #[error("Invalid amplitude {id:?}: {reason}")]
    InvalidAmplitude {
        id: String,
        reason: String,
    },

    /// A test-case file holds no cases
    #[error("No test cases found")]
    NoTestCases,

    /// A non-solver option is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type PrioritizerResult<T> = Result<T, PrioritizerError>;
