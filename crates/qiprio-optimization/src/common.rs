use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised before any optimization work begins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizationError {
    /// The problem has zero dimensions, so there is nothing to order.
    #[error("empty input: cannot optimize an ordering of zero elements")]
    EmptyInput,

    /// A solver option is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type SolverResult<T> = Result<T, OptimizationError>;

/// Represents a candidate solution in the continuous search space.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Individual {
    pub variables: Array1<f64>,
    pub fitness: f64,
}

impl Individual {
    pub fn new(variables: Array1<f64>, fitness: f64) -> Self {
        Self { variables, fitness }
    }
}

/// Defines a permutation problem. Fitness is maximized.
pub trait Problem: Send + Sync {
    /// Score of a complete ordering of `0..dim()`.
    fn fitness(&self, permutation: &[usize]) -> f64;

    /// Number of elements being ordered.
    fn dim(&self) -> usize;
}

/// Configuration for the solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub population_size: usize,
    pub max_iterations: usize,
    /// Contraction-expansion coefficient.
    pub alpha: f64,
    /// Probability that a dimension moves with a `+` sign.
    pub positive_sign_probability: f64,
    /// Fixed seed for reproducible runs. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Evaluate particles concurrently within an iteration.
    pub parallel: bool,
    /// Stop after this many consecutive iterations without a global improvement.
    pub stall_iterations: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            max_iterations: 50,
            alpha: 0.5,
            positive_sign_probability: 0.8,
            seed: None,
            parallel: false,
            stall_iterations: None,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> SolverResult<()> {
        if self.population_size == 0 {
            return Err(OptimizationError::InvalidConfiguration(
                "population_size must be greater than 0".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(OptimizationError::InvalidConfiguration(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(OptimizationError::InvalidConfiguration(format!(
                "alpha must be a positive finite number, got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.positive_sign_probability) {
            return Err(OptimizationError::InvalidConfiguration(format!(
                "positive_sign_probability must lie in [0, 1], got {}",
                self.positive_sign_probability
            )));
        }
        if self.stall_iterations == Some(0) {
            return Err(OptimizationError::InvalidConfiguration(
                "stall_iterations must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// The result of an optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best_variables: Array1<f64>,
    pub best_permutation: Vec<usize>,
    pub best_fitness: f64,
    /// Global best fitness after each completed iteration.
    pub history: Vec<f64>,
    pub iterations: usize,
}

/// A permutation problem defined by a closure.
pub struct SimpleProblem<F>
where
    F: Fn(&[usize]) -> f64 + Send + Sync,
{
    pub fitness_func: F,
    pub dim: usize,
}

impl<F> Problem for SimpleProblem<F>
where
    F: Fn(&[usize]) -> f64 + Send + Sync,
{
    fn fitness(&self, permutation: &[usize]) -> f64 {
        (self.fitness_func)(permutation)
    }

    fn dim(&self) -> usize {
        self.dim
    }
}
