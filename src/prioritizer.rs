//! Test case prioritization
//!
//! Adapts an [`AmplitudeSet`] to the interference-aware permutation problem
//! and runs the quantum-behaved swarm over it.

use crate::amplitude::AmplitudeSet;
use crate::config::PrioritizerConfig;
use crate::error::PrioritizerResult;
use crate::report::{rank, RankedTest};
use qiprio_optimization::{InterferenceProblem, OptimizationResult, Problem, QPSOSolver};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Outcome of one prioritization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prioritization {
    /// Indices into the amplitude set, highest priority first
    pub order: Vec<usize>,
    /// Test ids in the same order as `order`
    pub ids: Vec<String>,
    /// Interference-aware fitness of `order`
    pub fitness: f64,
    /// Fitness of the input order, for comparison
    pub baseline_fitness: f64,
    /// Global best fitness after each iteration
    pub history: Vec<f64>,
    pub iterations: usize,
    pub population_size: usize,
    pub alpha: f64,
}

impl Prioritization {
    /// Ranked view over `amplitudes`, which must be the set this run was computed from.
    pub fn ranking<'a>(&self, amplitudes: &'a AmplitudeSet) -> Vec<RankedTest<'a>> {
        rank(&self.order, amplitudes)
    }

    /// Fitness gained over running the tests in input order.
    pub fn improvement(&self) -> f64 {
        self.fitness - self.baseline_fitness
    }
}

pub struct Prioritizer {
    config: PrioritizerConfig,
    solver: QPSOSolver,
}

impl Prioritizer {
    pub fn new(config: PrioritizerConfig) -> PrioritizerResult<Self> {
        config.validate()?;
        let solver = QPSOSolver::new(config.solver.clone())?;
        Ok(Self { config, solver })
    }

    pub fn config(&self) -> &PrioritizerConfig {
        &self.config
    }

    /// Build the optimization problem for `amplitudes`.
    pub fn problem(&self, amplitudes: &AmplitudeSet) -> InterferenceProblem {
        InterferenceProblem::new(amplitudes.phasors(), self.config.interference)
    }

    /// Prioritize with the configured seed (or entropy when none is set).
    pub fn prioritize(&self, amplitudes: &AmplitudeSet) -> PrioritizerResult<Prioritization> {
        let problem = self.problem(amplitudes);
        let start = Instant::now();
        let result = self.solver.solve(&problem)?;
        info!("Prioritized {} tests in {:.2?}", amplitudes.len(), start.elapsed());
        Ok(self.finish(amplitudes, &problem, result))
    }

    /// Prioritize drawing every random number from `rng`.
    pub fn prioritize_with_rng<R: Rng + ?Sized>(
        &self,
        amplitudes: &AmplitudeSet,
        rng: &mut R,
    ) -> PrioritizerResult<Prioritization> {
        let problem = self.problem(amplitudes);
        let result = self.solver.solve_with_rng(&problem, rng)?;
        Ok(self.finish(amplitudes, &problem, result))
    }

    fn finish(
        &self,
        amplitudes: &AmplitudeSet,
        problem: &InterferenceProblem,
        result: OptimizationResult,
    ) -> Prioritization {
        let input_order: Vec<usize> = (0..amplitudes.len()).collect();
        let ids = result
            .best_permutation
            .iter()
            .filter_map(|&idx| amplitudes.get(idx).map(|a| a.id.clone()))
            .collect();

        Prioritization {
            ids,
            baseline_fitness: problem.fitness(&input_order),
            fitness: result.best_fitness,
            order: result.best_permutation,
            history: result.history,
            iterations: result.iterations,
            population_size: self.config.solver.population_size,
            alpha: self.config.solver.alpha,
        }
    }
}
