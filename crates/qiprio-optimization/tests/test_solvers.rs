use qiprio_optimization::algorithms::*;
use qiprio_optimization::codec::is_permutation;
use qiprio_optimization::common::*;
use qiprio_optimization::interference::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::{FRAC_PI_2, PI};

fn problem(phasors: &[(f64, f64)]) -> InterferenceProblem {
    InterferenceProblem::new(
        phasors.iter().map(|&(m, p)| Phasor::new(m, p)).collect(),
        InterferenceModel::default(),
    )
}

#[test]
fn test_identical_pair_scores_one_and_a_quarter() {
    let problem = problem(&[(1.0, 0.0), (1.0, 0.0)]);
    let config = SolverConfig { seed: Some(7), ..Default::default() };
    let result = QPSOSolver::new(config).unwrap().solve(&problem).unwrap();

    assert!((result.best_fitness - 1.25).abs() < 1e-12);
    assert!(is_permutation(&result.best_permutation, 2));
}

#[test]
fn test_orthogonal_pair_beats_in_phase_pair() {
    let orthogonal = problem(&[(1.0, 0.0), (1.0, FRAC_PI_2)]);
    let config = SolverConfig { seed: Some(7), ..Default::default() };
    let result = QPSOSolver::new(config).unwrap().solve(&orthogonal).unwrap();

    assert!((result.best_fitness - 1.5).abs() < 1e-12);
}

#[test]
fn test_dominant_test_runs_first() {
    let problem = problem(&[
        (0.05, 0.0),
        (0.05, FRAC_PI_2),
        (1.0, PI),
        (0.05, 3.0 * FRAC_PI_2),
    ]);
    let config = SolverConfig {
        population_size: 40,
        max_iterations: 100,
        seed: Some(2024),
        ..Default::default()
    };
    let result = QPSOSolver::new(config).unwrap().solve(&problem).unwrap();

    assert_eq!(result.best_permutation[0], 2, "QPSO should front-load the dominant test: {:?}", result.best_permutation);
}

#[test]
fn test_in_phase_tests_are_separated() {
    // Two identical in-phase tests and one orthogonal one. Best orders put the
    // orthogonal test between or ahead of the in-phase pair: 1 + 2/3 + 0.5/3.
    let problem = problem(&[(1.0, 0.0), (1.0, 0.0), (1.0, FRAC_PI_2)]);
    let config = SolverConfig { seed: Some(99), ..Default::default() };
    let result = QPSOSolver::new(config).unwrap().solve(&problem).unwrap();

    assert!((result.best_fitness - 11.0 / 6.0).abs() < 1e-9, "got {}", result.best_fitness);
    assert!(result.best_fitness <= problem.magnitude_sum());
}

#[test]
fn test_injected_rng_is_reproducible() {
    let problem = problem(&[(0.9, 0.1), (0.4, 2.0), (0.7, 0.2), (0.3, 4.0), (0.8, 5.5), (0.2, 1.0)]);
    let solver = QPSOSolver::new(SolverConfig::default()).unwrap();

    let a = solver.solve_with_rng(&problem, &mut StdRng::seed_from_u64(17)).unwrap();
    let b = solver.solve_with_rng(&problem, &mut StdRng::seed_from_u64(17)).unwrap();

    assert_eq!(a.best_permutation, b.best_permutation);
    assert_eq!(a.best_fitness, b.best_fitness);
    assert_eq!(a.best_variables, b.best_variables);
}

#[test]
fn test_parallel_matches_problem_bounds() {
    let phasors: Vec<(f64, f64)> = (0..25)
        .map(|i| (((i * 37) % 100) as f64 / 100.0, ((i * 53) % 628) as f64 / 100.0))
        .collect();
    let problem = problem(&phasors);
    let config = SolverConfig { seed: Some(1), parallel: true, ..Default::default() };
    let result = QPSOSolver::new(config).unwrap().solve(&problem).unwrap();

    assert!(is_permutation(&result.best_permutation, 25));
    assert!(result.best_fitness <= problem.magnitude_sum());
    assert_eq!(problem.fitness(&result.best_permutation), result.best_fitness);
    for pair in result.history.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
}
