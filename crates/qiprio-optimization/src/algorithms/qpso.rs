use crate::codec::spv_permutation;
use crate::common::{Individual, OptimizationError, OptimizationResult, Problem, SolverConfig, SolverResult};
use ndarray::Array1;
use rand::distributions::Open01;
use rand::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info};

/// Quantum-behaved particle swarm optimization over permutations.
///
/// Particles have no velocity. Each dimension of a new position is drawn
/// around a random local attractor between the particle's personal best and
/// the global best, with a spread proportional to the distance from the mean
/// of all personal bests. Positions live in `[0, n]` and are decoded with the
/// smallest-position-value rule.
pub struct QPSOSolver {
    pub config: SolverConfig,
}

#[derive(Clone, Debug)]
struct Particle {
    position: Array1<f64>,
    best: Individual,
}

impl QPSOSolver {
    pub fn new(config: SolverConfig) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run with a generator seeded from `config.seed`, or from entropy when unset.
    pub fn solve<P: Problem>(&self, problem: &P) -> SolverResult<OptimizationResult> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.solve_with_rng(problem, &mut rng)
    }

    /// Run with an injected random source. Identical streams give identical results.
    pub fn solve_with_rng<P, R>(&self, problem: &P, rng: &mut R) -> SolverResult<OptimizationResult>
    where
        P: Problem,
        R: Rng + ?Sized,
    {
        self.config.validate()?;
        let dim = problem.dim();
        if dim == 0 {
            return Err(OptimizationError::EmptyInput);
        }
        let upper = dim as f64;

        info!(
            "QPSO: ordering {} elements with {} particles for up to {} iterations",
            dim, self.config.population_size, self.config.max_iterations
        );

        // Initialize swarm
        let mut particles: Vec<Particle> = (0..self.config.population_size)
            .map(|_| {
                let position: Array1<f64> = (0..dim).map(|_| rng.gen_range(0.0..=upper)).collect();
                let fitness = problem.fitness(&decode(&position));
                Particle {
                    best: Individual::new(position.clone(), fitness),
                    position,
                }
            })
            .collect();

        let mut gbest = particles[self.find_best(&particles)].best.clone();

        let mut history = Vec::with_capacity(self.config.max_iterations);
        let mut stalled = 0usize;

        for iter in 0..self.config.max_iterations {
            if iter % 10 == 0 {
                debug!(
                    "QPSO Solver: Iteration {}/{}, best fitness {:.6}",
                    iter, self.config.max_iterations, gbest.fitness
                );
            }

            let before = gbest.fitness;
            if self.config.parallel {
                self.step_parallel(problem, &mut particles, &mut gbest, upper, rng);
            } else {
                self.step(problem, &mut particles, &mut gbest, upper, rng);
            }
            history.push(gbest.fitness);

            if gbest.fitness > before {
                stalled = 0;
            } else {
                stalled += 1;
            }
            if let Some(limit) = self.config.stall_iterations {
                if stalled >= limit {
                    debug!("QPSO Solver: no improvement for {} iterations, stopping at {}", limit, iter + 1);
                    break;
                }
            }
        }

        info!("QPSO: finished after {} iterations, best fitness {:.6}", history.len(), gbest.fitness);

        Ok(OptimizationResult {
            best_permutation: decode(&gbest.variables),
            best_fitness: gbest.fitness,
            iterations: history.len(),
            best_variables: gbest.variables,
            history,
        })
    }

    /// One sequential iteration. A particle that improves the global best is
    /// immediately visible to the particles after it.
    fn step<P, R>(&self, problem: &P, particles: &mut [Particle], gbest: &mut Individual, upper: f64, rng: &mut R)
    where
        P: Problem,
        R: Rng + ?Sized,
    {
        let mbest = mean_best(particles);

        for particle in particles.iter_mut() {
            let candidate = self.sample_position(particle, &gbest.variables, &mbest, upper, rng);
            let fitness = problem.fitness(&decode(&candidate));
            accept(particle, candidate, fitness, gbest);
        }
    }

    /// One parallel iteration. Mean best and global best are frozen for the
    /// whole iteration; updates are applied afterwards in particle order.
    fn step_parallel<P, R>(&self, problem: &P, particles: &mut [Particle], gbest: &mut Individual, upper: f64, rng: &mut R)
    where
        P: Problem,
        R: Rng + ?Sized,
    {
        let mbest = mean_best(particles);
        let attractor = gbest.variables.clone();
        let seeds: Vec<u64> = (0..particles.len()).map(|_| rng.gen()).collect();

        let candidates: Vec<(Array1<f64>, f64)> = particles
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(particle, &seed)| {
                let mut local_rng = StdRng::seed_from_u64(seed);
                let candidate = self.sample_position(particle, &attractor, &mbest, upper, &mut local_rng);
                let fitness = problem.fitness(&decode(&candidate));
                (candidate, fitness)
            })
            .collect();

        for (particle, (candidate, fitness)) in particles.iter_mut().zip(candidates) {
            accept(particle, candidate, fitness, gbest);
        }
    }

    /// Draw `p + s * L * ln(1/u)` per dimension and clamp into `[0, upper]`.
    ///
    /// Draw order is all of `phi`, then all of `u`, then all signs.
    fn sample_position<R>(
        &self,
        particle: &Particle,
        gbest: &Array1<f64>,
        mbest: &Array1<f64>,
        upper: f64,
        rng: &mut R,
    ) -> Array1<f64>
    where
        R: Rng + ?Sized,
    {
        let dim = particle.position.len();
        let phi: Vec<f64> = (0..dim).map(|_| rng.sample(Open01)).collect();
        let u: Vec<f64> = (0..dim).map(|_| rng.sample(Open01)).collect();
        let signs: Vec<f64> = (0..dim)
            .map(|_| {
                if rng.gen::<f64>() < self.config.positive_sign_probability {
                    1.0
                } else {
                    -1.0
                }
            })
            .collect();

        let mut next = Array1::zeros(dim);
        for j in 0..dim {
            let p = phi[j] * particle.best.variables[j] + (1.0 - phi[j]) * gbest[j];
            let l = self.config.alpha * (mbest[j] - particle.position[j]).abs();
            next[j] = (p + signs[j] * l * quantum_offset(u[j])).clamp(0.0, upper);
        }
        next
    }

    fn find_best(&self, particles: &[Particle]) -> usize {
        let mut best_idx = 0;
        for (i, particle) in particles.iter().enumerate() {
            if particle.best.fitness > particles[best_idx].best.fitness {
                best_idx = i;
            }
        }
        best_idx
    }
}

/// `ln(1/u)` with `u` floored at the smallest positive normal, so the result is finite.
pub fn quantum_offset(u: f64) -> f64 {
    (1.0 / u.max(f64::MIN_POSITIVE)).ln()
}

fn decode(position: &Array1<f64>) -> Vec<usize> {
    match position.as_slice() {
        Some(values) => spv_permutation(values),
        None => spv_permutation(&position.to_vec()),
    }
}

fn mean_best(particles: &[Particle]) -> Array1<f64> {
    let dim = particles[0].position.len();
    let mut sum = Array1::zeros(dim);
    for particle in particles {
        sum += &particle.best.variables;
    }
    sum / particles.len() as f64
}

fn accept(particle: &mut Particle, candidate: Array1<f64>, fitness: f64, gbest: &mut Individual) {
    if fitness > particle.best.fitness {
        particle.best = Individual::new(candidate.clone(), fitness);
        if fitness > gbest.fitness {
            *gbest = particle.best.clone();
        }
    }
    particle.position = candidate;
}
