//! Discrete particle swarm optimization algorithm.

use log::{debug, info, warn};
use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::core::fitness::FitnessEvaluator;
use crate::core::placement_algorithm::PlacementAlgorithm;
use crate::core::problem::PlacementProblem;
use crate::core::solution::Solution;
use crate::error::PlacementError;

/// Parameters of particle swarm optimization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleSwarmConfig {
    /// Number of particles in randomly initialized swarm.
    pub population: usize,
    pub iterations: usize,
    /// Inertia coefficient.
    pub w: f64,
    /// Cognitive coefficient.
    pub c1: f64,
    /// Social coefficient.
    pub c2: f64,
}

struct Particle {
    solution: Solution,
    position: Vec<isize>,
    velocity: Vec<f64>,
    best: Solution,
    best_position: Vec<isize>,
}

/// Searches the space of positions, where position is the vector of host indices of VMs.
///
/// Each particle moves towards its personal best position and the global best position of the swarm.
/// Moved coordinates are rounded and clamped to valid host indices.
pub struct ParticleSwarm {
    config: ParticleSwarmConfig,
    evaluator: FitnessEvaluator,
    rng: Pcg64,
    history: Vec<f64>,
}

impl ParticleSwarm {
    pub fn new(config: ParticleSwarmConfig, evaluator: FitnessEvaluator, seed: u64) -> Self {
        Self {
            config,
            evaluator,
            rng: Pcg64::seed_from_u64(seed),
            history: Vec::new(),
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Returns the global best fitness after each iteration of the last run.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Creates `population` evaluated solutions placing every VM on a uniformly random host.
    pub fn random_swarm(&mut self, problem: &PlacementProblem) -> Vec<Solution> {
        (0..self.config.population)
            .map(|_| {
                let position: Vec<usize> = (0..problem.vm_count())
                    .map(|_| self.rng.gen_range(0..problem.host_count()))
                    .collect();
                let mut solution = Solution::from_position(&position);
                self.evaluator.evaluate_in_place(&mut solution, problem);
                solution
            })
            .collect()
    }

    /// Runs the search starting from the given swarm, whose size defines the number of particles.
    ///
    /// Initial solutions are evaluated again, so their stored fitness values are not trusted.
    pub fn solve_with_initial_swarm(
        &mut self,
        swarm: Vec<Solution>,
        problem: &PlacementProblem,
    ) -> Result<Solution, PlacementError> {
        if swarm.is_empty() {
            return Err(PlacementError::EmptySwarm);
        }
        self.history.clear();
        let vm_count = problem.vm_count();
        let max_host = problem.host_count() as isize - 1;

        let mut particles = Vec::with_capacity(swarm.len());
        for mut solution in swarm {
            self.evaluator.evaluate_in_place(&mut solution, problem);
            let position = solution.position(vm_count);
            let velocity: Vec<f64> = (0..vm_count).map(|_| self.rng.gen_range(-1.0..=1.0)).collect();
            particles.push(Particle {
                best: solution.clone(),
                best_position: position.clone(),
                solution,
                position,
                velocity,
            });
        }

        let mut global_best = particles[0].solution.clone();
        let mut global_best_position = particles[0].position.clone();
        for particle in particles.iter() {
            if particle.solution.is_better_than(&global_best) {
                global_best = particle.solution.clone();
                global_best_position = particle.position.clone();
            }
        }

        for iteration in 0..self.config.iterations {
            for particle in particles.iter_mut() {
                let r1: f64 = self.rng.gen();
                let r2: f64 = self.rng.gen();
                for i in 0..vm_count {
                    let current = particle.position[i] as f64;
                    let cognitive = self.config.c1 * r1 * (particle.best_position[i] as f64 - current);
                    let social = self.config.c2 * r2 * (global_best_position[i] as f64 - current);
                    particle.velocity[i] = self.config.w * particle.velocity[i] + cognitive + social;
                }

                for i in 0..vm_count {
                    let moved = (particle.position[i] as f64 + particle.velocity[i]).round() as isize;
                    particle.position[i] = moved.clamp(0, max_host);
                }
                let hosts: Vec<usize> = particle.position.iter().map(|&host| host as usize).collect();
                particle.solution = Solution::from_position(&hosts);
                self.evaluator.evaluate_in_place(&mut particle.solution, problem);

                if particle.solution.is_better_than(&particle.best) {
                    particle.best = particle.solution.clone();
                    particle.best_position = particle.position.clone();
                    if particle.solution.is_better_than(&global_best) {
                        global_best = particle.solution.clone();
                        global_best_position = particle.position.clone();
                    }
                }
            }
            debug!("PSO iteration {}: global best fitness {}", iteration, global_best.fitness());
            self.history.push(global_best.fitness());
        }

        if !global_best.is_feasible() {
            warn!("PSO finished without feasible solution");
        }
        Ok(global_best)
    }
}

impl PlacementAlgorithm for ParticleSwarm {
    fn name(&self) -> &str {
        "PSO"
    }

    fn solve(&mut self, problem: &PlacementProblem) -> Result<Solution, PlacementError> {
        info!(
            "PSO started: {} VMs, {} hosts, {} particles, {} iterations",
            problem.vm_count(),
            problem.host_count(),
            self.config.population,
            self.config.iterations
        );
        let swarm = self.random_swarm(problem);
        let best = self.solve_with_initial_swarm(swarm, problem)?;
        if best.is_feasible() {
            info!("PSO finished: best fitness {:.4}", best.fitness());
        }
        Ok(best)
    }
}
