//! Hybrid algorithm refining the results of ant colony and particle swarm runs.

use log::{info, warn};
use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::core::fitness::FitnessEvaluator;
use crate::core::placement_algorithms::particle_swarm::{ParticleSwarm, ParticleSwarmConfig};
use crate::core::placement_algorithms::perturbation::PerturbationStrategy;
use crate::core::problem::PlacementProblem;
use crate::core::solution::Solution;
use crate::error::PlacementError;

/// Fuses two scout solutions into an elite swarm and refines it with particle swarm optimization.
///
/// The swarm consists of the best scout solution and its perturbed copies, so the result is never worse
/// than the best feasible scout.
pub struct HybridScheduler {
    swarm_config: ParticleSwarmConfig,
    refinement_iterations: usize,
    evaluator: FitnessEvaluator,
    rng: Pcg64,
    history: Vec<f64>,
}

impl HybridScheduler {
    pub fn new(
        swarm_config: ParticleSwarmConfig,
        refinement_iterations: usize,
        evaluator: FitnessEvaluator,
        seed: u64,
    ) -> Self {
        Self {
            swarm_config,
            refinement_iterations,
            evaluator,
            rng: Pcg64::seed_from_u64(seed),
            history: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        "Hybrid"
    }

    /// Returns the global best fitness after each refinement iteration of the last run.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Returns the better of feasible scouts or `None` if both scouts are infeasible.
    pub fn best_of_scouts<'a>(aco_scout: &'a Solution, pso_scout: &'a Solution) -> Option<&'a Solution> {
        match (aco_scout.is_feasible(), pso_scout.is_feasible()) {
            (true, true) if aco_scout.is_better_than(pso_scout) => Some(aco_scout),
            (true, true) => Some(pso_scout),
            (true, false) => Some(aco_scout),
            (false, true) => Some(pso_scout),
            (false, false) => None,
        }
    }

    /// Builds the elite swarm from the anchor solution and refines it.
    ///
    /// If neither scout is feasible, the particle swarm scout is returned unchanged.
    pub fn solve(
        &mut self,
        problem: &PlacementProblem,
        aco_scout: &Solution,
        pso_scout: &Solution,
    ) -> Result<Solution, PlacementError> {
        self.history.clear();
        let anchor = match Self::best_of_scouts(aco_scout, pso_scout) {
            Some(anchor) => anchor,
            None => {
                warn!("Hybrid: neither scout found a feasible solution");
                return Ok(pso_scout.clone());
            }
        };
        info!("Hybrid started from scout with fitness {:.4}", anchor.fitness());

        let population = self.swarm_config.population.max(1);
        let mut swarm = Vec::with_capacity(population);
        swarm.push(anchor.clone());
        while swarm.len() < population {
            let mut solution = anchor.clone();
            PerturbationStrategy::random(&mut self.rng).apply(&mut solution, problem, &mut self.rng);
            self.evaluator.evaluate_in_place(&mut solution, problem);
            swarm.push(solution);
        }

        info!("Hybrid: refining for {} iterations", self.refinement_iterations);
        let mut refiner = ParticleSwarm::new(self.swarm_config, self.evaluator, self.rng.gen())
            .with_iterations(self.refinement_iterations);
        let best = refiner.solve_with_initial_swarm(swarm, problem)?;
        self.history = refiner.history().to_vec();
        info!("Hybrid finished: best fitness {:.4}", best.fitness());
        Ok(best)
    }
}
