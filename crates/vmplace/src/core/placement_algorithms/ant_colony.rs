//! Ant colony optimization algorithm.

use log::{debug, info, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::core::fitness::{FitnessEvaluator, EPSILON};
use crate::core::placement_algorithm::PlacementAlgorithm;
use crate::core::problem::PlacementProblem;
use crate::core::solution::{Solution, INFEASIBLE_FITNESS};
use crate::error::PlacementError;

const INITIAL_PHEROMONE: f64 = 1.;
const LOAD_HEURISTIC_WEIGHT: f64 = 0.5;
const NETWORK_HEURISTIC_WEIGHT: f64 = 0.5;
const NETWORK_THRESHOLD: f64 = 1.;

/// Parameters of ant colony optimization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AntColonyConfig {
    /// Number of solutions constructed on each iteration.
    pub ants: usize,
    pub iterations: usize,
    /// Pheromone exponent.
    pub alpha: f64,
    /// Heuristic exponent.
    pub beta: f64,
    /// Pheromone evaporation rate.
    pub rho: f64,
    /// Pheromone deposit factor.
    pub q: f64,
}

/// Desirability of placing VM on host learned by the colony, indexed by `[vm][host]`.
struct PheromoneMatrix {
    trails: Vec<Vec<f64>>,
}

impl PheromoneMatrix {
    fn new(vm_count: usize, host_count: usize) -> Self {
        Self {
            trails: vec![vec![INITIAL_PHEROMONE; host_count]; vm_count],
        }
    }

    fn get(&self, vm: usize, host: usize) -> f64 {
        self.trails[vm][host]
    }

    fn evaporate(&mut self, rho: f64) {
        for row in self.trails.iter_mut() {
            for trail in row.iter_mut() {
                *trail *= 1. - rho;
            }
        }
    }

    fn deposit(&mut self, solution: &Solution, amount: f64) {
        for (&vm, &host) in solution.mapping() {
            self.trails[vm][host] += amount;
        }
    }
}

/// Partial solution of a single ant along with the host loads it induces.
struct Ant {
    solution: Solution,
    cpu_load: Vec<f64>,
    memory_load: Vec<f64>,
    network_load: Vec<f64>,
}

impl Ant {
    fn new(host_count: usize) -> Self {
        Self {
            solution: Solution::new(),
            cpu_load: vec![0.; host_count],
            memory_load: vec![0.; host_count],
            network_load: vec![0.; host_count],
        }
    }

    /// Returns the traffic between VM and its already placed peers grouped by host, and the total of this traffic.
    fn placed_peer_traffic(&self, vm: usize, problem: &PlacementProblem) -> (Vec<f64>, f64) {
        let mut by_host = vec![0.; problem.host_count()];
        let mut total = 0.;
        for &(peer, volume) in problem.network().peers(vm) {
            if let Some(host) = self.solution.host_of(peer) {
                by_host[host] += volume as f64;
                total += volume as f64;
            }
        }
        (by_host, total)
    }

    fn place(&mut self, vm: usize, host: usize, problem: &PlacementProblem) {
        let demand = &problem.vms()[vm];
        self.cpu_load[host] += demand.cpu_usage as f64;
        self.memory_load[host] += demand.memory_usage as f64;
        for &(peer, volume) in problem.network().peers(vm) {
            if let Some(peer_host) = self.solution.host_of(peer) {
                if peer_host != host {
                    self.network_load[host] += volume as f64;
                    self.network_load[peer_host] += volume as f64;
                }
            }
        }
        self.solution.assign(vm, host);
    }
}

/// Builds solutions VM by VM choosing hosts with probability proportional to pheromone trail and a heuristic
/// favoring low CPU load and low cross-host traffic. The trails are reinforced by the best found solution.
pub struct AntColony {
    config: AntColonyConfig,
    evaluator: FitnessEvaluator,
    rng: Pcg64,
    history: Vec<f64>,
}

impl AntColony {
    pub fn new(config: AntColonyConfig, evaluator: FitnessEvaluator, seed: u64) -> Self {
        Self {
            config,
            evaluator,
            rng: Pcg64::seed_from_u64(seed),
            history: Vec::new(),
        }
    }

    /// Returns the best fitness after each iteration of the last run.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Evaporates all trails and reinforces the ones of the best solution, if it is feasible.
    fn update_trails(&self, pheromone: &mut PheromoneMatrix, best: Option<&Solution>) {
        pheromone.evaporate(self.config.rho);
        if let Some(best) = best.filter(|s| s.is_feasible()) {
            pheromone.deposit(best, self.config.q / (best.fitness() + 1.));
        }
    }

    fn construct(&mut self, problem: &PlacementProblem, pheromone: &PheromoneMatrix) -> Solution {
        let mut ant = Ant::new(problem.host_count());
        for vm in 0..problem.vm_count() {
            let host = self.select_host(vm, &ant, problem, pheromone);
            ant.place(vm, host, problem);
        }
        ant.solution
    }

    fn select_host(&mut self, vm: usize, ant: &Ant, problem: &PlacementProblem, pheromone: &PheromoneMatrix) -> usize {
        let thresholds = self.evaluator.thresholds();
        let demand = &problem.vms()[vm];
        let bandwidth = problem.network().host_bandwidth();
        let (peer_traffic, total_peer_traffic) = ant.placed_peer_traffic(vm, problem);

        let mut fits = vec![false; problem.host_count()];
        let mut weights = vec![0.; problem.host_count()];
        for (id, host) in problem.hosts().iter().enumerate() {
            let cpu_ratio = (ant.cpu_load[id] + demand.cpu_usage as f64) / host.cpu_total as f64;
            let memory_ratio = (ant.memory_load[id] + demand.memory_usage as f64) / host.memory_total as f64;
            let new_traffic = total_peer_traffic - peer_traffic[id];
            let network_ratio = (ant.network_load[id] + new_traffic) / bandwidth;
            if cpu_ratio > thresholds.cpu || memory_ratio > thresholds.memory || network_ratio > NETWORK_THRESHOLD {
                continue;
            }
            fits[id] = true;

            let load_heuristic = 1. / (cpu_ratio + EPSILON);
            let network_heuristic = 1. / (new_traffic + EPSILON);
            let heuristic =
                load_heuristic.powf(LOAD_HEURISTIC_WEIGHT) * network_heuristic.powf(NETWORK_HEURISTIC_WEIGHT);
            weights[id] = pheromone.get(vm, id).powf(self.config.alpha) * heuristic.powf(self.config.beta);
        }

        let fallback = || fits.iter().position(|&fit| fit).unwrap_or(0);
        if !weights.iter().sum::<f64>().is_finite() {
            return fallback();
        }
        match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(&mut self.rng),
            // all weights are zero
            Err(_) => fallback(),
        }
    }
}

impl PlacementAlgorithm for AntColony {
    fn name(&self) -> &str {
        "ACO"
    }

    fn solve(&mut self, problem: &PlacementProblem) -> Result<Solution, PlacementError> {
        info!(
            "ACO started: {} VMs, {} hosts, {} ants, {} iterations",
            problem.vm_count(),
            problem.host_count(),
            self.config.ants,
            self.config.iterations
        );
        self.history.clear();
        let mut pheromone = PheromoneMatrix::new(problem.vm_count(), problem.host_count());
        let mut best: Option<Solution> = None;

        for iteration in 0..self.config.iterations {
            for _ in 0..self.config.ants {
                let mut solution = self.construct(problem, &pheromone);
                self.evaluator.evaluate_in_place(&mut solution, problem);
                let improved = match &best {
                    Some(current) => solution.is_better_than(current),
                    None => true,
                };
                if improved {
                    best = Some(solution);
                }
            }

            self.update_trails(&mut pheromone, best.as_ref());

            let best_fitness = best.as_ref().map_or(INFEASIBLE_FITNESS, |s| s.fitness());
            debug!("ACO iteration {}: best fitness {}", iteration, best_fitness);
            self.history.push(best_fitness);
        }

        let best = best.unwrap_or_default();
        if best.is_feasible() {
            info!("ACO finished: best fitness {:.4}", best.fitness());
        } else {
            warn!("ACO finished without feasible solution");
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::core::fitness::{FitnessWeights, Thresholds};

    fn colony() -> AntColony {
        let config = AntColonyConfig {
            ants: 1,
            iterations: 1,
            alpha: 1.,
            beta: 1.,
            rho: 0.5,
            q: 10.,
        };
        let weights = FitnessWeights {
            power: 1.,
            load: 1.,
            network: 1.,
            link: 1.,
        };
        AntColony::new(config, FitnessEvaluator::new(weights, Thresholds::default()), 1)
    }

    #[test]
    fn test_trails_only_evaporate_without_feasible_best() {
        let colony = colony();
        let mut pheromone = PheromoneMatrix::new(2, 2);
        colony.update_trails(&mut pheromone, None);
        let infeasible = Solution::from_position(&[0, 1]);
        colony.update_trails(&mut pheromone, Some(&infeasible));
        for vm in 0..2 {
            for host in 0..2 {
                assert_eq!(pheromone.get(vm, host), 0.25);
            }
        }
    }

    #[test]
    fn test_feasible_best_reinforces_its_trails() {
        let colony = colony();
        let mut pheromone = PheromoneMatrix::new(2, 2);
        let mut best = Solution::from_position(&[0, 1]);
        best.set_fitness(4.);
        colony.update_trails(&mut pheromone, Some(&best));
        assert_abs_diff_eq!(pheromone.get(0, 0), 0.5 + 2.);
        assert_abs_diff_eq!(pheromone.get(1, 1), 0.5 + 2.);
        assert_abs_diff_eq!(pheromone.get(0, 1), 0.5);
        assert_abs_diff_eq!(pheromone.get(1, 0), 0.5);
    }
}
