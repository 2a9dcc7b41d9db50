//! Multi-objective fitness of placement solutions.
//!
//! The fitness is a weighted sum of four objectives: power consumption of active hosts, CPU load imbalance
//! between active hosts, network traffic cost (volume multiplied by hop count) and maximum host link utilization.
//! Solutions overloading any host by CPU, memory or network are infeasible and get [`INFEASIBLE_FITNESS`].

use serde::{Deserialize, Serialize};

use crate::core::problem::PlacementProblem;
use crate::core::solution::{Solution, INFEASIBLE_FITNESS};

/// Guards ratios against division by zero.
pub const EPSILON: f64 = 1e-6;

/// Hop count charged for traffic of VMs which are not placed yet.
pub const UNASSIGNED_HOPS: f64 = 2.;

/// Weights of the fitness objectives.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    pub power: f64,
    pub load: f64,
    pub network: f64,
    pub link: f64,
}

/// Host capacity fractions which can be used without making the solution infeasible.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub cpu: f64,
    pub memory: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { cpu: 1., memory: 1. }
    }
}

/// Raw (unweighted) objective values of a feasible solution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Objectives {
    /// Total power consumption of active hosts in W.
    pub power: f64,
    /// Standard deviation of CPU utilization of active hosts.
    pub load_imbalance: f64,
    /// Sum of traffic volume multiplied by hop count over all communicating VM pairs.
    pub network_traffic: f64,
    /// Maximum ratio of host network load to host bandwidth.
    pub max_link_utilization: f64,
}

/// Result of solution evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub fitness: f64,
    /// Objective values, `None` for infeasible solutions.
    pub objectives: Option<Objectives>,
}

impl Evaluation {
    pub fn infeasible() -> Self {
        Self {
            fitness: INFEASIBLE_FITNESS,
            objectives: None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.objectives.is_some()
    }
}

/// Computes the fitness of solutions.
///
/// The evaluator holds no per-call state and can be shared between solvers and threads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitnessEvaluator {
    weights: FitnessWeights,
    thresholds: Thresholds,
}

impl FitnessEvaluator {
    pub fn new(weights: FitnessWeights, thresholds: Thresholds) -> Self {
        Self { weights, thresholds }
    }

    pub fn weights(&self) -> FitnessWeights {
        self.weights
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Evaluates the solution. The mapping must reference VMs and hosts of `problem`.
    ///
    /// Partial solutions are accepted: the traffic of unplaced VMs is charged with [`UNASSIGNED_HOPS`] hops.
    pub fn evaluate(&self, solution: &Solution, problem: &PlacementProblem) -> Evaluation {
        let hosts = problem.hosts();
        let vms = problem.vms();
        let network = problem.network();

        let mut active = vec![false; hosts.len()];
        let mut cpu_used = vec![0.; hosts.len()];
        let mut memory_used = vec![0.; hosts.len()];
        for (&vm, &host) in solution.mapping() {
            active[host] = true;
            cpu_used[host] += vms[vm].cpu_usage as f64;
            memory_used[host] += vms[vm].memory_usage as f64;
        }

        let mut power = 0.;
        let mut total_cpu_used = 0.;
        let mut total_cpu = 0.;
        let mut host_loads = Vec::new();
        for (id, host) in hosts.iter().enumerate() {
            if !active[id] {
                continue;
            }
            let cpu_total = host.cpu_total as f64;
            if memory_used[id] > host.memory_total as f64 * self.thresholds.memory
                || cpu_used[id] > cpu_total * self.thresholds.cpu
            {
                return Evaluation::infeasible();
            }
            let cpu_util = cpu_used[id] / cpu_total;
            power += host.power(cpu_util);
            host_loads.push(cpu_util);
            total_cpu_used += cpu_used[id];
            total_cpu += cpu_total;
        }

        let mut load_imbalance = 0.;
        if !host_loads.is_empty() {
            let avg_load = total_cpu_used / (total_cpu + EPSILON);
            let squared_diffs: f64 = host_loads.iter().map(|load| (load - avg_load).powi(2)).sum();
            load_imbalance = (squared_diffs / host_loads.len() as f64).sqrt();
        }

        let mut network_traffic = 0.;
        let mut host_network_load = vec![0.; hosts.len()];
        for &(vm1, vm2, volume) in network.traffic_edges() {
            let volume = volume as f64;
            match (solution.host_of(vm1), solution.host_of(vm2)) {
                (Some(host1), Some(host2)) => {
                    let hops = network.hops(host1, host2);
                    network_traffic += volume * hops as f64;
                    if hops > 0 {
                        host_network_load[host1] += volume;
                        host_network_load[host2] += volume;
                    }
                }
                _ => network_traffic += volume * UNASSIGNED_HOPS,
            }
        }

        let max_network_load = host_network_load.iter().copied().fold(0., f64::max);
        let max_link_utilization = max_network_load / (network.host_bandwidth() + EPSILON);
        if max_link_utilization > 1. {
            return Evaluation::infeasible();
        }

        let objectives = Objectives {
            power,
            load_imbalance,
            network_traffic,
            max_link_utilization,
        };
        Evaluation {
            fitness: self.weighted_sum(&objectives),
            objectives: Some(objectives),
        }
    }

    /// Evaluates the solution and stores its fitness in it.
    pub fn evaluate_in_place(&self, solution: &mut Solution, problem: &PlacementProblem) -> Evaluation {
        let evaluation = self.evaluate(solution, problem);
        solution.set_fitness(evaluation.fitness);
        evaluation
    }

    fn weighted_sum(&self, objectives: &Objectives) -> f64 {
        self.weights.power * objectives.power
            + self.weights.load * objectives.load_imbalance
            + self.weights.network * objectives.network_traffic
            + self.weights.link * objectives.max_link_utilization
    }
}
