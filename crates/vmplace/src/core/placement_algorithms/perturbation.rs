//! Random perturbations used to diversify the elite swarm of hybrid algorithm.

use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::core::problem::PlacementProblem;
use crate::core::solution::Solution;

/// Fraction of VMs relocated by consolidation and balance perturbations.
pub const RELOCATION_FRACTION: f64 = 0.05;
/// Fraction of VMs defining the number of swaps made by traffic swap perturbation.
pub const SWAP_FRACTION: f64 = 0.10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerturbationStrategy {
    /// Moves a few random VMs to other random hosts, which occasionally packs VMs together.
    Consolidation,
    /// Swaps hosts of a few random VM pairs, changing traffic paths without changing the set of active hosts much.
    TrafficSwap,
    /// Moves a few random VMs to other random hosts.
    ///
    /// Currently performs the same relocation as [`PerturbationStrategy::Consolidation`],
    /// selection of balanced results is left to the fitness function.
    Balance,
}

impl PerturbationStrategy {
    pub const ALL: [PerturbationStrategy; 3] = [Self::Consolidation, Self::TrafficSwap, Self::Balance];

    /// Picks a strategy uniformly at random.
    pub fn random(rng: &mut Pcg64) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Modifies the solution mapping in place. The solution fitness is not updated.
    ///
    /// Solutions of problems without VMs or with less than two hosts are left unchanged.
    pub fn apply(self, solution: &mut Solution, problem: &PlacementProblem, rng: &mut Pcg64) {
        if problem.vm_count() == 0 || problem.host_count() < 2 {
            return;
        }
        match self {
            Self::Consolidation | Self::Balance => relocate(solution, problem, rng),
            Self::TrafficSwap => swap(solution, problem, rng),
        }
    }
}

fn move_count(vm_count: usize, fraction: f64) -> usize {
    ((vm_count as f64 * fraction).floor() as usize).max(1)
}

fn relocate(solution: &mut Solution, problem: &PlacementProblem, rng: &mut Pcg64) {
    let host_count = problem.host_count();
    for _ in 0..move_count(problem.vm_count(), RELOCATION_FRACTION) {
        let vm = rng.gen_range(0..problem.vm_count());
        let new_host = match solution.host_of(vm) {
            Some(current) => {
                // uniform among the other hosts
                let host = rng.gen_range(0..host_count - 1);
                if host >= current {
                    host + 1
                } else {
                    host
                }
            }
            None => rng.gen_range(0..host_count),
        };
        solution.assign(vm, new_host);
    }
}

fn swap(solution: &mut Solution, problem: &PlacementProblem, rng: &mut Pcg64) {
    for _ in 0..move_count(problem.vm_count(), SWAP_FRACTION) {
        let vm1 = rng.gen_range(0..problem.vm_count());
        let vm2 = rng.gen_range(0..problem.vm_count());
        if let (Some(host1), Some(host2)) = (solution.host_of(vm1), solution.host_of(vm2)) {
            if host1 != host2 {
                solution.assign(vm1, host2);
                solution.assign(vm2, host1);
            }
        }
    }
}
