use std::collections::BTreeMap;

use approx::assert_abs_diff_eq;

use vmplace_models::power::cpu_models::constant::ConstantCpuPowerModel;
use vmplace_models::power::cpu_models::linear::LinearCpuPowerModel;
use vmplace_models::power::host::HostPowerModel;

use crate::core::fitness::{FitnessEvaluator, FitnessWeights, Thresholds};
use crate::core::host::Host;
use crate::core::network::NetworkModel;
use crate::core::placement_algorithms::perturbation::PerturbationStrategy;
use crate::core::problem::PlacementProblem;
use crate::core::solution::{Solution, INFEASIBLE_FITNESS};
use crate::core::vm::VirtualMachine;
use crate::error::PlacementError;

fn weights(power: f64, load: f64, network: f64, link: f64) -> FitnessWeights {
    FitnessWeights {
        power,
        load,
        network,
        link,
    }
}

fn evaluator(weights: FitnessWeights) -> FitnessEvaluator {
    FitnessEvaluator::new(weights, Thresholds::default())
}

fn linear_host(id: u32, cpu: u64, memory: u64) -> Host {
    let power_model = HostPowerModel::cpu_only(Box::new(LinearCpuPowerModel::new(100., 200.)));
    Host::new(id, &format!("h{}", id), cpu, memory, 1000, power_model)
}

fn vms(demands: &[(u64, u64)]) -> Vec<VirtualMachine> {
    demands
        .iter()
        .enumerate()
        .map(|(id, &(cpu, memory))| VirtualMachine::new(id as u32, cpu, memory, 10, 10))
        .collect()
}

fn hops(host_count: usize, hops: u32) -> Vec<Vec<u32>> {
    (0..host_count)
        .map(|a| (0..host_count).map(|b| if a == b { 0 } else { hops }).collect())
        .collect()
}

fn three_vms_two_hosts() -> PlacementProblem {
    let hosts = vec![linear_host(0, 150, 10), linear_host(1, 150, 10)];
    let network = NetworkModel::without_traffic(3, 2, 2, 1000.);
    PlacementProblem::new(vms(&[(100, 1), (100, 1), (100, 1)]), hosts, network).unwrap()
}

/// Two VMs exchanging `volume` units between two hosts which are `hop_count` hops apart.
fn communicating_pair(volume: u32, hop_count: u32, bandwidth: f64) -> PlacementProblem {
    let hosts = vec![linear_host(0, 1000, 1000), linear_host(1, 1000, 1000)];
    let traffic = vec![vec![0, volume], vec![volume, 0]];
    let network = NetworkModel::new(traffic, hops(2, hop_count), bandwidth);
    PlacementProblem::new(vms(&[(100, 10), (100, 10)]), hosts, network).unwrap()
}

#[test]
fn test_empty_problem_scores_zero() {
    let problem = PlacementProblem::new(Vec::new(), Vec::new(), NetworkModel::without_traffic(0, 0, 2, 1.)).unwrap();
    let evaluation = evaluator(weights(1., 1., 1., 1.)).evaluate(&Solution::new(), &problem);
    assert_eq!(evaluation.fitness, 0.);
    assert!(evaluation.is_feasible());
}

#[test]
fn test_cpu_overload_is_infeasible() {
    let problem = three_vms_two_hosts();
    let evaluator = evaluator(weights(1., 1., 1., 1.));

    let all_on_one = Solution::from_position(&[0, 0, 0]);
    assert_eq!(evaluator.evaluate(&all_on_one, &problem).fitness, INFEASIBLE_FITNESS);

    // any host with two VMs needs 200 > 150 MIPS
    let two_on_one = Solution::from_position(&[0, 1, 1]);
    assert_eq!(evaluator.evaluate(&two_on_one, &problem).fitness, INFEASIBLE_FITNESS);
    assert!(evaluator.evaluate(&two_on_one, &problem).objectives.is_none());
}

#[test]
fn test_memory_overload_is_infeasible() {
    let hosts = vec![linear_host(0, 1000, 10)];
    let network = NetworkModel::without_traffic(2, 1, 2, 1000.);
    let problem = PlacementProblem::new(vms(&[(10, 6), (10, 6)]), hosts, network).unwrap();
    let solution = Solution::from_position(&[0, 0]);
    let evaluation = evaluator(weights(0., 0., 0., 0.)).evaluate(&solution, &problem);
    assert_eq!(evaluation.fitness, INFEASIBLE_FITNESS);
}

#[test]
fn test_threshold_limits_capacity() {
    let hosts = vec![linear_host(0, 100, 100)];
    let network = NetworkModel::without_traffic(1, 1, 2, 1000.);
    let problem = PlacementProblem::new(vms(&[(60, 10)]), hosts, network).unwrap();
    let solution = Solution::from_position(&[0]);

    let relaxed = FitnessEvaluator::new(weights(1., 0., 0., 0.), Thresholds::default());
    assert!(relaxed.evaluate(&solution, &problem).is_feasible());
    let strict = FitnessEvaluator::new(weights(1., 0., 0., 0.), Thresholds { cpu: 0.5, memory: 1. });
    assert!(!strict.evaluate(&solution, &problem).is_feasible());
}

#[test]
fn test_link_congestion_is_infeasible() {
    let problem = communicating_pair(150, 2, 100.);
    let evaluator = evaluator(weights(1., 1., 1., 1.));

    let split = Solution::from_position(&[0, 1]);
    assert_eq!(evaluator.evaluate(&split, &problem).fitness, INFEASIBLE_FITNESS);

    // co-located VMs do not load the network
    let together = Solution::from_position(&[0, 0]);
    let evaluation = evaluator.evaluate(&together, &problem);
    assert!(evaluation.is_feasible());
    assert_eq!(evaluation.objectives.unwrap().max_link_utilization, 0.);
}

#[test]
fn test_objective_values() {
    let problem = communicating_pair(50, 3, 100.);
    let solution = Solution::from_position(&[0, 1]);
    let evaluation = evaluator(weights(1., 10., 2., 100.)).evaluate(&solution, &problem);
    let objectives = evaluation.objectives.unwrap();

    // both hosts are 10% loaded
    assert_abs_diff_eq!(objectives.power, 220., epsilon = 1e-9);
    assert_abs_diff_eq!(objectives.load_imbalance, 0., epsilon = 1e-6);
    assert_abs_diff_eq!(objectives.network_traffic, 150., epsilon = 1e-9);
    assert_abs_diff_eq!(objectives.max_link_utilization, 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(evaluation.fitness, 220. + 300. + 50., epsilon = 1e-4);
}

#[test]
fn test_load_imbalance_is_population_std_dev() {
    let hosts = vec![linear_host(0, 100, 100), linear_host(1, 100, 100)];
    let network = NetworkModel::without_traffic(2, 2, 2, 1000.);
    let problem = PlacementProblem::new(vms(&[(80, 1), (20, 1)]), hosts, network).unwrap();
    let solution = Solution::from_position(&[0, 1]);
    let objectives = evaluator(weights(0., 1., 0., 0.))
        .evaluate(&solution, &problem)
        .objectives
        .unwrap();
    // loads 0.8 and 0.2 around the mean 0.5
    assert_abs_diff_eq!(objectives.load_imbalance, 0.3, epsilon = 1e-6);
}

#[test]
fn test_inactive_hosts_consume_nothing() {
    let hosts = vec![linear_host(0, 100, 100), linear_host(1, 100, 100)];
    let network = NetworkModel::without_traffic(1, 2, 2, 1000.);
    let problem = PlacementProblem::new(vms(&[(50, 1)]), hosts, network).unwrap();
    let objectives = evaluator(weights(1., 0., 0., 0.))
        .evaluate(&Solution::from_position(&[1]), &problem)
        .objectives
        .unwrap();
    assert_abs_diff_eq!(objectives.power, 150., epsilon = 1e-9);
}

#[test]
fn test_unassigned_traffic_penalty() {
    let problem = communicating_pair(10, 4, 1000.);
    let mut partial = Solution::new();
    partial.assign(0, 0);
    let objectives = evaluator(weights(0., 0., 1., 0.))
        .evaluate(&partial, &problem)
        .objectives
        .unwrap();
    assert_abs_diff_eq!(objectives.network_traffic, 20., epsilon = 1e-9);
    assert_eq!(objectives.max_link_utilization, 0.);
}

#[test]
fn test_evaluate_in_place_stores_fitness() {
    let problem = three_vms_two_hosts();
    let evaluator = evaluator(weights(1., 0., 0., 0.));
    let mut solution = Solution::new();
    solution.assign(0, 0);
    solution.assign(1, 1);
    let evaluation = evaluator.evaluate_in_place(&mut solution, &problem);
    assert!(solution.is_feasible());
    assert_eq!(solution.fitness(), evaluation.fitness);
}

#[test]
fn test_clone_is_deep_copy() {
    let mut original = Solution::from_position(&[0, 1, 0]);
    original.set_fitness(12.5);
    let mut copy = original.clone();
    copy.assign(0, 1);
    copy.assign(5, 3);
    copy.set_fitness(1.);

    assert_eq!(original.host_of(0), Some(0));
    assert_eq!(original.host_of(5), None);
    assert_eq!(original.len(), 3);
    assert_eq!(original.fitness(), 12.5);
}

#[test]
fn test_position_encoding() {
    let mut solution = Solution::new();
    solution.assign(0, 2);
    solution.assign(2, 1);
    assert_eq!(solution.position(4), vec![2, -1, 1, -1]);
    assert_eq!(Solution::from_position(&[3, 0]).mapping(), &BTreeMap::from([(0, 3), (1, 0)]));
}

#[test]
fn test_problem_validation() {
    let network = NetworkModel::without_traffic(2, 1, 2, 1000.);
    let mut catalog = vms(&[(1, 1), (1, 1)]);
    catalog[1].id = 7;
    let result = PlacementProblem::new(catalog, vec![linear_host(0, 10, 10)], network.clone());
    assert!(matches!(result, Err(PlacementError::InvalidProblem(_))));

    let result = PlacementProblem::new(vms(&[(1, 1), (1, 1)]), Vec::new(), network.clone());
    assert!(matches!(result, Err(PlacementError::InvalidProblem(_))));

    let asymmetric = NetworkModel::new(vec![vec![0, 1], vec![2, 0]], hops(1, 2), 1000.);
    let result = PlacementProblem::new(vms(&[(1, 1), (1, 1)]), vec![linear_host(0, 10, 10)], asymmetric);
    assert!(matches!(result, Err(PlacementError::InvalidProblem(_))));

    let result = PlacementProblem::new(vms(&[(1, 1), (1, 1)]), vec![linear_host(0, 10, 10)], network);
    assert!(result.is_ok());
}

#[test]
fn test_problem_rejects_unusable_bandwidth() {
    for bandwidth in [0., -1., f64::NAN, f64::INFINITY] {
        let network = NetworkModel::without_traffic(1, 1, 2, bandwidth);
        let result = PlacementProblem::new(vms(&[(1, 1)]), vec![linear_host(0, 10, 10)], network);
        assert!(
            matches!(result, Err(PlacementError::InvalidProblem(_))),
            "bandwidth {} accepted",
            bandwidth
        );
    }
}

#[test]
fn test_constant_power_host() {
    let host = Host::new(
        0,
        "h0",
        10,
        10,
        10,
        HostPowerModel::cpu_only(Box::new(ConstantCpuPowerModel::new(42.))),
    );
    assert_eq!(host.power(0.), 42.);
    assert_eq!(host.power(1.), 42.);
}

#[test]
fn test_perturbations_keep_solution_complete() {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    let hosts = (0..4).map(|id| linear_host(id, 1000, 1000)).collect();
    let network = NetworkModel::without_traffic(40, 4, 2, 1000.);
    let problem = PlacementProblem::new(vms(&[(1, 1); 40]), hosts, network).unwrap();
    let anchor = Solution::from_position(&[0; 40]);
    let mut rng = Pcg64::seed_from_u64(5);

    for strategy in PerturbationStrategy::ALL {
        for _ in 0..10 {
            let mut solution = anchor.clone();
            strategy.apply(&mut solution, &problem, &mut rng);
            assert_eq!(solution.len(), 40);
            assert!(solution.mapping().values().all(|&host| host < 4));
        }
    }

    // 20 VMs give a single relocation, which always targets another host
    let hosts = (0..4).map(|id| linear_host(id, 1000, 1000)).collect();
    let network = NetworkModel::without_traffic(20, 4, 2, 1000.);
    let problem = PlacementProblem::new(vms(&[(1, 1); 20]), hosts, network).unwrap();
    for strategy in [PerturbationStrategy::Consolidation, PerturbationStrategy::Balance] {
        let mut relocated = Solution::from_position(&[0; 20]);
        strategy.apply(&mut relocated, &problem, &mut rng);
        let moved = relocated.mapping().values().filter(|&&host| host != 0).count();
        assert_eq!(moved, 1);
    }
}

#[test]
fn test_perturbation_needs_two_hosts() {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    let network = NetworkModel::without_traffic(3, 1, 2, 1000.);
    let problem = PlacementProblem::new(vms(&[(1, 1); 3]), vec![linear_host(0, 10, 10)], network).unwrap();
    let mut solution = Solution::from_position(&[0, 0, 0]);
    let mut rng = Pcg64::seed_from_u64(1);
    for strategy in PerturbationStrategy::ALL {
        strategy.apply(&mut solution, &problem, &mut rng);
    }
    assert_eq!(solution, Solution::from_position(&[0, 0, 0]));
}
