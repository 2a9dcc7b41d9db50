//! Tools for running experiments with multiple scenario runs.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{error, info};
use rand::prelude::*;
use rand_pcg::Pcg64;
use threadpool::ThreadPool;

use crate::config::ExperimentConfig;
use crate::core::fitness::FitnessEvaluator;
use crate::core::placement_algorithm::PlacementAlgorithm;
use crate::core::placement_algorithms::ant_colony::AntColony;
use crate::core::placement_algorithms::hybrid::HybridScheduler;
use crate::core::placement_algorithms::particle_swarm::ParticleSwarm;
use crate::core::problem::PlacementProblem;
use crate::core::solution::Solution;
use crate::error::PlacementError;
use crate::report::{Algorithm, RunResult};
use crate::scenario::ScenarioGenerator;

/// Identifies a single run of experiment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScenarioRun {
    pub host_count: usize,
    /// Run number within the host count, starting from 1.
    pub run: usize,
    pub seed: u64,
}

/// Implements execution of experiment.
///
/// Each run generates its own scenario and compares ant colony, particle swarm and hybrid algorithms on it.
pub struct Experiment {
    pub config: ExperimentConfig,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Returns all runs of the experiment, each with a distinct seed derived from the base seed.
    pub fn runs(&self) -> Vec<ScenarioRun> {
        let sim = &self.config.simulation;
        let mut runs = Vec::new();
        for host_count in sim.hosts.values() {
            for run in 1..=sim.runs {
                runs.push(ScenarioRun {
                    host_count,
                    run,
                    seed: sim.seed.wrapping_add(runs.len() as u64),
                });
            }
        }
        runs
    }

    /// Runs the experiment using the specified number of threads.
    ///
    /// Returns the results sorted by host count, run number and algorithm.
    pub fn run(&self, num_threads: usize) -> Result<Vec<RunResult>, PlacementError> {
        let results = Arc::new(Mutex::new(Vec::new()));
        let pool = ThreadPool::new(num_threads.max(1));

        for scenario in self.runs() {
            let config = self.config.clone();
            let results = results.clone();
            pool.execute(move || {
                info!("RUN {} hosts #{} (seed {})", scenario.host_count, scenario.run, scenario.seed);
                let run_results = run_scenario(&config, scenario);
                if let Ok(mut results) = results.lock() {
                    results.push(run_results);
                }
            });
        }

        pool.join();
        if pool.panic_count() > 0 {
            error!("{} run(s) panicked", pool.panic_count());
            return Err(PlacementError::RunPanicked(pool.panic_count()));
        }

        let run_results = match results.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        let mut results = Vec::new();
        for run_result in run_results {
            results.extend(run_result?);
        }
        results.sort_by_key(|r| (r.host_count, r.run, r.algorithm));
        Ok(results)
    }
}

/// Generates the scenario of a single run and solves it with all algorithms.
pub fn run_scenario(config: &ExperimentConfig, scenario: ScenarioRun) -> Result<Vec<RunResult>, PlacementError> {
    let mut seeds = Pcg64::seed_from_u64(scenario.seed);
    let problem = ScenarioGenerator::new(&config.simulation, seeds.gen()).generate(scenario.host_count)?;
    info!(
        "Created {} hosts and {} VMs for run #{}",
        problem.host_count(),
        problem.vm_count(),
        scenario.run
    );
    let evaluator = config.fitness.evaluator();

    let mut aco = AntColony::new(config.aco, evaluator, seeds.gen());
    let (aco_solution, aco_time) = timed(|| aco.solve(&problem))?;
    info!("{} finished in {} ms", aco.name(), aco_time.as_millis());

    let mut pso = ParticleSwarm::new(config.pso, evaluator, seeds.gen());
    let (pso_solution, pso_time) = timed(|| pso.solve(&problem))?;
    info!("{} finished in {} ms", pso.name(), pso_time.as_millis());

    let mut hybrid = HybridScheduler::new(
        config.pso,
        config.hybrid.refinement_iterations,
        evaluator,
        seeds.gen(),
    );
    let (mut hybrid_solution, refinement_time) = timed(|| hybrid.solve(&problem, &aco_solution, &pso_solution))?;
    // scouts are assumed to run in parallel
    let hybrid_time = aco_time.max(pso_time) + refinement_time;
    hybrid_solution.set_duration(hybrid_time);
    info!(
        "{} finished in {} ms (refinement: {} ms)",
        hybrid.name(),
        hybrid_time.as_millis(),
        refinement_time.as_millis()
    );

    Ok(vec![
        run_result(scenario, Algorithm::AntColony, &aco_solution, &evaluator, &problem),
        run_result(scenario, Algorithm::ParticleSwarm, &pso_solution, &evaluator, &problem),
        run_result(scenario, Algorithm::Hybrid, &hybrid_solution, &evaluator, &problem),
    ])
}

fn timed<F>(solve: F) -> Result<(Solution, Duration), PlacementError>
where
    F: FnOnce() -> Result<Solution, PlacementError>,
{
    let start = Instant::now();
    let mut solution = solve()?;
    let duration = start.elapsed();
    solution.set_duration(duration);
    Ok((solution, duration))
}

/// Converts the final solution of algorithm to result, taking the objectives from a fresh evaluation.
pub fn run_result(
    scenario: ScenarioRun,
    algorithm: Algorithm,
    solution: &Solution,
    evaluator: &FitnessEvaluator,
    problem: &PlacementProblem,
) -> RunResult {
    let evaluation = evaluator.evaluate(solution, problem);
    RunResult {
        host_count: scenario.host_count,
        run: scenario.run,
        algorithm,
        fitness: evaluation.objectives.map(|_| evaluation.fitness),
        time_ms: solution.duration().as_millis() as u64,
        objectives: evaluation.objectives.unwrap_or_default(),
    }
}
