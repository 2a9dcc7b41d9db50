//! Reporting of experiment results to console, CSV and JSON.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::fitness::Objectives;
use crate::error::PlacementError;

/// Algorithms compared in experiment runs, in reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Algorithm {
    #[serde(rename = "ACO")]
    AntColony,
    #[serde(rename = "PSO")]
    ParticleSwarm,
    #[serde(rename = "Hybrid ACO-PSO")]
    Hybrid,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Algorithm::AntColony => write!(f, "ACO"),
            Algorithm::ParticleSwarm => write!(f, "PSO"),
            Algorithm::Hybrid => write!(f, "Hybrid ACO-PSO"),
        }
    }
}

/// Result of a single algorithm in a single experiment run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunResult {
    pub host_count: usize,
    pub run: usize,
    pub algorithm: Algorithm,
    /// Best fitness, `None` if no feasible solution was found.
    pub fitness: Option<f64>,
    pub time_ms: u64,
    /// Objective values, all zeros if no feasible solution was found.
    pub objectives: Objectives,
}

impl RunResult {
    fn fitness_str(&self, precision: usize, failed: &str) -> String {
        match self.fitness {
            Some(fitness) => format!("{:.*}", precision, fitness),
            None => failed.to_string(),
        }
    }
}

const TABLE_LINE: &str =
    "--------------------------------------------------------------------------------------------------------------";

/// Prints comparison table of algorithm results of one run.
pub fn print_run_report(host_count: usize, run: usize, results: &[RunResult]) {
    println!();
    println!("--- Comparison Report ({} Hosts, Run #{}) ---", host_count, run);
    println!("{}", TABLE_LINE);
    println!(
        "| {:<16} | {:<18} | {:<10} | {:<10} | {:<10} | {:<14} | {:<10} |",
        "Algorithm", "Best Fitness", "Time (ms)", "Power", "Load", "Network (hops)", "Max Link %"
    );
    println!("{}", TABLE_LINE);
    for result in results {
        println!(
            "| {:<16} | {:<18} | {:<10} | {:<10.2} | {:<10.4} | {:<14.2} | {:<10.4} |",
            result.algorithm.to_string(),
            result.fitness_str(2, "Infinity (Failed)"),
            result.time_ms,
            result.objectives.power,
            result.objectives.load_imbalance,
            result.objectives.network_traffic,
            result.objectives.max_link_utilization
        );
    }
    println!("{}", TABLE_LINE);
}

/// Prints comparison tables of all runs in the order of their appearance in results.
pub fn print_experiment_report(results: &[RunResult]) {
    let mut runs: IndexMap<(usize, usize), Vec<RunResult>> = IndexMap::new();
    for result in results {
        runs.entry((result.host_count, result.run)).or_default().push(result.clone());
    }
    for ((host_count, run), run_results) in runs {
        print_run_report(host_count, run, &run_results);
    }
}

#[derive(Serialize)]
struct CsvRecord {
    #[serde(rename = "HostCount")]
    host_count: usize,
    #[serde(rename = "Run")]
    run: usize,
    #[serde(rename = "Algorithm")]
    algorithm: String,
    #[serde(rename = "BestFitness")]
    fitness: String,
    #[serde(rename = "TimeMs")]
    time_ms: u64,
    #[serde(rename = "Power")]
    power: String,
    #[serde(rename = "Load")]
    load: String,
    #[serde(rename = "Network")]
    network: String,
    #[serde(rename = "Link")]
    link: String,
}

impl From<&RunResult> for CsvRecord {
    fn from(result: &RunResult) -> Self {
        Self {
            host_count: result.host_count,
            run: result.run,
            algorithm: result.algorithm.to_string(),
            fitness: result.fitness_str(4, "FAILED"),
            time_ms: result.time_ms,
            power: format!("{:.2}", result.objectives.power),
            load: format!("{:.4}", result.objectives.load_imbalance),
            network: format!("{:.2}", result.objectives.network_traffic),
            link: format!("{:.4}", result.objectives.max_link_utilization),
        }
    }
}

/// Writes results to CSV file, replacing its previous content.
pub fn write_csv(path: impl AsRef<Path>, results: &[RunResult]) -> Result<(), PlacementError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for result in results {
        wtr.serialize(CsvRecord::from(result))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes results to JSON file as a pretty-printed array.
pub fn write_json(path: impl AsRef<Path>, results: &[RunResult]) -> Result<(), PlacementError> {
    let json = serde_json::to_string_pretty(results).map_err(std::io::Error::from)?;
    std::fs::write(path, json)?;
    Ok(())
}
