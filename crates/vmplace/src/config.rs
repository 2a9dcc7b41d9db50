//! Experiment configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::fitness::{FitnessEvaluator, FitnessWeights, Thresholds};
use crate::core::placement_algorithms::ant_colony::AntColonyConfig;
use crate::core::placement_algorithms::particle_swarm::ParticleSwarmConfig;
use crate::error::ConfigError;

/// Parameter which can take a single value, a list of values or a range of values.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
pub enum NumericParam<T> {
    Value(T),
    Range { from: T, to: T, step: T },
    Values(Vec<T>),
}

impl NumericParam<usize> {
    /// Returns all values taken by the parameter, range bounds are inclusive.
    pub fn values(&self) -> Vec<usize> {
        match self {
            NumericParam::Value(value) => vec![*value],
            NumericParam::Range { from, to, step } => {
                if *step == 0 {
                    return vec![*from];
                }
                (*from..=*to).step_by(*step).collect()
            }
            NumericParam::Values(values) => values.clone(),
        }
    }
}

/// Holds raw simulation config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawSimulationConfig {
    pub vms: usize,
    pub hosts: NumericParam<usize>,
    pub runs: usize,
    pub seed: Option<u64>,
    pub hosts_per_rack: Option<usize>,
    pub traffic_density: Option<f64>,
    pub max_traffic: Option<u32>,
    pub host_bandwidth: Option<f64>,
}

/// Represents simulation scenarios configuration.
#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct SimulationConfig {
    /// Number of VMs in each scenario.
    pub vms: usize,
    /// Numbers of hosts, each one defines a separate group of runs.
    pub hosts: NumericParam<usize>,
    /// Number of runs for each number of hosts.
    pub runs: usize,
    /// Base seed of random generators.
    pub seed: u64,
    /// Number of hosts in a rack.
    pub hosts_per_rack: usize,
    /// Probability that a pair of VMs exchanges traffic.
    pub traffic_density: f64,
    /// Maximal traffic volume between a pair of VMs.
    pub max_traffic: u32,
    /// Network capacity of each host.
    pub host_bandwidth: f64,
}

impl From<RawSimulationConfig> for SimulationConfig {
    fn from(data: RawSimulationConfig) -> Self {
        Self {
            vms: data.vms,
            hosts: data.hosts,
            runs: data.runs,
            seed: data.seed.unwrap_or(123),
            hosts_per_rack: data.hosts_per_rack.unwrap_or(8),
            traffic_density: data.traffic_density.unwrap_or(0.2),
            max_traffic: data.max_traffic.unwrap_or(100),
            host_bandwidth: data.host_bandwidth.unwrap_or(100000.),
        }
    }
}

/// Hybrid algorithm parameters.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct HybridConfig {
    /// Number of iterations of the final particle swarm run.
    pub refinement_iterations: usize,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawFitnessConfig {
    pub weights: FitnessWeights,
    pub cpu_threshold: Option<f64>,
    pub memory_threshold: Option<f64>,
}

/// Fitness function parameters.
#[derive(Debug, PartialEq, Serialize, Clone, Copy)]
pub struct FitnessConfig {
    pub weights: FitnessWeights,
    pub thresholds: Thresholds,
}

impl From<RawFitnessConfig> for FitnessConfig {
    fn from(data: RawFitnessConfig) -> Self {
        let default = Thresholds::default();
        Self {
            weights: data.weights,
            thresholds: Thresholds {
                cpu: data.cpu_threshold.unwrap_or(default.cpu),
                memory: data.memory_threshold.unwrap_or(default.memory),
            },
        }
    }
}

impl FitnessConfig {
    pub fn evaluator(&self) -> FitnessEvaluator {
        FitnessEvaluator::new(self.weights, self.thresholds)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawExperimentConfig {
    pub simulation: RawSimulationConfig,
    pub aco: AntColonyConfig,
    pub pso: ParticleSwarmConfig,
    pub hybrid: HybridConfig,
    pub fitness: RawFitnessConfig,
}

/// Represents experiment configuration.
#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct ExperimentConfig {
    pub simulation: SimulationConfig,
    pub aco: AntColonyConfig,
    pub pso: ParticleSwarmConfig,
    pub hybrid: HybridConfig,
    pub fitness: FitnessConfig,
}

impl ExperimentConfig {
    /// Creates experiment config by reading parameter values from YAML file.
    ///
    /// All algorithm parameters are required. The returned config is validated.
    pub fn from_file(file_name: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = file_name.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let data: RawExperimentConfig = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self {
            simulation: data.simulation.into(),
            aco: data.aco,
            pso: data.pso,
            hybrid: data.hybrid,
            fitness: data.fitness.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that parameter values are usable by the algorithms.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.runs == 0 {
            return Err(ConfigError::invalid("simulation.runs", "must be positive"));
        }
        if let NumericParam::Range { step: 0, .. } = sim.hosts {
            return Err(ConfigError::invalid("simulation.hosts", "range step must be positive"));
        }
        let hosts = sim.hosts.values();
        if hosts.is_empty() {
            return Err(ConfigError::invalid("simulation.hosts", "no host counts given"));
        }
        if sim.vms > 0 && hosts.contains(&0) {
            return Err(ConfigError::invalid("simulation.hosts", "host count must be positive"));
        }
        if sim.hosts_per_rack == 0 {
            return Err(ConfigError::invalid("simulation.hosts_per_rack", "must be positive"));
        }
        if !(0. ..=1.).contains(&sim.traffic_density) {
            return Err(ConfigError::invalid("simulation.traffic_density", "must be in [0, 1]"));
        }
        if !(sim.host_bandwidth > 0.) || sim.host_bandwidth.is_infinite() {
            return Err(ConfigError::invalid("simulation.host_bandwidth", "must be positive"));
        }

        if self.aco.ants == 0 {
            return Err(ConfigError::invalid("aco.ants", "must be positive"));
        }
        if !(0. ..=1.).contains(&self.aco.rho) {
            return Err(ConfigError::invalid("aco.rho", "must be in [0, 1]"));
        }
        if self.pso.population == 0 {
            return Err(ConfigError::invalid("pso.population", "must be positive"));
        }
        for (key, value) in [
            ("aco.alpha", self.aco.alpha),
            ("aco.beta", self.aco.beta),
            ("aco.q", self.aco.q),
            ("pso.w", self.pso.w),
            ("pso.c1", self.pso.c1),
            ("pso.c2", self.pso.c2),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::invalid(key, "must be finite"));
            }
        }

        let weights = &self.fitness.weights;
        for (key, weight) in [
            ("fitness.weights.power", weights.power),
            ("fitness.weights.load", weights.load),
            ("fitness.weights.network", weights.network),
            ("fitness.weights.link", weights.link),
        ] {
            if !(weight >= 0.) || weight.is_infinite() {
                return Err(ConfigError::invalid(key, "must be non-negative and finite"));
            }
        }
        let thresholds = &self.fitness.thresholds;
        if !(thresholds.cpu > 0.) {
            return Err(ConfigError::invalid("fitness.cpu_threshold", "must be positive"));
        }
        if !(thresholds.memory > 0.) {
            return Err(ConfigError::invalid("fitness.memory_threshold", "must be positive"));
        }
        Ok(())
    }
}
