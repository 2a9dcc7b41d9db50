//! Errors raised by configuration loading and solver runs.
//!
//! Infeasible placements are not errors: they are represented by the maximal fitness value
//! and flow through the solvers as regular data.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problem detected before any solver starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("can't parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value of `{key}`: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Structural failure which aborts the solver run or experiment that triggered it.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("invalid placement problem: {0}")]
    InvalidProblem(String),
    #[error("initial swarm can't be empty")]
    EmptySwarm,
    #[error("{0} experiment run(s) panicked")]
    RunPanicked(usize),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
