//! Implementations of VM placement algorithms.

pub mod ant_colony;
pub mod hybrid;
pub mod particle_swarm;
pub mod perturbation;
