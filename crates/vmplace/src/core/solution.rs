//! Placement solution: VM-to-host mapping and its fitness.

use std::collections::BTreeMap;
use std::time::Duration;

/// Fitness of infeasible or not yet evaluated solutions.
pub const INFEASIBLE_FITNESS: f64 = f64::MAX;

/// Represents a (possibly partial) mapping of VMs to hosts along with its fitness.
///
/// VMs and hosts are referenced by their positions in the problem catalogs.
/// Lower fitness is better. Cloning a solution copies the whole mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    mapping: BTreeMap<usize, usize>,
    fitness: f64,
    duration: Duration,
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl Solution {
    /// Creates an empty solution with infeasible fitness.
    pub fn new() -> Self {
        Self {
            mapping: BTreeMap::new(),
            fitness: INFEASIBLE_FITNESS,
            duration: Duration::ZERO,
        }
    }

    pub fn from_mapping(mapping: BTreeMap<usize, usize>) -> Self {
        Self {
            mapping,
            ..Self::new()
        }
    }

    /// Builds a complete solution from a particle position, `position[vm]` is the host of `vm`.
    pub fn from_position(position: &[usize]) -> Self {
        Self::from_mapping(position.iter().copied().enumerate().collect())
    }

    /// Returns the particle position of this solution.
    ///
    /// Unassigned VMs are encoded as `-1`.
    pub fn position(&self, vm_count: usize) -> Vec<isize> {
        (0..vm_count)
            .map(|vm| self.host_of(vm).map_or(-1, |host| host as isize))
            .collect()
    }

    pub fn mapping(&self) -> &BTreeMap<usize, usize> {
        &self.mapping
    }

    /// Assigns VM to host, replacing its previous assignment.
    pub fn assign(&mut self, vm: usize, host: usize) {
        self.mapping.insert(vm, host);
    }

    pub fn host_of(&self, vm: usize) -> Option<usize> {
        self.mapping.get(&vm).copied()
    }

    /// Returns the number of assigned VMs.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    pub fn is_feasible(&self) -> bool {
        self.fitness != INFEASIBLE_FITNESS
    }

    /// Returns true if this solution has strictly lower fitness than `other`.
    pub fn is_better_than(&self, other: &Solution) -> bool {
        self.fitness < other.fitness
    }

    /// Returns the time reported for finding this solution.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }
}
