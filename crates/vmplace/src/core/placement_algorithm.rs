//! VM placement algorithms.

use crate::core::problem::PlacementProblem;
use crate::core::solution::Solution;
use crate::error::PlacementError;

/// Trait for implementation of VM placement algorithms.
///
/// The algorithm is defined as a function of placement problem, which returns the best found solution.
/// The returned solution can be infeasible, which is signalled by its fitness value rather than by an error.
/// Errors are returned only for structural problems such as invalid algorithm input.
///
/// Algorithms own their random generators, so repeated calls continue the same random sequence.
pub trait PlacementAlgorithm {
    fn name(&self) -> &str;
    fn solve(&mut self, problem: &PlacementProblem) -> Result<Solution, PlacementError>;
}
