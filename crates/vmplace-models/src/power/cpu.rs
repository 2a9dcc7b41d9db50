//! CPU power model trait.

use dyn_clone::{clone_trait_object, DynClone};

/// Maps CPU utilization of a host to its power draw in W.
///
/// Utilization is a fraction of the host CPU capacity, normally in 0.0-1.0 range.
/// Models are `Send + Sync` so that hosts carrying them can be moved to worker threads.
pub trait CpuPowerModel: DynClone + Send + Sync {
    /// Returns power draw in W at the given utilization.
    fn power(&self, utilization: f64) -> f64;
}

clone_trait_object!(CpuPowerModel);
