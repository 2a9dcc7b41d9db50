//! Constant CPU power model.

use crate::power::cpu::CpuPowerModel;

/// Draws the same power regardless of utilization.
#[derive(Clone, Debug)]
pub struct ConstantCpuPowerModel {
    watts: f64,
}

impl ConstantCpuPowerModel {
    /// Creates a model drawing `watts` at any utilization.
    pub fn new(watts: f64) -> Self {
        Self { watts }
    }
}

impl CpuPowerModel for ConstantCpuPowerModel {
    fn power(&self, _utilization: f64) -> f64 {
        self.watts
    }
}
