//! Linear CPU power model.

use crate::power::cpu::CpuPowerModel;

/// Interpolates linearly between the idle power at zero utilization and the peak power at full utilization.
///
/// Utilization above 1.0 (overcommitted host) extrapolates the same line.
#[derive(Clone, Debug)]
pub struct LinearCpuPowerModel {
    idle_power: f64,
    peak_power: f64,
}

impl LinearCpuPowerModel {
    /// Creates a model drawing `idle_power` W when idle and `peak_power` W when fully loaded.
    pub fn new(idle_power: f64, peak_power: f64) -> Self {
        Self { idle_power, peak_power }
    }
}

impl CpuPowerModel for LinearCpuPowerModel {
    fn power(&self, utilization: f64) -> f64 {
        self.idle_power + (self.peak_power - self.idle_power) * utilization
    }
}
