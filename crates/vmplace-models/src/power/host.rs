//! Host power model.

use crate::power::cpu::CpuPowerModel;
use crate::power::cpu_models::constant::ConstantCpuPowerModel;

/// Estimates the power draw of a physical host from its CPU utilization.
#[derive(Clone)]
pub struct HostPowerModel {
    cpu: Box<dyn CpuPowerModel>,
}

impl HostPowerModel {
    /// Creates a model driven by the CPU curve only.
    pub fn cpu_only(cpu: Box<dyn CpuPowerModel>) -> Self {
        Self { cpu }
    }

    /// Returns host power draw in W at the given CPU utilization.
    pub fn power(&self, cpu_utilization: f64) -> f64 {
        self.cpu.power(cpu_utilization)
    }
}

impl Default for HostPowerModel {
    fn default() -> Self {
        Self::cpu_only(Box::new(ConstantCpuPowerModel::new(0.)))
    }
}
