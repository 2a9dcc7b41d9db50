//! Representation of physical host.

use vmplace_models::power::host::HostPowerModel;

/// Represents physical host, the target of VM placement.
///
/// Host ID is also its position in the host catalog and indexes the hop count matrix.
#[derive(Clone)]
pub struct Host {
    pub id: u32,
    pub name: String,
    /// CPU capacity in MIPS.
    pub cpu_total: u64,
    /// Memory capacity in MB.
    pub memory_total: u64,
    pub bandwidth: u64,
    power_model: HostPowerModel,
}

impl Host {
    pub fn new(
        id: u32,
        name: &str,
        cpu_total: u64,
        memory_total: u64,
        bandwidth: u64,
        power_model: HostPowerModel,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            cpu_total,
            memory_total,
            bandwidth,
            power_model,
        }
    }

    /// Returns host power consumption in W at the given CPU utilization.
    pub fn power(&self, cpu_util: f64) -> f64 {
        self.power_model.power(cpu_util)
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("cpu_total", &self.cpu_total)
            .field("memory_total", &self.memory_total)
            .field("bandwidth", &self.bandwidth)
            .finish()
    }
}
