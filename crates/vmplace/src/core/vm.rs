//! Representation of virtual machine.

use serde::Serialize;

/// Represents virtual machine (VM), the unit of workload placed onto hosts.
///
// VM is characterized by its ID and resource requirements. The ID is also the VM position in the catalog,
// it indexes the traffic matrix and placement mappings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VirtualMachine {
    pub id: u32,
    /// Required CPU rate in MIPS.
    pub cpu_usage: u64,
    /// Required memory in MB.
    pub memory_usage: u64,
    pub bandwidth: u64,
    /// Required storage in MB.
    pub storage: u64,
}

impl VirtualMachine {
    /// Creates virtual machine with specified parameters.
    pub fn new(id: u32, cpu_usage: u64, memory_usage: u64, bandwidth: u64, storage: u64) -> Self {
        Self {
            id,
            cpu_usage,
            memory_usage,
            bandwidth,
            storage,
        }
    }
}
