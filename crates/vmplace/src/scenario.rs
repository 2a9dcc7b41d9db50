//! Generation of synthetic placement scenarios.

use rand::prelude::*;
use rand_pcg::Pcg64;

use vmplace_models::power::cpu_models::linear::LinearCpuPowerModel;
use vmplace_models::power::host::HostPowerModel;

use crate::config::SimulationConfig;
use crate::core::host::Host;
use crate::core::network::NetworkModel;
use crate::core::problem::PlacementProblem;
use crate::core::vm::VirtualMachine;
use crate::error::PlacementError;

const HOST_CORES: u64 = 8;
const HOST_CORE_MIPS: u64 = 10000;
const HOST_MEMORY: u64 = 32768;
const HOST_BANDWIDTH: u64 = 100000;
const HOST_IDLE_POWER: f64 = 100.;
const HOST_MAX_POWER: f64 = 250.;

const VM_CORE_MIPS: u64 = 1000;
const VM_CORE_MIPS_SPREAD: u64 = 250;
const VM_MAX_CORES: u64 = 2;
const VM_MEMORY: u64 = 4096;
const VM_MEMORY_SPREAD: u64 = 512;
const VM_BANDWIDTH: u64 = 1000;
const VM_STORAGE: u64 = 10000;

/// Hops between hosts in the same rack.
pub const RACK_HOPS: u32 = 2;
/// Hops between hosts in different racks.
pub const CROSS_RACK_HOPS: u32 = 4;

/// Generates identical hosts, VMs with slightly varying demands and random traffic between them.
pub struct ScenarioGenerator {
    vm_count: usize,
    hosts_per_rack: usize,
    traffic_density: f64,
    max_traffic: u32,
    host_bandwidth: f64,
    rng: Pcg64,
}

impl ScenarioGenerator {
    pub fn new(config: &SimulationConfig, seed: u64) -> Self {
        Self {
            vm_count: config.vms,
            hosts_per_rack: config.hosts_per_rack.max(1),
            traffic_density: config.traffic_density.clamp(0., 1.),
            max_traffic: config.max_traffic.max(1),
            host_bandwidth: config.host_bandwidth,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Generates a scenario with the given number of hosts.
    pub fn generate(&mut self, host_count: usize) -> Result<PlacementProblem, PlacementError> {
        let hosts = Self::hosts(host_count);
        let vms = self.vms(self.vm_count);
        let traffic = self.traffic_matrix(self.vm_count);
        let hops = Self::hop_matrix(host_count, self.hosts_per_rack);
        PlacementProblem::new(vms, hosts, NetworkModel::new(traffic, hops, self.host_bandwidth))
    }

    pub fn hosts(count: usize) -> Vec<Host> {
        (0..count)
            .map(|id| {
                let power_model =
                    HostPowerModel::cpu_only(Box::new(LinearCpuPowerModel::new(HOST_IDLE_POWER, HOST_MAX_POWER)));
                Host::new(
                    id as u32,
                    &format!("h{}", id),
                    HOST_CORES * HOST_CORE_MIPS,
                    HOST_MEMORY,
                    HOST_BANDWIDTH,
                    power_model,
                )
            })
            .collect()
    }

    pub fn vms(&mut self, count: usize) -> Vec<VirtualMachine> {
        (0..count)
            .map(|id| {
                let core_mips = self
                    .rng
                    .gen_range(VM_CORE_MIPS - VM_CORE_MIPS_SPREAD..VM_CORE_MIPS + VM_CORE_MIPS_SPREAD);
                let memory = self
                    .rng
                    .gen_range(VM_MEMORY - VM_MEMORY_SPREAD..VM_MEMORY + VM_MEMORY_SPREAD);
                let cores = self.rng.gen_range(1..=VM_MAX_CORES);
                VirtualMachine::new(id as u32, core_mips * cores, memory, VM_BANDWIDTH, VM_STORAGE)
            })
            .collect()
    }

    /// Returns symmetric traffic matrix where each VM pair communicates with probability `traffic_density`.
    pub fn traffic_matrix(&mut self, vm_count: usize) -> Vec<Vec<u32>> {
        let mut traffic = vec![vec![0; vm_count]; vm_count];
        for i in 0..vm_count {
            for j in (i + 1)..vm_count {
                if self.rng.gen_bool(self.traffic_density) {
                    let volume = self.rng.gen_range(1..=self.max_traffic);
                    traffic[i][j] = volume;
                    traffic[j][i] = volume;
                }
            }
        }
        traffic
    }

    /// Returns hop counts between hosts grouped into racks of `hosts_per_rack` consecutive hosts.
    pub fn hop_matrix(host_count: usize, hosts_per_rack: usize) -> Vec<Vec<u32>> {
        let rack = |host: usize| host / hosts_per_rack.max(1);
        (0..host_count)
            .map(|a| {
                (0..host_count)
                    .map(|b| {
                        if a == b {
                            0
                        } else if rack(a) == rack(b) {
                            RACK_HOPS
                        } else {
                            CROSS_RACK_HOPS
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
