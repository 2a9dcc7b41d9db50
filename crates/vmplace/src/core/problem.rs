//! Placement problem instance: VM and host catalogs with the network model.

use crate::core::host::Host;
use crate::core::network::NetworkModel;
use crate::core::vm::VirtualMachine;
use crate::error::PlacementError;

/// Immutable input of a solver run.
///
/// VMs and hosts are addressed by their position in the catalogs, which must match their IDs.
#[derive(Clone, Debug)]
pub struct PlacementProblem {
    vms: Vec<VirtualMachine>,
    hosts: Vec<Host>,
    network: NetworkModel,
}

impl PlacementProblem {
    /// Creates the problem checking that catalogs and matrices are consistent.
    pub fn new(vms: Vec<VirtualMachine>, hosts: Vec<Host>, network: NetworkModel) -> Result<Self, PlacementError> {
        for (i, vm) in vms.iter().enumerate() {
            if vm.id as usize != i {
                return Err(invalid(format!("VM at position {} has ID {}", i, vm.id)));
            }
        }
        for (i, host) in hosts.iter().enumerate() {
            if host.id as usize != i {
                return Err(invalid(format!("host at position {} has ID {}", i, host.id)));
            }
            if host.cpu_total == 0 || host.memory_total == 0 {
                return Err(invalid(format!("host {} has zero capacity", host.name)));
            }
        }
        if !vms.is_empty() && hosts.is_empty() {
            return Err(invalid("no hosts to place VMs on".to_string()));
        }
        check_square_matrix("traffic", network.traffic_matrix(), vms.len())?;
        check_square_matrix("hop count", network.hop_matrix(), hosts.len())?;
        let bandwidth = network.host_bandwidth();
        if !(bandwidth > 0.) || bandwidth.is_infinite() {
            return Err(invalid(format!("host bandwidth must be positive and finite, got {}", bandwidth)));
        }
        Ok(Self { vms, hosts, network })
    }

    pub fn vms(&self) -> &[VirtualMachine] {
        &self.vms
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn network(&self) -> &NetworkModel {
        &self.network
    }

    pub fn vm_count(&self) -> usize {
        self.vms.len()
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}

fn invalid(reason: String) -> PlacementError {
    PlacementError::InvalidProblem(reason)
}

fn check_square_matrix(name: &str, matrix: &[Vec<u32>], size: usize) -> Result<(), PlacementError> {
    if matrix.len() != size || matrix.iter().any(|row| row.len() != size) {
        return Err(invalid(format!("{} matrix must be {}x{}", name, size, size)));
    }
    for i in 0..size {
        if matrix[i][i] != 0 {
            return Err(invalid(format!("{} matrix has non-zero diagonal at {}", name, i)));
        }
        for j in (i + 1)..size {
            if matrix[i][j] != matrix[j][i] {
                return Err(invalid(format!("{} matrix is not symmetric at ({}, {})", name, i, j)));
            }
        }
    }
    Ok(())
}
