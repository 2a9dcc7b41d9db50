//! Network model of a placement scenario: VM traffic and host hop counts.

/// Read-only traffic and topology data of one scenario.
///
/// `traffic[i][j]` is the traffic volume between VMs `i` and `j`, `hops[a][b]` is the number of hops
/// between hosts `a` and `b`. Both matrices are symmetric with zero diagonal.
/// The traffic crossing a host network interface (in + out) is limited by `host_bandwidth`.
#[derive(Clone, Debug)]
pub struct NetworkModel {
    traffic: Vec<Vec<u32>>,
    hops: Vec<Vec<u32>>,
    host_bandwidth: f64,
    // (i, j, volume) for every VM pair i < j with non-zero traffic
    edges: Vec<(usize, usize, u32)>,
    peers: Vec<Vec<(usize, u32)>>,
}

impl NetworkModel {
    pub fn new(traffic: Vec<Vec<u32>>, hops: Vec<Vec<u32>>, host_bandwidth: f64) -> Self {
        let mut edges = Vec::new();
        let mut peers = vec![Vec::new(); traffic.len()];
        for i in 0..traffic.len() {
            for j in (i + 1)..traffic[i].len() {
                let volume = traffic[i][j];
                if volume > 0 {
                    edges.push((i, j, volume));
                    peers[i].push((j, volume));
                    if j < peers.len() {
                        peers[j].push((i, volume));
                    }
                }
            }
        }
        Self {
            traffic,
            hops,
            host_bandwidth,
            edges,
            peers,
        }
    }

    /// Creates a model without any VM traffic where all distinct hosts are `hops` apart.
    pub fn without_traffic(vm_count: usize, host_count: usize, hops: u32, host_bandwidth: f64) -> Self {
        let traffic = vec![vec![0; vm_count]; vm_count];
        let hops = (0..host_count)
            .map(|a| (0..host_count).map(|b| if a == b { 0 } else { hops }).collect())
            .collect();
        Self::new(traffic, hops, host_bandwidth)
    }

    pub fn traffic(&self, vm1: usize, vm2: usize) -> u32 {
        self.traffic[vm1][vm2]
    }

    pub fn hops(&self, host1: usize, host2: usize) -> u32 {
        self.hops[host1][host2]
    }

    pub fn host_bandwidth(&self) -> f64 {
        self.host_bandwidth
    }

    /// Returns all VM pairs `(i, j, volume)` with `i < j` exchanging non-zero traffic.
    pub fn traffic_edges(&self) -> &[(usize, usize, u32)] {
        &self.edges
    }

    /// Returns VMs exchanging non-zero traffic with the given VM along with the traffic volume.
    pub fn peers(&self, vm: usize) -> &[(usize, u32)] {
        &self.peers[vm]
    }

    pub(crate) fn traffic_matrix(&self) -> &[Vec<u32>] {
        &self.traffic
    }

    pub(crate) fn hop_matrix(&self) -> &[Vec<u32>] {
        &self.hops
    }
}
