//! Topology harness: nodes, links, addressing, port map and per-link
//! counters.
//!
//! Every connected pair gets its own /24 subnet under `10.x.y.0`; the two
//! endpoints take `.1` and `.2`, and a node's address is the first
//! interface address it was ever assigned. Local interface indices count up
//! from 1 per node (0 is reserved for loopback). All tables are fields of
//! the instance; nothing here is process-wide.

use log::warn;
use rust_iroute_common::types::{
    AdjMatrix, InterfaceId, LinkState, NodeId, PortMap, Weight,
};
use std::net::Ipv4Addr;

use crate::controller::NetworkView;
use crate::routes::NodeRoutes;

/// Bandwidth recorded for a link when the builder is not told otherwise,
/// in bits per second.
pub const DEFAULT_BANDWIDTH_BPS: u64 = 5_000_000;

/// A fully-owned network instance: graph, addressing, forwarding tables
/// and link counters.
#[derive(Debug, Clone)]
pub struct Topology {
    adj: AdjMatrix,
    ports: PortMap,
    node_addrs: Vec<Option<Ipv4Addr>>,
    next_iface: Vec<InterfaceId>,
    subnet_count: u32,
    link_states: Vec<Vec<LinkState>>,
    routes: Vec<NodeRoutes>,
}

impl Topology {
    /// `n` nodes, no links.
    pub fn new(n: usize) -> Self {
        Self {
            adj: AdjMatrix::unconnected(n),
            ports: PortMap::new(n),
            node_addrs: vec![None; n],
            next_iface: vec![1; n],
            subnet_count: 0,
            link_states: vec![vec![LinkState::default(); n]; n],
            routes: vec![NodeRoutes::default(); n],
        }
    }

    /// Connect `i` and `j` with weight 1.
    pub fn connect(&mut self, i: NodeId, j: NodeId) {
        self.connect_weighted(i, j, 1);
    }

    /// Connect `i` and `j`: allocate the link subnet, assign addresses,
    /// record the port map entries, install the direct subnet routes on
    /// both ends, and set the symmetric edge weight.
    pub fn connect_weighted(&mut self, i: NodeId, j: NodeId, w: Weight) {
        let n = self.node_count();
        if i >= n || j >= n || i == j {
            warn!("cannot connect node {i} and {j} in a {n}-node topology");
            return;
        }

        let subnet = self.next_subnet();
        let addr_i = addr_in(subnet, 1);
        let addr_j = addr_in(subnet, 2);
        self.node_addrs[i].get_or_insert(addr_i);
        self.node_addrs[j].get_or_insert(addr_j);

        let iface_i = self.next_iface[i];
        let iface_j = self.next_iface[j];
        self.next_iface[i] += 1;
        self.next_iface[j] += 1;
        self.ports.record(i, j, iface_i);
        self.ports.record(j, i, iface_j);

        // Directly-connected subnet routes survive every recomputation.
        self.routes[i].add(subnet, iface_i);
        self.routes[j].add(subnet, iface_j);

        self.link_states[i][j].bandwidth = DEFAULT_BANDWIDTH_BPS;
        self.link_states[j][i].bandwidth = DEFAULT_BANDWIDTH_BPS;

        self.adj.set_symmetric(i, j, w);
    }

    /// Build from `(i, j, w)` triples; the node count is one past the
    /// highest endpoint mentioned.
    pub fn from_edges(edges: &[(NodeId, NodeId, Weight)]) -> Self {
        let n = edges
            .iter()
            .map(|&(i, j, _)| i.max(j) + 1)
            .max()
            .unwrap_or(0);
        let mut topo = Self::new(n);
        for &(i, j, w) in edges {
            topo.connect_weighted(i, j, w);
        }
        topo
    }

    /// Rectangular grid of `n` nodes laid out `width` per row, each node
    /// linked to its right and lower neighbor.
    pub fn grid(n: usize, width: usize) -> Self {
        let mut topo = Self::new(n);
        for i in 0..n.saturating_sub(1) {
            if i + width < n {
                topo.connect(i, i + width);
            }
            if i % width + 1 < width {
                topo.connect(i, i + 1);
            }
        }
        topo
    }

    /// The 24-node GEANT2 reference topology, unit weights.
    pub fn geant2() -> Self {
        let links: [(NodeId, NodeId); 37] = [
            (0, 1), (0, 2), (1, 3), (1, 6), (1, 9), (2, 3), (2, 4), (3, 5),
            (3, 6), (4, 7), (5, 8), (6, 8), (6, 9), (7, 8), (7, 11), (8, 11),
            (8, 12), (8, 17), (8, 18), (8, 20), (9, 10), (9, 12), (9, 13),
            (10, 13), (11, 14), (11, 20), (12, 13), (12, 19), (12, 21),
            (14, 15), (15, 16), (16, 17), (17, 18), (18, 21), (19, 23),
            (21, 22), (22, 23),
        ];
        let mut topo = Self::new(24);
        for (i, j) in links {
            topo.connect(i, j);
        }
        topo
    }

    /// Override the recorded bandwidth of the link between `i` and `j`.
    pub fn set_bandwidth(&mut self, i: NodeId, j: NodeId, bps: u64) {
        self.link_states[i][j].bandwidth = bps;
        self.link_states[j][i].bandwidth = bps;
    }

    /// Transmit hook: `node` sent a packet out of local `iface` at
    /// `now_micros`. Bumps the directed edge toward the neighbor behind
    /// that interface; the drop counter goes up until the matching receive.
    pub fn on_send(&mut self, node: NodeId, iface: InterfaceId, now_micros: i64) {
        let Some(next) = self.ports.neighbor(node, iface) else {
            warn!("send on unknown interface {iface} of node {node}");
            return;
        };
        let state = &mut self.link_states[node][next];
        state.send_count += 1;
        state.drop_count += 1;
        state.latest_send_micros = now_micros;
    }

    /// Receive hook: `node` received `bytes` on local `iface` at
    /// `now_micros`. Settles the in-flight counter of the directed edge
    /// from the upstream neighbor and accumulates throughput and delay.
    pub fn on_receive(&mut self, node: NodeId, iface: InterfaceId, bytes: u64, now_micros: i64) {
        let Some(prev) = self.ports.neighbor(node, iface) else {
            warn!("receive on unknown interface {iface} of node {node}");
            return;
        };
        let state = &mut self.link_states[prev][node];
        state.drop_count -= 1;
        state.throughput += bytes;
        state.delay_micros += now_micros - state.latest_send_micros;
    }

    pub fn routes(&self, node: NodeId) -> &NodeRoutes {
        &self.routes[node]
    }

    pub fn ports(&self) -> &PortMap {
        &self.ports
    }

    /// One /24 per link: 10.x.y.0 with (x, y) counting links.
    fn next_subnet(&mut self) -> Ipv4Addr {
        let k = self.subnet_count;
        self.subnet_count += 1;
        Ipv4Addr::new(10, (k >> 8) as u8, (k & 0xff) as u8, 0)
    }
}

fn addr_in(subnet: Ipv4Addr, host: u8) -> Ipv4Addr {
    let [a, b, c, _] = subnet.octets();
    Ipv4Addr::new(a, b, c, host)
}

impl NetworkView for Topology {
    fn node_count(&self) -> usize {
        self.adj.node_count()
    }

    fn adjacency(&self) -> &AdjMatrix {
        &self.adj
    }

    fn port(&self, from: NodeId, to: NodeId) -> Option<InterfaceId> {
        self.ports.port(from, to)
    }

    fn link_states(&self) -> &[Vec<LinkState>] {
        &self.link_states
    }

    fn node_address(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.node_addrs[node]
    }

    fn install_host_route(&mut self, node: NodeId, dest: Ipv4Addr, iface: InterfaceId) {
        self.routes[node].add(dest, iface);
    }

    fn clear_non_direct_routes(&mut self, node: NodeId) {
        self.routes[node].clear_non_direct();
    }
}
