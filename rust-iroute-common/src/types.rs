//! Core types shared between the bridge, the controller, and the CLI.
//!
//! The weight matrix follows the external contract: `-1` means "no direct
//! link", any non-negative value is a link cost. The matrix is square, is
//! built once at topology-construction time, and is only mutated through
//! explicit weight updates afterwards.

use serde::{Deserialize, Serialize};

/// Node identifier, `0..N-1` within one topology.
pub type NodeId = usize;

/// Interface identifier local to one node. Index 0 is reserved (loopback);
/// egress interfaces count up from 1 in connection order.
pub type InterfaceId = u32;

/// Link weight (cost). Non-negative for a configured edge.
pub type Weight = i32;

/// Sentinel weight marking an absent edge in the adjacency matrix.
pub const NO_LINK: Weight = -1;

/// Square adjacency/weight matrix over `0..N-1`.
///
/// Edges are treated directionally: `set_weight` touches one ordered pair,
/// `set_symmetric` both. The diagonal is unused and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjMatrix {
    cells: Vec<Vec<Weight>>,
}

impl AdjMatrix {
    /// An `n x n` matrix with every edge absent.
    pub fn unconnected(n: usize) -> Self {
        Self {
            cells: vec![vec![NO_LINK; n]; n],
        }
    }

    /// Wrap an existing matrix. The caller is expected to hand in square
    /// data; `is_square` is how consumers validate before computing on it.
    pub fn from_rows(cells: Vec<Vec<Weight>>) -> Self {
        Self { cells }
    }

    pub fn node_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_square(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(|row| row.len() == self.cells.len())
    }

    pub fn weight(&self, i: NodeId, j: NodeId) -> Weight {
        self.cells[i][j]
    }

    pub fn has_edge(&self, i: NodeId, j: NodeId) -> bool {
        self.cells[i][j] != NO_LINK
    }

    /// Set the weight of the directed edge `i -> j`.
    pub fn set_weight(&mut self, i: NodeId, j: NodeId, w: Weight) {
        self.cells[i][j] = w;
    }

    /// Set the weight of both `i -> j` and `j -> i`.
    pub fn set_symmetric(&mut self, i: NodeId, j: NodeId, w: Weight) {
        self.cells[i][j] = w;
        self.cells[j][i] = w;
    }

    /// All configured directed edges `(i, j, w)` in ascending `(i, j)` order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, Weight)> + '_ {
        self.cells.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &w)| w != NO_LINK)
                .map(move |(j, &w)| (i, j, w))
        })
    }
}

/// Per-node map from directly-connected neighbor to local egress interface.
///
/// Supplied by the topology builder; read-only from the controller's side.
/// This is the join key between "next hop node id" and "local forwarding
/// action".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortMap {
    ports: Vec<Vec<(NodeId, InterfaceId)>>,
}

impl PortMap {
    pub fn new(n: usize) -> Self {
        Self {
            ports: vec![Vec::new(); n],
        }
    }

    /// Record that `node` reaches `neighbor` through local `iface`.
    pub fn record(&mut self, node: NodeId, neighbor: NodeId, iface: InterfaceId) {
        self.ports[node].push((neighbor, iface));
    }

    /// The local interface on `from` that reaches `to`, if they are
    /// directly connected.
    pub fn port(&self, from: NodeId, to: NodeId) -> Option<InterfaceId> {
        self.ports[from]
            .iter()
            .find(|(neighbor, _)| *neighbor == to)
            .map(|&(_, iface)| iface)
    }

    /// The neighbor reached through local `iface` on `node`.
    pub fn neighbor(&self, node: NodeId, iface: InterfaceId) -> Option<NodeId> {
        self.ports[node]
            .iter()
            .find(|(_, i)| *i == iface)
            .map(|&(neighbor, _)| neighbor)
    }

    pub fn node_count(&self) -> usize {
        self.ports.len()
    }
}

/// Cumulative counters for one directed edge `(i, j)`.
///
/// `drop_count` doubles as an in-flight counter: incremented on send,
/// decremented on the matching receive, so whatever remains is the number of
/// packets that never arrived. Values are monotonically cumulative; nothing
/// here resets them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkState {
    /// Packets sent on this directed edge.
    pub send_count: u64,
    /// Packets sent but not (yet) received.
    pub drop_count: i64,
    /// Configured link bandwidth in bits per second.
    pub bandwidth: u64,
    /// Cumulative received bytes.
    pub throughput: u64,
    /// Cumulative one-way delay in microseconds.
    pub delay_micros: i64,
    /// Timestamp (microseconds) of the most recent send.
    pub latest_send_micros: i64,
}

impl LinkState {
    /// Mean one-way delay per sent packet, 0 when nothing was sent.
    pub fn avg_delay(&self) -> f64 {
        if self.send_count == 0 {
            0.0
        } else {
            self.delay_micros as f64 / self.send_count as f64
        }
    }

    /// Fraction of sent packets still unaccounted for, 0 when nothing was
    /// sent.
    pub fn avg_drop_rate(&self) -> f64 {
        if self.send_count == 0 {
            0.0
        } else {
            self.drop_count as f64 / self.send_count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_edges_are_directional() {
        let mut adj = AdjMatrix::unconnected(3);
        adj.set_symmetric(0, 1, 4);
        adj.set_weight(1, 2, 7);

        assert!(adj.is_square());
        assert_eq!(adj.weight(0, 1), 4);
        assert_eq!(adj.weight(1, 0), 4);
        assert_eq!(adj.weight(1, 2), 7);
        assert_eq!(adj.weight(2, 1), NO_LINK);

        let edges: Vec<_> = adj.edges().collect();
        assert_eq!(edges, vec![(0, 1, 4), (1, 0, 4), (1, 2, 7)]);
    }

    #[test]
    fn non_square_matrix_is_rejected() {
        let adj = AdjMatrix::from_rows(vec![vec![NO_LINK, 1], vec![1]]);
        assert!(!adj.is_square());
        assert!(!AdjMatrix::from_rows(Vec::new()).is_square());
    }

    #[test]
    fn port_map_lookup_both_ways() {
        let mut ports = PortMap::new(2);
        ports.record(0, 1, 1);
        ports.record(1, 0, 1);

        assert_eq!(ports.port(0, 1), Some(1));
        assert_eq!(ports.port(1, 0), Some(1));
        assert_eq!(ports.port(0, 0), None);
        assert_eq!(ports.neighbor(0, 1), Some(1));
        assert_eq!(ports.neighbor(0, 2), None);
    }

    #[test]
    fn link_state_averages() {
        let state = LinkState {
            send_count: 4,
            drop_count: 1,
            delay_micros: 400,
            ..Default::default()
        };
        assert_eq!(state.avg_delay(), 100.0);
        assert_eq!(state.avg_drop_rate(), 0.25);

        let idle = LinkState::default();
        assert_eq!(idle.avg_delay(), 0.0);
        assert_eq!(idle.avg_drop_rate(), 0.0);
    }
}
