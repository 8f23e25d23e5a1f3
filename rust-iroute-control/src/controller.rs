//! The central controller.

use async_trait::async_trait;
use log::{debug, error, info};
use rust_iroute_common::metrics::IrouteMetrics;
use rust_iroute_common::payload::{encode_telemetry, parse_weight_update, WeightUpdate};
use rust_iroute_common::types::{AdjMatrix, InterfaceId, LinkState, NodeId};
use rust_iroute_common::{Error, Result};
use rust_iroute_shm::RoutingHooks;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// The collaborator surface the controller drives: topology lookups on the
/// read side, host-route installation on the write side.
pub trait NetworkView {
    fn node_count(&self) -> usize;

    /// The adjacency/weight snapshot the controller copies at construction.
    fn adjacency(&self) -> &AdjMatrix;

    /// Local egress interface on `from` toward the directly-connected `to`.
    fn port(&self, from: NodeId, to: NodeId) -> Option<InterfaceId>;

    /// Per-ordered-pair link counters.
    fn link_states(&self) -> &[Vec<LinkState>];

    /// The address identifying `node` as a host-route destination. `None`
    /// for a node that was never connected.
    fn node_address(&self, node: NodeId) -> Option<Ipv4Addr>;

    fn install_host_route(&mut self, node: NodeId, dest: Ipv4Addr, iface: InterfaceId);

    /// Remove every host route on `node`, keeping the directly-connected
    /// subnet routes.
    fn clear_non_direct_routes(&mut self, node: NodeId);
}

/// Owns the authoritative weight matrix and turns it into installed routes.
///
/// The matrix is copied out of the network view once at construction and
/// mutated only through `seed_weights` and `apply_weight_update`; edges are
/// updated symmetrically there but stored directionally, so asymmetric
/// weights survive if a view ever supplies them.
pub struct Controller<N: NetworkView> {
    net: N,
    adj: AdjMatrix,
    metrics: Arc<IrouteMetrics>,
}

impl<N: NetworkView> Controller<N> {
    pub fn new(net: N) -> Self {
        let adj = net.adjacency().clone();
        Self {
            net,
            adj,
            metrics: Arc::new(IrouteMetrics::new()),
        }
    }

    /// Overwrite matrix entries from `(i, j, w)` triples before the first
    /// computation.
    pub fn seed_weights(&mut self, seeds: &[WeightUpdate]) {
        let n = self.adj.node_count();
        for seed in seeds {
            if seed.from >= n || seed.to >= n {
                error!("seed ({}, {}) out of range, skipped", seed.from, seed.to);
                continue;
            }
            self.adj.set_symmetric(seed.from, seed.to, seed.weight);
        }
    }

    /// Single-source Dijkstra over the current weight matrix.
    pub fn compute_next_hops(&self, source: NodeId) -> Result<Vec<Option<NodeId>>> {
        crate::dijkstra::next_hops(&self.adj, source)
    }

    /// Clear and rebuild every node's host routes from fresh per-source
    /// next-hop trees.
    ///
    /// Fails (with no routes changed) when the matrix is unusable.
    /// Destinations with no reachable next hop, or whose hop has no mapped
    /// egress interface, are skipped silently.
    pub fn recompute_all_routes(&mut self) -> Result<()> {
        let n = self.adj.node_count();
        if n == 0 || !self.adj.is_square() {
            return Err(Error::RouteComputation(
                "adjacency matrix is not populated".into(),
            ));
        }

        let start = Instant::now();
        for node in 0..n {
            self.net.clear_non_direct_routes(node);
        }

        let mut installed: u64 = 0;
        for source in 0..n {
            let hops = self.compute_next_hops(source)?;
            for dest in 0..n {
                if dest == source {
                    continue;
                }
                let Some(hop) = hops[dest] else { continue };
                let Some(iface) = self.net.port(source, hop) else {
                    continue;
                };
                let Some(dest_addr) = self.net.node_address(dest) else {
                    continue;
                };
                self.net.install_host_route(source, dest_addr, iface);
                installed += 1;
            }
        }

        self.metrics.route_recomputes.increment();
        self.metrics.routes_installed.set(installed);
        let elapsed = self.metrics.recompute_latency.observe_since(start);
        info!(
            "recomputed routes for {n} nodes: {installed} host routes in {:?}",
            elapsed
        );
        Ok(())
    }

    /// Parse a weight-update payload, apply its records symmetrically, and
    /// recompute all routes.
    ///
    /// Parsing is fail-fast: the first malformed or out-of-range record
    /// halts the payload, records before it stay applied.
    pub fn apply_weight_update(&mut self, payload: &str) -> Result<()> {
        debug!("received weight update: {payload:?}");
        self.metrics.weight_updates_received.increment();

        let parsed = parse_weight_update(payload);
        if parsed.malformed.is_some() {
            self.metrics.parse_errors.increment();
        }

        let n = self.adj.node_count();
        let mut applied: u64 = 0;
        for update in &parsed.updates {
            if update.from >= n || update.to >= n {
                error!(
                    "weight update ({}, {}) out of range, halting apply",
                    update.from, update.to
                );
                self.metrics.parse_errors.increment();
                break;
            }
            self.adj.set_symmetric(update.from, update.to, update.weight);
            applied += 1;
        }
        self.metrics.weight_records_applied.add(applied);

        self.recompute_all_routes()
    }

    /// Build the telemetry payload: one line per configured directed edge.
    pub fn collect_telemetry(&self) -> String {
        self.metrics.telemetry_reports.increment();
        encode_telemetry(&self.adj, self.net.link_states())
    }

    pub fn adjacency(&self) -> &AdjMatrix {
        &self.adj
    }

    pub fn network(&self) -> &N {
        &self.net
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.net
    }

    pub fn metrics(&self) -> Arc<IrouteMetrics> {
        Arc::clone(&self.metrics)
    }
}

/// Adapter handing a controller to the bridge as its capability interface.
pub struct ControllerHooks<N: NetworkView> {
    inner: Arc<Mutex<Controller<N>>>,
}

impl<N: NetworkView> ControllerHooks<N> {
    pub fn new(controller: Controller<N>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    /// Shared handle for callers that want to poke the controller while
    /// the bridge owns the hooks.
    pub fn controller(&self) -> Arc<Mutex<Controller<N>>> {
        Arc::clone(&self.inner)
    }
}

impl<N: NetworkView> Clone for ControllerHooks<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<N: NetworkView + Send + 'static> RoutingHooks for ControllerHooks<N> {
    async fn collect_telemetry(&self) -> String {
        self.inner.lock().await.collect_telemetry()
    }

    async fn apply_update(&self, payload: String) {
        let mut controller = self.inner.lock().await;
        if let Err(e) = controller.apply_weight_update(&payload) {
            // A bad update leaves the previous routes installed.
            error!("weight update rejected: {e}");
        }
    }
}
