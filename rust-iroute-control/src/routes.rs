//! In-memory per-node static routing tables.
//!
//! Each node's table mixes two kinds of entries: directly-connected subnet
//! routes (destination `10.x.y.0`, installed once at connect time) and host
//! routes (destination is a node address, last octet non-zero, rebuilt on
//! every recomputation). The last octet is the distinguishing marker:
//! clearing keeps exactly the subnet entries.

use rust_iroute_common::types::InterfaceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// One forwarding entry: destination network or host, local egress
/// interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub dest: Ipv4Addr,
    pub iface: InterfaceId,
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via if{}", self.dest, self.iface)
    }
}

impl RouteEntry {
    /// Subnet entries end in `.0`; everything else is a host route.
    pub fn is_direct(&self) -> bool {
        self.dest.octets()[3] == 0
    }
}

/// Forwarding table of a single node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRoutes {
    entries: Vec<RouteEntry>,
}

impl NodeRoutes {
    pub fn add(&mut self, dest: Ipv4Addr, iface: InterfaceId) {
        self.entries.push(RouteEntry { dest, iface });
    }

    /// Drop every host route, keep the directly-connected subnet routes.
    pub fn clear_non_direct(&mut self) {
        self.entries.retain(RouteEntry::is_direct);
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_keeps_only_subnet_routes() {
        let mut routes = NodeRoutes::default();
        routes.add(Ipv4Addr::new(10, 0, 0, 0), 1);
        routes.add(Ipv4Addr::new(10, 0, 1, 2), 1);
        routes.add(Ipv4Addr::new(10, 0, 1, 0), 2);
        routes.add(Ipv4Addr::new(10, 0, 2, 1), 2);

        routes.clear_non_direct();

        let dests: Vec<Ipv4Addr> = routes.entries().iter().map(|e| e.dest).collect();
        assert_eq!(
            dests,
            vec![Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(10, 0, 1, 0)]
        );
    }

    #[test]
    fn entry_direct_marker() {
        let direct = RouteEntry {
            dest: Ipv4Addr::new(10, 0, 3, 0),
            iface: 1,
        };
        let host = RouteEntry {
            dest: Ipv4Addr::new(10, 0, 3, 2),
            iface: 1,
        };
        assert!(direct.is_direct());
        assert!(!host.is_direct());
        assert_eq!(host.to_string(), "10.0.3.2 via if1");
    }
}
