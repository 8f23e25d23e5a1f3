//! Routes command: one-shot recompute and routing-table dump.

use anyhow::{Context, Result};
use rust_iroute_control::{Controller, NetworkView};

use crate::utils::build_topology;
use crate::TopologyArgs;

pub fn show_routes(topology: TopologyArgs, source: Option<usize>) -> Result<()> {
    let topology = build_topology(&topology)?;
    let mut controller = Controller::new(topology);
    controller
        .recompute_all_routes()
        .context("route computation failed")?;

    for node in 0..controller.network().node_count() {
        println!("node: {}", node);
        for entry in controller.network().routes(node).entries() {
            let kind = if entry.is_direct() { "direct" } else { "host" };
            println!("  route: {} ({})", entry, kind);
        }
    }

    if let Some(source) = source {
        let hops = controller
            .compute_next_hops(source)
            .context("next-hop computation failed")?;
        println!("next hops from node {}:", source);
        for (dest, hop) in hops.iter().enumerate() {
            match hop {
                Some(hop) => println!("  {} -> via {}", dest, hop),
                None if dest == source => {}
                None => println!("  {} -> unreachable", dest),
            }
        }
    }

    Ok(())
}
