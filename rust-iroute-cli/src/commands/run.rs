//! Run command: the closed control loop against the external peer.

use anyhow::{Context, Result};
use log::info;
use rust_iroute_control::{Controller, ControllerHooks, NetworkView};
use rust_iroute_shm::{BridgeOptions, RoutingHooks, ShmBridge};
use std::sync::Arc;

use crate::utils::build_topology;
use crate::TopologyArgs;

/// Install the initial routes, then hand the controller to the bridge and
/// poll/respond until interrupted.
pub async fn run_loop(
    topology: TopologyArgs,
    poll_interval: u64,
    cooldown: u64,
    start_delay: u64,
) -> Result<()> {
    let topology = build_topology(&topology)?;
    info!("topology ready: {} nodes", topology.node_count());

    let mut controller = Controller::new(topology);
    controller
        .recompute_all_routes()
        .context("initial route computation failed")?;

    let options = BridgeOptions {
        poll_interval_ms: poll_interval,
        cooldown_ms: cooldown,
        start_delay_ms: start_delay,
        ..BridgeOptions::default()
    };
    let hooks = ControllerHooks::new(controller);
    let bridge = ShmBridge::new(options, Arc::new(hooks) as Arc<dyn RoutingHooks>)
        .context("cannot map the shared-memory channel")?;

    info!("bridge up, entering the telemetry/update loop (ctrl-c to stop)");
    tokio::select! {
        result = bridge.run() => result.context("bridge loop failed")?,
        _ = tokio::signal::ctrl_c() => {
            let metrics = bridge.metrics();
            info!(
                "stopping after {} round trips ({} polls)",
                metrics.bridge_round_trips.value(),
                metrics.bridge_polls.value(),
            );
        }
    }

    Ok(())
}
