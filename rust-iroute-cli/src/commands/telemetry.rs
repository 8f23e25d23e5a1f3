//! Telemetry command: print the payload the controller would publish.
//!
//! Counters are all zero without live traffic; this is a wire-format
//! inspector for the peer side.

use anyhow::Result;
use rust_iroute_control::Controller;

use crate::utils::build_topology;
use crate::TopologyArgs;

pub fn show_telemetry(topology: TopologyArgs) -> Result<()> {
    let topology = build_topology(&topology)?;
    let controller = Controller::new(topology);
    print!("{}", controller.collect_telemetry());
    Ok(())
}
