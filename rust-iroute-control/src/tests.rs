//! Scenario tests for the controller and the controller/bridge loop.

use crate::controller::{Controller, ControllerHooks, NetworkView};
use crate::topology::Topology;
use rust_iroute_shm::{BridgeOptions, ControlHeader, RoutingHooks, ShmBridge, ShmRegion, Tag};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// The 4-node diamond: 0-1 (1), 0-2 (1), 1-3 (2), 2-3 (1).
fn diamond() -> Topology {
    Topology::from_edges(&[(0, 1, 1), (0, 2, 1), (1, 3, 2), (2, 3, 1)])
}

fn host_route_iface(topo: &Topology, node: usize, dest_addr: Ipv4Addr) -> Option<u32> {
    topo.routes(node)
        .entries()
        .iter()
        .find(|e| e.dest == dest_addr)
        .map(|e| e.iface)
}

#[test]
fn recompute_installs_host_routes_next_to_direct_ones() {
    let mut controller = Controller::new(diamond());
    controller.recompute_all_routes().unwrap();

    let topo = controller.network();
    let addr_3 = topo.node_address(3).unwrap();

    // Node 0: two direct subnet routes plus one host route per other node.
    let entries = topo.routes(0).entries();
    assert_eq!(entries.iter().filter(|e| e.is_direct()).count(), 2);
    assert_eq!(entries.iter().filter(|e| !e.is_direct()).count(), 3);

    // 0 -> 3 goes via node 2 (cost 2 beats cost 3 via node 1); node 2 sits
    // behind interface 2 of node 0.
    assert_eq!(host_route_iface(topo, 0, addr_3), Some(2));
    assert_eq!(controller.metrics().routes_installed.value(), 12);
}

#[test]
fn recompute_is_idempotent() {
    let mut controller = Controller::new(diamond());
    controller.recompute_all_routes().unwrap();
    let first: Vec<_> = (0..4)
        .map(|n| controller.network().routes(n).clone())
        .collect();

    controller.recompute_all_routes().unwrap();
    let second: Vec<_> = (0..4)
        .map(|n| controller.network().routes(n).clone())
        .collect();

    assert_eq!(first, second);
    assert_eq!(controller.metrics().route_recomputes.value(), 2);
}

#[test]
fn weight_update_moves_traffic_off_the_degraded_link() {
    let mut controller = Controller::new(diamond());
    controller.recompute_all_routes().unwrap();

    let addr_3 = controller.network().node_address(3).unwrap();
    assert_eq!(host_route_iface(controller.network(), 0, addr_3), Some(2));

    // The peer degrades link 2-3; 0 -> 3 must switch to the branch via 1.
    controller.apply_weight_update("2 3 50/").unwrap();

    assert_eq!(controller.adjacency().weight(2, 3), 50);
    assert_eq!(controller.adjacency().weight(3, 2), 50);
    assert_eq!(host_route_iface(controller.network(), 0, addr_3), Some(1));
}

#[test]
fn malformed_update_applies_only_the_leading_records() {
    let mut controller = Controller::new(diamond());
    controller.apply_weight_update("0 1 5/2 x y/2 3 9/").unwrap();

    assert_eq!(controller.adjacency().weight(0, 1), 5);
    // The record after the malformed one never lands.
    assert_eq!(controller.adjacency().weight(2, 3), 1);
    assert_eq!(controller.metrics().weight_records_applied.value(), 1);
    assert_eq!(controller.metrics().parse_errors.value(), 1);
}

#[test]
fn out_of_range_update_halts_apply() {
    let mut controller = Controller::new(diamond());
    controller.apply_weight_update("0 1 7/0 9 3/2 3 9/").unwrap();

    assert_eq!(controller.adjacency().weight(0, 1), 7);
    assert_eq!(controller.adjacency().weight(2, 3), 1);
}

#[test]
fn telemetry_reports_averaged_link_state() {
    let mut topo = Topology::from_edges(&[(0, 1, 1)]);
    // Four sends on 0 -> 1, three matched receives 100us later each.
    for k in 0..4i64 {
        topo.on_send(0, 1, k * 1_000);
        if k < 3 {
            topo.on_receive(1, 1, 256, k * 1_000 + 100);
        }
    }
    // Settle the fourth send too, then leave a fifth one in flight:
    // send=5, drop=1, delay=400us total.
    topo.on_receive(1, 1, 0, 3 * 1_000 + 100);
    topo.on_send(0, 1, 4_000);

    let controller = Controller::new(topo);
    let payload = controller.collect_telemetry();
    let first_line = payload.lines().next().unwrap();
    let fields: Vec<&str> = first_line.split(' ').collect();

    assert_eq!(fields[0], "0");
    assert_eq!(fields[1], "1");
    assert_eq!(fields[2], "80"); // 400us over 5 sends
    assert_eq!(fields[4], "0.2"); // 1 in flight over 5 sends
}

#[test]
fn seeded_weights_override_the_snapshot() {
    use rust_iroute_common::payload::WeightUpdate;

    let mut controller = Controller::new(diamond());
    controller.seed_weights(&[WeightUpdate { from: 0, to: 2, weight: 10 }]);
    controller.recompute_all_routes().unwrap();

    let addr_3 = controller.network().node_address(3).unwrap();
    // With 0-2 at cost 10, 0 -> 3 prefers 0-1-3 at cost 3.
    assert_eq!(host_route_iface(controller.network(), 0, addr_3), Some(1));
}

#[test]
fn empty_topology_recompute_is_rejected() {
    let mut controller = Controller::new(Topology::new(0));
    assert!(controller.recompute_all_routes().is_err());
}

#[tokio::test]
async fn closed_loop_round_trip() {
    let options = BridgeOptions {
        data_name: "/iroute_test_loop_data".to_string(),
        control_name: "/iroute_test_loop_ctrl".to_string(),
        block_size: 1024,
        poll_interval_ms: 5,
        cooldown_ms: 50,
        start_delay_ms: 0,
    };

    let hooks = ControllerHooks::new(Controller::new(diamond()));
    let controller = hooks.controller();
    let bridge = ShmBridge::new(
        options.clone(),
        Arc::new(hooks) as Arc<dyn RoutingHooks>,
    )
    .unwrap();
    let bridge_task = tokio::spawn(async move { bridge.run().await });

    // Play the peer over independent region handles.
    let control = ShmRegion::create_or_open(&options.control_name, options.block_size).unwrap();
    let data = ShmRegion::create_or_open(&options.data_name, options.block_size).unwrap();

    let telemetry = timeout(Duration::from_secs(2), async {
        loop {
            sleep(Duration::from_millis(5)).await;
            let raw = control.read_string(11);
            if let Ok(header) = ControlHeader::parse(&raw) {
                if header.tag == Tag::Ai {
                    return data.read_string(header.len);
                }
            }
        }
    })
    .await
    .expect("no telemetry arrived");
    assert!(telemetry.starts_with("0 1 "));

    // Respond with a weight update, then wait for it to land.
    data.write(b"2 3 50/").unwrap();
    control
        .write(ControlHeader::new(Tag::Ns, 7).encode().as_bytes())
        .unwrap();

    timeout(Duration::from_secs(2), async {
        loop {
            sleep(Duration::from_millis(5)).await;
            if controller.lock().await.adjacency().weight(2, 3) == 50 {
                return;
            }
        }
    })
    .await
    .expect("weight update never applied");

    bridge_task.abort();
}
