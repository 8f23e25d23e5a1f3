//! The turn-taking bridge loop.
//!
//! One round: collect telemetry from the hooks, write it to the data block
//! under an `ai` header, poll the control block until the peer flips the
//! tag to `ns`, hand the response payload back through the hooks, cool
//! down, repeat. There is no timeout for a peer that never responds; the
//! poll runs until the process is torn down.

use async_trait::async_trait;
use log::{debug, error, info};
use rust_iroute_common::metrics::IrouteMetrics;
use rust_iroute_common::Result;
use std::sync::Arc;
use tokio::time::sleep;

use crate::{
    config::BridgeOptions,
    header::{ControlHeader, Tag},
    shm::ShmRegion,
    CONTROL_HEADER_LEN,
};

/// Capability interface the bridge drives.
///
/// Implemented by whatever owns the topology; the bridge knows nothing
/// about routing beyond these two calls.
#[async_trait]
pub trait RoutingHooks: Send + Sync {
    /// Produce the telemetry payload for the current collection round.
    async fn collect_telemetry(&self) -> String;

    /// Consume a weight-update payload received from the peer.
    async fn apply_update(&self, payload: String);
}

/// The two states of the bridge loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Telemetry is out; polling the control block for the peer's `ns` tag.
    AwaitingPeer,
    /// Response consumed; waiting out the cooldown before collecting again.
    Cooldown,
}

/// Duplex shared-memory channel to the external decision peer.
pub struct ShmBridge {
    options: BridgeOptions,
    data: ShmRegion,
    control: ShmRegion,
    hooks: Arc<dyn RoutingHooks>,
    metrics: Arc<IrouteMetrics>,
}

impl ShmBridge {
    /// Open (or create) both regions and wire up the hooks. Fails with
    /// `Error::Mapping` if either region cannot be mapped; a bridge that
    /// failed construction holds no resources.
    pub fn new(options: BridgeOptions, hooks: Arc<dyn RoutingHooks>) -> Result<Self> {
        let data = ShmRegion::create_or_open(&options.data_name, options.block_size)?;
        let control = ShmRegion::create_or_open(&options.control_name, options.block_size)?;
        // A header left over from a previous run must not be read as a
        // fresh peer response.
        control.clear();
        data.clear();
        info!(
            "bridge mapped {} and {} ({} B each)",
            options.data_name, options.control_name, options.block_size
        );
        Ok(Self {
            options,
            data,
            control,
            hooks,
            metrics: Arc::new(IrouteMetrics::new()),
        })
    }

    pub fn metrics(&self) -> Arc<IrouteMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Drive the loop forever: start delay, then collect / await / cooldown
    /// rounds until the task is dropped.
    pub async fn run(&self) -> Result<()> {
        sleep(self.options.start_delay()).await;
        loop {
            self.collect_and_send().await?;
            self.await_peer_response().await;
            debug!("state -> {:?}", BridgeState::Cooldown);
            sleep(self.options.cooldown()).await;
        }
    }

    /// Collect one telemetry payload and publish it under an `ai` header.
    pub async fn collect_and_send(&self) -> Result<()> {
        let payload = self.hooks.collect_telemetry().await;
        self.data.write(payload.as_bytes())?;
        let header = ControlHeader::new(Tag::Ai, payload.len()).encode();
        self.control.write(header.as_bytes())?;
        self.metrics.bytes_sent.add(payload.len() as u64);
        debug!(
            "sent {} B of telemetry, state -> {:?}",
            payload.len(),
            BridgeState::AwaitingPeer
        );
        Ok(())
    }

    /// Poll the control block until the peer's `ns` header shows up, then
    /// read the announced number of payload bytes and hand them to the
    /// hooks. Malformed headers are logged and treated as "not yet".
    pub async fn await_peer_response(&self) {
        loop {
            sleep(self.options.poll_interval()).await;
            self.metrics.bridge_polls.increment();

            let raw = self.control.read_string(CONTROL_HEADER_LEN);
            let Some(header) = ControlHeader::parse_lossy(&raw) else {
                continue;
            };
            if header.tag != Tag::Ns {
                continue;
            }

            let payload = self.data.read_string(header.len);
            self.metrics.bytes_received.add(payload.len() as u64);
            self.metrics.bridge_round_trips.increment();
            if payload.len() < header.len {
                // Short read: the payload had an embedded NUL or the header
                // over-announced. Proceed with what was actually there.
                error!(
                    "peer announced {} B but {} were readable",
                    header.len,
                    payload.len()
                );
            }
            self.hooks.apply_update(payload).await;
            return;
        }
    }
}
