//! Shared-memory bridge between the routing controller and an external
//! decision-making peer (e.g. a learning agent).
//!
//! Two fixed-size POSIX shared-memory regions form a duplex channel: the
//! `data` block carries the raw payload bytes, the `control` block carries
//! an 11-byte ASCII header `"<tag>/<8-digit-length>"` naming who wrote the
//! data block last. The bridge writes telemetry under the `ai` tag, then
//! polls until the peer answers under the `ns` tag, hands the decoded
//! weight-update payload to the controller, and cools down before the next
//! collection round.

mod bridge;
mod config;
mod header;
mod shm;

pub use bridge::{BridgeState, RoutingHooks, ShmBridge};
pub use config::BridgeOptions;
pub use header::{ControlHeader, Tag};
pub use shm::ShmRegion;

/// Name of the payload region shared with the peer.
pub const DATA_BLOCK_NAME: &str = "/data_memory";

/// Name of the header region shared with the peer.
pub const CONTROL_BLOCK_NAME: &str = "/control_memory";

/// Capacity of each region in bytes.
pub const BLOCK_SIZE: usize = 1024;

/// Exact length of a control header: 2-byte tag, `/`, 8 digits.
pub const CONTROL_HEADER_LEN: usize = 11;

/// How often the bridge re-reads the control block while awaiting the peer.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Pause between consuming a peer response and the next telemetry round.
pub const DEFAULT_COOLDOWN_MS: u64 = 2_000;

/// Delay between bridge start and the first telemetry collection.
pub const DEFAULT_START_DELAY_MS: u64 = 500;
