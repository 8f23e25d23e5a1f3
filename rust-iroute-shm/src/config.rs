//! Bridge configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    BLOCK_SIZE, CONTROL_BLOCK_NAME, DATA_BLOCK_NAME, DEFAULT_COOLDOWN_MS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_START_DELAY_MS,
};

/// Tunables for one bridge instance.
///
/// Region names and sizes are a fixed contract with the peer; overriding
/// them is only useful for tests that want a private channel. The three
/// delays shape the turn-taking loop and may be tuned freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeOptions {
    /// Name of the payload region.
    pub data_name: String,

    /// Name of the header region.
    pub control_name: String,

    /// Capacity of each region in bytes.
    pub block_size: usize,

    /// Poll interval while awaiting the peer's response (milliseconds).
    pub poll_interval_ms: u64,

    /// Pause after consuming a response, before the next collection
    /// (milliseconds).
    pub cooldown_ms: u64,

    /// Delay before the first collection after start (milliseconds).
    pub start_delay_ms: u64,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            data_name: DATA_BLOCK_NAME.to_string(),
            control_name: CONTROL_BLOCK_NAME.to_string(),
            block_size: BLOCK_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            start_delay_ms: DEFAULT_START_DELAY_MS,
        }
    }
}

impl BridgeOptions {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}
