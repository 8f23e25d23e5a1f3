//! Wire payload codecs for the controller/peer exchange.
//!
//! Two formats cross the shared-memory bridge:
//!
//! * telemetry (controller -> peer): newline-separated records
//!   `i j avgDelay bandwidth avgDropRate throughput`
//! * weight update (peer -> controller): `/`-terminated records `i j w`
//!
//! Weight-update parsing is fail-fast within a payload: the first malformed
//! record halts parsing, records before it stay applied.

use crate::types::{AdjMatrix, LinkState, NodeId, Weight};
use log::error;

/// One `(i, j, w)` record from a weight-update payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightUpdate {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: Weight,
}

/// Format one telemetry record for the directed edge `(i, j)`.
pub fn format_link_record(i: NodeId, j: NodeId, state: &LinkState) -> String {
    format!(
        "{} {} {} {} {} {}\n",
        i,
        j,
        state.avg_delay(),
        state.bandwidth,
        state.avg_drop_rate(),
        state.throughput,
    )
}

/// Build the full telemetry payload: one record per configured directed
/// edge of `adj`, in ascending `(i, j)` order.
pub fn encode_telemetry(adj: &AdjMatrix, link_states: &[Vec<LinkState>]) -> String {
    let mut payload = String::new();
    for (i, j, _) in adj.edges() {
        payload.push_str(&format_link_record(i, j, &link_states[i][j]));
    }
    payload
}

/// Encode `(i, j, w)` triples into a weight-update payload. Used by tests
/// and by peers driving the controller.
pub fn encode_weight_update(updates: &[WeightUpdate]) -> String {
    let mut payload = String::new();
    for u in updates {
        payload.push_str(&format!("{} {} {}/", u.from, u.to, u.weight));
    }
    payload
}

/// Outcome of parsing a weight-update payload: the records that parsed
/// before the first malformed one, and the malformed record itself if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeightUpdateParse {
    pub updates: Vec<WeightUpdate>,
    /// The record that halted parsing, when the payload was malformed.
    pub malformed: Option<String>,
}

/// Parse a weight-update payload.
///
/// Every record ends with `/`; text after the final `/` is not a record and
/// is ignored. Parsing stops at the first record that does not consist of
/// exactly three integer fields; earlier records are still returned (partial
/// application is the contract, there is no rollback).
pub fn parse_weight_update(data: &str) -> WeightUpdateParse {
    let mut records: Vec<&str> = data.split('/').collect();
    // The final split element is whatever trails the last '/'.
    records.pop();

    let mut parsed = WeightUpdateParse::default();
    for record in records {
        match parse_record(record) {
            Some(update) => parsed.updates.push(update),
            None => {
                error!("malformed weight-update record {record:?}, halting parse");
                parsed.malformed = Some(record.to_string());
                break;
            }
        }
    }
    parsed
}

fn parse_record(record: &str) -> Option<WeightUpdate> {
    let mut fields = record.split_whitespace();
    let from = fields.next()?.parse::<NodeId>().ok()?;
    let to = fields.next()?.parse::<NodeId>().ok()?;
    let weight = fields.next()?.parse::<Weight>().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(WeightUpdate { from, to, weight })
}
