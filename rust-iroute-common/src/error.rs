//! Error types for the intelligent-routing implementation.

use thiserror::Error;

/// All possible errors that can occur within the intelligent-routing core.
#[derive(Error, Debug)]
pub enum Error {
    /// A shared-memory region could not be created, sized, or mapped.
    /// Fatal to the bridge instance that hit it.
    #[error("shared memory mapping error: {0}")]
    Mapping(String),

    /// A control header or weight-update record did not parse. Non-fatal:
    /// the caller treats the input as zero-length or partially applied.
    #[error("protocol parse error: {0}")]
    ProtocolParse(String),

    /// The topology state was invalid for shortest-path computation
    /// (empty or non-square matrix, source out of range).
    #[error("route computation error: {0}")]
    RouteComputation(String),

    /// A write would exceed the capacity of a shared-memory region.
    #[error("buffer overflow: payload of {len} bytes exceeds region capacity {capacity}")]
    BufferOverflow { len: usize, capacity: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
