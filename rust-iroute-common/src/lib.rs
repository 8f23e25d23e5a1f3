//! Common types and utilities for the intelligent-routing controller.
//!
//! This crate provides the shared vocabulary used by the shared-memory
//! bridge, the routing controller, and the command-line front end: node and
//! interface identifiers, the adjacency/weight matrix, per-link counters,
//! the wire payload codecs, and the error taxonomy.

pub mod error;
pub mod metrics;
pub mod payload;
pub mod types;

/// Reexport of common types
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
