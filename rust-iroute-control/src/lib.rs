//! Central routing controller.
//!
//! Owns the authoritative edge-weight matrix of the network, recomputes
//! per-source shortest-path next hops with Dijkstra, installs host routes
//! through the network collaborator, and produces/consumes the telemetry
//! and weight-update payloads exchanged over the shared-memory bridge.

pub mod controller;
pub mod dijkstra;
pub mod routes;
pub mod topology;

#[cfg(test)]
mod tests;

pub use controller::{Controller, ControllerHooks, NetworkView};
pub use routes::{NodeRoutes, RouteEntry};
pub use topology::Topology;
