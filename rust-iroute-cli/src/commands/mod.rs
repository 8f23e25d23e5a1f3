//! Command implementations for the intelligent-routing CLI

pub mod routes;
pub mod run;
pub mod telemetry;
