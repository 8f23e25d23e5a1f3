//! Metrics collection for the routing controller and the bridge.
//!
//! Plain atomic counters and gauges, cheap enough to bump from the hot
//! recompute path and cloneable into snapshots for reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/* ---------------------------------------------------------------- *
 * Counter
 * ---------------------------------------------------------------- */

#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Clone for Counter {
    fn clone(&self) -> Self {
        let c = Counter::new();
        c.value.store(self.value(), Ordering::Relaxed);
        c
    }
}

/* ---------------------------------------------------------------- *
 * Gauge
 * ---------------------------------------------------------------- */

#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Clone for Gauge {
    fn clone(&self) -> Self {
        let g = Gauge::new();
        g.set(self.value());
        g
    }
}

/* ---------------------------------------------------------------- *
 * Latency timer
 * ---------------------------------------------------------------- */

/// Tracks call count, cumulative and peak duration in microseconds.
#[derive(Debug, Default)]
pub struct LatencyTimer {
    count: AtomicU64,
    total_micros: AtomicU64,
    max_micros: AtomicU64,
}

impl LatencyTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation, returning the measured duration.
    pub fn observe_since(&self, start: Instant) -> Duration {
        let elapsed = start.elapsed();
        let micros = elapsed.as_micros() as u64;
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_micros.fetch_add(micros, Ordering::Relaxed);
        self.max_micros.fetch_max(micros, Ordering::Relaxed);
        elapsed
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn average_micros(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.total_micros.load(Ordering::Relaxed) as f64 / count as f64
        }
    }

    pub fn max_micros(&self) -> u64 {
        self.max_micros.load(Ordering::Relaxed)
    }
}

impl Clone for LatencyTimer {
    fn clone(&self) -> Self {
        Self {
            count: AtomicU64::new(self.count.load(Ordering::Relaxed)),
            total_micros: AtomicU64::new(self.total_micros.load(Ordering::Relaxed)),
            max_micros: AtomicU64::new(self.max_micros.load(Ordering::Relaxed)),
        }
    }
}

/* ---------------------------------------------------------------- *
 * Aggregate metrics for the routing core
 * ---------------------------------------------------------------- */

#[derive(Debug, Default, Clone)]
pub struct IrouteMetrics {
    // Controller
    pub route_recomputes: Counter,
    pub recompute_latency: LatencyTimer,
    pub routes_installed: Gauge,
    pub weight_updates_received: Counter,
    pub weight_records_applied: Counter,
    pub telemetry_reports: Counter,
    pub parse_errors: Counter,

    // Bridge
    pub bridge_polls: Counter,
    pub bridge_round_trips: Counter,
    pub bytes_sent: Counter,
    pub bytes_received: Counter,
}

impl IrouteMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}
