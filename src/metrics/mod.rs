//! Refresh and lookup counters for the snapshot cache (feature `metrics`).

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
