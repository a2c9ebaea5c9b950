//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and export are separated into small traits so the
//! snapshot cache only ever writes counters and monitoring code only ever
//! reads them.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────┐     ┌─────────────────────────────┐
//!   │  SnapshotMetricsRecorder    │     │ SnapshotMetricsReadRecorder │
//!   │  (&mut self, refresh path)  │     │ (&self, lookup path)        │
//!   │  refresh call/completed/    │     │ record_at / row_of          │
//!   │  skipped, sort change       │     │ calls and hits              │
//!   └──────────────┬──────────────┘     └──────────────┬──────────────┘
//!                  └──────────────────┬────────────────┘
//!                                     ▼
//!                          ┌──────────────────────┐
//!                          │   SnapshotMetrics    │
//!                          └──────────┬───────────┘
//!                                     │ snapshot()
//!                  ┌──────────────────┴──────────────────┐
//!                  ▼                                     ▼
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters written by `refresh` and `set_sort` (exclusive access).
pub trait SnapshotMetricsRecorder {
    fn record_refresh_call(&mut self);
    fn record_refresh_completed(&mut self, copied: usize);
    fn record_refresh_skipped(&mut self);
    fn record_duplicate_dropped(&mut self);
    fn record_sort_change(&mut self);
}

/// Counters written by `&self` lookups (interior mutability).
///
/// Lookups may run concurrently under a shared read lock, so implementations
/// must tolerate parallel callers.
pub trait SnapshotMetricsReadRecorder {
    fn record_record_at_call(&self);
    fn record_record_at_hit(&self);
    fn record_row_of_call(&self);
    fn record_row_of_hit(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
