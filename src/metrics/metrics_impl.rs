use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{SnapshotMetricsReadRecorder, SnapshotMetricsRecorder};

// ---------------------------------------------------------------------------
// SnapshotMetrics
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SnapshotMetrics {
    pub refresh_calls: u64,
    pub refreshes_completed: u64,
    pub refreshes_skipped: u64,
    pub records_copied: u64,
    pub duplicates_dropped: u64,
    pub sort_changes: u64,
    pub record_at_calls: MetricsCell,
    pub record_at_hits: MetricsCell,
    pub row_of_calls: MetricsCell,
    pub row_of_hits: MetricsCell,
}

impl SnapshotMetricsRecorder for SnapshotMetrics {
    fn record_refresh_call(&mut self) {
        self.refresh_calls += 1;
    }
    fn record_refresh_completed(&mut self, copied: usize) {
        self.refreshes_completed += 1;
        self.records_copied += copied as u64;
    }
    fn record_refresh_skipped(&mut self) {
        self.refreshes_skipped += 1;
    }
    fn record_duplicate_dropped(&mut self) {
        self.duplicates_dropped += 1;
    }
    fn record_sort_change(&mut self) {
        self.sort_changes += 1;
    }
}

impl SnapshotMetricsReadRecorder for SnapshotMetrics {
    fn record_record_at_call(&self) {
        self.record_at_calls.incr();
    }
    fn record_record_at_hit(&self) {
        self.record_at_hits.incr();
    }
    fn record_row_of_call(&self) {
        self.row_of_calls.incr();
    }
    fn record_row_of_hit(&self) {
        self.row_of_hits.incr();
    }
}
