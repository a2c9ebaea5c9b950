/// Point-in-time copy of the snapshot cache's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotMetricsSnapshot {
    pub refresh_calls: u64,
    pub refreshes_completed: u64,
    pub refreshes_skipped: u64, // registry busy at try-acquire
    pub records_copied: u64,
    pub duplicates_dropped: u64,
    pub sort_changes: u64,

    pub record_at_calls: u64,
    pub record_at_hits: u64,
    pub row_of_calls: u64,
    pub row_of_hits: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub generation: u64,
}
