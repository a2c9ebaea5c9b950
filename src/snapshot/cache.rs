//! Non-blocking snapshot cache over a live connection registry.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                        SnapshotCache<R> Layout                           │
//! │                                                                          │
//! │   registry: R ──────────► ConnectionRegistry (shared with writers)       │
//! │   policy:   SortPolicy    column + order                                 │
//! │   generation: u64         successful refreshes so far                    │
//! │                                                                          │
//! │   snapshot: Snapshot ─┬── records: Vec<PeerRecord>   row order           │
//! │                       └── index:   RowIndex          node_id → row       │
//! │                                                                          │
//! │   records and index only ever change together, by replacing `snapshot`. │
//! └──────────────────────────────────────────────────────────────────────────┘
//!
//! Refresh Flow
//! ────────────
//!
//!   refresh():
//!     1. try_read_peers()  ── None ──► Skipped (no state change, no wait)
//!     2. copy_stats() for every peer into a fresh Vec
//!     3. drop the registry guard
//!     4. drop repeated ids, stable-sort by policy, build RowIndex
//!     5. snapshot = new snapshot; generation += 1
//!     6. Refreshed
//! ```
//!
//! ## States
//!
//! | State       | Meaning                                  | Leaves on            |
//! |-------------|------------------------------------------|----------------------|
//! | `Stale`     | no successful refresh yet, no records    | first `Refreshed`    |
//! | `Populated` | at least one successful refresh          | never                |
//!
//! Skipped refreshes never change state. There is no terminal state.
//!
//! ## Thread Safety
//!
//! `refresh` and `set_sort` take `&mut self`, so callers are serialized by
//! ownership. Lookups take `&self` and can run in parallel between
//! refreshes. For shared use across threads see
//! [`ConcurrentPeerTable`](crate::refresh::ConcurrentPeerTable).
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use peertable::policy::sort::SortOrder;
//! use peertable::record::{PeerColumn, PeerRecord};
//! use peertable::registry::LockedRegistry;
//! use peertable::snapshot::SnapshotCache;
//!
//! let registry = Arc::new(LockedRegistry::with_peers(vec![
//!     PeerRecord::new(1, "b", "/x/"),
//!     PeerRecord::new(2, "a", "/x/"),
//! ]));
//! let mut cache = SnapshotCache::new(Arc::clone(&registry));
//!
//! assert!(cache.set_sort(Some(PeerColumn::Address), SortOrder::Ascending).is_refreshed());
//! assert_eq!(cache.row_of(2), Some(0));
//! assert_eq!(cache.record_at(1).map(|p| p.node_id), Some(1));
//! ```

use tracing::{debug, trace, warn};

use crate::error::InvariantError;
use crate::policy::sort::{SortOrder, SortPolicy};
use crate::record::{NodeId, PeerColumn, PeerRecord};
use crate::snapshot::frame::Snapshot;
use crate::traits::{ConnectionRegistry, PeerStats};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::SnapshotMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::SnapshotMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    MetricsSnapshotProvider, SnapshotMetricsReadRecorder, SnapshotMetricsRecorder,
};

/// Result of a refresh attempt.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot replaced the previous one.
    Refreshed,
    /// The registry was busy; the previous snapshot is still current.
    Skipped,
}

impl RefreshOutcome {
    /// `true` for [`RefreshOutcome::Refreshed`].
    #[inline]
    pub fn is_refreshed(self) -> bool {
        matches!(self, RefreshOutcome::Refreshed)
    }
}

/// Observable lifecycle state of a [`SnapshotCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No successful refresh yet.
    Stale,
    /// At least one successful refresh.
    Populated,
}

/// Ordered, indexed copy of a registry's peers.
///
/// # Example
///
/// ```
/// use peertable::record::PeerRecord;
/// use peertable::registry::LockedRegistry;
/// use peertable::snapshot::{CacheState, RefreshOutcome, SnapshotCache};
///
/// let registry = LockedRegistry::with_peers(vec![PeerRecord::new(3, "a", "/x/")]);
/// let mut cache = SnapshotCache::new(&registry);
/// assert_eq!(cache.state(), CacheState::Stale);
///
/// let busy = registry.write();
/// assert_eq!(cache.refresh(), RefreshOutcome::Skipped);
/// drop(busy);
///
/// assert_eq!(cache.refresh(), RefreshOutcome::Refreshed);
/// assert_eq!(cache.state(), CacheState::Populated);
/// assert_eq!(cache.row_of(3), Some(0));
/// ```
#[derive(Debug)]
pub struct SnapshotCache<R> {
    registry: R,
    snapshot: Snapshot,
    policy: SortPolicy,
    generation: u64,
    #[cfg(feature = "metrics")]
    metrics: SnapshotMetrics,
}

impl<R: ConnectionRegistry> SnapshotCache<R> {
    /// Creates an unsorted, stale cache over `registry`.
    ///
    /// No refresh is attempted; call [`refresh`](Self::refresh) to load.
    pub fn new(registry: R) -> Self {
        Self::with_sort(registry, SortPolicy::UNSORTED)
    }

    /// Creates a stale cache that sorts with `policy` once populated.
    pub fn with_sort(registry: R, policy: SortPolicy) -> Self {
        Self {
            registry,
            snapshot: Snapshot::empty(),
            policy,
            generation: 0,
            #[cfg(feature = "metrics")]
            metrics: SnapshotMetrics::default(),
        }
    }

    /// Pulls a fresh copy of every peer from the registry.
    ///
    /// Never blocks: if the registry cannot be read right now, returns
    /// [`RefreshOutcome::Skipped`] and leaves the current snapshot untouched.
    /// The next scheduled refresh simply tries again.
    pub fn refresh(&mut self) -> RefreshOutcome {
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_refresh_call();
        }

        let copied: Vec<PeerRecord> = {
            let Some(peers) = self.registry.try_read_peers() else {
                trace!(generation = self.generation, "registry busy, refresh skipped");
                #[cfg(feature = "metrics")]
                {
                    self.metrics.record_refresh_skipped();
                }
                return RefreshOutcome::Skipped;
            };
            peers.iter().map(|peer| peer.copy_stats()).collect()
        };
        #[cfg(feature = "metrics")]
        let copied_len = copied.len();

        let (snapshot, dropped) = Snapshot::build(copied, self.policy);
        if dropped > 0 {
            warn!(dropped, "registry reported duplicate node ids, later entries dropped");
            #[cfg(feature = "metrics")]
            {
                for _ in 0..dropped {
                    self.metrics.record_duplicate_dropped();
                }
            }
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_refresh_completed(copied_len);
        }

        self.snapshot = snapshot;
        self.generation += 1;
        debug!(
            peers = self.snapshot.len(),
            column = ?self.policy.column(),
            order = ?self.policy.order(),
            generation = self.generation,
            "peer snapshot refreshed"
        );
        RefreshOutcome::Refreshed
    }

    /// Changes the sort column and direction, then refreshes immediately.
    ///
    /// `column == None` restores registry order. The refresh refetches from
    /// the registry rather than re-sorting the cached rows, so it also picks
    /// up any connection changes since the last pass. If the registry is
    /// busy the new policy is kept and applied on the next refresh.
    pub fn set_sort(&mut self, column: Option<PeerColumn>, order: SortOrder) -> RefreshOutcome {
        self.set_sort_policy(SortPolicy::new(column, order))
    }

    /// Replaces the sort policy, then refreshes immediately.
    pub fn set_sort_policy(&mut self, policy: SortPolicy) -> RefreshOutcome {
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_sort_change();
        }

        self.policy = policy;
        self.refresh()
    }
}

impl<R> SnapshotCache<R> {
    /// Number of cached records. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Returns `true` if the snapshot holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Record at `row`, `None` when `row >= len()`.
    pub fn record_at(&self, row: usize) -> Option<&PeerRecord> {
        let record = self.snapshot.record_at(row);

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_record_at_call();
            if record.is_some() {
                self.metrics.record_record_at_hit();
            }
        }

        record
    }

    /// Row of `node_id` in the current snapshot. O(1).
    ///
    /// `None` if the peer has disconnected or was never seen.
    pub fn row_of(&self, node_id: NodeId) -> Option<usize> {
        let row = self.snapshot.row_of(node_id);

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_row_of_call();
            if row.is_some() {
                self.metrics.record_row_of_hit();
            }
        }

        row
    }

    /// Records in row order.
    #[inline]
    pub fn records(&self) -> &[PeerRecord] {
        self.snapshot.records()
    }

    /// The current `(records, index)` pair.
    #[inline]
    pub fn current(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The active sort policy.
    #[inline]
    pub fn sort_policy(&self) -> SortPolicy {
        self.policy
    }

    /// Number of successful refreshes so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Lifecycle state.
    #[inline]
    pub fn state(&self) -> CacheState {
        if self.generation == 0 {
            CacheState::Stale
        } else {
            CacheState::Populated
        }
    }

    /// The registry this cache reads from.
    #[inline]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Verifies snapshot consistency.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.generation == 0 && !self.snapshot.is_empty() {
            return Err(InvariantError::new("stale cache holds records"));
        }
        self.snapshot.check_invariants()
    }
}

#[cfg(feature = "metrics")]
impl<R> SnapshotCache<R> {
    /// Returns a snapshot of cache metrics.
    pub fn metrics_snapshot(&self) -> SnapshotMetricsSnapshot {
        SnapshotMetricsSnapshot {
            refresh_calls: self.metrics.refresh_calls,
            refreshes_completed: self.metrics.refreshes_completed,
            refreshes_skipped: self.metrics.refreshes_skipped,
            records_copied: self.metrics.records_copied,
            duplicates_dropped: self.metrics.duplicates_dropped,
            sort_changes: self.metrics.sort_changes,
            record_at_calls: self.metrics.record_at_calls.get(),
            record_at_hits: self.metrics.record_at_hits.get(),
            row_of_calls: self.metrics.row_of_calls.get(),
            row_of_hits: self.metrics.row_of_hits.get(),
            len: self.snapshot.len(),
            generation: self.generation,
        }
    }
}

#[cfg(feature = "metrics")]
impl<R> MetricsSnapshotProvider<SnapshotMetricsSnapshot> for SnapshotCache<R> {
    fn snapshot(&self) -> SnapshotMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registry::LockedRegistry;

    fn peer(id: NodeId, address: &str) -> PeerRecord {
        PeerRecord::new(id, address, "/test:1.0/")
    }

    fn ids<R>(cache: &SnapshotCache<R>) -> Vec<NodeId> {
        cache.records().iter().map(|r| r.node_id).collect()
    }

    fn registry(peers: Vec<PeerRecord>) -> Arc<LockedRegistry<PeerRecord>> {
        Arc::new(LockedRegistry::with_peers(peers))
    }

    #[test]
    fn new_cache_is_stale_and_empty() {
        let cache = SnapshotCache::new(registry(vec![peer(1, "a")]));
        assert_eq!(cache.state(), CacheState::Stale);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.sort_policy().column(), None);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn refresh_keeps_registry_order_when_unsorted() {
        let mut cache = SnapshotCache::new(registry(vec![peer(3, "c"), peer(1, "a"), peer(2, "b")]));
        assert_eq!(cache.refresh(), RefreshOutcome::Refreshed);
        assert_eq!(ids(&cache), vec![3, 1, 2]);
        assert_eq!(cache.state(), CacheState::Populated);
        assert_eq!(cache.generation(), 1);
    }

    #[test]
    fn sort_by_address_ascending() {
        let mut cache = SnapshotCache::new(registry(vec![peer(1, "b"), peer(2, "a")]));
        assert!(cache.set_sort(Some(PeerColumn::Address), SortOrder::Ascending).is_refreshed());
        assert_eq!(ids(&cache), vec![2, 1]);
        assert_eq!(cache.row_of(1), Some(1));
        assert_eq!(cache.row_of(2), Some(0));
    }

    #[test]
    fn sort_by_address_descending() {
        let mut cache = SnapshotCache::new(registry(vec![peer(1, "b"), peer(2, "a")]));
        assert!(cache.set_sort(Some(PeerColumn::Address), SortOrder::Descending).is_refreshed());
        assert_eq!(ids(&cache), vec![1, 2]);
    }

    #[test]
    fn equal_ping_is_stable() {
        let reg = registry(vec![peer(1, "x").with_ping(0.1), peer(2, "y").with_ping(0.1)]);
        let mut cache = SnapshotCache::new(reg);
        assert!(cache.set_sort(Some(PeerColumn::Ping), SortOrder::Ascending).is_refreshed());
        assert_eq!(ids(&cache), vec![1, 2]);
    }

    #[test]
    fn busy_registry_skips_without_change() {
        let reg = registry(vec![peer(1, "a")]);
        let mut cache = SnapshotCache::new(Arc::clone(&reg));
        assert!(cache.refresh().is_refreshed());

        let mut guard = reg.write();
        guard.push(peer(2, "b"));
        assert_eq!(cache.refresh(), RefreshOutcome::Skipped);
        assert_eq!(ids(&cache), vec![1]);
        assert_eq!(cache.generation(), 1);
        drop(guard);

        assert!(cache.refresh().is_refreshed());
        assert_eq!(ids(&cache), vec![1, 2]);
        assert_eq!(cache.generation(), 2);
    }

    #[test]
    fn skipped_first_refresh_stays_stale() {
        let reg = registry(vec![peer(1, "a")]);
        let mut cache = SnapshotCache::new(Arc::clone(&reg));
        let guard = reg.write();
        assert_eq!(cache.refresh(), RefreshOutcome::Skipped);
        assert_eq!(cache.state(), CacheState::Stale);
        drop(guard);
    }

    #[test]
    fn skipped_sort_change_applies_on_next_refresh() {
        let reg = registry(vec![peer(1, "b"), peer(2, "a")]);
        let mut cache = SnapshotCache::new(Arc::clone(&reg));
        assert!(cache.refresh().is_refreshed());

        let guard = reg.write();
        let outcome = cache.set_sort(Some(PeerColumn::Address), SortOrder::Ascending);
        assert_eq!(outcome, RefreshOutcome::Skipped);
        assert_eq!(ids(&cache), vec![1, 2]);
        drop(guard);

        assert!(cache.refresh().is_refreshed());
        assert_eq!(ids(&cache), vec![2, 1]);
    }

    #[test]
    fn disconnected_peer_is_not_found() {
        let reg = registry(vec![peer(1, "a"), peer(3, "c")]);
        let mut cache = SnapshotCache::new(Arc::clone(&reg));
        assert!(cache.refresh().is_refreshed());
        assert_eq!(cache.row_of(3), Some(1));

        reg.disconnect(3);
        assert!(cache.refresh().is_refreshed());
        assert_eq!(cache.row_of(3), None);
        assert_eq!(cache.row_of(1), Some(0));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut cache = SnapshotCache::new(registry(vec![peer(1, "a")]));
        assert!(cache.refresh().is_refreshed());
        assert_eq!(cache.row_of(42), None);
    }

    #[test]
    fn record_at_is_bounds_checked() {
        let mut cache = SnapshotCache::new(registry(vec![peer(1, "a"), peer(2, "b")]));
        assert!(cache.record_at(0).is_none());
        assert!(cache.refresh().is_refreshed());
        assert_eq!(cache.record_at(1).map(|r| r.node_id), Some(2));
        assert!(cache.record_at(2).is_none());
        assert!(cache.record_at(usize::MAX).is_none());
    }

    #[test]
    fn snapshot_is_a_deep_copy() {
        let reg = registry(vec![peer(1, "a").with_ping(0.5)]);
        let mut cache = SnapshotCache::new(Arc::clone(&reg));
        assert!(cache.refresh().is_refreshed());

        reg.update(1, |p| p.ping_time = Some(9.0));
        assert_eq!(cache.record_at(0).and_then(|r| r.ping_time), Some(0.5));
    }

    #[test]
    fn sort_change_refetches_registry() {
        let reg = registry(vec![peer(1, "b")]);
        let mut cache = SnapshotCache::new(Arc::clone(&reg));
        assert!(cache.refresh().is_refreshed());

        reg.connect(peer(2, "a"));
        assert!(cache.set_sort(Some(PeerColumn::Address), SortOrder::Ascending).is_refreshed());
        assert_eq!(ids(&cache), vec![2, 1]);

        assert!(cache.set_sort(None, SortOrder::Ascending).is_refreshed());
        assert_eq!(ids(&cache), vec![1, 2]);
    }

    #[test]
    fn duplicate_ids_from_registry_are_dropped() {
        // bypass connect() to simulate a registry breaking id uniqueness
        let reg = registry(vec![peer(1, "a"), peer(1, "dup"), peer(2, "b")]);
        let mut cache = SnapshotCache::new(reg);
        assert!(cache.refresh().is_refreshed());
        assert_eq!(ids(&cache), vec![1, 2]);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn works_over_borrowed_registry() {
        let reg = LockedRegistry::with_peers(vec![peer(5, "a")]);
        let mut cache = SnapshotCache::new(&reg);
        assert!(cache.refresh().is_refreshed());
        assert_eq!(cache.row_of(5), Some(0));
        assert_eq!(cache.registry().len(), 1);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_track_refresh_outcomes() {
        let reg = registry(vec![peer(1, "a"), peer(2, "b")]);
        let mut cache = SnapshotCache::new(Arc::clone(&reg));
        assert!(cache.refresh().is_refreshed());
        let guard = reg.write();
        assert!(!cache.refresh().is_refreshed());
        drop(guard);
        let _ = cache.row_of(1);
        let _ = cache.row_of(9);
        let _ = cache.record_at(5);

        let m = cache.metrics_snapshot();
        assert_eq!(m.refresh_calls, 2);
        assert_eq!(m.refreshes_completed, 1);
        assert_eq!(m.refreshes_skipped, 1);
        assert_eq!(m.records_copied, 2);
        assert_eq!(m.row_of_calls, 2);
        assert_eq!(m.row_of_hits, 1);
        assert_eq!(m.record_at_calls, 1);
        assert_eq!(m.record_at_hits, 0);
        assert_eq!(m.len, 2);
        assert_eq!(m.generation, 1);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_count_copies_before_dedup() {
        let reg = registry(vec![peer(1, "a"), peer(1, "dup"), peer(2, "b")]);
        let mut cache = SnapshotCache::new(reg);
        assert!(cache.refresh().is_refreshed());

        let m = cache.metrics_snapshot();
        assert_eq!(m.records_copied, 3);
        assert_eq!(m.duplicates_dropped, 1);
        assert_eq!(m.len, 2);

        let via_provider = MetricsSnapshotProvider::snapshot(&cache);
        assert_eq!(via_provider, m);
        assert_eq!(cache.current().len(), 2);
    }
}
