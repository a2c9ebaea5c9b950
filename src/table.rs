//! Row/column view of the snapshot cache for a table projection.
//!
//! [`PeerTableModel`] owns a [`SnapshotCache`] and exposes it the way a
//! table widget consumes data: a row count, three fixed columns with header
//! labels, display text per cell, and identifier lookups for restoring a
//! selection after rows move. Every refresh is bracketed by
//! [`TableObserver`] notifications so views never read a half-updated cache.
//!
//! ## Architecture
//!
//! ```text
//!   scheduler tick / header click
//!              │
//!              ▼
//!   ┌─────────────────────────────────────────────────────────┐
//!   │ PeerTableModel::refresh / sort                          │
//!   │                                                         │
//!   │   observers.layout_about_to_change()                    │
//!   │   cache.refresh()  or  cache.set_sort(..)               │
//!   │   observers.layout_changed()                            │
//!   └─────────────────────────────────────────────────────────┘
//!              │
//!              ▼
//!   row_count() · data(row, column) · row_by_node_id(id)
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use peertable::policy::sort::SortOrder;
//! use peertable::record::{PeerColumn, PeerRecord};
//! use peertable::registry::LockedRegistry;
//! use peertable::table::PeerTableModel;
//!
//! let registry = LockedRegistry::with_peers(vec![
//!     PeerRecord::new(1, "10.0.0.2:8333", "/Satoshi:0.9.0/").with_ping(0.25),
//!     PeerRecord::new(2, "10.0.0.1:8333", "/Satoshi:0.8.6/"),
//! ]);
//! let mut table = PeerTableModel::new(&registry);
//! assert_eq!(table.row_count(), 2);
//!
//! let _ = table.sort(Some(PeerColumn::Address), SortOrder::Ascending);
//! assert_eq!(table.data(1, PeerColumn::Ping).as_deref(), Some("0.250"));
//! assert_eq!(table.row_by_node_id(2), Some(0));
//! ```

use std::sync::Arc;

use crate::policy::sort::{SortOrder, SortPolicy};
use crate::record::{NodeId, PeerColumn, PeerRecord};
use crate::snapshot::{RefreshOutcome, SnapshotCache};
use crate::traits::{ConnectionRegistry, TableObserver};

/// Header labels, one per [`PeerColumn`].
pub type Headers = [String; PeerColumn::COUNT];

/// Default English header labels.
pub fn default_headers() -> Headers {
    PeerColumn::ALL.map(|column| column.default_label().to_string())
}

/// Renders a ping time in seconds with millisecond precision.
///
/// Unknown pings render as an empty cell.
pub fn format_ping(ping_time: Option<f64>) -> String {
    match ping_time {
        Some(seconds) => format!("{seconds:.3}"),
        None => String::new(),
    }
}

/// Table model over a peer snapshot.
pub struct PeerTableModel<R> {
    cache: SnapshotCache<R>,
    headers: Headers,
    observers: Vec<Arc<dyn TableObserver>>,
}

impl<R: ConnectionRegistry> PeerTableModel<R> {
    /// Creates an unsorted model and loads the initial rows.
    ///
    /// If the registry is busy the model starts empty and fills on the next
    /// refresh.
    pub fn new(registry: R) -> Self {
        Self::from_parts(SnapshotCache::new(registry), default_headers())
    }

    /// Wraps an existing cache, then attempts an initial refresh.
    pub fn from_parts(cache: SnapshotCache<R>, headers: Headers) -> Self {
        let mut model = Self {
            cache,
            headers,
            observers: Vec::new(),
        };
        let _ = model.refresh();
        model
    }

    /// Refreshes the snapshot, bracketed by observer notifications.
    pub fn refresh(&mut self) -> RefreshOutcome {
        notify_about_to_change(&self.observers);
        let outcome = self.cache.refresh();
        notify_changed(&self.observers);
        outcome
    }

    /// Sorts by `column` (`None` = registry order) and refreshes.
    pub fn sort(&mut self, column: Option<PeerColumn>, order: SortOrder) -> RefreshOutcome {
        notify_about_to_change(&self.observers);
        let outcome = self.cache.set_sort(column, order);
        notify_changed(&self.observers);
        outcome
    }

    /// Refreshes without notifying; the caller brackets the call.
    #[cfg(feature = "concurrency")]
    pub(crate) fn refresh_unnotified(&mut self) -> RefreshOutcome {
        self.cache.refresh()
    }

    /// Sorts without notifying; the caller brackets the call.
    #[cfg(feature = "concurrency")]
    pub(crate) fn sort_unnotified(&mut self, column: Option<PeerColumn>, order: SortOrder) -> RefreshOutcome {
        self.cache.set_sort(column, order)
    }

    /// Sorts by a header position as reported by a table widget.
    ///
    /// Negative or out-of-range positions clear the sort.
    pub fn sort_by_index(&mut self, column: i32, order: SortOrder) -> RefreshOutcome {
        let column = usize::try_from(column).ok().and_then(PeerColumn::from_index);
        self.sort(column, order)
    }
}

impl<R> PeerTableModel<R> {
    /// Registers an observer for refresh notifications.
    pub fn add_observer(&mut self, observer: Arc<dyn TableObserver>) {
        self.observers.push(observer);
    }

    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.cache.len()
    }

    /// Number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        PeerColumn::COUNT
    }

    /// Header label of the column at `section`.
    pub fn header(&self, section: usize) -> Option<&str> {
        self.headers.get(section).map(String::as_str)
    }

    /// Display text of one cell, `None` when `row` is out of range.
    pub fn data(&self, row: usize, column: PeerColumn) -> Option<String> {
        let record = self.cache.record_at(row)?;
        Some(match column {
            PeerColumn::Address => record.address.clone(),
            PeerColumn::SubVersion => record.sub_version.clone(),
            PeerColumn::Ping => format_ping(record.ping_time),
        })
    }

    /// Display text by column position.
    pub fn data_at(&self, row: usize, section: usize) -> Option<String> {
        self.data(row, PeerColumn::from_index(section)?)
    }

    /// Full record behind `row`.
    #[inline]
    pub fn node_stats(&self, row: usize) -> Option<&PeerRecord> {
        self.cache.record_at(row)
    }

    /// Current row of `node_id`, `None` if it is no longer connected.
    #[inline]
    pub fn row_by_node_id(&self, node_id: NodeId) -> Option<usize> {
        self.cache.row_of(node_id)
    }

    /// Active sort policy.
    #[inline]
    pub fn sort_policy(&self) -> SortPolicy {
        self.cache.sort_policy()
    }

    /// The underlying cache.
    #[inline]
    pub fn cache(&self) -> &SnapshotCache<R> {
        &self.cache
    }

    /// Handles to the registered observers.
    #[cfg(feature = "concurrency")]
    pub(crate) fn observers(&self) -> Vec<Arc<dyn TableObserver>> {
        self.observers.clone()
    }
}

pub(crate) fn notify_about_to_change(observers: &[Arc<dyn TableObserver>]) {
    for observer in observers {
        observer.layout_about_to_change();
    }
}

pub(crate) fn notify_changed(observers: &[Arc<dyn TableObserver>]) {
    for observer in observers {
        observer.layout_changed();
    }
}

impl<R> std::fmt::Debug for PeerTableModel<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerTableModel")
            .field("rows", &self.cache.len())
            .field("sort", &self.cache.sort_policy())
            .field("generation", &self.cache.generation())
            .field("observers", &self.observers.len())
            .finish()
    }
}
