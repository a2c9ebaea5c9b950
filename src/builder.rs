//! Builder for peer tables.
//!
//! Collects the few knobs a peer table has (refresh period, initial sort,
//! header labels), validates them, and assembles the model.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use peertable::builder::PeerTableBuilder;
//! use peertable::policy::sort::SortOrder;
//! use peertable::record::{PeerColumn, PeerRecord};
//! use peertable::registry::LockedRegistry;
//!
//! let registry = LockedRegistry::with_peers(vec![
//!     PeerRecord::new(1, "b", "/x/").with_ping(0.3),
//!     PeerRecord::new(2, "a", "/x/").with_ping(0.1),
//! ]);
//! let table = PeerTableBuilder::new()
//!     .refresh_interval(Duration::from_millis(500))
//!     .sort_by(Some(PeerColumn::Ping), SortOrder::Ascending)
//!     .build(&registry);
//!
//! assert_eq!(table.row_by_node_id(2), Some(0));
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::policy::sort::{SortOrder, SortPolicy};
use crate::record::PeerColumn;
use crate::snapshot::SnapshotCache;
use crate::table::{Headers, PeerTableModel, default_headers};
use crate::traits::ConnectionRegistry;

#[cfg(feature = "concurrency")]
use crate::refresh::{AutoRefresh, ConcurrentPeerTable, DEFAULT_REFRESH_INTERVAL};

#[cfg(not(feature = "concurrency"))]
const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(1000);

/// Peer table configuration.
#[derive(Debug, Clone)]
pub struct PeerTableBuilder {
    refresh_interval: Duration,
    sort: SortPolicy,
    headers: Headers,
}

impl Default for PeerTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerTableBuilder {
    /// Defaults: 1000 ms refresh, registry order, English headers.
    pub fn new() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            sort: SortPolicy::UNSORTED,
            headers: default_headers(),
        }
    }

    /// Sets the auto-refresh period. Validated by [`try_build`](Self::try_build).
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Sets the auto-refresh period, rejecting zero immediately.
    pub fn try_refresh_interval(self, interval: Duration) -> Result<Self, ConfigError> {
        validate_interval(interval)?;
        Ok(self.refresh_interval(interval))
    }

    /// Sets the initial sort; `None` keeps registry order.
    pub fn sort_by(mut self, column: Option<PeerColumn>, order: SortOrder) -> Self {
        self.sort = SortPolicy::new(column, order);
        self
    }

    /// Sets the initial sort by header position.
    pub fn try_sort_by_index(self, index: usize, order: SortOrder) -> Result<Self, ConfigError> {
        let column = PeerColumn::from_index(index).ok_or_else(|| {
            ConfigError::new(format!(
                "sort column {} out of range (table has {} columns)",
                index,
                PeerColumn::COUNT
            ))
        })?;
        Ok(self.sort_by(Some(column), order))
    }

    /// Replaces the header labels, in column order.
    pub fn headers<S: Into<String>>(mut self, labels: [S; PeerColumn::COUNT]) -> Self {
        self.headers = labels.map(Into::into);
        self
    }

    /// Configured refresh period.
    pub fn interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Configured initial sort.
    pub fn sort_policy(&self) -> SortPolicy {
        self.sort
    }

    /// Validates the configuration and builds the model.
    ///
    /// The model attempts its initial refresh before returning.
    pub fn try_build<R: ConnectionRegistry>(self, registry: R) -> Result<PeerTableModel<R>, ConfigError> {
        validate_interval(self.refresh_interval)?;
        let cache = SnapshotCache::with_sort(registry, self.sort);
        Ok(PeerTableModel::from_parts(cache, self.headers))
    }

    /// Builds the model.
    ///
    /// # Panics
    ///
    /// Panics on invalid configuration. Use [`try_build`](Self::try_build)
    /// for a non-panicking alternative.
    pub fn build<R: ConnectionRegistry>(self, registry: R) -> PeerTableModel<R> {
        match self.try_build(registry) {
            Ok(table) => table,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds a shared table handle.
    #[cfg(feature = "concurrency")]
    pub fn try_build_concurrent<R: ConnectionRegistry>(
        self,
        registry: R,
    ) -> Result<ConcurrentPeerTable<R>, ConfigError> {
        self.try_build(registry).map(ConcurrentPeerTable::new)
    }

    /// Builds a shared table handle and starts refreshing it every
    /// configured interval.
    #[cfg(feature = "concurrency")]
    pub fn spawn<R>(self, registry: R) -> Result<(ConcurrentPeerTable<R>, AutoRefresh), ConfigError>
    where
        R: ConnectionRegistry + Send + Sync + 'static,
    {
        let interval = self.refresh_interval;
        let table = self.try_build_concurrent(registry)?;
        let timer = AutoRefresh::start(table.clone(), interval)
            .map_err(|e| ConfigError::new(format!("cannot start auto refresh: {}", e)))?;
        Ok((table, timer))
    }
}

fn validate_interval(interval: Duration) -> Result<(), ConfigError> {
    if interval.is_zero() {
        return Err(ConfigError::new("refresh interval must be > 0"));
    }
    Ok(())
}
