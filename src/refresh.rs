//! Shared table handle and periodic refresh driver (feature `concurrency`).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────┐        ┌───────────────────────────────┐
//!   │  AutoRefresh thread      │        │  UI / control thread          │
//!   │                          │        │                               │
//!   │  every `interval`:       │        │  with_read(|t| t.data(..))    │
//!   │    table.refresh()       │        │  row_by_node_id(selected)     │
//!   └────────────┬─────────────┘        └───────────────┬───────────────┘
//!                │ write lock (copy+sort+index)         │ read lock
//!                ▼                                      ▼
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │  ConcurrentPeerTable<R> = Arc<RwLock<PeerTableModel<R>>>         │
//!   └────────────────────────────────┬─────────────────────────────────┘
//!                                    │ try_read_peers (never waits)
//!                                    ▼
//!                          ConnectionRegistry R
//! ```
//!
//! The table lock is held only for one bounded copy-sort-index pass. The
//! registry is never waited on: a busy registry turns the tick into a
//! skipped refresh and the thread sleeps until the next tick.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use peertable::record::PeerRecord;
//! use peertable::refresh::{AutoRefresh, ConcurrentPeerTable};
//! use peertable::registry::LockedRegistry;
//! use peertable::table::PeerTableModel;
//!
//! let registry = Arc::new(LockedRegistry::<PeerRecord>::new());
//! let table = ConcurrentPeerTable::new(PeerTableModel::new(Arc::clone(&registry)));
//!
//! let mut timer = AutoRefresh::start(table.clone(), Duration::from_millis(10)).unwrap();
//! registry.connect(PeerRecord::new(1, "10.0.0.1:8333", "/a/"));
//! while table.row_by_node_id(1).is_none() {
//!     std::thread::sleep(Duration::from_millis(5));
//! }
//! timer.stop();
//!
//! assert_eq!(table.row_count(), 1);
//! ```

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, trace, warn};

use crate::policy::sort::SortOrder;
use crate::record::{NodeId, PeerColumn, PeerRecord};
use crate::snapshot::RefreshOutcome;
use crate::table::{PeerTableModel, notify_about_to_change, notify_changed};
use crate::traits::{ConnectionRegistry, TableObserver};

/// Default period between automatic refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(1000);

// ---------------------------------------------------------------------------
// ConcurrentPeerTable
// ---------------------------------------------------------------------------

/// Thread-safe peer table handle using a `parking_lot::RwLock`.
///
/// Lookups take a **read lock** and run in parallel. `refresh` and `sort`
/// take a **write lock**, so readers see either the previous snapshot or the
/// new one and never an in-flight refresh.
///
/// Observers are notified with no table lock held, so an observer may call
/// back into its own handle (for example `row_by_node_id` to restore a
/// selection inside `layout_changed`).
pub struct ConcurrentPeerTable<R> {
    inner: Arc<RwLock<PeerTableModel<R>>>,
}

impl<R> Clone for ConcurrentPeerTable<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: ConnectionRegistry> ConcurrentPeerTable<R> {
    /// Refreshes the snapshot.
    pub fn refresh(&self) -> RefreshOutcome {
        let observers = self.inner.read().observers();
        notify_about_to_change(&observers);
        let outcome = self.inner.write().refresh_unnotified();
        notify_changed(&observers);
        outcome
    }

    /// Changes the sort and refreshes.
    pub fn sort(&self, column: Option<PeerColumn>, order: SortOrder) -> RefreshOutcome {
        let observers = self.inner.read().observers();
        notify_about_to_change(&observers);
        let outcome = self.inner.write().sort_unnotified(column, order);
        notify_changed(&observers);
        outcome
    }
}

impl<R> ConcurrentPeerTable<R> {
    /// Wraps a model for shared use.
    pub fn new(model: PeerTableModel<R>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(model)),
        }
    }

    /// Runs `f` against the model under a read lock.
    pub fn with_read<T>(&self, f: impl FnOnce(&PeerTableModel<R>) -> T) -> T {
        f(&*self.inner.read())
    }

    /// Like [`with_read`](Self::with_read) but returns `None` instead of
    /// waiting while a refresh holds the write lock.
    pub fn try_with_read<T>(&self, f: impl FnOnce(&PeerTableModel<R>) -> T) -> Option<T> {
        let guard = self.inner.try_read()?;
        Some(f(&*guard))
    }

    /// Acquires a read guard over the model.
    pub fn read(&self) -> RwLockReadGuard<'_, PeerTableModel<R>> {
        self.inner.read()
    }

    /// Registers an observer for refresh notifications.
    pub fn add_observer(&self, observer: Arc<dyn TableObserver>) {
        self.inner.write().add_observer(observer);
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.inner.read().row_count()
    }

    /// Current row of `node_id`.
    pub fn row_by_node_id(&self, node_id: NodeId) -> Option<usize> {
        self.inner.read().row_by_node_id(node_id)
    }

    /// Cloned record at `row`.
    pub fn node_stats(&self, row: usize) -> Option<PeerRecord> {
        self.inner.read().node_stats(row).cloned()
    }
}

impl<R> std::fmt::Debug for ConcurrentPeerTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentPeerTable")
            .field("inner", &*self.inner.read())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AutoRefresh
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    /// Sleeps until `deadline` or until stopped. Returns `true` if stopped.
    ///
    /// A `None` deadline lies beyond what `Instant` can represent, so the
    /// wait only ends on stop.
    fn wait_until(&self, deadline: Option<Instant>) -> bool {
        let mut stopped = self.stopped.lock();
        while !*stopped {
            match deadline {
                Some(deadline) => {
                    if self.wake.wait_until(&mut stopped, deadline).timed_out() {
                        break;
                    }
                },
                None => self.wake.wait(&mut stopped),
            }
        }
        *stopped
    }

    fn stop(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }
}

/// Background thread that refreshes a [`ConcurrentPeerTable`] on a fixed
/// period.
///
/// Dropping the handle stops the thread and joins it.
#[derive(Debug)]
pub struct AutoRefresh {
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl AutoRefresh {
    /// Spawns the refresh thread.
    ///
    /// The first refresh happens one `interval` after start; the model
    /// already loaded its initial rows when it was built.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero interval, or the spawn error if the thread
    /// could not be created.
    pub fn start<R>(table: ConcurrentPeerTable<R>, interval: Duration) -> io::Result<Self>
    where
        R: ConnectionRegistry + Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "refresh interval must be > 0",
            ));
        }

        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);
        let handle = std::thread::Builder::new()
            .name("peertable-refresh".into())
            .spawn(move || {
                let mut next = Instant::now().checked_add(interval);
                while !thread_signal.wait_until(next) {
                    let outcome = table.refresh();
                    trace!(?outcome, "auto refresh tick");
                    let now = Instant::now();
                    // fell behind: skip missed ticks instead of bursting
                    next = match next.and_then(|tick| tick.checked_add(interval)) {
                        Some(tick) if tick >= now => Some(tick),
                        _ => now.checked_add(interval),
                    };
                }
            })?;

        debug!(interval_ms = interval.as_millis() as u64, "auto refresh started");
        Ok(Self {
            signal,
            handle: Some(handle),
            interval,
        })
    }

    /// Period between refreshes.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` while the refresh thread is alive.
    ///
    /// `false` after [`stop`](Self::stop), or if the thread died because an
    /// observer panicked.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the thread and waits for it to exit. Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.signal.stop();
        match handle.join() {
            Ok(()) => debug!("auto refresh stopped"),
            Err(_) => warn!("auto refresh thread panicked before stop"),
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}
