//! peertable: a non-blocking, consistently ordered snapshot of live peer
//! connections, shaped for table views.
//!
//! The networking layer owns the authoritative peer list behind a lock
//! ([`ConnectionRegistry`](traits::ConnectionRegistry)). A
//! [`SnapshotCache`](snapshot::SnapshotCache) copies it only when the lock is
//! free, sorts the copy, and indexes node ids to rows. A
//! [`PeerTableModel`](table::PeerTableModel) renders the cache as rows and
//! columns, and [`AutoRefresh`](refresh::AutoRefresh) keeps it current on a
//! timer.

pub mod builder;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod policy;
pub mod prelude;
pub mod record;

#[cfg(feature = "concurrency")]
pub mod refresh;

pub mod registry;
pub mod snapshot;
pub mod table;
pub mod traits;
