pub use crate::builder::PeerTableBuilder;
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::sort::{SortOrder, SortPolicy};
pub use crate::record::{NodeId, PeerColumn, PeerRecord};
pub use crate::registry::LockedRegistry;
pub use crate::snapshot::{CacheState, RefreshOutcome, Snapshot, SnapshotCache};
pub use crate::table::PeerTableModel;
pub use crate::traits::{ConnectionRegistry, PeerStats, TableObserver};

#[cfg(feature = "concurrency")]
pub use crate::refresh::{AutoRefresh, ConcurrentPeerTable};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::SnapshotMetricsSnapshot;
